#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: String,
    /// Lowercase hex SHA-256 of the password
    pub password_digest: String,
}

impl User {
    pub fn new(id: u32, name: impl Into<String>, password_digest: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            password_digest: password_digest.into(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// The connected user, as seen by the sheet service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: u32,
    pub name: String,
}
