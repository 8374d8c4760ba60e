use std::sync::Arc;
use tracing::{info, warn};

use crate::core::error::SheetError;
use crate::models::user::Principal;
use crate::stores::{session::SessionSlot, sheet_store::SheetStore, user_store::UserStore};
use crate::utils::digest::{hash_password, verify_password};

/// Signup, login, logout and "who am I" over the user registry and the
/// session slot.
pub struct AccountService {
    users: Arc<UserStore>,
    sheets: Arc<SheetStore>,
    session: Arc<SessionSlot>,
}

impl AccountService {
    pub fn new(users: Arc<UserStore>, sheets: Arc<SheetStore>, session: Arc<SessionSlot>) -> Self {
        Self {
            users,
            sheets,
            session,
        }
    }

    /// Create an account. Does not log the new user in.
    pub fn signup(&self, name: &str, password: &str) -> Result<Principal, SheetError> {
        validate_credentials(name, password)?;

        let user = self
            .users
            .insert(name, &hash_password(password))
            .ok_or(SheetError::Conflict)?;

        // Continue anyway - the account exists in memory
        if let Err(e) = self.users.persist() {
            warn!(user_id = user.id, error = %e, "Failed to persist user file");
        }
        if let Err(e) = self.sheets.hydrate(user.id) {
            warn!(user_id = user.id, error = %e, "Failed to load sheets of new user");
        }

        info!(user_id = user.id, name = %user.name, "Account created");
        Ok(user.principal())
    }

    /// Check credentials and make the user the connected principal.
    /// On failure the current session is left as it was.
    pub fn login(&self, name: &str, password: &str) -> Result<Principal, SheetError> {
        let user = self
            .users
            .get(name)
            .filter(|user| verify_password(password, &user.password_digest))
            .ok_or(SheetError::InvalidCredentials)?;

        let principal = user.principal();
        match self.session.replace(principal.clone()) {
            Some(previous) => info!(
                user_id = principal.id,
                previous_user_id = previous.id,
                "Login replaced the connected user"
            ),
            None => info!(user_id = principal.id, "User logged in"),
        }

        Ok(principal)
    }

    /// Disconnect the current principal, if any.
    pub fn logout(&self) -> Option<Principal> {
        let previous = self.session.clear();
        if let Some(principal) = &previous {
            info!(user_id = principal.id, "User logged out");
        }
        previous
    }

    pub fn whoami(&self) -> Option<Principal> {
        self.session.current()
    }
}

/// Names end up as `;`-separated file fields, one per line.
fn validate_credentials(name: &str, password: &str) -> Result<(), SheetError> {
    if name.is_empty() || password.is_empty() {
        return Err(SheetError::invalid("Nom et mot de passe requis"));
    }
    if name.contains([';', '\n', '\r']) {
        return Err(SheetError::invalid("Nom invalide"));
    }
    Ok(())
}
