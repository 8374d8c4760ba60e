// Centralized error handling for the sheet server

use http::StatusCode;
use thiserror::Error;

use crate::handlers::render;
use crate::net::response::Reply;

/// Errors returned by the account and sheet services
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Non connecte")]
    NotAuthenticated,

    #[error("{0}")]
    NotFound(String),

    #[error("Le nom d'utilisateur existe deja")]
    Conflict,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Nom ou mot de passe incorrect")]
    InvalidCredentials,

    #[error("Module inconnu")]
    UnknownModule(String),

    #[error("Erreur interne")]
    Storage(#[from] anyhow::Error),
}

impl SheetError {
    pub fn sheet_not_found() -> Self {
        SheetError::NotFound("Fiche non trouvee".to_string())
    }

    pub fn invalid(message: &str) -> Self {
        SheetError::InvalidInput(message.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SheetError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            SheetError::NotFound(_) => StatusCode::NOT_FOUND,
            SheetError::Conflict => StatusCode::CONFLICT,
            SheetError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SheetError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            SheetError::UnknownModule(_) => StatusCode::BAD_REQUEST,
            SheetError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{"erreur": <message>}` with the matching status.
    pub fn into_reply(self) -> Reply {
        error_reply(self.status(), &self.to_string())
    }
}

pub fn error_reply(status: StatusCode, message: &str) -> Reply {
    Reply::json(status, render::error_body(message))
}
