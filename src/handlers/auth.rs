use http::{Method, StatusCode};
use std::sync::Arc;

use crate::core::error::{error_reply, SheetError};
use crate::core::routes::{method_not_allowed, Route};
use crate::handlers::{body::parse_body, fallback::fallback, render};
use crate::models::api::CredentialsBody;
use crate::net::response::Reply;
use crate::services::accounts::AccountService;

/// `/api/signup`, `/api/login`, `/api/logout`, `/api/utilisateur`
pub struct AuthRoute {
    accounts: Arc<AccountService>,
}

impl AuthRoute {
    pub fn new(accounts: Arc<AccountService>) -> Self {
        Self { accounts }
    }

    fn signup(&self, body: &str) -> Reply {
        let (Some(name), Some(password)) = credentials(body) else {
            return SheetError::invalid("Nom et mot de passe requis").into_reply();
        };

        match self.accounts.signup(&name, &password) {
            Ok(principal) => Reply::created(render::success_with_id_name(principal.id, &principal.name)),
            Err(e) => e.into_reply(),
        }
    }

    fn login(&self, body: &str) -> Reply {
        let (Some(name), Some(password)) = credentials(body) else {
            return SheetError::invalid("Nom et mot de passe requis").into_reply();
        };

        match self.accounts.login(&name, &password) {
            Ok(principal) => Reply::ok(render::success_with_id_name(principal.id, &principal.name)),
            Err(e) => e.into_reply(),
        }
    }

    fn logout(&self) -> Reply {
        match self.accounts.logout() {
            Some(_) => Reply::ok(render::success()),
            None => error_reply(StatusCode::OK, "Aucun utilisateur connecte"),
        }
    }

    fn current_user(&self) -> Reply {
        match self.accounts.whoami() {
            Some(principal) => Reply::ok(render::connected(&principal)),
            None => Reply::ok(render::disconnected()),
        }
    }
}

fn credentials(body: &str) -> (Option<String>, Option<String>) {
    let CredentialsBody { nom, motdepasse } = parse_body(body);
    (nom, motdepasse)
}

impl Route for AuthRoute {
    fn matches(&self, path: &str) -> bool {
        matches!(
            path,
            "/api/signup" | "/api/login" | "/api/logout" | "/api/utilisateur"
        )
    }

    fn handle(&self, method: &Method, path: &str, body: &str) -> Reply {
        match (path, method) {
            ("/api/signup", &Method::POST) => self.signup(body),
            ("/api/login", &Method::POST) => self.login(body),
            ("/api/logout", &Method::POST) => self.logout(),
            ("/api/utilisateur", &Method::GET) => self.current_user(),
            ("/api/signup" | "/api/login" | "/api/logout" | "/api/utilisateur", _) => {
                method_not_allowed()
            }
            _ => fallback(),
        }
    }
}
