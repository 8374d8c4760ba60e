// Route registry and dispatch

use http::{Method, StatusCode};
use std::sync::Arc;

use crate::core::error::error_reply;
use crate::core::state::AppState;
use crate::handlers::{auth::AuthRoute, fallback::fallback, sheets::SheetRoute};
use crate::net::response::Reply;

/// A group of paths served by one handler.
pub trait Route: Send + Sync {
    fn matches(&self, path: &str) -> bool;

    /// Only called when `matches(path)` is true. Unsupported methods are
    /// answered with 405 from here.
    fn handle(&self, method: &Method, path: &str, body: &str) -> Reply;
}

/// Ordered routes; the first match wins.
pub struct Router {
    routes: Vec<Box<dyn Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn route(mut self, route: impl Route + 'static) -> Self {
        self.routes.push(Box::new(route));
        self
    }

    pub fn dispatch(&self, method: &Method, path: &str, body: &str) -> Reply {
        match self.routes.iter().find(|route| route.matches(path)) {
            Some(route) => route.handle(method, path, body),
            None => fallback(),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

pub fn method_not_allowed() -> Reply {
    error_reply(StatusCode::METHOD_NOT_ALLOWED, "Methode non autorisee")
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Account endpoints
        .route(AuthRoute::new(Arc::clone(&state.accounts)))
        // Sheet endpoints (require a connected user)
        .route(SheetRoute::new(
            Arc::clone(&state.session),
            Arc::clone(&state.sheets),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, &'static str);

    impl Route for Fixed {
        fn matches(&self, path: &str) -> bool {
            path.starts_with(self.0)
        }

        fn handle(&self, _method: &Method, _path: &str, _body: &str) -> Reply {
            Reply::ok(self.1)
        }
    }

    #[test]
    fn test_first_match_wins() {
        let router = Router::new()
            .route(Fixed("/api/a", "first"))
            .route(Fixed("/api", "second"));

        assert_eq!(router.dispatch(&Method::GET, "/api/a/b", "").body, "first");
        assert_eq!(router.dispatch(&Method::GET, "/api/z", "").body, "second");
    }

    #[test]
    fn test_no_match_is_404() {
        let router = Router::new().route(Fixed("/api", "x"));
        let reply = router.dispatch(&Method::GET, "/other", "");
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body, r#"{"erreur":"Route inconnue"}"#);
    }

    #[test]
    fn test_method_not_allowed_body() {
        let reply = method_not_allowed();
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.body, r#"{"erreur":"Methode non autorisee"}"#);
    }
}
