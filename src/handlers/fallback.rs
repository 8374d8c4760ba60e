use http::StatusCode;

use crate::core::error::error_reply;
use crate::net::response::Reply;

/// Answer for paths no route claims
pub fn fallback() -> Reply {
    error_reply(StatusCode::NOT_FOUND, "Route inconnue")
}
