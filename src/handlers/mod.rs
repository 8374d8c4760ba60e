pub mod auth;
pub mod body;
pub mod fallback;
pub mod render;
pub mod sheets;
