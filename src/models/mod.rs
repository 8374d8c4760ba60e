pub mod api;
pub mod module;
pub mod sheet;
pub mod user;
