pub mod session;
pub mod sheet_store;
pub mod user_store;
