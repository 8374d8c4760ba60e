pub mod accounts;
pub mod sheets;
