pub mod core;
pub mod handlers;
pub mod models;
pub mod net;
pub mod persistence;
pub mod services;
pub mod stores;
pub mod utils;
