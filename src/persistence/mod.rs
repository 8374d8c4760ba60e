pub mod sheet_file;
pub mod user_file;
