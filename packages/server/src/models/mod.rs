pub mod app_version;
pub mod filter;
