pub mod app_version;
