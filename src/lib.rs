pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod login_app;
pub mod state;
pub mod telemetry;
pub mod users;
