pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use app::{AppSnapshot, ScannerApp};
pub use config::AppConfig;
pub use error::{ClientError, ClientResult};
