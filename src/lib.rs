pub mod config;
pub mod error;
pub mod service;
pub mod router;
pub mod middleware;
pub mod handlers;
pub mod db;
pub mod types;

pub use config::Config;
pub use error::ApiError;
pub use service::manager::DatabaseManager;
