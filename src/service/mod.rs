//! Lifecycle services layered over the administrative connection.

pub mod credentials;
pub mod dump;
pub mod export_job;
pub mod manager;
pub mod storage;
