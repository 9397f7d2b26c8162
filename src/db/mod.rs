//! Database module: the administrative session and the statements sent over it.
//!
//! Layout:
//! - `connection.rs`: one explicitly opened/closed MySQL session
//! - `statements.rs`: SQL text for schema and account administration

pub mod connection;
pub mod statements;

pub use connection::{Connection, ConnectionSettings};
