//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod db;
pub mod error;
pub mod github;
pub mod http;
pub mod store;
pub mod telemetry;
