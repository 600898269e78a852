//! Application services layer.

pub mod access;
pub mod error;
pub mod migrate;
pub mod posts;
pub mod projects;
pub mod render;
pub mod repos;
