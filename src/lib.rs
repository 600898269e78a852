//! folio: a personal portfolio site with a markdown blog, a password-gated
//! post editor and a GitHub project feed.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
