//! askama view models and templates.

pub mod admin;
pub mod views;
