//! Domain layer types and invariants.

pub mod error;
pub mod hobbies;
pub mod posts;
pub mod slug;
