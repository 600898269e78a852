//! File-backed post storage.

pub mod frontmatter;
mod fs;

pub use fs::FileStore;
