//! # Storage backends
//!
//! Two [`ModelStore`](crate::manager::ModelStore) implementations sharing one
//! directory layout and one XML codec:
//!
//! - [`FileSystemStore`] - writable, one directory per model below configured roots
//! - [`ResourceStore`] - read-only, the same layout below a resource prefix

pub mod descriptor;
mod filesystem;
mod resource;
mod tree;

pub use filesystem::{FileSystemModelManager, FileSystemStore};
pub use resource::{ResourceModelManager, ResourceStore};

#[cfg(test)]
mod tests;
