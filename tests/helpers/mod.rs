//! Shared fixtures for the repository integration tests.

pub mod model_tree;

pub use model_tree::{ModelTree, q};
