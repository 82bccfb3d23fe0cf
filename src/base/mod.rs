//! Foundation types for the procmodel repository.
//!
//! This module provides the types shared by every other layer:
//! - [`RepositoryError`] - The error taxonomy of the repository
//! - [`Message`], [`MessageContainer`] - Validation messages collected during
//!   bulk loads and reference passes
//! - Domain constants (system model name, storage layout names, delimiters)
//!
//! This module has NO dependencies on other procmodel modules.

pub mod constants;
mod error;
mod messages;

pub use error::{RepositoryError, Result};
pub use messages::{Message, MessageContainer, Severity};
