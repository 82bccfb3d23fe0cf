//! # Models
//!
//! A model is a named namespace of typed items with an ordered import list.
//! Items live in a table keyed by item type, then by name. Reference
//! resolution consults the model itself, its direct imports and the System
//! model, in that order; see [`ModelContext`].

mod container;
mod item;
mod resolve;

pub use container::{ImportState, Model};
pub use item::{Item, ItemReference, ItemType, ModelObject};
pub use resolve::{ModelContext, ObjectRef};

#[cfg(test)]
mod tests;
