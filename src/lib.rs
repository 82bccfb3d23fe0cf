//! # procmodel-base
//!
//! Core library for business-process model repositories: qualified names,
//! models with import-based resolution, per-model code resolution and the
//! storage backends behind a single manager contract.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! shared / config  → thread-shared handle, environment configuration
//!   ↓
//! multiplexer      → several managers behind one contract
//!   ↓
//! backend          → filesystem and read-only resource stores, XML codec
//!   ↓
//! manager          → ModelManager contract, registration base, reference pass
//!   ↓
//! code             → per-model code and resource resolution
//!   ↓
//! model            → models, items, import resolution
//!   ↓
//! qualifier        → Logos lexer and parser for qualified names
//!   ↓
//! base             → errors, messages, constants
//! ```

// ============================================================================
// MODULES (dependency order: base → qualifier → model → code → manager → backend)
// ============================================================================

/// Foundation types: RepositoryError, Message, MessageContainer
pub mod base;

/// Qualifier grammar: `/Model/Type:item.object`
pub mod qualifier;

/// Models, items and reference resolution
pub mod model;

/// Code resolver and artifact sources
pub mod code;

/// Model manager contract and the shared registration base
pub mod manager;

/// Filesystem and resource storage backends
pub mod backend;

/// Multiplexer over several managers
pub mod multiplexer;

/// `Arc<RwLock<_>>` handle for concurrent readers
pub mod shared;

/// Repository configuration
pub mod config;

// Re-export foundation types
pub use base::{Message, MessageContainer, RepositoryError, Result, Severity};

// Re-export the public surface
pub use backend::{FileSystemModelManager, FileSystemStore, ResourceModelManager, ResourceStore};
pub use code::{Artifact, ArtifactKind, ArtifactSource, BuiltinArtifacts, CodeResolverConfig};
pub use config::RepositoryConfig;
pub use manager::{ManagerId, ModelFilter, ModelManager, ModelStore, RepositoryManager};
pub use model::{ImportState, Item, ItemType, Model, ModelContext};
pub use multiplexer::ModelMultiplexer;
pub use qualifier::{Qualifier, QualifierFields};
pub use shared::SharedRepository;
