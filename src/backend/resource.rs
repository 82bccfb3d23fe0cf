//! Read-only store over resources bundled with the process.

use std::path::PathBuf;

use crate::base::constants::DEFAULT_RESOURCE_PREFIX;
use crate::base::{RepositoryError, Result};
use crate::manager::{ModelFilter, ModelStore, RepositoryManager, StoreLoad};
use crate::model::{Item, Model};

use super::tree;

/// Manager over a [`ResourceStore`].
pub type ResourceModelManager = RepositoryManager<ResourceStore>;

const BACKEND: &str = "resource";

/// The filesystem layout rooted at `<resource root>/<prefix>`, read-only.
///
/// Every mutating hook fails with `UnsupportedOperation`; reading and
/// resolution work as for any other store.
#[derive(Clone, Debug)]
pub struct ResourceStore {
    roots: Vec<PathBuf>,
    prefix: String,
}

impl ResourceStore {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
        }
    }

    /// Store over the discovered resource roots.
    pub fn discover() -> Self {
        Self::new(Self::discover_roots(DEFAULT_RESOURCE_PREFIX))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Discover resource roots holding `prefix`.
    ///
    /// Searches, in order:
    /// 1. The directory of the current executable (installed binaries)
    /// 2. `CARGO_MANIFEST_DIR` (development)
    pub fn discover_roots(prefix: &str) -> Vec<PathBuf> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
        let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from);

        let mut roots: Vec<PathBuf> = Vec::new();
        for dir in exe_dir.into_iter().chain(manifest_dir) {
            if dir.join(prefix).is_dir() && !roots.contains(&dir) {
                roots.push(dir);
            }
        }
        roots
    }

    fn bases(&self) -> Vec<PathBuf> {
        let prefix = self.prefix.trim_matches('/');
        self.roots
            .iter()
            .map(|root| if prefix.is_empty() { root.clone() } else { root.join(prefix) })
            .collect()
    }
}

impl ModelStore for ResourceStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn load_models(&self, filter: &ModelFilter) -> Result<StoreLoad> {
        let bases = self.bases();
        tree::scan_roots(bases.iter().map(PathBuf::as_path), filter, BACKEND)
    }

    fn add_model_to_store(&mut self, _model: &mut Model) -> Result<()> {
        Err(RepositoryError::unsupported("add_model", BACKEND))
    }

    fn save_model_to_store(&mut self, _model: &Model) -> Result<()> {
        Err(RepositoryError::unsupported("save_model", BACKEND))
    }

    fn remove_model_from_store(&mut self, _model: &Model) -> Result<()> {
        Err(RepositoryError::unsupported("remove_model", BACKEND))
    }

    fn add_item_to_store(&mut self, _model: &Model, _item: &Item) -> Result<()> {
        Err(RepositoryError::unsupported("add_item", BACKEND))
    }

    fn save_item_to_store(&mut self, _model: &Model, _item: &Item) -> Result<()> {
        Err(RepositoryError::unsupported("save_item", BACKEND))
    }

    fn remove_item_from_store(&mut self, _model: &Model, _item: &Item) -> Result<()> {
        Err(RepositoryError::unsupported("remove_item", BACKEND))
    }
}
