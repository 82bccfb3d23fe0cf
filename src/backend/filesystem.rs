//! Writable directory-tree store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{descriptor, tree};
use crate::base::constants::MODEL_DESCRIPTOR;
use crate::base::{Message, RepositoryError, Result};
use crate::manager::{ModelFilter, ModelStore, RepositoryManager, StoreLoad};
use crate::model::{Item, Model};

/// Manager over a [`FileSystemStore`].
pub type FileSystemModelManager = RepositoryManager<FileSystemStore>;

/// Models stored as one directory per model below a primary root, plus
/// optional additional roots scanned the same way. New models are always
/// created below the primary root.
#[derive(Clone, Debug)]
pub struct FileSystemStore {
    roots: Vec<PathBuf>,
}

impl FileSystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    pub fn with_additional_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn primary_root(&self) -> &Path {
        &self.roots[0]
    }

    fn model_dir(&self, model: &Model) -> PathBuf {
        model
            .location()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| tree::model_dir(self.primary_root(), model.name()))
    }

    fn write_descriptor(&self, dir: &Path, model: &Model) -> Result<()> {
        let path = dir.join(MODEL_DESCRIPTOR);
        let bytes = descriptor::write_model(model, &path)?;
        fs::write(&path, bytes)?;
        Ok(())
    }

    fn write_item(&self, dir: &Path, item: &Item) -> Result<()> {
        let path = tree::item_path(dir, item);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = descriptor::write_item(item, &path)?;
        fs::write(&path, bytes)?;
        debug!("[FS] wrote {}", path.display());
        Ok(())
    }

    /// Write the descriptor and every item of a new model, recording each
    /// path before it is touched.
    fn write_model_files(&self, dir: &Path, model: &Model, written: &mut Vec<PathBuf>) -> Result<()> {
        fs::create_dir_all(dir)?;
        written.push(dir.join(MODEL_DESCRIPTOR));
        self.write_descriptor(dir, model)?;
        for item in model.items(None) {
            written.push(tree::item_path(dir, item));
            self.write_item(dir, item)?;
        }
        Ok(())
    }

    /// Undo a failed model creation. A directory this call created goes
    /// away entirely; in a pre-existing one only the written files do.
    fn discard_partial_model(&self, dir: &Path, created: bool, written: &[PathBuf]) {
        if created {
            if dir.exists()
                && let Err(e) = fs::remove_dir_all(dir)
            {
                warn!("[FS] could not remove partial model directory {}: {}", dir.display(), e);
            }
            return;
        }
        for path in written.iter().filter(|p| p.is_file()) {
            if let Err(e) = fs::remove_file(path) {
                warn!("[FS] could not remove partial model file {}: {}", path.display(), e);
            }
        }
    }
}

impl ModelStore for FileSystemStore {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn load_models(&self, filter: &ModelFilter) -> Result<StoreLoad> {
        let mut load = tree::scan_roots(self.roots.iter().map(PathBuf::as_path), filter, self.name())?;
        if !self.primary_root().is_dir() {
            warn!("[FS] model root {} does not exist", self.primary_root().display());
            load.messages.push(Message::warning(
                None,
                format!("model root {} does not exist", self.primary_root().display()),
            ));
        }
        Ok(load)
    }

    fn add_model_to_store(&mut self, model: &mut Model) -> Result<()> {
        let dir = tree::model_dir(self.primary_root(), model.name());
        if dir.join(MODEL_DESCRIPTOR).exists() {
            return Err(RepositoryError::duplicate(
                "model",
                format!("{} (on disk at {})", model.name(), dir.display()),
            ));
        }
        let created = !dir.exists();
        let mut written = Vec::new();
        if let Err(e) = self.write_model_files(&dir, model, &mut written) {
            self.discard_partial_model(&dir, created, &written);
            return Err(e);
        }
        debug!("[FS] created model directory {}", dir.display());
        model.set_location(Some(dir));
        Ok(())
    }

    fn save_model_to_store(&mut self, model: &Model) -> Result<()> {
        let dir = self.model_dir(model);
        fs::create_dir_all(&dir)?;
        self.write_descriptor(&dir, model)
    }

    fn remove_model_from_store(&mut self, model: &Model) -> Result<()> {
        let dir = self.model_dir(model);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            debug!("[FS] removed model directory {}", dir.display());
        }
        Ok(())
    }

    fn add_item_to_store(&mut self, model: &Model, item: &Item) -> Result<()> {
        self.write_item(&self.model_dir(model), item)
    }

    fn save_item_to_store(&mut self, model: &Model, item: &Item) -> Result<()> {
        self.write_item(&self.model_dir(model), item)
    }

    fn remove_item_from_store(&mut self, model: &Model, item: &Item) -> Result<()> {
        let path = tree::item_path(&self.model_dir(model), item);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("[FS] removed {}", path.display());
        }
        Ok(())
    }
}
