//! Writes model directories to a temporary root.

use std::fs;
use std::path::{Path, PathBuf};

use procmodel::{FileSystemModelManager, FileSystemStore, Qualifier, RepositoryManager};
use tempfile::TempDir;

/// A temporary model root populated through builder calls.
pub struct ModelTree {
    dir: TempDir,
    base: PathBuf,
}

impl ModelTree {
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    /// Models are written below `<temp root>/<prefix>`, as resource trees are.
    pub fn with_prefix(prefix: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let base = dir.path().join(prefix);
        Self { dir, base }
    }

    /// The temporary root (above any prefix).
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<root>/<name>/model.xml` importing `imports`.
    pub fn model(&self, name: &str, imports: &[&str]) -> &Self {
        let imports: String = imports
            .iter()
            .map(|i| format!("  <import model=\"{i}\"/>\n"))
            .collect();
        self.file(
            name,
            "model.xml",
            &format!("<model name=\"{name}\">\n{imports}</model>\n"),
        )
    }

    /// Write an item file below the model's type directory.
    pub fn item(&self, model: &str, item_type: &str, name: &str, body: &str) -> &Self {
        self.file(
            model,
            &format!("{}/{name}.xml", item_type.to_lowercase()),
            &format!("<item name=\"{name}\" type=\"{item_type}\">{body}</item>"),
        )
    }

    pub fn process(&self, model: &str, name: &str) -> &Self {
        self.item(model, "Process", name, "")
    }

    /// A `Type` item implemented by `class`.
    pub fn type_item(&self, model: &str, name: &str, class: &str) -> &Self {
        self.file(
            model,
            &format!("type/{name}.xml"),
            &format!("<item name=\"{name}\" type=\"Type\" class=\"{class}\"/>"),
        )
    }

    /// Write an arbitrary file inside a model directory.
    pub fn file(&self, model: &str, relative: &str, contents: &str) -> &Self {
        let path = self.base.join(model).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create model dir");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    pub fn manager(&self) -> FileSystemModelManager {
        RepositoryManager::new(FileSystemStore::new(self.path()))
    }
}

pub fn q(text: &str) -> Qualifier {
    Qualifier::parse(text).expect("valid qualifier")
}
