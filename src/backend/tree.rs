//! Directory-tree layout shared by the filesystem and resource stores.
//!
//! ```text
//! <root>/
//!   Sales/
//!     model.xml
//!     process/CheckOrder.xml
//!     type/Order.xml
//!     classes/ lib/ ...        (code locations, not scanned here)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::descriptor;
use crate::base::constants::{CLASS_DIRS, ITEM_FILE_EXTENSION, LIBRARY_DIRS, MODEL_DESCRIPTOR};
use crate::base::{Message, MessageContainer, RepositoryError, Result};
use crate::manager::{ModelFilter, StoreLoad};
use crate::model::{Item, Model};

/// Directory holding the model named `name` below `root`.
pub(crate) fn model_dir(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

/// File holding `item` inside a model directory.
pub(crate) fn item_path(model_dir: &Path, item: &Item) -> PathBuf {
    model_dir
        .join(item.item_type().dir_name())
        .join(format!("{}.{}", item.name(), ITEM_FILE_EXTENSION))
}

/// Returns true for sub-directories consumed by the code resolver.
fn is_code_dir(name: &str) -> bool {
    CLASS_DIRS
        .iter()
        .chain(LIBRARY_DIRS)
        .any(|dir| dir.split('/').next() == Some(name))
}

fn sorted_dir_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read every accepted model directory below `root`, in parallel.
pub(crate) fn scan_root(root: &Path, filter: &ModelFilter) -> Result<StoreLoad> {
    let model_dirs: Vec<PathBuf> = sorted_dir_entries(root)?
        .into_iter()
        .filter(|path| path.join(MODEL_DESCRIPTOR).is_file())
        .filter(|path| filter.accepts(&entry_name(path)))
        .collect();

    let results: Vec<(Option<Model>, MessageContainer)> =
        model_dirs.par_iter().map(|dir| read_model_dir(dir)).collect();

    let mut load = StoreLoad::default();
    for (model, messages) in results {
        load.messages.extend(messages);
        load.models.extend(model);
    }
    debug!(
        "[TREE] scanned {}: {} models, {} messages",
        root.display(),
        load.models.len(),
        load.messages.len()
    );
    Ok(load)
}

/// Read one model directory: descriptor first, then each item type directory.
pub(crate) fn read_model_dir(dir: &Path) -> (Option<Model>, MessageContainer) {
    let mut messages = MessageContainer::new();
    let dir_name = entry_name(dir);
    let descriptor_path = dir.join(MODEL_DESCRIPTOR);

    let parsed = fs::read(&descriptor_path)
        .map_err(RepositoryError::from)
        .and_then(|bytes| descriptor::read_model(&bytes, &descriptor_path));
    let mut model = match parsed {
        Ok(model) => model,
        Err(e) => {
            messages.push(Message::error(Some(&dir_name), e.to_string()));
            return (None, messages);
        }
    };
    if model.name() != dir_name {
        warn!(
            "[TREE] descriptor in '{}' names model '{}'",
            dir.display(),
            model.name()
        );
        messages.push(Message::warning(
            Some(model.name()),
            format!("model directory is named '{dir_name}'"),
        ));
    }
    model.set_location(Some(dir.to_path_buf()));

    let type_dirs = match sorted_dir_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            messages.push(Message::error(Some(model.name()), e.to_string()));
            return (Some(model), messages);
        }
    };
    for type_dir in type_dirs.iter().filter(|p| p.is_dir()) {
        if is_code_dir(&entry_name(type_dir)) {
            continue;
        }
        read_item_dir(&mut model, type_dir, &mut messages);
    }

    trace!("[TREE] read model '{}' ({} items)", model.name(), model.item_count());
    (Some(model), messages)
}

fn read_item_dir(model: &mut Model, type_dir: &Path, messages: &mut MessageContainer) {
    let files = match sorted_dir_entries(type_dir) {
        Ok(files) => files,
        Err(e) => {
            messages.push(Message::error(Some(model.name()), e.to_string()));
            return;
        }
    };
    let item_files = files.into_iter().filter(|p| {
        p.is_file() && p.extension().is_some_and(|ext| ext == ITEM_FILE_EXTENSION)
    });

    for path in item_files {
        let item = fs::read(&path)
            .map_err(RepositoryError::from)
            .and_then(|bytes| descriptor::read_item(&bytes, &path));
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                messages.push(
                    Message::error(Some(model.name()), e.to_string())
                        .with_item(path.display().to_string()),
                );
                continue;
            }
        };
        let qualifier = item.qualifier().with_model(model.name()).to_string();
        if let Err(e) = model.add_item(item) {
            messages.push(Message::error(Some(model.name()), e.to_string()).with_item(qualifier));
        }
    }
}

/// Scan several roots; the first root defining a model name wins.
pub(crate) fn scan_roots<'a>(
    roots: impl IntoIterator<Item = &'a Path>,
    filter: &ModelFilter,
    store: &'static str,
) -> Result<StoreLoad> {
    let mut load = StoreLoad::default();
    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();

    for root in roots {
        if !root.is_dir() {
            trace!("[{}] skipping missing root {}", store, root.display());
            continue;
        }
        let scanned = scan_root(root, filter)?;
        load.messages.extend(scanned.messages);
        for model in scanned.models {
            if !seen.insert(SmolStr::new(model.name())) {
                warn!(
                    "[{}] model '{}' in {} shadowed by an earlier root",
                    store,
                    model.name(),
                    root.display()
                );
                load.messages.push(Message::warning(
                    Some(model.name()),
                    format!("duplicate definition in {} ignored", root.display()),
                ));
                continue;
            }
            load.models.push(model);
        }
    }
    Ok(load)
}
