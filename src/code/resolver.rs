//! Per-model code resolver.
//!
//! A model directory may carry compiled code next to its items:
//!
//! ```text
//! Sales/
//!   model.xml
//!   classes/           class roots
//!   target/classes/
//!   lib/               library roots (plus immediate sub-directories)
//!   extlib/
//! ```

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::artifact::{Artifact, ArtifactKind, confined_path};
use crate::base::constants::{CLASS_DIRS, LIBRARY_DIRS, NATIVE_LIBRARY_EXTENSIONS, OBJECT_DELIMITER};
use crate::base::{RepositoryError, Result};
use crate::model::{Model, ModelContext};

/// Locations and extensions a code resolver is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeResolverConfig {
    /// Class directories, relative to the model directory.
    pub class_dirs: Vec<String>,
    /// Library directories, relative to the model directory.
    pub library_dirs: Vec<String>,
    /// File extensions tried for a code name, in order.
    pub extensions: Vec<String>,
}

impl Default for CodeResolverConfig {
    fn default() -> Self {
        Self {
            class_dirs: CLASS_DIRS.iter().map(|d| d.to_string()).collect(),
            library_dirs: LIBRARY_DIRS.iter().map(|d| d.to_string()).collect(),
            extensions: vec![
                "wasm".to_string(),
                std::env::consts::DLL_EXTENSION.to_string(),
            ],
        }
    }
}

/// Resolves code and resources inside one model's own locations.
///
/// Never looks at other models; delegation is done by the owning [`Model`].
#[derive(Clone, Debug, Default)]
pub struct ModelCodeResolver {
    model: SmolStr,
    class_roots: Vec<PathBuf>,
    library_roots: Vec<PathBuf>,
    libraries: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl ModelCodeResolver {
    /// Scan the code locations below `location`. A model without a storage
    /// location gets an empty resolver.
    pub fn new(model: impl Into<SmolStr>, location: Option<&Path>, config: &CodeResolverConfig) -> Self {
        let mut resolver = Self {
            model: model.into(),
            extensions: config.extensions.clone(),
            ..Self::default()
        };
        let Some(location) = location else {
            return resolver;
        };

        resolver.class_roots = config
            .class_dirs
            .iter()
            .map(|dir| location.join(dir))
            .filter(|path| path.is_dir())
            .collect();

        for dir in &config.library_dirs {
            let root = location.join(dir);
            if !root.is_dir() {
                continue;
            }
            let subdirs = sorted_entries(&root)
                .into_iter()
                .filter(|path| path.is_dir())
                .collect::<Vec<_>>();
            resolver.library_roots.push(root);
            resolver.library_roots.extend(subdirs);
        }

        resolver.libraries = resolver
            .library_roots
            .iter()
            .flat_map(|root| sorted_entries(root))
            .filter(|path| path.is_file() && is_dynamic_lib(path))
            .collect();

        debug!(
            "[CODE] resolver for '{}': {} class roots, {} library roots, {} libraries",
            resolver.model,
            resolver.class_roots.len(),
            resolver.library_roots.len(),
            resolver.libraries.len()
        );
        resolver
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn class_roots(&self) -> &[PathBuf] {
        &self.class_roots
    }

    pub fn library_roots(&self) -> &[PathBuf] {
        &self.library_roots
    }

    /// Native plugin libraries found in the library roots.
    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }

    fn roots(&self) -> impl Iterator<Item = &PathBuf> {
        self.class_roots.iter().chain(self.library_roots.iter())
    }

    /// Find `pkg.sub.Name` as `pkg/sub/Name.<ext>` below a class or library
    /// root.
    pub fn find_code(&self, name: &str) -> Option<Artifact> {
        let relative = code_path(name)?;
        for root in self.roots() {
            for ext in &self.extensions {
                let candidate = root.join(&relative).with_extension(ext);
                if candidate.is_file() {
                    return Some(Artifact::from_model(
                        name,
                        ArtifactKind::Code,
                        self.model.clone(),
                        candidate,
                    ));
                }
            }
        }
        None
    }

    /// Find a resource by relative path below a class or library root.
    pub fn find_resource(&self, path: &str) -> Option<Artifact> {
        let relative = confined_path(path)?;
        let name = relative.to_str()?;
        self.roots()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
            .map(|candidate| {
                Artifact::from_model(name, ArtifactKind::Resource, self.model.clone(), candidate)
            })
    }
}

/// `a.b.C` -> `a/b/C`; `None` for empty segments.
fn code_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for segment in name.split(OBJECT_DELIMITER) {
        if segment.is_empty() || segment.contains(['/', '\\']) {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

fn is_dynamic_lib(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| NATIVE_LIBRARY_EXTENSIONS.contains(&ext))
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            warn!("[CODE] cannot read {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    entries.sort();
    entries
}

impl Model {
    /// This model's code resolver, created on first use.
    pub fn code_resolver(&self, config: &CodeResolverConfig) -> &ModelCodeResolver {
        self.code_resolver_slot()
            .get_or_init(|| ModelCodeResolver::new(self.name(), self.location(), config))
    }

    /// Resolve a code name through this model, its imports, the System model
    /// and finally the context's fallback source.
    pub fn resolve_code(&self, ctx: &dyn ModelContext, name: &str) -> Result<Artifact> {
        for model in self.search_chain(ctx)? {
            if let Some(artifact) = model.code_resolver(ctx.code_config()).find_code(name) {
                trace!("[RESOLVE_CODE] '{}' from '{}' -> '{}'", name, self.name(), model.name());
                return Ok(artifact);
            }
        }
        ctx.fallback_artifacts().find_code(name).ok_or_else(|| {
            RepositoryError::not_found("code", format!("{name} (from model '{}')", self.name()))
        })
    }

    /// Resolve a resource path along the same chain as [`resolve_code`](Self::resolve_code).
    pub fn resolve_resource(&self, ctx: &dyn ModelContext, path: &str) -> Result<Artifact> {
        for model in self.search_chain(ctx)? {
            if let Some(artifact) = model.code_resolver(ctx.code_config()).find_resource(path) {
                trace!("[RESOLVE_RESOURCE] '{}' from '{}' -> '{}'", path, self.name(), model.name());
                return Ok(artifact);
            }
        }
        ctx.fallback_artifacts().find_resource(path).ok_or_else(|| {
            RepositoryError::not_found("resource", format!("{path} (from model '{}')", self.name()))
        })
    }
}
