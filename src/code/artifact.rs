//! Artifacts located by code resolvers, and the shared fallback source.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexSet;
use smol_str::SmolStr;

/// What a lookup was asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// A compiled implementation addressed by a dotted code name.
    Code,
    /// A non-code asset addressed by a relative path.
    Resource,
}

/// Where an artifact was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactOrigin {
    /// A file inside a model's code locations.
    Model { model: SmolStr, path: PathBuf },
    /// The process's own code space.
    Builtin,
}

/// A located code or resource artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub origin: ArtifactOrigin,
}

impl Artifact {
    pub fn from_model(
        name: impl Into<String>,
        kind: ArtifactKind,
        model: impl Into<SmolStr>,
        path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            origin: ArtifactOrigin::Model {
                model: model.into(),
                path,
            },
        }
    }

    pub fn builtin(name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            kind,
            origin: ArtifactOrigin::Builtin,
        }
    }

    /// Name of the model that provided the artifact, `None` for builtins.
    pub fn model(&self) -> Option<&str> {
        match &self.origin {
            ArtifactOrigin::Model { model, .. } => Some(model),
            ArtifactOrigin::Builtin => None,
        }
    }

    /// File backing the artifact, `None` for builtins.
    pub fn path(&self) -> Option<&PathBuf> {
        match &self.origin {
            ArtifactOrigin::Model { path, .. } => Some(path),
            ArtifactOrigin::Builtin => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.origin, ArtifactOrigin::Builtin)
    }
}

/// A resource path relative to some root, with the leading `/` dropped.
/// `None` if empty or if any segment could step outside the root.
pub(crate) fn confined_path(path: &str) -> Option<&Path> {
    let relative = Path::new(path.trim_start_matches('/'));
    let mut components = relative.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_)))
        .then_some(relative)
}

/// Resolver consulted after every model in a chain has been tried.
pub trait ArtifactSource: Send + Sync + fmt::Debug {
    fn find_code(&self, name: &str) -> Option<Artifact>;

    fn find_resource(&self, path: &str) -> Option<Artifact>;
}

/// Registry of code names and resources provided by the host process.
#[derive(Clone, Debug, Default)]
pub struct BuiltinArtifacts {
    code: IndexSet<String>,
    resources: IndexSet<String>,
}

impl BuiltinArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_code(&mut self, name: impl Into<String>) -> &mut Self {
        self.code.insert(name.into());
        self
    }

    pub fn register_resource(&mut self, path: impl Into<String>) -> &mut Self {
        self.resources.insert(path.into());
        self
    }

    pub fn with_code(mut self, name: impl Into<String>) -> Self {
        self.register_code(name);
        self
    }

    pub fn with_resource(mut self, path: impl Into<String>) -> Self {
        self.register_resource(path);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.resources.is_empty()
    }
}

impl ArtifactSource for BuiltinArtifacts {
    fn find_code(&self, name: &str) -> Option<Artifact> {
        self.code
            .contains(name)
            .then(|| Artifact::builtin(name, ArtifactKind::Code))
    }

    fn find_resource(&self, path: &str) -> Option<Artifact> {
        let path = confined_path(path)?.to_str()?;
        self.resources
            .contains(path)
            .then(|| Artifact::builtin(path, ArtifactKind::Resource))
    }
}
