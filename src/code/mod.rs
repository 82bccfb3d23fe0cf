//! # Code resolution
//!
//! Locates compiled implementation artifacts and resources for a model. The
//! search mirrors item resolution:
//!
//! ```text
//! model → direct imports → System → shared fallback (ArtifactSource)
//! ```
//!
//! Each model owns one lazily built [`ModelCodeResolver`] that is released on
//! reset, shutdown or any import change.

mod artifact;
mod resolver;

pub(crate) use artifact::confined_path;
pub use artifact::{Artifact, ArtifactKind, ArtifactOrigin, ArtifactSource, BuiltinArtifacts};
pub use resolver::{CodeResolverConfig, ModelCodeResolver};

#[cfg(test)]
mod tests;
