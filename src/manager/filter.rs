//! Model-selection filter.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::base::constants::SYSTEM_MODEL;
use crate::base::{RepositoryError, Result};

/// Shell-style name patterns restricting which top-level models a backend
/// loads. An empty filter accepts every model; `System` is always accepted.
#[derive(Clone, Debug, Default)]
pub struct ModelFilter {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl ModelFilter {
    /// Filter that accepts every model.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, P>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            let glob = Glob::new(pattern).map_err(|e| RepositoryError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        if kept.is_empty() {
            return Ok(Self::all());
        }
        let set = builder.build().map_err(|e| RepositoryError::InvalidPattern {
            pattern: kept.join(","),
            message: e.to_string(),
        })?;
        Ok(Self {
            patterns: kept,
            set: Some(set),
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn accepts(&self, model: &str) -> bool {
        if model == SYSTEM_MODEL {
            return true;
        }
        self.set.as_ref().is_none_or(|set| set.is_match(model))
    }
}
