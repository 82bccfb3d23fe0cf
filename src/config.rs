//! Repository configuration.
//!
//! Built in code with the `with_*` methods or read from the process
//! environment:
//!
//! | Variable                       | Meaning                                 |
//! |--------------------------------|-----------------------------------------|
//! | `PROCMODEL_ROOT`               | primary model root                      |
//! | `PROCMODEL_ADDITIONAL_ROOTS`   | further model roots (platform path list)|
//! | `PROCMODEL_RESOURCE_ROOTS`     | resource roots (platform path list)     |
//! | `PROCMODEL_RESOURCE_PREFIX`    | prefix below each resource root         |
//! | `PROCMODEL_MODELS`             | comma separated model name globs        |
//! | `PROCMODEL_RELOAD_ON_RESET`    | `true`/`false`/`1`/`0`                  |

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::backend::ResourceStore;
use crate::base::constants::{
    DEFAULT_MODEL_ROOT, DEFAULT_RESOURCE_PREFIX, ENV_ADDITIONAL_ROOTS, ENV_MODELS,
    ENV_RELOAD_ON_RESET, ENV_RESOURCE_PREFIX, ENV_RESOURCE_ROOTS, ENV_ROOT,
};
use crate::code::CodeResolverConfig;

/// Settings for the standard filesystem + resource stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub model_root: PathBuf,
    pub additional_roots: Vec<PathBuf>,
    pub resource_roots: Vec<PathBuf>,
    pub resource_prefix: String,
    /// Model name globs; empty selects every model.
    pub models: Vec<String>,
    pub reload_on_reset: bool,
    pub code: CodeResolverConfig,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            model_root: PathBuf::from(DEFAULT_MODEL_ROOT),
            additional_roots: Vec::new(),
            resource_roots: Vec::new(),
            resource_prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            models: Vec::new(),
            reload_on_reset: true,
            code: CodeResolverConfig::default(),
        }
    }
}

impl RepositoryConfig {
    pub fn new(model_root: impl Into<PathBuf>) -> Self {
        Self {
            model_root: model_root.into(),
            ..Self::default()
        }
    }

    pub fn with_additional_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.additional_roots.push(root.into());
        self
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_roots.push(root.into());
        self
    }

    pub fn with_resource_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_prefix = prefix.into();
        self
    }

    pub fn with_models<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.models = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reload_on_reset(mut self, reload: bool) -> Self {
        self.reload_on_reset = reload;
        self
    }

    pub fn with_code_config(mut self, code: CodeResolverConfig) -> Self {
        self.code = code;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var_os(key))
    }

    /// Read the configuration through `lookup`. Unset variables keep their
    /// defaults; without explicit resource roots the roots are discovered.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup(ENV_ROOT).filter(|v| !v.is_empty()) {
            config.model_root = PathBuf::from(root);
        }
        if let Some(roots) = lookup(ENV_ADDITIONAL_ROOTS) {
            config.additional_roots = path_list(&roots);
        }
        if let Some(prefix) = lookup(ENV_RESOURCE_PREFIX) {
            match prefix.into_string() {
                Ok(prefix) => config.resource_prefix = prefix,
                Err(raw) => warn!("[CONFIG] ignoring non UTF-8 {}: {:?}", ENV_RESOURCE_PREFIX, raw),
            }
        }
        config.resource_roots = match lookup(ENV_RESOURCE_ROOTS) {
            Some(roots) => path_list(&roots),
            None => ResourceStore::discover_roots(&config.resource_prefix),
        };
        if let Some(models) = lookup(ENV_MODELS) {
            match models.to_str() {
                Some(models) => {
                    config.models = models
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                None => warn!("[CONFIG] ignoring non UTF-8 {}", ENV_MODELS),
            }
        }
        if let Some(raw) = lookup(ENV_RELOAD_ON_RESET) {
            match raw.to_str().and_then(parse_flag) {
                Some(flag) => config.reload_on_reset = flag,
                None => warn!("[CONFIG] ignoring malformed {}={:?}", ENV_RELOAD_ON_RESET, raw),
            }
        }

        debug!(
            "[CONFIG] root {}, {} additional roots, {} resource roots",
            config.model_root.display(),
            config.additional_roots.len(),
            config.resource_roots.len()
        );
        config
    }
}

fn path_list(raw: &OsString) -> Vec<PathBuf> {
    std::env::split_paths(raw)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
