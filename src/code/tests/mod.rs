
use std::path::Path;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::*;
use crate::model::{Model, ModelContext};

/// Registry of fully resolved models for exercising code delegation.
pub(super) struct CodeContext {
    pub models: IndexMap<SmolStr, Model>,
    pub config: CodeResolverConfig,
    pub builtins: BuiltinArtifacts,
}

impl CodeContext {
    pub fn new(models: impl IntoIterator<Item = Model>, builtins: BuiltinArtifacts) -> Self {
        let mut models: IndexMap<SmolStr, Model> = models
            .into_iter()
            .map(|m| (SmolStr::new(m.name()), m))
            .collect();
        for model in models.values_mut() {
            let imports = model.imports().to_vec();
            model.apply_import_resolution(imports);
        }
        Self {
            models,
            config: CodeResolverConfig {
                extensions: vec!["wasm".to_string()],
                ..CodeResolverConfig::default()
            },
            builtins,
        }
    }
}

impl ModelContext for CodeContext {
    fn lookup_model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    fn code_config(&self) -> &CodeResolverConfig {
        &self.config
    }

    fn fallback_artifacts(&self) -> &dyn ArtifactSource {
        &self.builtins
    }
}

/// Create `relative` below `root`, including parent directories.
pub(super) fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"\0asm").unwrap();
}
