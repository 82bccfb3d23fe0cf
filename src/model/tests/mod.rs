mod tests_items;

use super::*;
use crate::code::{ArtifactSource, BuiltinArtifacts, CodeResolverConfig};
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Minimal registry for exercising resolution without a manager.
pub(super) struct TestContext {
    pub models: IndexMap<SmolStr, Model>,
    pub code: CodeResolverConfig,
    pub builtins: BuiltinArtifacts,
}

impl TestContext {
    pub fn new(models: impl IntoIterator<Item = Model>) -> Self {
        Self {
            models: models
                .into_iter()
                .map(|m| (SmolStr::new(m.name()), m))
                .collect(),
            code: CodeResolverConfig::default(),
            builtins: BuiltinArtifacts::default(),
        }
    }

    /// Mark every model resolved against the models present in the context.
    pub fn resolve_all(&mut self) {
        let names: Vec<SmolStr> = self.models.keys().cloned().collect();
        for model in self.models.values_mut() {
            let resolved = model
                .imports()
                .iter()
                .filter(|i| names.contains(i))
                .cloned()
                .collect();
            model.apply_import_resolution(resolved);
        }
    }

    pub fn model(&self, name: &str) -> &Model {
        &self.models[name]
    }
}

impl ModelContext for TestContext {
    fn lookup_model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    fn code_config(&self) -> &CodeResolverConfig {
        &self.code
    }

    fn fallback_artifacts(&self) -> &dyn ArtifactSource {
        &self.builtins
    }
}
