
use indexmap::IndexMap;
use smol_str::SmolStr;

use super::*;
use crate::base::{RepositoryError, Result};
use crate::model::{Item, Model};

/// Store that keeps persisted copies in memory and logs every hook call.
#[derive(Debug, Default)]
pub(super) struct MemoryStore {
    pub persisted: IndexMap<SmolStr, Model>,
    pub calls: Vec<String>,
    pub read_only: bool,
    pub fail_item_writes: bool,
}

impl MemoryStore {
    pub fn with_models(models: impl IntoIterator<Item = Model>) -> Self {
        Self {
            persisted: models
                .into_iter()
                .map(|m| (SmolStr::new(m.name()), m))
                .collect(),
            ..Self::default()
        }
    }

    fn guard(&self, operation: &'static str) -> Result<()> {
        if self.read_only {
            return Err(RepositoryError::unsupported(operation, "memory"));
        }
        Ok(())
    }
}

impl ModelStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn load_models(&self, filter: &ModelFilter) -> Result<StoreLoad> {
        Ok(StoreLoad {
            models: self
                .persisted
                .values()
                .filter(|m| filter.accepts(m.name()))
                .cloned()
                .collect(),
            messages: MessageContainer::new(),
        })
    }

    fn add_model_to_store(&mut self, model: &mut Model) -> Result<()> {
        self.guard("add_model")?;
        self.calls.push(format!("add_model {}", model.name()));
        self.persisted.insert(SmolStr::new(model.name()), model.clone());
        Ok(())
    }

    fn save_model_to_store(&mut self, model: &Model) -> Result<()> {
        self.guard("save_model")?;
        self.calls.push(format!("save_model {}", model.name()));
        self.persisted.insert(SmolStr::new(model.name()), model.clone());
        Ok(())
    }

    fn remove_model_from_store(&mut self, model: &Model) -> Result<()> {
        self.guard("remove_model")?;
        self.calls.push(format!("remove_model {}", model.name()));
        self.persisted.shift_remove(model.name());
        Ok(())
    }

    fn add_item_to_store(&mut self, model: &Model, item: &Item) -> Result<()> {
        self.guard("add_item")?;
        if self.fail_item_writes {
            return Err(RepositoryError::Io(std::io::Error::other("disk full")));
        }
        self.calls.push(format!("add_item {}", item.qualifier()));
        self.persisted.insert(SmolStr::new(model.name()), model.clone());
        Ok(())
    }

    fn save_item_to_store(&mut self, model: &Model, item: &Item) -> Result<()> {
        self.guard("save_item")?;
        self.calls.push(format!("save_item {}", item.qualifier()));
        self.persisted.insert(SmolStr::new(model.name()), model.clone());
        Ok(())
    }

    fn remove_item_from_store(&mut self, model: &Model, item: &Item) -> Result<()> {
        self.guard("remove_item")?;
        self.calls.push(format!("remove_item {}", item.qualifier()));
        if let Some(persisted) = self.persisted.get_mut(model.name()) {
            let _ = persisted.remove_item(item.name(), item.item_type());
        }
        Ok(())
    }
}

pub(super) type MemoryManager = RepositoryManager<MemoryStore>;

/// Manager with `System`, `Sales` (imports `Shared`) and `Shared` registered.
pub(super) fn sales_manager() -> MemoryManager {
    let mut manager = RepositoryManager::new(MemoryStore::default());
    manager.add_model(Model::new("System")).unwrap();
    manager.add_model(Model::new("Shared")).unwrap();
    manager
        .add_model(Model::new("Sales").with_import("Shared"))
        .unwrap();
    manager
}

pub(super) fn q(text: &str) -> Qualifier {
    Qualifier::parse(text).unwrap()
}
