//! Reference resolution across model boundaries.
//!
//! Every lookup walks the same fixed chain:
//!
//! ```text
//! this model → direct imports (declared order) → System
//! ```
//!
//! An imported model's own imports are never consulted, so import cycles need
//! no detection. Absolute references bypass the chain and go straight to the
//! context's registry.

use std::path::PathBuf;

use tracing::trace;

use super::container::Model;
use super::item::{Item, ItemType, ModelObject};
use crate::base::constants::{OBJECT_DELIMITER, SYSTEM_MODEL};
use crate::base::{RepositoryError, Result};
use crate::code::{ArtifactSource, CodeResolverConfig, confined_path};
use crate::qualifier::{Qualifier, QualifierFields};

/// The registry view resolution runs against.
///
/// Implemented by every manager (over its own models) and by the multiplexer
/// (over all of its backends).
pub trait ModelContext {
    /// Look up a registered model by name.
    fn lookup_model(&self, name: &str) -> Option<&Model>;

    /// The distinguished fallback model.
    fn system_model(&self) -> Option<&Model> {
        self.lookup_model(SYSTEM_MODEL)
    }

    /// Look up an item by absolute qualifier. Without a type tag the first
    /// item of that name wins.
    fn lookup_item(&self, qualifier: &Qualifier) -> Option<&Item> {
        let model = self.lookup_model(qualifier.model()?)?;
        let item_type = qualifier.item_type().map(ItemType::parse);
        model.find_item(qualifier.item()?, item_type.as_ref())
    }

    /// Locations and extensions used when building code resolvers.
    fn code_config(&self) -> &CodeResolverConfig;

    /// Shared resolver consulted after the model chain is exhausted.
    fn fallback_artifacts(&self) -> &dyn ArtifactSource;
}

/// Either an item or one of its nested objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectRef<'a> {
    Item(&'a Item),
    Object(&'a ModelObject),
}

impl<'a> ObjectRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ObjectRef::Item(item) => item.name(),
            ObjectRef::Object(object) => &object.name,
        }
    }

    pub fn as_object(&self) -> Option<&'a ModelObject> {
        match self {
            ObjectRef::Object(object) => Some(object),
            ObjectRef::Item(_) => None,
        }
    }
}

impl Model {
    // ============================================================
    // Search chain
    // ============================================================

    /// Models consulted for a relative reference, in precedence order.
    ///
    /// Imports that are not registered in `ctx` are skipped, as is a System
    /// model that is already part of the chain.
    pub fn search_chain<'a>(&'a self, ctx: &'a dyn ModelContext) -> Result<Vec<&'a Model>> {
        let mut chain: Vec<&'a Model> = vec![self];
        for name in self.resolved_imports()? {
            if let Some(import) = ctx.lookup_model(name)
                && !chain.iter().any(|m| m.name() == import.name())
            {
                chain.push(import);
            }
        }
        if let Some(system) = ctx.system_model()
            && !chain.iter().any(|m| m.name() == system.name())
        {
            chain.push(system);
        }
        Ok(chain)
    }

    // ============================================================
    // Item references
    // ============================================================

    /// Resolve an item reference.
    ///
    /// `name` may be absolute (`/Model/Type:item`), typed (`Type:item`) or
    /// bare; a type carried by the name overrides `item_type`.
    pub fn resolve_item_ref<'a>(
        &'a self,
        ctx: &'a dyn ModelContext,
        name: &str,
        item_type: &ItemType,
    ) -> Result<&'a Item> {
        let qualifier = Qualifier::parse(name)?;
        if qualifier.object_path().is_some() {
            return Err(RepositoryError::parse(name, "item references take no object path"));
        }
        let Some(item_name) = qualifier.item() else {
            return Err(RepositoryError::parse(name, "reference names no item"));
        };
        let item_type = qualifier
            .item_type()
            .map(ItemType::parse)
            .unwrap_or_else(|| item_type.clone());

        if qualifier.is_absolute() {
            let qualifier = qualifier.with_item_type(item_type.as_str());
            trace!("[RESOLVE_ITEM] absolute '{}'", qualifier);
            return ctx
                .lookup_item(&qualifier)
                .ok_or_else(|| RepositoryError::not_found("item", qualifier.to_string()));
        }

        for model in self.search_chain(ctx)? {
            if let Some(item) = model.find_item(item_name, Some(&item_type)) {
                trace!(
                    "[RESOLVE_ITEM] '{}' from '{}' -> found in '{}'",
                    name,
                    self.name(),
                    model.name()
                );
                return Ok(item);
            }
        }

        Err(RepositoryError::not_found(
            "item",
            format!("{item_type}:{item_name} (from model '{}')", self.name()),
        ))
    }

    /// The shortest reference text to `item` that resolves back to it from
    /// this model: the bare name when the chain finds that very item first,
    /// otherwise the untyped absolute qualifier.
    pub fn determine_item_ref(&self, ctx: &dyn ModelContext, item: &Item) -> String {
        let Some(owner) = item.model() else {
            return item.name().to_string();
        };

        match self.resolve_item_ref(ctx, item.name(), item.item_type()) {
            Ok(found) if found.same_identity(item) => item.name().to_string(),
            _ => Qualifier::for_name(item.name())
                .with_model(owner)
                .format(false),
        }
    }

    /// Resolve `item.path.to.object`. Without an object path the item itself is
    /// returned.
    pub fn resolve_object_ref<'a>(
        &'a self,
        ctx: &'a dyn ModelContext,
        name: &str,
        item_type: &ItemType,
    ) -> Result<ObjectRef<'a>> {
        let Some((item_ref, path)) = name.split_once(OBJECT_DELIMITER) else {
            return self.resolve_item_ref(ctx, name, item_type).map(ObjectRef::Item);
        };

        let item = self.resolve_item_ref(ctx, item_ref, item_type)?;
        if path.is_empty() {
            return Ok(ObjectRef::Item(item));
        }
        item.object_at(path).map(ObjectRef::Object).map_err(|segment| {
            RepositoryError::not_found("object", format!("'{segment}' in '{name}'"))
        })
    }

    // ============================================================
    // Files
    // ============================================================

    /// Find a file relative to the storage location of this model, its
    /// imports or the System model; the first existing file wins.
    pub fn resolve_file_ref(&self, ctx: &dyn ModelContext, file_name: &str) -> Result<PathBuf> {
        let relative = confined_path(file_name).ok_or_else(|| {
            RepositoryError::parse(file_name, "file references must stay below the model location")
        })?;
        for model in self.search_chain(ctx)? {
            if let Some(location) = model.location() {
                let candidate = location.join(relative);
                if candidate.is_file() {
                    trace!(
                        "[RESOLVE_FILE] '{}' -> {}",
                        file_name,
                        candidate.display()
                    );
                    return Ok(candidate);
                }
            }
        }
        Err(RepositoryError::not_found(
            "file",
            format!("{file_name} (from model '{}')", self.name()),
        ))
    }

    // ============================================================
    // Types
    // ============================================================

    /// Best-effort mapping from an implementation class name to a `Type`
    /// item: local types first, then each import's (no System, no deeper
    /// imports). A stale model scans only its own types.
    pub fn lookup_type_by_class_name<'a>(
        &'a self,
        ctx: &'a dyn ModelContext,
        class_name: &str,
    ) -> Option<&'a Item> {
        let by_class = |model: &'a Model| {
            model
                .items(Some(&ItemType::Type))
                .find(|item| item.class_name.as_deref() == Some(class_name))
        };

        if let Some(item) = by_class(self) {
            return Some(item);
        }

        let imports = self.resolved_imports().unwrap_or_default();
        imports
            .iter()
            .filter_map(|name| ctx.lookup_model(name))
            .find_map(by_class)
    }

    /// Items of this model whose qualifier matches `pattern` on the selected
    /// fields (the model field is always this model).
    pub fn find_matching<'a>(
        &'a self,
        pattern: &'a Qualifier,
        fields: QualifierFields,
    ) -> impl Iterator<Item = &'a Item> + 'a {
        self.items(None)
            .filter(move |item| item.qualifier().matches_fields(pattern, fields))
    }
}
