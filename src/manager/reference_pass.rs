//! The reference-resolution and validation pass.
//!
//! Runs over every model a manager (or multiplexer) can see:
//!
//! 1. plan: match each model's import list against the registry
//! 2. apply: store the resolved import lists on the models
//! 3. validate: resolve every outgoing item reference

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::ModelManager;
use crate::base::constants::SYSTEM_MODEL;
use crate::base::{Message, MessageContainer};
use crate::model::{Model, ModelContext};

/// Run the pass and return the messages it produced.
pub(crate) fn run<M: ModelManager + ?Sized>(manager: &mut M) -> MessageContainer {
    let mut messages = MessageContainer::new();

    let mut plan: FxHashMap<SmolStr, Vec<SmolStr>> = {
        let ctx = manager.as_context();
        manager
            .models()
            .map(|model| (SmolStr::new(model.name()), plan_imports(ctx, model, &mut messages)))
            .collect()
    };

    for model in manager.models_mut() {
        if let Some(resolved) = plan.remove(model.name()) {
            model.apply_import_resolution(resolved);
        }
    }

    let ctx = manager.as_context();
    let mut checked = 0usize;
    for model in manager.models() {
        checked += validate_references(ctx, model, &mut messages);
    }

    if ctx.system_model().is_none() {
        messages.push(Message::warning(
            None,
            format!("model '{SYSTEM_MODEL}' is not loaded; fallback resolution is disabled"),
        ));
    }

    debug!(
        "[REFERENCE_PASS] {} references checked, {} messages",
        checked,
        messages.len()
    );
    messages
}

fn plan_imports(ctx: &dyn ModelContext, model: &Model, messages: &mut MessageContainer) -> Vec<SmolStr> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut resolved = Vec::new();

    for import in model.imports() {
        if import == model.name() {
            messages.push(Message::warning(Some(model.name()), "model imports itself"));
            continue;
        }
        if !seen.insert(import.as_str()) {
            continue;
        }
        if ctx.lookup_model(import).is_none() {
            messages.push(Message::error(
                Some(model.name()),
                format!("imported model '{import}' does not exist"),
            ));
            continue;
        }
        resolved.push(import.clone());
    }

    trace!("[REFERENCE_PASS] '{}' imports {:?}", model.name(), resolved);
    resolved
}

fn validate_references(ctx: &dyn ModelContext, model: &Model, messages: &mut MessageContainer) -> usize {
    let mut checked = 0;
    for item in model.items(None) {
        for reference in &item.references {
            checked += 1;
            if let Err(e) = model.resolve_item_ref(ctx, &reference.target, &reference.item_type) {
                messages.push(
                    Message::error(
                        Some(model.name()),
                        format!("unresolved reference '{}': {}", reference.target, e),
                    )
                    .with_item(item.qualifier().to_string()),
                );
            }
        }
    }
    checked
}
