use std::sync::Arc;

use procmodel::{
    ArtifactKind, BuiltinArtifacts, CodeResolverConfig, FileSystemStore, ModelContext, ModelManager,
    RepositoryError, RepositoryManager,
};

use crate::helpers::ModelTree;

fn wasm_only() -> CodeResolverConfig {
    CodeResolverConfig {
        extensions: vec!["wasm".to_string()],
        ..CodeResolverConfig::default()
    }
}

#[test]
fn test_code_resolves_through_imports_and_fallback() {
    let tree = ModelTree::new();
    tree.model("System", &[])
        .file("System", "classes/sys/Clock.wasm", "")
        .model("Shared", &[])
        .file("Shared", "lib/pkg/Check.wasm", "")
        .model("Sales", &["Shared"])
        .file("Sales", "target/classes/sales/Local.wasm", "");

    let builtins = BuiltinArtifacts::new().with_code("core.Runtime");
    let mut manager = RepositoryManager::new(FileSystemStore::new(tree.path()))
        .with_code_config(wasm_only())
        .with_fallback(Arc::new(builtins));
    manager.read_models().unwrap();
    let sales = manager.lookup_model("Sales").unwrap();

    let local = sales.resolve_code(&manager, "sales.Local").unwrap();
    assert_eq!(local.model(), Some("Sales"));
    assert_eq!(local.kind, ArtifactKind::Code);

    let imported = sales.resolve_code(&manager, "pkg.Check").unwrap();
    assert_eq!(imported.model(), Some("Shared"));
    assert_eq!(
        imported.path().unwrap(),
        &tree.path().join("Shared/lib/pkg/Check.wasm")
    );

    let system = sales.resolve_code(&manager, "sys.Clock").unwrap();
    assert_eq!(system.model(), Some("System"));

    let builtin = sales.resolve_code(&manager, "core.Runtime").unwrap();
    assert!(builtin.is_builtin());

    let err = sales.resolve_code(&manager, "nope.Missing").unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { kind: "code", .. }));
}

#[test]
fn test_code_dirs_are_not_read_as_items() {
    let tree = ModelTree::new();
    tree.model("System", &[])
        .model("Sales", &[])
        .file("Sales", "classes/Order.xml", "<not-an-item/>")
        .file("Sales", "lib/readme.xml", "<not-an-item/>");
    let mut manager = tree.manager();

    manager.read_models().unwrap();

    assert_eq!(manager.lookup_model("Sales").unwrap().item_count(), 0);
}

#[test]
fn test_reset_releases_code_resolvers() {
    let tree = ModelTree::new();
    tree.model("System", &[])
        .model("Sales", &[])
        .file("Sales", "classes/a/B.wasm", "");
    let mut manager = RepositoryManager::new(FileSystemStore::new(tree.path()))
        .with_code_config(wasm_only())
        .with_reload_on_reset(false);
    manager.read_models().unwrap();

    let sales = manager.lookup_model("Sales").unwrap();
    sales.resolve_code(&manager, "a.B").unwrap();
    assert!(sales.has_code_resolver());

    assert_eq!(manager.soft_reset(), 1);
    assert!(!manager.lookup_model("Sales").unwrap().has_code_resolver());
}
