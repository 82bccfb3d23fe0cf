use procmodel::{Item, ItemType, Model, ModelContext, ModelManager, RepositoryError};

use crate::helpers::{ModelTree, q};

/// `A` imports `B`; both define `Shared`, only `B` defines `Remote` and `T1`.
fn tree() -> ModelTree {
    let tree = ModelTree::new();
    tree.model("System", &[])
        .process("System", "Base")
        .model("B", &[])
        .process("B", "Remote")
        .process("B", "Shared")
        .type_item("B", "T1", "pkg.T1")
        .model("A", &["B"])
        .process("A", "Shared")
        .item(
            "A",
            "Process",
            "CheckOrder",
            r#"<object name="Entry" kind="Section"><object name="amount" kind="Field"/></object>"#,
        );
    tree
}

#[test]
fn test_added_item_is_returned_and_duplicate_rejected() {
    let tree = tree();
    let mut manager = tree.manager();
    manager.read_models().unwrap();

    manager
        .add_item(&q("/A/"), Item::new("Ship", ItemType::Process))
        .unwrap();
    let a = manager.lookup_model("A").unwrap();
    let ship = a.get_item("Ship", &ItemType::Process, true).unwrap().unwrap();
    assert_eq!(ship.qualifier(), q("/A/Process:Ship"));

    let err = manager
        .add_item(&q("/A/"), Item::new("Ship", ItemType::Process))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateName { .. }));
}

#[test]
fn test_imported_item_resolves_until_import_is_removed() {
    let tree = tree();
    let mut manager = tree.manager();
    manager.read_models().unwrap();

    let a = manager.lookup_model("A").unwrap();
    let remote = a.resolve_item_ref(&manager, "Remote", &ItemType::Process).unwrap();
    assert_eq!(remote.model(), Some("B"));

    manager.update_model(Model::new("A")).unwrap();

    let a = manager.lookup_model("A").unwrap();
    let err = a
        .resolve_item_ref(&manager, "Remote", &ItemType::Process)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_local_item_shadows_import() {
    let tree = tree();
    let mut manager = tree.manager();
    manager.read_models().unwrap();

    let a = manager.lookup_model("A").unwrap();
    let shared = a.resolve_item_ref(&manager, "Shared", &ItemType::Process).unwrap();
    assert_eq!(shared.model(), Some("A"));
}

#[test]
fn test_determine_then_resolve_round_trip() {
    let tree = tree();
    let mut manager = tree.manager();
    manager.read_models().unwrap();
    let a = manager.lookup_model("A").unwrap();

    for target in ["/A/Process:Shared", "/B/Process:Shared", "/B/Process:Remote", "/System/Process:Base"] {
        let item = manager.get_item(&q(target), true).unwrap().unwrap();
        let reference = a.determine_item_ref(&manager, item);
        let resolved = a
            .resolve_item_ref(&manager, &reference, item.item_type())
            .unwrap();
        assert!(resolved.same_identity(item), "{target} via '{reference}'");
    }

    let shadowed = manager.get_item(&q("/B/Process:Shared"), true).unwrap().unwrap();
    assert_eq!(a.determine_item_ref(&manager, shadowed), "/B/Shared");
}

#[test]
fn test_lookup_type_by_class_name_follows_imports() {
    let tree = tree();
    let mut manager = tree.manager();
    manager.read_models().unwrap();

    let a = manager.lookup_model("A").unwrap();
    let t1 = a.lookup_type_by_class_name(&manager, "pkg.T1").unwrap();
    assert_eq!(t1.qualifier(), q("/B/Type:T1"));

    manager.update_model(Model::new("A")).unwrap();

    let a = manager.lookup_model("A").unwrap();
    assert!(a.lookup_type_by_class_name(&manager, "pkg.T1").is_none());
}

#[test]
fn test_object_reference_from_disk() {
    let tree = tree();
    let mut manager = tree.manager();
    manager.read_models().unwrap();
    let a = manager.lookup_model("A").unwrap();

    let amount = a
        .resolve_object_ref(&manager, "CheckOrder.Entry.amount", &ItemType::Process)
        .unwrap();
    assert_eq!(amount.name(), "amount");

    let err = a
        .resolve_object_ref(&manager, "CheckOrder.Entry.total", &ItemType::Process)
        .unwrap_err();
    assert!(err.to_string().contains("total"));
}

#[test]
fn test_file_reference_searches_imports() {
    let tree = tree();
    tree.file("B", "forms/order.html", "<form/>");
    let mut manager = tree.manager();
    manager.read_models().unwrap();

    let a = manager.lookup_model("A").unwrap();
    let path = a.resolve_file_ref(&manager, "forms/order.html").unwrap();
    assert_eq!(path, tree.path().join("B/forms/order.html"));
}
