use procmodel::{ModelContext, ModelManager, RepositoryError, RepositoryManager};

use crate::helpers::{ModelTree, q};

fn tree_with_broken_model() -> ModelTree {
    let tree = ModelTree::new();
    tree.model("System", &[])
        .model("Sales", &[])
        .process("Sales", "CheckOrder")
        .model("Broken", &["Missing"])
        .item(
            "Broken",
            "Process",
            "Dangling",
            r#"<reference type="Process" target="Nowhere"/>"#,
        );
    tree
}

#[test]
fn test_reset_with_invalid_model_keeps_valid_models() {
    let tree = tree_with_broken_model();
    let mut manager = tree.manager();
    assert!(manager.read_models().is_err());

    let err = manager.request_reset().unwrap_err();

    let RepositoryError::ValidationFailed(messages) = err else {
        panic!("expected ValidationFailed");
    };
    assert_eq!(messages.models_with_errors(), vec!["Broken"]);
    assert!(messages.to_string().contains("Broken"));

    let check = manager.get_item(&q("/Sales/Process:CheckOrder"), true).unwrap();
    assert!(check.is_some());
    let sales = manager.lookup_model("Sales").unwrap();
    assert!(sales.is_resolved());
    assert!(manager.lookup_model("Broken").is_some(), "invalid models stay registered");
}

#[test]
fn test_reset_after_fix_succeeds() {
    let tree = tree_with_broken_model();
    let mut manager = tree.manager();
    assert!(manager.read_models().is_err());

    std::fs::remove_dir_all(tree.path().join("Broken")).unwrap();
    manager.request_reset().unwrap();

    assert!(manager.lookup_model("Broken").is_none());
    assert!(manager.messages().is_empty(), "{}", manager.messages());
}

#[test]
fn test_soft_reset_keeps_registry() {
    let tree = ModelTree::new();
    tree.model("System", &[]).model("Sales", &[]);
    let mut manager = RepositoryManager::new(procmodel::FileSystemStore::new(tree.path()))
        .with_reload_on_reset(false);
    manager.read_models().unwrap();
    tree.model("Late", &[]);

    manager.request_reset().unwrap();

    assert!(manager.lookup_model("Late").is_none());
    assert!(manager.lookup_model("Sales").unwrap().is_resolved());
}

#[test]
fn test_load_diagnostics_do_not_abort() {
    let tree = ModelTree::new();
    tree.model("System", &[])
        .model("Sales", &[])
        .file("Sales", "process/Bad.xml", "<item type=\"Process\"/>");
    let mut manager = tree.manager();

    let err = manager.read_models().unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationFailed(_)));
    assert!(manager.lookup_model("Sales").is_some());
    assert_eq!(manager.messages().models_with_errors(), vec!["Sales"]);
}
