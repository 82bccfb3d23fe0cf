use procmodel::{
    Item, ItemType, Model, ModelContext, ModelManager, ModelMultiplexer, RepositoryConfig,
    RepositoryError, SharedRepository,
};

use crate::helpers::{ModelTree, q};

/// Writable workspace with `Sales`; bundled `System` and `Library` below `bundle/`.
fn stack() -> (ModelTree, ModelTree, RepositoryConfig) {
    let workspace = ModelTree::new();
    workspace
        .model("Sales", &["Library"])
        .item(
            "Sales",
            "Process",
            "CheckOrder",
            r#"<reference type="Process" target="Approve"/>"#,
        );

    let resources = ModelTree::with_prefix("bundle");
    resources
        .model("System", &[])
        .process("System", "Base")
        .model("Library", &[])
        .process("Library", "Approve");

    let config = RepositoryConfig::new(workspace.path())
        .with_resource_root(resources.path())
        .with_resource_prefix("bundle");
    (workspace, resources, config)
}

#[test]
fn test_standard_stack_resolves_across_backends() {
    let (_workspace, _resources, config) = stack();
    let mut multiplexer = ModelMultiplexer::from_config(&config).unwrap();
    multiplexer.read_models().unwrap();

    let sales = multiplexer.lookup_model("Sales").unwrap();
    let approve = sales
        .resolve_item_ref(&multiplexer, "Approve", &ItemType::Process)
        .unwrap();
    assert_eq!(approve.model(), Some("Library"));
    assert!(multiplexer.messages().is_empty(), "{}", multiplexer.messages());
}

#[test]
fn test_writes_go_to_the_workspace() {
    let (workspace, resources, config) = stack();
    let mut multiplexer = ModelMultiplexer::from_config(&config).unwrap();
    multiplexer.read_models().unwrap();

    multiplexer
        .add_model(Model::new("Shipping").with_import("Library"))
        .unwrap();
    multiplexer
        .add_item(&q("/Shipping/"), Item::new("Ship", ItemType::Process))
        .unwrap();

    assert!(workspace.path().join("Shipping/process/Ship.xml").is_file());
    assert!(!resources.path().join("bundle/Shipping").exists());

    let err = multiplexer
        .update_model(Model::new("Library").with_description("edited"))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UnsupportedOperation { .. }));
}

#[test]
fn test_reset_reports_invalid_model_across_backends() {
    let (workspace, _resources, config) = stack();
    let mut multiplexer = ModelMultiplexer::from_config(&config).unwrap();
    multiplexer.read_models().unwrap();
    workspace.model("Broken", &["Nowhere"]);

    let err = multiplexer.request_reset().unwrap_err();

    let RepositoryError::ValidationFailed(messages) = err else {
        panic!("expected ValidationFailed");
    };
    assert_eq!(messages.models_with_errors(), vec!["Broken"]);
    assert!(multiplexer.get_item(&q("/Library/Approve"), true).unwrap().is_some());
    assert!(multiplexer.get_item(&q("/Sales/CheckOrder"), true).unwrap().is_some());
}

#[test]
fn test_shared_multiplexer() {
    let (_workspace, _resources, config) = stack();
    let shared = SharedRepository::new(ModelMultiplexer::from_config(&config).unwrap());
    shared.read_models().unwrap();

    let reader = shared.clone();
    let name = std::thread::spawn(move || {
        reader
            .item(&q("/Library/Process:Approve"))
            .unwrap()
            .name()
            .to_string()
    })
    .join()
    .unwrap();
    assert_eq!(name, "Approve");

    shared.request_reset().unwrap();
    assert_eq!(shared.read().models().count(), 3);
}
