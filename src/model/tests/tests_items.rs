#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::base::RepositoryError;
use crate::model::{ImportState, Item, ItemType, Model, ModelObject};
use rstest::rstest;

fn sales() -> Model {
    Model::new("Sales")
        .with_item(Item::new("CheckOrder", ItemType::Process))
        .unwrap()
        .with_item(Item::new("Order", ItemType::Type))
        .unwrap()
        .with_item(Item::new("Ship", ItemType::Process))
        .unwrap()
}

#[test]
fn test_added_item_is_returned_by_get_item() {
    let model = sales();
    let item = model
        .get_item("CheckOrder", &ItemType::Process, true)
        .unwrap()
        .unwrap();

    assert_eq!(item.name(), "CheckOrder");
    assert_eq!(item.model(), Some("Sales"), "add_item sets the back-reference");
}

#[test]
fn test_duplicate_name_and_type_rejected() {
    let mut model = sales();
    let result = model.add_item(Item::new("CheckOrder", ItemType::Process));
    assert!(matches!(result, Err(RepositoryError::DuplicateName { .. })));
}

#[test]
fn test_same_name_different_type_allowed() {
    let mut model = sales();
    model
        .add_item(Item::new("CheckOrder", ItemType::Activity))
        .expect("names are unique per type only");
    assert_eq!(model.item_count(), 4);
}

#[test]
fn test_get_item_missing() {
    let model = sales();
    assert!(model.get_item("Nope", &ItemType::Process, false).unwrap().is_none());

    let err = model.get_item("Nope", &ItemType::Process, true).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("/Sales/Process:Nope"));
}

#[test]
fn test_remove_item_clears_back_reference() {
    let mut model = sales();
    let removed = model.remove_item("Order", &ItemType::Type).unwrap();

    assert_eq!(removed.model(), None);
    assert!(model.find_item("Order", None).is_none());
    assert!(model.remove_item("Order", &ItemType::Type).unwrap_err().is_not_found());
}

#[test]
fn test_items_by_type_are_contiguous() {
    let model = sales();
    let types: Vec<_> = model.items(None).map(|i| i.item_type().clone()).collect();

    assert_eq!(
        types,
        vec![ItemType::Process, ItemType::Process, ItemType::Type],
        "same-typed children must be adjacent"
    );
    assert_eq!(model.items(Some(&ItemType::Process)).count(), 2);
    assert_eq!(model.items(Some(&ItemType::Queue)).count(), 0);
}

#[rstest]
#[case("")]
#[case("a.b")]
#[case("a/b")]
#[case("a:b")]
#[case("a;b")]
fn test_invalid_item_names_rejected(#[case] name: &str) {
    let mut model = Model::new("Sales");
    let result = model.add_item(Item::new(name, ItemType::Process));
    assert!(matches!(result, Err(RepositoryError::Parse { .. })));
}

#[test]
fn test_import_changes_invalidate_state() {
    let mut model = Model::new("A").with_import("B");
    model.apply_import_resolution(vec!["B".into()]);
    assert!(model.is_resolved());

    model.add_import("C");
    assert_eq!(model.import_state(), &ImportState::Unresolved);

    model.apply_import_resolution(vec!["B".into(), "C".into()]);
    assert!(model.remove_import("B"));
    assert!(!model.is_resolved());
    assert!(!model.remove_import("B"));
}

#[test]
fn test_add_import_ignores_duplicates() {
    let model = Model::new("A").with_import("B").with_import("B");
    assert_eq!(model.imports().len(), 1);
}

#[test]
fn test_model_owns_itself() {
    let model = Model::new("Sales");
    assert_eq!(model.owner(), model.name());
    assert_eq!(model.qualifier().to_string(), "/Sales/");
}

#[test]
fn test_overwrite_from_keeps_items_and_links() {
    let mut model = sales().with_location("/tmp/sales");
    model.apply_import_resolution(vec![]);

    let incoming = Model::new("Sales")
        .with_description("updated")
        .with_import("System");
    model.overwrite_from(incoming);

    assert_eq!(model.description.as_deref(), Some("updated"));
    assert_eq!(model.imports(), &["System"]);
    assert_eq!(model.item_count(), 3, "items survive copy-in-place");
    assert!(model.location().is_some());
    assert!(!model.is_resolved(), "copy-in-place requires re-resolution");
}

#[test]
fn test_item_overwrite_from_keeps_identity() {
    let mut model = sales();
    let item = model.get_item_mut("Order", &ItemType::Type).unwrap();
    item.overwrite_from(
        Item::new("Ignored", ItemType::Actor)
            .with_class_name("pkg.Order")
            .with_description("new"),
    );

    let item = model.get_item("Order", &ItemType::Type, true).unwrap().unwrap();
    assert_eq!(item.class_name.as_deref(), Some("pkg.Order"));
    assert_eq!(item.model(), Some("Sales"));
    assert_eq!(item.item_type(), &ItemType::Type);
}

#[test]
fn test_object_at_walks_nested_children() {
    let item = Item::new("CheckOrder", ItemType::Process).with_object(
        ModelObject::new("Entry", "Node").with_child(ModelObject::new("amount", "Parameter")),
    );

    assert_eq!(item.object_at("Entry.amount").unwrap().kind, "Parameter");
    assert_eq!(item.object_at("Entry.missing").unwrap_err(), "missing");
    assert_eq!(item.object_at("Exit").unwrap_err(), "Exit");
}

#[rstest]
#[case("process", ItemType::Process)]
#[case("TYPE", ItemType::Type)]
#[case("Mapping", ItemType::Other("Mapping".into()))]
fn test_item_type_parse(#[case] tag: &str, #[case] expected: ItemType) {
    assert_eq!(ItemType::parse(tag), expected);
}

#[test]
fn test_item_type_dir_name_is_lower_case() {
    assert_eq!(ItemType::Process.dir_name(), "process");
    assert_eq!(ItemType::Other("Mapping".into()).dir_name(), "mapping");
}

#[rstest]
#[case("a/b")]
#[case("../../outside")]
#[case("")]
fn test_add_item_rejects_invalid_type_tag(#[case] tag: &str) {
    let mut model = sales();
    let result = model.add_item(Item::new("Evil", ItemType::Other(tag.into())));

    assert!(matches!(result, Err(RepositoryError::Parse { .. })));
    assert_eq!(model.item_count(), 3);
}
