use procmodel::{Qualifier, QualifierFields, RepositoryError};
use rstest::rstest;

#[test]
fn test_sales_qualifier_fields() {
    let q = Qualifier::parse("/Sales/Process:CheckOrder.Entry.amount").unwrap();

    assert_eq!(q.model(), Some("Sales"));
    assert_eq!(q.item_type(), Some("Process"));
    assert_eq!(q.item(), Some("CheckOrder"));
    assert_eq!(q.object_path(), Some("Entry.amount"));
    assert!(q.is_absolute());
}

#[rstest]
#[case("/Sales/")]
#[case("/Sales/CheckOrder")]
#[case("/Sales/Process:CheckOrder")]
#[case("/Sales/Process:CheckOrder.Entry.amount")]
#[case("Process:CheckOrder")]
#[case("CheckOrder.Entry")]
fn test_format_reparses_to_equal_qualifier(#[case] text: &str) {
    let parsed = Qualifier::parse(text).unwrap();
    let formatted = parsed.format(true);

    assert_eq!(formatted, text);
    assert_eq!(Qualifier::parse(&formatted).unwrap(), parsed);
}

#[rstest]
#[case("/")]
#[case("/Sales/Process/CheckOrder")]
#[case("/Sales/a;b")]
fn test_malformed_text_is_parse_error(#[case] text: &str) {
    assert!(matches!(
        Qualifier::parse(text),
        Err(RepositoryError::Parse { .. })
    ));
}

#[test]
fn test_match_ignores_missing_type() {
    let typed = Qualifier::parse("/Sales/Process:CheckOrder").unwrap();
    let untyped = Qualifier::parse("/Sales/CheckOrder").unwrap();
    let elsewhere = Qualifier::parse("/Shared/CheckOrder").unwrap();

    assert!(typed.matches(&untyped));
    assert!(!typed.matches(&elsewhere));
    assert!(typed.matches_fields(&elsewhere, QualifierFields::ITEM));
}
