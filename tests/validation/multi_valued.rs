//! Multi-valued attribute validation tests.

use serde_json::json;

use crate::common::builders::UserBuilder;
use crate::common::{error_codes, fixtures::schemas};
use crate::{assert_errors_at, assert_no_errors, assert_warnings_at};

use scim_schema::{DataValue, location};

#[test]
fn test_single_value_given_for_multi_valued() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with("emails", json!({"value": "bjensen@example.com"}))
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["emails"], [2]);
    assert_eq!(
        issues.errors_at(&location!["emails"])[0].message(),
        "bad type, expecting 'list'"
    );
    assert!(user.get("emails").is_invalid());
}

#[test]
fn test_only_bad_element_is_invalidated() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with(
            "emails",
            json!([
                {"value": "bjensen@example.com", "type": "work"},
                "babs@jensen.org",
                {"value": "babs@jensen.org", "type": "home"}
            ]),
        )
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_eq!(error_codes(&issues), vec![("emails.1".to_string(), 2)]);
    assert!(issues.can_proceed(&location!["emails"]));
    assert!(!issues.can_proceed(&location!["emails", 1usize]));

    let emails = user.get("emails");
    let items = emails.as_list().expect("emails stays a list");
    assert!(items[0].as_data().is_some());
    assert!(items[1].is_invalid());
    assert_eq!(
        items[2].as_data().map(|item| item.get("type")),
        Some(DataValue::from("home"))
    );
}

#[test]
fn test_multiple_primary_values() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with(
            "emails",
            json!([
                {"value": "bjensen@example.com", "primary": true},
                {"value": "babs@jensen.org", "primary": true}
            ]),
        )
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["emails"], [15]);
    assert!(issues.can_proceed(&location!["emails"]));
    assert!(user.get("emails").as_list().is_some());
}

#[test]
fn test_single_primary_value_is_accepted() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with(
            "emails",
            json!([
                {"value": "bjensen@example.com", "primary": true},
                {"value": "babs@jensen.org", "primary": false}
            ]),
        )
        .build();
    assert!(schemas.user.validate(&mut user).is_empty());
}

#[test]
fn test_duplicated_type_value_pairs_warn() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with(
            "phoneNumbers",
            json!([
                {"value": "555-555-5555", "type": "work"},
                {"value": "555-555-5555", "type": "work"},
                {"value": "555-555-4444", "type": "work"}
            ]),
        )
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_no_errors!(issues);
    assert_warnings_at!(issues, ["phoneNumbers"], [2]);
}

#[test]
fn test_sub_attribute_error_in_element() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with(
            "phoneNumbers",
            json!([
                {"value": "555-555-5555", "primary": "yes"},
                {"value": "555-555-4444", "primary": false}
            ]),
        )
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["phoneNumbers", 0usize, "primary"], [2]);
    assert!(issues.can_proceed(&location!["phoneNumbers", 0usize]));

    let phones = user.get("phoneNumbers");
    let first = phones.as_list().and_then(|items| items[0].as_data()).expect("element kept");
    assert!(first.get("primary").is_invalid());
    assert_eq!(first.get("value"), DataValue::from("555-555-5555"));
}

#[test]
fn test_empty_list_is_valid() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with("emails", json!([])).build();
    assert!(schemas.user.validate(&mut user).is_empty());
}
