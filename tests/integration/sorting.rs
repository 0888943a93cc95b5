//! Sorting resources by attribute values.

use serde_json::{Value, json};

use crate::common::data;
use crate::common::fixtures::{ENTERPRISE_SCHEMA, schemas};

use scim_schema::{AttrPath, ScimData, ScimError, Sorter};

fn users(values: Vec<Value>) -> Vec<ScimData> {
    values.into_iter().map(data).collect()
}

fn ids(sorted: &[ScimData]) -> Vec<String> {
    sorted
        .iter()
        .map(|item| item.get("id").as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_sort_by_user_name_ignoring_case() {
    let schemas = schemas();
    let sorter = Sorter::new(
        AttrPath::parse("userName", &schemas.registry).expect("valid path"),
        true,
    );

    let sorted = sorter
        .sort(
            users(vec![
                json!({"id": "1", "userName": "mandy"}),
                json!({"id": "2"}),
                json!({"id": "3", "userName": "Babs"}),
                json!({"id": "4", "userName": ""}),
                json!({"id": "5", "userName": "alice"}),
            ]),
            schemas.user.attrs(),
        )
        .expect("comparable values");

    assert_eq!(ids(&sorted), vec!["5", "3", "1", "2", "4"]);
}

#[test]
fn test_descending_order_from_query() {
    let schemas = schemas();
    let query = data(json!({"sortBy": "name.familyName", "sortOrder": "DESCENDING"}));
    let sorter = Sorter::from_query(&query, &schemas.registry)
        .expect("valid sortBy")
        .expect("sortBy given");
    assert!(!sorter.ascending());

    let sorted = sorter
        .sort(
            users(vec![
                json!({"id": "1", "name": {"familyName": "Jensen"}}),
                json!({"id": "2", "name": {"givenName": "Nobody"}}),
                json!({"id": "3", "name": {"familyName": "Pepperidge"}}),
                json!({"id": "4", "name": {"familyName": "adams"}}),
            ]),
            schemas.user.attrs(),
        )
        .expect("comparable values");

    // absent values stay last in descending order too
    assert_eq!(ids(&sorted), vec!["3", "1", "4", "2"]);
}

#[test]
fn test_query_without_sort_by() {
    let schemas = schemas();
    let query = data(json!({"sortOrder": "descending"}));
    assert!(Sorter::from_query(&query, &schemas.registry).expect("nothing to parse").is_none());

    let query = data(json!({"sortBy": "urn:example:nope:userName"}));
    assert!(matches!(
        Sorter::from_query(&query, &schemas.registry),
        Err(ScimError::UnknownSchema { .. })
    ));
}

#[test]
fn test_multi_valued_sorts_by_primary_value() {
    let schemas = schemas();
    let sorter = Sorter::new(
        AttrPath::parse("emails", &schemas.registry).expect("valid path"),
        true,
    );

    let sorted = sorter
        .sort(
            users(vec![
                json!({"id": "1", "emails": [
                    {"value": "a@example.com"},
                    {"value": "z@example.com", "primary": true}
                ]}),
                json!({"id": "2", "emails": [{"value": "m@example.com"}]}),
                json!({"id": "3", "emails": []}),
            ]),
            schemas.user.attrs(),
        )
        .expect("comparable values");

    assert_eq!(ids(&sorted), vec!["2", "1", "3"]);
}

#[test]
fn test_sort_by_extension_attribute() {
    let schemas = schemas();
    let sorter = Sorter::new(
        AttrPath::parse(&format!("{}:employeeNumber", ENTERPRISE_SCHEMA), &schemas.registry)
            .expect("valid path"),
        true,
    );

    let sorted = sorter
        .sort(
            users(vec![
                json!({"id": "1", ENTERPRISE_SCHEMA: {"employeeNumber": "300"}}),
                json!({"id": "2", "employeeNumber": "100"}),
                json!({"id": "3", ENTERPRISE_SCHEMA: {"employeeNumber": "200"}}),
            ]),
            schemas.user.attrs(),
        )
        .expect("comparable values");

    assert_eq!(ids(&sorted), vec!["3", "1", "2"]);
}

#[test]
fn test_nothing_to_sort_by() {
    let schemas = schemas();
    let sorter = Sorter::new(
        AttrPath::parse("nickName", &schemas.registry).expect("valid path"),
        false,
    );
    let input = users(vec![json!({"id": "2"}), json!({"id": "1"})]);

    let sorted = sorter.sort(input.clone(), schemas.user.attrs()).expect("no values");

    assert_eq!(sorted, input);
}

#[test]
fn test_mixed_value_kinds() {
    let schemas = schemas();
    let sorter = Sorter::new(
        AttrPath::parse("emails", &schemas.registry).expect("valid path"),
        true,
    );

    let result = sorter.sort(
        users(vec![
            json!({"id": "1", "emails": [{"value": "a@example.com"}]}),
            json!({"id": "2", "emails": [{"value": 42}]}),
        ]),
        schemas.user.attrs(),
    );

    assert!(matches!(result, Err(ScimError::SortTypeMismatch { .. })));
}
