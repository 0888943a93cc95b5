//! Tests for the `schemas` attribute of a resource.

use serde_json::json;

use crate::common::builders::UserBuilder;
use crate::common::fixtures::{ENTERPRISE_SCHEMA, GROUP_SCHEMA, USER_SCHEMA, schemas};
use crate::common::{data, error_codes};
use crate::{assert_errors_at, assert_no_errors};

use scim_schema::location;

#[test]
fn test_main_schema_only() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with_schemas(&[USER_SCHEMA]).build();
    assert_no_errors!(schemas.user.validate(&mut user));
}

#[test]
fn test_main_and_extension_schema() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[USER_SCHEMA, ENTERPRISE_SCHEMA])
        .with(ENTERPRISE_SCHEMA, json!({"employeeNumber": "701984"}))
        .build();
    assert_no_errors!(schemas.user.validate(&mut user));
}

#[test]
fn test_schema_uris_are_case_insensitive() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[
            "URN:IETF:PARAMS:SCIM:SCHEMAS:CORE:2.0:USER",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:user",
        ])
        .with(ENTERPRISE_SCHEMA, json!({"costCenter": "4130"}))
        .build();
    assert_no_errors!(schemas.user.validate(&mut user));
}

#[test]
fn test_duplicated_schema() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[USER_SCHEMA, &USER_SCHEMA.to_uppercase()])
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["schemas"], [10]);
}

#[test]
fn test_unknown_schema_reported_once() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[USER_SCHEMA, GROUP_SCHEMA, "urn:example:unknown"])
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["schemas"], [14]);
}

#[test]
fn test_missing_main_schema() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[ENTERPRISE_SCHEMA])
        .with(ENTERPRISE_SCHEMA, json!({"employeeNumber": "701984"}))
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["schemas"], [12]);
}

#[test]
fn test_extension_data_without_listed_extension() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[USER_SCHEMA])
        .with(ENTERPRISE_SCHEMA, json!({"employeeNumber": "701984"}))
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["schemas"], [13]);
    assert_eq!(
        issues.errors_at(&location!["schemas"])[0].context()["extension"],
        json!(ENTERPRISE_SCHEMA)
    );
}

#[test]
fn test_every_schemas_problem_at_once() {
    let schemas = schemas();
    let mut user = data(json!({
        "schemas": ["urn:example:unknown", "URN:EXAMPLE:UNKNOWN"],
        "userName": "bjensen",
        ENTERPRISE_SCHEMA: {"employeeNumber": "701984"}
    }));

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["schemas"], [10, 14, 12, 13]);
    assert!(issues.can_proceed(&location!["schemas"]));
}

#[test]
fn test_schemas_must_be_a_list() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with("schemas", json!(USER_SCHEMA)).build();

    let issues = schemas.user.validate(&mut user);

    assert_eq!(error_codes(&issues), vec![("schemas".to_string(), 2)]);
}

#[test]
fn test_absent_schemas_are_not_checked() {
    let schemas = schemas();
    let mut user = UserBuilder::new().without("schemas").build();
    assert!(schemas.user.validate(&mut user).is_empty());

    let mut user = UserBuilder::new().with_schemas(&[]).build();
    assert_no_errors!(schemas.user.validate(&mut user));
}
