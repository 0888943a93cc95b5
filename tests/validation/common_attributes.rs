//! Tests for the attributes shared by every resource: `id`, `externalId`
//! and `meta`.

use serde_json::json;

use crate::common::builders::UserBuilder;
use crate::common::fixtures::{USER_SCHEMA, schemas};
use crate::common::error_codes;
use crate::{assert_errors_at, assert_no_errors};

use scim_schema::{AttributeIssuer, Mutability, Returned, Uniqueness, location};

#[test]
fn test_common_attributes_are_declared() {
    let schemas = schemas();
    let attrs = schemas.user.attrs();

    let id = attrs.get_by_name("id").expect("valid path").expect("id");
    assert!(id.required());
    assert!(id.case_exact());
    assert_eq!(id.issuer(), AttributeIssuer::Server);
    assert_eq!(id.mutability(), Mutability::ReadOnly);
    assert_eq!(id.returned(), Returned::Always);
    assert_eq!(id.uniqueness(), Uniqueness::Server);

    let external_id = attrs.get_by_name("externalId").expect("valid path").expect("externalId");
    assert_eq!(external_id.issuer(), AttributeIssuer::Client);

    let created = attrs.get_by_name("meta.created").expect("valid path").expect("meta.created");
    assert_eq!(created.mutability(), Mutability::ReadOnly);
}

#[test]
fn test_common_attributes_are_not_core() {
    let schemas = schemas();
    let core: Vec<_> = schemas
        .user
        .attrs()
        .core_attrs()
        .map(|attr| attr.name().as_str().to_string())
        .collect();
    assert!(core.contains(&"userName".to_string()));
    for common in ["schemas", "id", "externalId", "meta"] {
        assert!(!core.iter().any(|name| name == common), "{} listed as core", common);
    }
}

#[test]
fn test_id_must_be_string() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with("id", json!(2819)).build();
    let issues = schemas.user.validate(&mut user);
    assert_errors_at!(issues, ["id"], [2]);
}

#[test]
fn test_meta_timestamps() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with("meta.created", json!("2010-01-23T04:56:22Z"))
        .with("meta.lastModified", json!("last tuesday"))
        .build();

    let issues = schemas.user.validate(&mut user);

    assert_eq!(
        error_codes(&issues),
        vec![("meta.lastModified".to_string(), 1)]
    );
    assert!(issues.can_proceed(&location!["meta", "created"]));
}

#[test]
fn test_resource_type_mismatch() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with("meta.resourceType", json!("Group")).build();

    let issues = schemas.user.validate(&mut user);

    assert_errors_at!(issues, ["meta", "resourceType"], [18]);
    let context = issues.errors_at(&location!["meta", "resourceType"])[0].context();
    assert_eq!(context["resource_type"], json!("User"));
    assert_eq!(context["provided"], json!("Group"));
}

#[test]
fn test_resource_type_is_case_exact() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with("meta.resourceType", json!("user")).build();
    let issues = schemas.user.validate(&mut user);
    assert_errors_at!(issues, ["meta", "resourceType"], [18]);
}

#[test]
fn test_matching_resource_type() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with("meta", json!({"resourceType": "User", "version": "W/\"1\""}))
        .build();
    assert_no_errors!(schemas.user.validate(&mut user));

    let mut user = UserBuilder::new().without("meta").build();
    assert_no_errors!(schemas.user.validate(&mut user));
}

#[test]
fn test_group_shares_common_attributes() {
    let schemas = schemas();
    let mut group = UserBuilder::new()
        .with_schemas(&[crate::common::fixtures::GROUP_SCHEMA])
        .without("userName")
        .with("displayName", json!("Tour Guides"))
        .with("meta.resourceType", json!("Group"))
        .build();
    assert_no_errors!(schemas.group.validate(&mut group));

    assert!(schemas.group.schemas().iter().all(|uri| uri.as_str() != USER_SCHEMA));
}
