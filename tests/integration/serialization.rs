//! Resource serialization and deserialization.

use serde_json::json;
use std::sync::Arc;

use crate::common::data;
use crate::common::fixtures::{ENTERPRISE_SCHEMA, USER_SCHEMA, enterprise_user, schemas};

use scim_schema::{Attribute, AttributeKind, DataValue, ResourceSchema, SchemaRegistry};

#[test]
fn test_deserialize_keeps_known_attributes() {
    let schemas = schemas();
    let user = data(enterprise_user());

    let deserialized = schemas.user.deserialize(&user).expect("addressable paths");

    assert_eq!(deserialized, user);
}

#[test]
fn test_unknown_attributes_are_dropped() {
    let schemas = schemas();
    let user = data(json!({
        "schemas": [USER_SCHEMA],
        "USERNAME": "bjensen",
        "favouriteColour": "green",
        "name": {"givenName": "Barbara", "middleName": "Jane"},
        "emails": [{"value": "bjensen@example.com", "label": "work"}]
    }));

    let serialized = schemas.user.serialize(&user).expect("addressable paths");

    assert_eq!(
        serialized.to_plain(),
        json!({
            "schemas": [USER_SCHEMA],
            "userName": "bjensen",
            "name": {"givenName": "Barbara"},
            "emails": [{"value": "bjensen@example.com"}]
        })
    );
}

#[test]
fn test_output_follows_declaration_order() {
    let schemas = schemas();
    let user = data(json!({
        ENTERPRISE_SCHEMA: {"employeeNumber": "701984"},
        "active": true,
        "userName": "bjensen",
        "id": "2819c223"
    }));

    let serialized = schemas.user.serialize(&user).expect("addressable paths");

    assert_eq!(
        serialized.keys().collect::<Vec<_>>(),
        vec!["id", "userName", "active", ENTERPRISE_SCHEMA]
    );
}

#[test]
fn test_numbers_follow_declared_type() {
    let schemas = schemas();
    let user = data(json!({"weight": 70, "loginCount": 4.0}));

    let serialized = schemas.user.serialize(&user).expect("addressable paths");
    assert_eq!(serialized.get("weight"), DataValue::from(json!(70.0)));
    assert_eq!(serialized.get("loginCount"), DataValue::from(4i64));

    let deserialized = schemas.user.deserialize(&user).expect("addressable paths");
    assert_eq!(deserialized.get("weight"), DataValue::from(json!(70.0)));
    assert_eq!(deserialized.get("loginCount"), DataValue::from(4i64));
}

#[test]
fn test_fractional_integer_is_not_truncated() {
    let schemas = schemas();
    let user = data(json!({"loginCount": 4.9}));

    let serialized = schemas.user.serialize(&user).expect("addressable paths");

    assert_eq!(serialized.get("loginCount"), DataValue::from(json!(4.9)));
}

#[test]
fn test_custom_serializer_replaces_default() {
    let registry = Arc::new(SchemaRegistry::new());
    let schema = ResourceSchema::builder("urn:example:Device", "Device")
        .with_attributes([Attribute::builder("serial", AttributeKind::String)
            .with_serializer(|value: DataValue| match value.as_str() {
                Some(serial) => DataValue::from(serial.to_uppercase()),
                None => value,
            })
            .with_deserializer(|value: DataValue| match value.as_str() {
                Some(serial) => DataValue::from(serial.to_lowercase()),
                None => value,
            })
            .build()
            .expect("serial")])
        .build(registry)
        .expect("Device schema");
    let device = data(json!({"serial": "Ab-12"}));

    let serialized = schema.serialize(&device).expect("addressable paths");
    assert_eq!(serialized.get("serial"), DataValue::from("AB-12"));

    let deserialized = schema.deserialize(&device).expect("addressable paths");
    assert_eq!(deserialized.get("serial"), DataValue::from("ab-12"));
}

#[test]
fn test_serialized_resource_is_plain_json() {
    let schemas = schemas();
    let user = schemas
        .user
        .serialize(&data(enterprise_user()))
        .expect("addressable paths");

    let rendered = serde_json::to_value(&user).expect("serializable");

    assert_eq!(rendered["name"]["givenName"], json!("Barbara"));
    assert_eq!(rendered[ENTERPRISE_SCHEMA]["manager"]["displayName"], json!("John Smith"));
    assert_eq!(rendered["emails"][0]["primary"], json!(true));
}
