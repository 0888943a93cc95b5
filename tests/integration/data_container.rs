//! Data container addressing through schema-resolved paths.

use serde_json::json;

use crate::common::data;
use crate::common::fixtures::{ENTERPRISE_SCHEMA, USER_SCHEMA, enterprise_user, schemas};

use scim_schema::{AttrPath, DataValue, ScimData, ScimError};

fn path(value: &str) -> AttrPath {
    let schemas = schemas();
    AttrPath::parse(value, &schemas.registry).expect("valid attribute path")
}

#[test]
fn test_set_sub_attribute_creates_parent() {
    let mut user = ScimData::new();
    user.set(&path("name.givenName"), "Barbara").expect("parent created");
    user.set(&path("NAME.familyName"), "Jensen").expect("parent reused");

    assert_eq!(
        user.to_plain(),
        json!({"name": {"givenName": "Barbara", "familyName": "Jensen"}})
    );
}

#[test]
fn test_set_sub_attribute_below_scalar() {
    let mut user = data(json!({"name": "Barbara Jensen"}));
    let result = user.set(&path("name.givenName"), "Barbara");

    assert!(matches!(
        result,
        Err(ScimError::IncompatibleTarget { ref attr, ref sub_attr })
            if attr == "name" && sub_attr == "givenName"
    ));
    assert_eq!(user.get("name"), DataValue::from("Barbara Jensen"));
}

#[test]
fn test_lookup_ignores_case() {
    let user = data(enterprise_user());

    assert_eq!(user.get(&path("USERNAME")), DataValue::from("bjensen@example.com"));
    assert_eq!(user.get(&path("name.GIVENNAME")), DataValue::from("Barbara"));
    assert_eq!(
        user.get(&path(&format!("{}:userName", USER_SCHEMA.to_uppercase()))),
        DataValue::from("bjensen@example.com")
    );
    assert_eq!(
        user.get(&path("emails.type")),
        DataValue::from(json!(["work", "home"]))
    );
}

#[test]
fn test_extension_paths_use_the_namespace() {
    let mut user = data(json!({"userName": "bjensen", "employeeNumber": "top-level"}));
    let employee_number = path(&format!("{}:employeeNumber", ENTERPRISE_SCHEMA));
    let manager = path(&format!("{}:manager.displayName", ENTERPRISE_SCHEMA));

    user.set(&employee_number, "701984").expect("namespace created");
    user.set(&manager, "John Smith").expect("parent created in namespace");

    assert_eq!(user.get(&employee_number), DataValue::from("701984"));
    assert_eq!(user.get("employeeNumber"), DataValue::from("top-level"));
    assert_eq!(
        user.to_plain(),
        json!({
            "userName": "bjensen",
            "employeeNumber": "top-level",
            ENTERPRISE_SCHEMA: {
                "employeeNumber": "701984",
                "manager": {"displayName": "John Smith"}
            }
        })
    );

    assert_eq!(user.pop(&employee_number), DataValue::from("701984"));
    assert!(user.get(ENTERPRISE_SCHEMA).as_data().is_some());
}

#[test]
fn test_namespace_equals_qualified_keys() {
    let nested = data(json!({
        "userName": "bjensen",
        ENTERPRISE_SCHEMA: {"employeeNumber": "701984"}
    }));
    let qualified = data(json!({
        "userName": "bjensen",
        format!("{}:employeeNumber", ENTERPRISE_SCHEMA): "701984"
    }));
    let different = data(json!({
        "userName": "bjensen",
        format!("{}:employeeNumber", ENTERPRISE_SCHEMA): "1"
    }));

    assert_eq!(nested, qualified);
    assert_eq!(qualified, nested);
    assert_ne!(nested, different);
}

#[test]
fn test_round_trip_keeps_casing_and_order() {
    let original = json!({"UserName": "bjensen", "active": true, "Name": {"GivenName": "Barbara"}});
    let user = data(original.clone());

    assert_eq!(user.keys().collect::<Vec<_>>(), vec!["UserName", "active", "Name"]);
    assert_eq!(user.to_plain(), original);
    assert_eq!(serde_json::to_value(&user).expect("serializable"), original);
}

#[test]
fn test_textual_paths_on_the_enterprise_user() {
    let mut user = data(enterprise_user());

    assert_eq!(user.get("name.familyName"), DataValue::from("Jensen"));
    assert_eq!(
        user.get(format!("{}:employeeNumber", ENTERPRISE_SCHEMA).as_str()),
        DataValue::from("701984")
    );

    user.set(format!("{}:manager.displayName", ENTERPRISE_SCHEMA).as_str(), "Ada")
        .expect("namespace present");
    assert_eq!(
        user.get(&path(&format!("{}:manager.displayName", ENTERPRISE_SCHEMA))),
        DataValue::from("Ada")
    );
    assert_eq!(user.pop("emails.display").as_list().map(<[_]>::len), Some(2));
}

#[test]
fn test_registry_resolved_textual_paths() {
    let schemas = schemas();
    let mut user = ScimData::new();
    let employee_number = format!("{}:employeeNumber", ENTERPRISE_SCHEMA);

    user.set_path(&employee_number, "701984", &schemas.registry)
        .expect("registered extension");
    user.set_path(&format!("{}:userName", USER_SCHEMA), "bjensen", &schemas.registry)
        .expect("registered core schema");

    assert_eq!(
        user.to_plain(),
        json!({
            ENTERPRISE_SCHEMA: {"employeeNumber": "701984"},
            "userName": "bjensen"
        })
    );
    assert_eq!(
        user.pop_path(&employee_number, &schemas.registry)
            .expect("registered extension"),
        DataValue::from("701984")
    );
    assert_eq!(
        user.get_path(ENTERPRISE_SCHEMA, &schemas.registry)
            .expect("registered extension"),
        DataValue::Data(ScimData::new())
    );
}
