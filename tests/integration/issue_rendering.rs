//! Rendering collected issues as the nested wire tree.

use serde_json::json;

use crate::common::builders::UserBuilder;
use crate::common::fixtures::{ENTERPRISE_SCHEMA, USER_SCHEMA, schemas};

use scim_schema::location;

#[test]
fn test_rendered_tree_shape() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with("active", json!("yes"))
        .with("userType", json!("Intern"))
        .with(
            "emails",
            json!([{"value": "a@example.com", "primary": "yes"}]),
        )
        .build();

    let issues = schemas.user.validate(&mut user);
    let rendered = issues.to_rendered_tree(false, false);

    assert_eq!(
        rendered,
        json!({
            "active": {"_errors": [{"code": 2}]},
            "emails": {"0": {"primary": {"_errors": [{"code": 2}]}}},
            "userType": {"_warnings": [{"code": 1}]}
        })
    );
}

#[test]
fn test_rendered_messages_and_context() {
    let schemas = schemas();
    let mut user = UserBuilder::new().with("active", json!("yes")).build();

    let issues = schemas.user.validate(&mut user);

    assert_eq!(
        issues.to_rendered_tree(true, true),
        json!({
            "active": {
                "_errors": [{
                    "code": 2,
                    "error": "bad type, expecting 'boolean'",
                    "context": {"expected": "boolean"}
                }]
            }
        })
    );
}

#[test]
fn test_extension_issues_render_under_uri() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with_schemas(&[USER_SCHEMA, ENTERPRISE_SCHEMA])
        .with(ENTERPRISE_SCHEMA, json!({"costCenter": 4130}))
        .build();

    let issues = schemas.user.validate(&mut user);
    let rendered = issues.to_rendered_tree(false, false);

    assert_eq!(
        rendered[ENTERPRISE_SCHEMA]["costCenter"]["_errors"],
        json!([{"code": 2}])
    );
}

#[test]
fn test_issues_at_parent_and_child() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with(
            "emails",
            json!([
                {"value": "a@example.com", "primary": true},
                {"value": "b@example.com", "primary": true},
                {"value": "c@example.com", "type": 5}
            ]),
        )
        .build();

    let issues = schemas.user.validate(&mut user);
    let rendered = issues.to_rendered_tree(false, false);

    assert_eq!(rendered["emails"]["_errors"], json!([{"code": 15}]));
    assert_eq!(rendered["emails"]["2"]["type"]["_errors"], json!([{"code": 2}]));
}

#[test]
fn test_selecting_and_popping_issues() {
    let schemas = schemas();
    let mut user = UserBuilder::new()
        .with("active", json!("yes"))
        .with("locale", json!("fr-FR"))
        .build();

    let mut issues = schemas.user.validate(&mut user);

    let type_errors = issues.get(Some(&[2u16][..]), None, &[]);
    assert_eq!(type_errors.to_rendered_tree(false, false), json!({"active": {"_errors": [{"code": 2}]}}));

    let popped = issues.pop_errors(&[9], &location!["locale"]);
    assert_eq!(popped.errors_at(&[])[0].code(), 9);
    assert!(issues.can_proceed(&location!["locale"]));
    assert!(!issues.can_proceed(&location!["active"]));
}
