//! Test data builders for creating valid and invalid resources.
//!
//! Builders start from a valid RFC example and are modified one attribute at
//! a time, so each test states only what it breaks.

use super::fixtures;
use scim_schema::ScimData;
use serde_json::{Map, Value, json};

/// Builder for User resources with fluent API for creating test data
#[derive(Debug, Clone)]
pub struct UserBuilder {
    data: Value,
}

impl UserBuilder {
    /// Start from a minimal valid User
    pub fn new() -> Self {
        Self {
            data: json!({
                "schemas": [fixtures::USER_SCHEMA],
                "id": "2819c223-7f76-453a-919d-413861904646",
                "userName": "bjensen@example.com",
                "meta": {"resourceType": "User"}
            }),
        }
    }

    /// Start from the full enterprise user example
    pub fn new_full() -> Self {
        Self {
            data: fixtures::enterprise_user(),
        }
    }

    /// Set a top-level attribute, or a sub-attribute with a dotted path.
    /// Schema URIs are always top-level keys.
    pub fn with(mut self, path: &str, value: Value) -> Self {
        match split_sub_attr(path) {
            Some((attr, sub_attr)) => {
                let parent = self.object().entry(attr).or_insert_with(|| json!({}));
                parent[sub_attr] = value;
            }
            None => {
                self.object().insert(path.to_string(), value);
            }
        }
        self
    }

    /// Remove a top-level attribute, or a sub-attribute with a dotted path
    pub fn without(mut self, path: &str) -> Self {
        match split_sub_attr(path) {
            Some((attr, sub_attr)) => {
                if let Some(parent) = self.object().get_mut(attr).and_then(Value::as_object_mut) {
                    parent.remove(sub_attr);
                }
            }
            None => {
                self.object().remove(path);
            }
        }
        self
    }

    /// Replace the `schemas` attribute
    pub fn with_schemas(self, schemas: &[&str]) -> Self {
        self.with("schemas", json!(schemas))
    }

    pub fn without_username(self) -> Self {
        self.without("userName")
    }

    pub fn build_json(self) -> Value {
        self.data
    }

    pub fn build(self) -> ScimData {
        super::data(self.data)
    }

    fn object(&mut self) -> &mut Map<String, Value> {
        self.data
            .as_object_mut()
            .expect("builder data is always an object")
    }
}

/// Split `attr.subAttr`; keys holding a schema URI are never split, even
/// though URIs like `...:enterprise:2.0:User` contain dots.
fn split_sub_attr(path: &str) -> Option<(&str, &str)> {
    if path.contains(':') {
        return None;
    }
    path.split_once('.')
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures::ENTERPRISE_SCHEMA;

    #[test]
    fn test_schema_uri_keys_stay_top_level() {
        let user = UserBuilder::new()
            .with(ENTERPRISE_SCHEMA, json!({"employeeNumber": "701984"}))
            .with("name.givenName", json!("Barbara"))
            .build_json();

        assert_eq!(user[ENTERPRISE_SCHEMA], json!({"employeeNumber": "701984"}));
        assert_eq!(user["name"], json!({"givenName": "Barbara"}));

        let user = UserBuilder::new()
            .with(ENTERPRISE_SCHEMA, json!({}))
            .without(ENTERPRISE_SCHEMA)
            .build_json();
        assert!(user.get(ENTERPRISE_SCHEMA).is_none());
    }
}
