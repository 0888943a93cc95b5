//! Catalog of validation error and warning codes.
//!
//! Each issue carries a stable numeric code, a rendered message and the
//! structured context the message was rendered from. Errors additionally carry
//! the SCIM `scimType` a transport layer should report them with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// SCIM detail error keywords (RFC 7644 section 3.12) reported for data
/// errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ScimErrorType {
    InvalidSyntax,
    InvalidValue,
}

/// A data error found while validating instance data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    code: u16,
    message: String,
    context: Map<String, Value>,
    #[serde(rename = "scimType")]
    scim_type: ScimErrorType,
}

impl ValidationError {
    fn new(code: u16, message: String, context: Value, scim_type: ScimErrorType) -> Self {
        let context = match context {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            code,
            message,
            context,
            scim_type,
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn scim_type(&self) -> ScimErrorType {
        self.scim_type
    }

    pub fn bad_value_syntax() -> Self {
        Self::new(
            1,
            "bad value syntax".into(),
            json!({}),
            ScimErrorType::InvalidSyntax,
        )
    }

    pub fn bad_type(expected: &str) -> Self {
        Self::new(
            2,
            format!("bad type, expecting '{}'", expected),
            json!({ "expected": expected }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn bad_encoding(expected: &str) -> Self {
        Self::new(
            3,
            format!("bad encoding, expecting '{}'", expected),
            json!({ "expected": expected }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn bad_value_content() -> Self {
        Self::new(
            4,
            "bad value content".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn missing() -> Self {
        Self::new(5, "missing".into(), json!({}), ScimErrorType::InvalidValue)
    }

    pub fn must_not_be_provided() -> Self {
        Self::new(
            6,
            "must not be provided".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn must_not_be_returned() -> Self {
        Self::new(
            7,
            "must not be returned".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn must_be_one_of(expected_values: &[Value]) -> Self {
        let expected_values = Value::Array(expected_values.to_vec());
        Self::new(
            9,
            format!("must be one of: {}", expected_values),
            json!({ "expected_values": expected_values }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn duplicated_values() -> Self {
        Self::new(
            10,
            "contains duplicates, which are not allowed".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn missing_main_schema() -> Self {
        Self::new(
            12,
            "missing main schema".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn missing_schema_extension(extension: &str) -> Self {
        Self::new(
            13,
            format!("missing schema extension '{}'", extension),
            json!({ "extension": extension }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn unknown_schema() -> Self {
        Self::new(
            14,
            "unknown schema".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn multiple_primary_values() -> Self {
        Self::new(
            15,
            "'primary' attribute set to 'True' MUST appear no more than once".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn bad_scim_reference(allowed_resources: &[String]) -> Self {
        Self::new(
            16,
            format!(
                "bad SCIM reference, allowed resources: {}",
                allowed_resources.join(", ")
            ),
            json!({ "allowed_resources": allowed_resources }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn bad_attribute_name(attribute: &str) -> Self {
        Self::new(
            17,
            format!("bad attribute name '{}'", attribute),
            json!({ "attribute": attribute }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn resource_type_mismatch(resource_type: &str, provided: &str) -> Self {
        Self::new(
            18,
            format!(
                "resource type mismatch, expected '{}', got '{}'",
                resource_type, provided
            ),
            json!({ "resource_type": resource_type, "provided": provided }),
            ScimErrorType::InvalidValue,
        )
    }

    pub fn not_supported() -> Self {
        Self::new(
            31,
            "value or operation not supported".into(),
            json!({}),
            ScimErrorType::InvalidValue,
        )
    }
}

/// An advisory finding; warnings never block further evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    code: u16,
    message: String,
    context: Map<String, Value>,
}

impl ValidationWarning {
    fn new(code: u16, message: String, context: Value) -> Self {
        let context = match context {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            code,
            message,
            context,
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn should_be_one_of(expected_values: &[Value]) -> Self {
        let expected_values = Value::Array(expected_values.to_vec());
        Self::new(
            1,
            format!("value should be one of: {}", expected_values),
            json!({ "expected_values": expected_values }),
        )
    }

    pub fn multiple_type_value_pairs() -> Self {
        Self::new(
            2,
            "multi-valued complex attribute should contain a given type-value pair no more than once"
                .into(),
            json!({}),
        )
    }
}
