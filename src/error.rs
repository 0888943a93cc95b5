//! Error types for schema declaration and data addressing.
//!
//! These errors describe programmer mistakes: malformed attribute names,
//! unregistered schemas, duplicate registrations and the like. Problems with
//! instance data are never reported here; they are collected into
//! [`ValidationIssues`](crate::issues::ValidationIssues) instead.

/// Main error type for schema construction and container addressing.
///
/// This enum covers every hard failure the engine can raise. All of them are
/// detectable while a schema is being declared or while code addresses a
/// container with a path that cannot apply to it.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Attribute name does not match the attribute name grammar
    #[error("'{name}' is not a valid attribute name")]
    InvalidAttrName { name: String },

    /// Schema URI does not match the URI prefix grammar
    #[error("'{uri}' is not a valid schema URI")]
    InvalidSchemaUri { uri: String },

    /// Attribute path does not match `[schema:]attr[.subAttr]`
    #[error("'{path}' is not a valid attribute path")]
    InvalidAttrPath { path: String },

    /// Schema URI is well formed but was never registered
    #[error("Unknown schema: {uri}")]
    UnknownSchema { uri: String },

    /// Schema URI registered twice
    #[error("Schema '{uri}' is already registered")]
    DuplicateSchema { uri: String },

    /// Resource type registered twice
    #[error("Resource type '{name}' is already registered")]
    DuplicateResource { name: String },

    /// Extension attached twice to the same attribute collection
    #[error("Extension '{uri}' is already attached to '{schema}'")]
    DuplicateExtension { schema: String, uri: String },

    /// Sub-attribute requested on a non-complex attribute
    #[error("Attribute '{attribute}' is not complex")]
    NotComplex { attribute: String },

    /// Attribute rejected by the keep predicate passed to `clone`
    #[error("Attribute '{attribute}' does not match the filter")]
    FilteredOut { attribute: String },

    /// Container path points below a value that can not hold sub-attributes
    #[error("Can not assign sub-attribute '{sub_attr}' to '{attr}'")]
    IncompatibleTarget { attr: String, sub_attr: String },

    /// Two values of different kinds compared within the same sort
    #[error("Can not compare {left} with {right} while sorting")]
    SortTypeMismatch { left: String, right: String },
}

// Convenience methods for creating common errors
impl ScimError {
    /// Create an invalid attribute name error
    pub fn invalid_attr_name(name: impl Into<String>) -> Self {
        Self::InvalidAttrName { name: name.into() }
    }

    /// Create an invalid schema URI error
    pub fn invalid_schema_uri(uri: impl Into<String>) -> Self {
        Self::InvalidSchemaUri { uri: uri.into() }
    }

    /// Create an invalid attribute path error
    pub fn invalid_attr_path(path: impl Into<String>) -> Self {
        Self::InvalidAttrPath { path: path.into() }
    }

    /// Create an unknown schema error
    pub fn unknown_schema(uri: impl Into<String>) -> Self {
        Self::UnknownSchema { uri: uri.into() }
    }

    /// Create a not-complex error
    pub fn not_complex(attribute: impl Into<String>) -> Self {
        Self::NotComplex {
            attribute: attribute.into(),
        }
    }

    /// Create an incompatible target error
    pub fn incompatible_target(attr: impl Into<String>, sub_attr: impl Into<String>) -> Self {
        Self::IncompatibleTarget {
            attr: attr.into(),
            sub_attr: sub_attr.into(),
        }
    }
}

// Result type alias for convenience
pub type ScimResult<T> = Result<T, ScimError>;
