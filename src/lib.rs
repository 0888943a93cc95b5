//! Schema-driven validation and (de)serialization for SCIM 2.0 resources.
//!
//! Declare a resource's attributes once, then validate, normalize, serialize
//! and path-address arbitrary instance data against that declaration. Data
//! problems are collected into location-tagged [`ValidationIssues`] instead of
//! failing on the first one.
//!
//! # Core Components
//!
//! - [`SchemaRegistry`] - Known schema URIs and resource type endpoints
//! - [`ScimData`] - Case-insensitive, extension-aware data container
//! - [`Attribute`] - Attribute declaration with validation and (de)serialization
//! - [`BoundedAttrs`] - Attributes bound to a schema, with extensions
//! - [`ValidationIssues`] - Location-indexed errors and warnings
//! - [`ResourceSchema`] - Resource type declaration built on all of the above
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use scim_schema::{Attribute, AttributeKind, ResourceSchema, SchemaRegistry, ScimData};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(SchemaRegistry::new());
//! let user = ResourceSchema::builder("urn:ietf:params:scim:schemas:core:2.0:User", "User")
//!     .with_endpoint("/Users")
//!     .with_attributes([
//!         Attribute::builder("userName", AttributeKind::String)
//!             .with_required(true)
//!             .build()?,
//!         Attribute::builder("active", AttributeKind::Boolean).build()?,
//!     ])
//!     .build(registry)?;
//!
//! let payload = json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "userName": "bjensen",
//!     "active": "yes"
//! });
//! let mut data = ScimData::from(payload.as_object().cloned().unwrap_or_default());
//! let issues = user.validate(&mut data);
//!
//! assert!(issues.has_errors(&scim_schema::location!["active"]));
//! println!("{}", issues.to_rendered_tree(true, false));
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod data;
pub mod error;
pub mod issues;
pub mod path;
pub mod presence;
pub mod registry;
pub mod schema;
pub mod sorter;

// Re-export commonly used types for convenience
pub use attributes::{
    Attribute, AttributeBuilder, AttributeIssuer, AttributeKind, AttributeType, Attrs,
    BoundedAttrs, Mutability, ReferenceKind, Returned, Uniqueness,
};
pub use data::{DataKey, DataValue, ScimData};
pub use error::{ScimError, ScimResult};
pub use issues::{ValidationError, ValidationIssues, ValidationWarning};
pub use path::{AttrName, AttrPath, AttrRep, BoundedAttrRep, Location, SchemaUri, Segment};
pub use presence::{AttributePresenceChecker, Direction};
pub use registry::{ResourceType, SchemaRegistry};
pub use schema::{ResourceSchema, ResourceSchemaBuilder, SchemaExtension};
pub use sorter::Sorter;
