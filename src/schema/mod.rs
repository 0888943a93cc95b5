//! Resource schemas and schema extensions.
//!
//! A [`ResourceSchema`] combines the common attributes every resource carries
//! (`schemas`, `id`, `externalId`, `meta`) with the attributes of one resource
//! type, and registers the resource type and its endpoint so SCIM references
//! can be resolved. [`SchemaExtension`]s attach further attributes under their
//! own schema URI.
//!
//! # Key Types
//!
//! - [`ResourceSchema`] - Resource type declaration with validation and (de)serialization
//! - [`SchemaExtension`] - Attribute namespace attachable to a resource schema
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use scim_schema::SchemaRegistry;
//! use scim_schema::attributes::{Attribute, AttributeKind};
//! use scim_schema::data::ScimData;
//! use scim_schema::schema::ResourceSchema;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(SchemaRegistry::new());
//! let user = ResourceSchema::builder("urn:example:User", "User")
//!     .with_endpoint("/Users")
//!     .with_attributes([Attribute::builder("userName", AttributeKind::String)
//!         .with_required(true)
//!         .build()?])
//!     .build(registry)?;
//!
//! let mut data = ScimData::from(
//!     json!({"schemas": ["urn:example:User"], "active": true})
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default(),
//! );
//! let issues = user.validate(&mut data);
//! assert!(issues.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod common;

pub use common::COMMON_ATTRIBUTES;

use crate::attributes::{Attribute, Attrs, BoundedAttrs};
use crate::data::{DataValue, ScimData};
use crate::error::{ScimError, ScimResult};
use crate::issues::{ValidationError, ValidationIssues};
use crate::path::{AttrPath, AttrRep, SchemaUri};
use crate::registry::SchemaRegistry;

use log::{debug, warn};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;

/// Schema URI of the RFC 7643 resource type representation.
pub const RESOURCE_TYPE_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";

/// Attributes attachable to a resource schema under their own URI.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaExtension {
    schema: SchemaUri,
    name: String,
    description: String,
    attrs: Attrs,
}

impl SchemaExtension {
    /// Declare an extension, registering `schema` as an extension URI.
    pub fn new(
        schema: &str,
        name: impl Into<String>,
        attrs: impl IntoIterator<Item = Attribute>,
        registry: &SchemaRegistry,
    ) -> ScimResult<Self> {
        let schema = registry.register_schema(schema, true)?;
        Ok(Self {
            schema,
            name: name.into(),
            description: String::new(),
            attrs: Attrs::new(attrs),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn schema(&self) -> &SchemaUri {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Render the RFC 7643 schema representation.
    pub fn to_schema_value(&self) -> Value {
        json!({
            "id": self.schema.as_str(),
            "name": self.name,
            "description": self.description,
            "attributes": self.attrs.iter().map(Attribute::to_schema_value).collect::<Vec<_>>(),
        })
    }
}

/// Declaration of a resource type.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    schema: SchemaUri,
    name: String,
    endpoint: String,
    description: String,
    attrs: BoundedAttrs,
    extensions: Vec<(SchemaExtension, bool)>,
    resource_type: AttrRep,
}

impl ResourceSchema {
    /// Start declaring the resource type `name` under the main `schema`.
    pub fn builder(schema: impl Into<String>, name: impl Into<String>) -> ResourceSchemaBuilder {
        ResourceSchemaBuilder {
            schema: schema.into(),
            name: name.into(),
            endpoint: None,
            description: String::new(),
            attrs: Vec::new(),
        }
    }

    pub fn schema(&self) -> &SchemaUri {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the bound attributes, including common and extension attributes.
    pub fn attrs(&self) -> &BoundedAttrs {
        &self.attrs
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        self.attrs.registry()
    }

    /// Get the main schema followed by every attached extension schema.
    pub fn schemas(&self) -> Vec<&SchemaUri> {
        std::iter::once(&self.schema)
            .chain(self.extensions.iter().map(|(extension, _)| extension.schema()))
            .collect()
    }

    /// Iterate over attached extensions with their "required" flag.
    pub fn extensions(&self) -> impl Iterator<Item = (&SchemaExtension, bool)> {
        self.extensions
            .iter()
            .map(|(extension, required)| (extension, *required))
    }

    /// Look up an attached extension by name, ignoring case.
    pub fn get_extension(&self, name: &str) -> Option<&SchemaExtension> {
        self.extensions
            .iter()
            .map(|(extension, _)| extension)
            .find(|extension| extension.name.eq_ignore_ascii_case(name))
    }

    /// Attach `extension`; fails with `DuplicateExtension` when its schema or
    /// name is already in use.
    pub fn add_extension(&mut self, extension: SchemaExtension, required: bool) -> ScimResult<()> {
        if self.get_extension(&extension.name).is_some() {
            warn!(
                "Extension named '{}' already attached to '{}'",
                extension.name, self.name
            );
            return Err(ScimError::DuplicateExtension {
                schema: self.schema.to_string(),
                uri: extension.schema.to_string(),
            });
        }
        self.attrs
            .extend(extension.attrs.clone(), extension.schema.as_str(), required)?;
        self.extensions.push((extension, required));
        Ok(())
    }

    /// Validate `data` against every bound attribute.
    ///
    /// Values rejected during validation are replaced with
    /// [`DataValue::Invalid`] in `data`. Attribute issues are located at the
    /// attribute's path, extension attributes under the extension URI.
    pub fn validate(&self, data: &mut ScimData) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        for attr in self.attrs.iter() {
            let path = attr.path();
            let mut value = data.get(path);
            if value.is_missing() {
                continue;
            }
            let attr_issues = attr.validate(&mut value);
            if !attr_issues.can_proceed(&[]) {
                value = DataValue::Invalid;
            }
            if attr_issues.has_errors(&[]) {
                if let Some(slot) = value_mut(data, path) {
                    *slot = value;
                }
            }
            issues.merge(attr_issues, &path.location());
        }

        let location = crate::location!["schemas"];
        if issues.can_proceed(&location) {
            let listed = data.get("schemas");
            if listed.is_truthy() {
                issues.merge(self.validate_schemas_field(data, &listed), &location);
            }
        }

        if issues.can_proceed(&[]) {
            if let Some(provided) = data.get(&self.resource_type).as_str() {
                if provided != self.name {
                    issues.add_error(
                        ValidationError::resource_type_mismatch(&self.name, provided),
                        true,
                        &crate::location!["meta", "resourceType"],
                    );
                }
            }
        }
        issues
    }

    fn validate_schemas_field(&self, data: &ScimData, listed: &DataValue) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        let listed: Vec<String> = listed
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(DataValue::as_str)
            .map(str::to_lowercase)
            .collect();
        if listed.iter().collect::<HashSet<_>>().len() < listed.len() {
            issues.add_error(ValidationError::duplicated_values(), true, &[]);
        }

        let main = self.schema.folded();
        let extensions: Vec<&str> = self
            .extensions
            .iter()
            .map(|(extension, _)| extension.schema.folded())
            .collect();

        if listed
            .iter()
            .any(|schema| schema != main && !extensions.contains(&schema.as_str()))
        {
            issues.add_error(ValidationError::unknown_schema(), true, &[]);
        }
        if !listed.iter().any(|schema| schema == main) {
            issues.add_error(ValidationError::missing_main_schema(), true, &[]);
        }
        for key in data.keys() {
            let folded = key.to_lowercase();
            if extensions.contains(&folded.as_str()) && !listed.contains(&folded) {
                issues.add_error(ValidationError::missing_schema_extension(key), true, &[]);
            }
        }
        issues
    }

    /// Build a fresh container holding the serialized values of known
    /// attributes only.
    pub fn serialize(&self, data: &ScimData) -> ScimResult<ScimData> {
        self.transform(data, Attribute::serialize)
    }

    /// Build a fresh container holding the deserialized values of known
    /// attributes only.
    pub fn deserialize(&self, data: &ScimData) -> ScimResult<ScimData> {
        self.transform(data, Attribute::deserialize)
    }

    fn transform(
        &self,
        data: &ScimData,
        transform: fn(&Attribute, DataValue) -> DataValue,
    ) -> ScimResult<ScimData> {
        let mut output = ScimData::new();
        for attr in self.attrs.iter() {
            let value = data.get(attr.path());
            if !value.is_missing() {
                output.set(attr.path(), transform(attr, value))?;
            }
        }
        Ok(output)
    }

    /// Render the RFC 7643 schema representation of the main schema.
    pub fn to_schema_value(&self) -> Value {
        json!({
            "id": self.schema.as_str(),
            "name": self.name,
            "description": self.description,
            "attributes": self.attrs.core_attrs().map(Attribute::to_schema_value).collect::<Vec<_>>(),
        })
    }

    /// Render the RFC 7643 resource type representation.
    pub fn to_resource_type_value(&self) -> Value {
        json!({
            "schemas": [RESOURCE_TYPE_SCHEMA],
            "id": self.name,
            "name": self.name,
            "endpoint": self.endpoint,
            "description": self.description,
            "schema": self.schema.as_str(),
            "schemaExtensions": self
                .extensions
                .iter()
                .map(|(extension, required)| json!({
                    "schema": extension.schema.as_str(),
                    "required": required,
                }))
                .collect::<Vec<_>>(),
        })
    }
}

/// Get the stored value of a top-level attribute without reordering keys.
fn value_mut<'a>(data: &'a mut ScimData, path: &AttrPath) -> Option<&'a mut DataValue> {
    match path.schema().filter(|_| path.is_extension()) {
        Some(schema) => data
            .get_mut(schema.as_str())
            .and_then(DataValue::as_data_mut)
            .and_then(|namespace| namespace.get_mut(path.attr().as_str())),
        None => data.get_mut(path.attr().as_str()),
    }
}

/// Fluent builder for [`ResourceSchema`].
pub struct ResourceSchemaBuilder {
    schema: String,
    name: String,
    endpoint: Option<String>,
    description: String,
    attrs: Vec<Attribute>,
}

impl ResourceSchemaBuilder {
    /// Endpoint serving the resources, `/{name}` by default.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attributes(mut self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Bind the common and declared attributes to the schema URI, then
    /// register the resource type.
    ///
    /// Nothing stays registered when any step fails.
    pub fn build(self, registry: Arc<SchemaRegistry>) -> ScimResult<ResourceSchema> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| format!("/{}", self.name));
        if registry.resource_endpoint(&self.name).is_some() {
            return Err(ScimError::DuplicateResource { name: self.name });
        }
        let resource_type = AttrRep::from_names("meta", Some("resourceType"))?;
        let attrs = common::common_attributes()?
            .into_iter()
            .chain(self.attrs);

        // attributes bind to registered schemas only
        let schema = registry.register_schema(&self.schema, false)?;
        let bound = BoundedAttrs::new(schema.as_str(), attrs, &COMMON_ATTRIBUTES, registry.clone())
            .and_then(|attrs| {
                registry.register_resource(&self.name, &endpoint)?;
                Ok(attrs)
            });
        let attrs = match bound {
            Ok(attrs) => attrs,
            Err(error) => {
                warn!("Declaring resource type '{}' failed: {}", self.name, error);
                registry.unregister_schema(&schema);
                return Err(error);
            }
        };
        debug!(
            "Declared resource type '{}' with {} attributes",
            self.name,
            attrs.iter().count()
        );

        Ok(ResourceSchema {
            schema,
            name: self.name,
            endpoint,
            description: self.description,
            attrs,
            extensions: Vec::new(),
            resource_type,
        })
    }
}
