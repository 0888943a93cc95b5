//! Registry of known schema URIs and resource type endpoints.
//!
//! The registry is the only process-wide lookup table the engine needs. It is
//! populated once while schemas are declared and read by every component that
//! resolves schema-qualified paths or SCIM references. Registration takes a
//! shared reference so that a registry can be wrapped in an `Arc` before all
//! resource types are declared; the internal locks are read-mostly.

use crate::error::{ScimError, ScimResult};
use crate::path::SchemaUri;

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A resource type known to the registry, used to resolve SCIM references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    /// Resource type name, e.g. `User`
    pub name: String,
    /// Endpoint the resources are served from, e.g. `/Users`
    pub endpoint: String,
}

/// Registry for schema URIs and resource types.
///
/// Each schema URI carries an "is extension" flag that determines how
/// schema-bound attribute paths are located inside data containers.
///
/// # Examples
///
/// ```rust
/// use scim_schema::SchemaRegistry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SchemaRegistry::new();
/// let user = registry.register_schema("urn:ietf:params:scim:schemas:core:2.0:User", false)?;
/// assert_eq!(registry.is_extension(&user), Some(false));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<SchemaUri, bool>>,
    resources: RwLock<Vec<ResourceType>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema URI, flagging whether it names an extension.
    pub fn register_schema(&self, uri: &str, extension: bool) -> ScimResult<SchemaUri> {
        let uri = SchemaUri::new(uri)?;
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        if schemas.contains_key(&uri) {
            warn!("Schema '{}' registered more than once", uri);
            return Err(ScimError::DuplicateSchema {
                uri: uri.to_string(),
            });
        }
        debug!("Registering schema '{}' (extension: {})", uri, extension);
        schemas.insert(uri.clone(), extension);
        Ok(uri)
    }

    /// Drop a schema whose declaration failed after it was registered.
    pub(crate) fn unregister_schema(&self, uri: &SchemaUri) {
        debug!("Unregistering schema '{}'", uri);
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri);
    }

    /// Get the extension flag of a registered schema, `None` if unregistered.
    pub fn is_extension(&self, uri: &SchemaUri) -> Option<bool> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .copied()
    }

    /// Check whether a schema URI is registered.
    pub fn contains_schema(&self, uri: &SchemaUri) -> bool {
        self.is_extension(uri).is_some()
    }

    /// Look up a registered schema by its textual form, case-insensitively.
    ///
    /// Returns the registered URI (with its registered casing) and its
    /// extension flag.
    pub fn find_schema(&self, value: &str) -> Option<(SchemaUri, bool)> {
        let uri = SchemaUri::new(value).ok()?;
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_key_value(&uri)
            .map(|(uri, extension)| (uri.clone(), *extension))
    }

    /// Get all registered schemas.
    pub fn schemas(&self) -> Vec<(SchemaUri, bool)> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(uri, extension)| (uri.clone(), *extension))
            .collect()
    }

    /// Register a resource type together with the endpoint serving it.
    pub fn register_resource(
        &self,
        name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> ScimResult<()> {
        let name = name.into();
        let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
        if resources.iter().any(|resource| resource.name == name) {
            warn!("Resource type '{}' registered more than once", name);
            return Err(ScimError::DuplicateResource { name });
        }
        let endpoint = endpoint.into();
        debug!("Registering resource type '{}' at '{}'", name, endpoint);
        resources.push(ResourceType { name, endpoint });
        Ok(())
    }

    /// Get the endpoint of a registered resource type.
    pub fn resource_endpoint(&self, name: &str) -> Option<String> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|resource| resource.name == name)
            .map(|resource| resource.endpoint.clone())
    }

    /// Get all registered resource types in registration order.
    pub fn resources(&self) -> Vec<ResourceType> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
