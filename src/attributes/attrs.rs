//! Attribute collections.
//!
//! [`Attrs`] is a plain, ordered collection of attribute declarations.
//! [`BoundedAttrs`] binds such a collection to a registered schema and carries
//! the extension collections attached to it.

use super::Attribute;
use crate::data::{DataValue, ScimData};
use crate::error::{ScimError, ScimResult};
use crate::path::{AttrName, AttrPath, AttrRep, BoundedAttrRep, SchemaUri};
use crate::registry::SchemaRegistry;

use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered collection of attributes with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    attrs: Vec<Attribute>,
}

impl Attrs {
    /// Collect attributes; a later attribute replaces an earlier one of the
    /// same name.
    pub fn new(attrs: impl IntoIterator<Item = Attribute>) -> Self {
        let mut collected: Vec<Attribute> = Vec::new();
        for attr in attrs {
            match collected.iter_mut().find(|existing| existing.name() == attr.name()) {
                Some(existing) => *existing = attr,
                None => collected.push(attr),
            }
        }
        Self { attrs: collected }
    }

    pub fn get(&self, name: &AttrName) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name() == name)
    }

    /// Look up an attribute by its textual name, ignoring case.
    pub fn get_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| *attr.name() == *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Copy the collection keeping only attributes satisfying `keep_if`,
    /// filtering complex sub-attributes the same way.
    pub fn clone_filtered(&self, keep_if: &dyn Fn(&Attribute) -> bool) -> Attrs {
        Attrs {
            attrs: self
                .attrs
                .iter()
                .filter_map(|attr| attr.clone_with(None, Some(keep_if)).ok())
                .collect(),
        }
    }

    pub(crate) fn map(&self, f: impl Fn(&Attribute) -> Attribute) -> Attrs {
        Attrs {
            attrs: self.attrs.iter().map(f).collect(),
        }
    }

    /// Rebuild a container keeping only declared attributes, each value passed
    /// through `transform`.
    pub(crate) fn transform(
        &self,
        data: &ScimData,
        transform: fn(&Attribute, DataValue) -> DataValue,
    ) -> ScimData {
        let mut output = ScimData::new();
        for attr in &self.attrs {
            let value = data.get(attr.name());
            if value.is_missing() {
                continue;
            }
            output.insert(attr.name(), transform(attr, value));
        }
        output
    }
}

impl FromIterator<Attribute> for Attrs {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Attrs {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

/// Attributes bound to a registered schema, plus attached extensions.
///
/// Every attribute (and every sub-attribute of a complex attribute) carries a
/// schema-bound path, so values and issues of extension attributes are
/// located under the extension URI.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use scim_schema::SchemaRegistry;
/// use scim_schema::attributes::{Attribute, AttributeKind, Attrs, BoundedAttrs};
/// use scim_schema::path::AttrPath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Arc::new(SchemaRegistry::new());
/// registry.register_schema("urn:example:User", false)?;
/// registry.register_schema("urn:example:Enterprise", true)?;
///
/// let mut attrs = BoundedAttrs::new(
///     "urn:example:User",
///     [Attribute::builder("userName", AttributeKind::String).build()?],
///     &[],
///     registry.clone(),
/// )?;
/// attrs.extend(
///     Attrs::new([Attribute::builder("employeeNumber", AttributeKind::String).build()?]),
///     "urn:example:Enterprise",
///     false,
/// )?;
///
/// let path = AttrPath::parse("urn:example:Enterprise:employeeNumber", &registry)?;
/// assert!(attrs.get(&path)?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BoundedAttrs {
    schema: SchemaUri,
    extension: bool,
    required: bool,
    raw: Vec<Attribute>,
    attrs: Vec<Attribute>,
    common: HashSet<String>,
    extensions: Vec<BoundedAttrs>,
    registry: Arc<SchemaRegistry>,
}

impl BoundedAttrs {
    /// Bind `attrs` to `schema`, which must already be registered.
    ///
    /// Attributes named in `common` are schema-independent (e.g. `id`) and are
    /// excluded from [`core_attrs`](Self::core_attrs).
    pub fn new(
        schema: &str,
        attrs: impl IntoIterator<Item = Attribute>,
        common: &[&str],
        registry: Arc<SchemaRegistry>,
    ) -> ScimResult<Self> {
        let (schema, extension) = registry
            .find_schema(schema)
            .ok_or_else(|| ScimError::unknown_schema(schema))?;
        let raw: Vec<Attribute> = Attrs::new(attrs).attrs;
        let attrs = bind(&raw, &schema, &registry)?;
        Ok(Self {
            schema,
            extension,
            required: false,
            raw,
            attrs,
            common: common.iter().map(|name| name.to_lowercase()).collect(),
            extensions: Vec::new(),
            registry,
        })
    }

    pub fn schema(&self) -> &SchemaUri {
        &self.schema
    }

    pub fn is_extension(&self) -> bool {
        self.extension
    }

    /// Whether this extension was attached as required.
    pub fn required(&self) -> bool {
        self.required
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Iterate over own attributes followed by those of every extension.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs
            .iter()
            .chain(self.extensions.iter().flat_map(|extension| extension.attrs.iter()))
    }

    /// Get own attributes that are not common to every schema.
    pub fn core_attrs(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs
            .iter()
            .filter(|attr| !self.common.contains(attr.name().folded()))
    }

    /// Get own attributes that are common to every schema.
    pub fn common_attrs(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs
            .iter()
            .filter(|attr| self.common.contains(attr.name().folded()))
    }

    pub fn extensions(&self) -> &[BoundedAttrs] {
        &self.extensions
    }

    pub fn extension(&self, schema: &SchemaUri) -> Option<&BoundedAttrs> {
        self.extensions
            .iter()
            .find(|extension| extension.schema == *schema)
    }

    /// Look up an attribute or sub-attribute by path.
    ///
    /// A path qualified with an extension URI is resolved within that
    /// extension; a path qualified with any other foreign schema resolves to
    /// nothing. An unqualified path searches own attributes first, then the
    /// extensions. Fails with `NotComplex` when a sub-attribute of a
    /// non-complex attribute is requested.
    pub fn get(&self, path: &AttrPath) -> ScimResult<Option<&Attribute>> {
        let top_level = match path {
            AttrPath::Bound(bounded) => {
                if let Some(extension) = self.extension(bounded.schema()) {
                    return extension.get(path);
                }
                if *bounded.schema() != self.schema {
                    return Ok(None);
                }
                self.attrs.iter().find(|attr| attr.name() == bounded.attr())
            }
            AttrPath::Unbound(rep) => self
                .iter()
                .find(|attr| attr.name() == rep.attr()),
        };

        let Some(attr) = top_level else {
            return Ok(None);
        };
        let Some(sub_attr) = path.sub_attr() else {
            return Ok(Some(attr));
        };
        let sub_attrs = attr
            .sub_attributes()
            .ok_or_else(|| ScimError::not_complex(attr.path().to_string()))?;
        Ok(sub_attrs.get(sub_attr))
    }

    /// Look up by a textual path, e.g. `name.givenName`.
    pub fn get_by_name(&self, path: &str) -> ScimResult<Option<&Attribute>> {
        self.get(&AttrPath::parse(path, &self.registry)?)
    }

    /// Attach an extension collection under the registered `schema`.
    ///
    /// Fails with `DuplicateExtension` when the schema is already attached.
    pub fn extend(&mut self, attrs: Attrs, schema: &str, required: bool) -> ScimResult<()> {
        let (uri, _) = self
            .registry
            .find_schema(schema)
            .ok_or_else(|| ScimError::unknown_schema(schema))?;
        if uri == self.schema || self.extension(&uri).is_some() {
            return Err(ScimError::DuplicateExtension {
                schema: self.schema.to_string(),
                uri: uri.to_string(),
            });
        }
        let mut extension = BoundedAttrs::new(uri.as_str(), attrs.attrs, &[], self.registry.clone())?;
        extension.required = required;
        debug!(
            "Attached extension '{}' to '{}' (required: {})",
            uri, self.schema, required
        );
        self.extensions.push(extension);
        Ok(())
    }

    /// Copy keeping only attributes satisfying `keep_if`, recursively in
    /// every extension.
    pub fn clone_filtered(&self, keep_if: &dyn Fn(&Attribute) -> bool) -> ScimResult<BoundedAttrs> {
        let raw: Vec<Attribute> = self
            .raw
            .iter()
            .filter_map(|attr| attr.clone_with(None, Some(keep_if)).ok())
            .collect();
        let attrs = bind(&raw, &self.schema, &self.registry)?;
        let extensions = self
            .extensions
            .iter()
            .map(|extension| extension.clone_filtered(keep_if))
            .collect::<ScimResult<Vec<_>>>()?;
        Ok(BoundedAttrs {
            schema: self.schema.clone(),
            extension: self.extension,
            required: self.required,
            raw,
            attrs,
            common: self.common.clone(),
            extensions,
            registry: self.registry.clone(),
        })
    }
}

fn bind(raw: &[Attribute], schema: &SchemaUri, registry: &SchemaRegistry) -> ScimResult<Vec<Attribute>> {
    raw.iter()
        .map(|attr| {
            let rep = AttrRep::new(attr.name().clone(), None);
            Ok(attr.bound_to(BoundedAttrRep::new(schema.clone(), rep, registry)?))
        })
        .collect()
}
