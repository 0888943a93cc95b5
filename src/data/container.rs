//! Case-insensitive, extension-aware data container.

use super::value::DataValue;
use crate::error::{ScimError, ScimResult};
use crate::path::{AttrName, AttrPath, AttrRep, BoundedAttrRep, SchemaUri};
use crate::registry::SchemaRegistry;

use log::trace;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Borrowed address of a value inside a [`ScimData`] container.
///
/// Any name, path or schema URI converts into a key; bound paths whose schema
/// is an extension address the extension's own namespace container.
///
/// Plain strings become [`DataKey::Path`]. A string matching a stored key is
/// that key; otherwise `attr.subAttr` addresses a sub-attribute and
/// `schema:attr[.subAttr]` addresses an attribute inside the namespace
/// container already stored under `schema`. Telling core schema URIs from
/// extension URIs needs the registry, see [`ScimData::set_path`].
#[derive(Debug, Clone, Copy)]
pub enum DataKey<'a> {
    /// Raw top-level key, matched case-insensitively.
    Key(&'a str),
    /// Textual path, resolved against the container's contents.
    Path(&'a str),
    /// Extension namespace container.
    Schema(&'a SchemaUri),
    Attr {
        attr: &'a AttrName,
        sub_attr: Option<&'a AttrName>,
    },
    Extension {
        schema: &'a SchemaUri,
        attr: &'a AttrName,
        sub_attr: Option<&'a AttrName>,
    },
}

impl<'a> From<&'a str> for DataKey<'a> {
    fn from(value: &'a str) -> Self {
        DataKey::Path(value)
    }
}

impl<'a> From<&'a String> for DataKey<'a> {
    fn from(value: &'a String) -> Self {
        DataKey::Path(value)
    }
}

/// Address of a parsed textual path, optionally inside a namespace.
fn path_key<'p>(schema: Option<&'p SchemaUri>, rep: &'p AttrRep) -> DataKey<'p> {
    match schema {
        Some(schema) => DataKey::Extension {
            schema,
            attr: rep.attr(),
            sub_attr: rep.sub_attr(),
        },
        None => DataKey::from(rep),
    }
}

impl<'a> From<&'a SchemaUri> for DataKey<'a> {
    fn from(value: &'a SchemaUri) -> Self {
        DataKey::Schema(value)
    }
}

impl<'a> From<&'a AttrName> for DataKey<'a> {
    fn from(value: &'a AttrName) -> Self {
        DataKey::Attr {
            attr: value,
            sub_attr: None,
        }
    }
}

impl<'a> From<&'a AttrRep> for DataKey<'a> {
    fn from(value: &'a AttrRep) -> Self {
        DataKey::Attr {
            attr: value.attr(),
            sub_attr: value.sub_attr(),
        }
    }
}

impl<'a> From<&'a BoundedAttrRep> for DataKey<'a> {
    fn from(value: &'a BoundedAttrRep) -> Self {
        if value.extension() {
            DataKey::Extension {
                schema: value.schema(),
                attr: value.attr(),
                sub_attr: value.sub_attr(),
            }
        } else {
            DataKey::from(value.rep())
        }
    }
}

impl<'a> From<&'a AttrPath> for DataKey<'a> {
    fn from(value: &'a AttrPath) -> Self {
        match value {
            AttrPath::Unbound(rep) => DataKey::from(rep),
            AttrPath::Bound(bounded) => DataKey::from(bounded),
        }
    }
}

/// Insertion-ordered mapping with case-insensitive keys.
///
/// Keys keep the casing they were last written with. Values written under an
/// extension path live in a nested container stored under the literal schema
/// URI, so they never collide with top-level attributes of the same name.
///
/// ```rust
/// use scim_schema::data::{DataValue, ScimData};
/// use scim_schema::path::AttrRep;
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut data = ScimData::new();
/// let given_name = AttrRep::from_names("name", Some("givenName"))?;
/// data.set(&given_name, "Ada")?;
///
/// assert_eq!(data.get("NAME").to_plain(), json!({"givenName": "Ada"}));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScimData {
    entries: Vec<(String, DataValue)>,
    index: HashMap<String, usize>,
}

impl ScimData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a plain JSON object. Never fails; odd shapes surface later
    /// as validation issues.
    pub fn from_mapping(map: Map<String, Value>) -> Self {
        let mut data = Self::new();
        for (key, value) in map {
            data.insert_raw(key, DataValue::from(value));
        }
        data
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys in insertion order, with their stored casing.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(&key.to_lowercase()).copied()
    }

    fn raw(&self, key: &str) -> Option<&DataValue> {
        self.position(key).map(|position| &self.entries[position].1)
    }

    fn raw_mut(&mut self, key: &str) -> Option<&mut DataValue> {
        self.position(key)
            .map(move |position| &mut self.entries[position].1)
    }

    fn remove_raw(&mut self, key: &str) -> Option<DataValue> {
        let position = self.index.remove(&key.to_lowercase())?;
        let (_, value) = self.entries.remove(position);
        for (_, index) in self.index.iter_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        Some(value)
    }

    /// Insert under `key`, replacing (and moving to the end) any entry whose
    /// key differs only by case.
    fn insert_raw(&mut self, key: String, value: DataValue) {
        self.remove_raw(&key);
        self.index.insert(key.to_lowercase(), self.entries.len());
        self.entries.push((key, value));
    }

    /// Insert a top-level attribute value.
    pub(crate) fn insert(&mut self, name: &AttrName, value: DataValue) {
        self.insert_raw(name.to_string(), value);
    }

    /// Get the namespace container for `schema`, creating it if absent.
    fn namespace_mut(&mut self, schema: &SchemaUri, attr: &AttrName) -> ScimResult<&mut ScimData> {
        if self.position(schema.as_str()).is_none() {
            trace!("Creating namespace container for '{}'", schema);
            self.insert_raw(schema.to_string(), DataValue::Data(ScimData::new()));
        }
        self.raw_mut(schema.as_str())
            .and_then(DataValue::as_data_mut)
            .ok_or_else(|| ScimError::incompatible_target(schema.as_str(), attr.as_str()))
    }

    /// Parse a textual key that is not stored as-is.
    ///
    /// Returns `None` when the key is stored, does not parse, or names a
    /// schema whose namespace container is absent; such keys are used raw.
    fn resolve(&self, key: &str) -> Option<(Option<SchemaUri>, AttrRep)> {
        if self.position(key).is_some() {
            return None;
        }
        match AttrPath::split(key).ok()? {
            (None, rep) => Some((None, rep)),
            (Some(schema), rep) => match self.raw(schema.as_str()) {
                Some(DataValue::Data(_)) => Some((Some(schema), rep)),
                _ => None,
            },
        }
    }

    /// Get a top-level value for in-place modification.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut DataValue> {
        self.raw_mut(key)
    }

    /// Get the value addressed by `key`, or `Missing`.
    ///
    /// A sub-attribute of a multi-valued parent resolves to a parallel list
    /// holding `Missing` for elements that are not containers.
    pub fn get<'k>(&self, key: impl Into<DataKey<'k>>) -> DataValue {
        match key.into() {
            DataKey::Key(key) => self.raw(key).cloned().unwrap_or_default(),
            DataKey::Path(path) => match self.resolve(path) {
                Some((schema, rep)) => self.get(path_key(schema.as_ref(), &rep)),
                None => self.raw(path).cloned().unwrap_or_default(),
            },
            DataKey::Schema(schema) => self.raw(schema.as_str()).cloned().unwrap_or_default(),
            DataKey::Attr { attr, sub_attr } => {
                let Some(value) = self.raw(attr.as_str()) else {
                    return DataValue::Missing;
                };
                let Some(sub_attr) = sub_attr else {
                    return value.clone();
                };
                match value {
                    DataValue::Data(data) => data.get(sub_attr),
                    DataValue::List(items) => DataValue::List(
                        items
                            .iter()
                            .map(|item| match item {
                                DataValue::Data(data) => data.get(sub_attr),
                                _ => DataValue::Missing,
                            })
                            .collect(),
                    ),
                    _ => DataValue::Missing,
                }
            }
            DataKey::Extension {
                schema,
                attr,
                sub_attr,
            } => match self.raw(schema.as_str()) {
                Some(DataValue::Data(data)) => data.get(DataKey::Attr { attr, sub_attr }),
                _ => DataValue::Missing,
            },
        }
    }

    /// Write `value` at `key`.
    ///
    /// Writing a sub-attribute creates the parent container when it does not
    /// exist. A list value written below a multi-valued parent is distributed
    /// element-wise. Fails with `IncompatibleTarget` when the parent holds a
    /// value that can not carry sub-attributes.
    pub fn set<'k>(&mut self, key: impl Into<DataKey<'k>>, value: impl Into<DataValue>) -> ScimResult<()> {
        let value = value.into();
        match key.into() {
            DataKey::Key(key) => {
                self.insert_raw(key.to_string(), value);
                Ok(())
            }
            DataKey::Path(path) => match self.resolve(path) {
                Some((schema, rep)) => self.set(path_key(schema.as_ref(), &rep), value),
                None => {
                    self.insert_raw(path.to_string(), value);
                    Ok(())
                }
            },
            DataKey::Schema(schema) => {
                match self.raw_mut(schema.as_str()) {
                    Some(existing) => *existing = value,
                    None => self.insert_raw(schema.to_string(), value),
                }
                Ok(())
            }
            DataKey::Attr {
                attr,
                sub_attr: None,
            } => {
                self.insert_raw(attr.to_string(), value);
                Ok(())
            }
            DataKey::Attr {
                attr,
                sub_attr: Some(sub_attr),
            } => {
                if self.position(attr.as_str()).is_none() {
                    self.insert_raw(attr.to_string(), DataValue::Data(ScimData::new()));
                }
                let parent = self
                    .raw_mut(attr.as_str())
                    .ok_or_else(|| ScimError::incompatible_target(attr.as_str(), sub_attr.as_str()))?;
                match (parent, value) {
                    (DataValue::Data(data), value) => {
                        data.insert_raw(sub_attr.to_string(), value);
                        Ok(())
                    }
                    (DataValue::List(items), DataValue::List(values)) => {
                        distribute(items, sub_attr, values);
                        Ok(())
                    }
                    _ => Err(ScimError::incompatible_target(attr.as_str(), sub_attr.as_str())),
                }
            }
            DataKey::Extension {
                schema,
                attr,
                sub_attr,
            } => self
                .namespace_mut(schema, attr)?
                .set(DataKey::Attr { attr, sub_attr }, value),
        }
    }

    /// Like [`set`](Self::set), but a list value written to a sub-attribute
    /// whose parent is absent creates one container per element.
    ///
    /// `Missing` elements are skipped, leaving the matching container (if any)
    /// untouched.
    pub fn set_expanded<'k>(
        &mut self,
        key: impl Into<DataKey<'k>>,
        value: impl Into<DataValue>,
    ) -> ScimResult<()> {
        let key = key.into();
        let value = value.into();
        match (key, value) {
            (
                DataKey::Attr {
                    attr,
                    sub_attr: Some(sub_attr),
                },
                DataValue::List(values),
            ) => {
                if self.position(attr.as_str()).is_none() {
                    self.insert_raw(attr.to_string(), DataValue::List(Vec::new()));
                }
                match self.raw_mut(attr.as_str()) {
                    Some(DataValue::List(items)) => {
                        distribute(items, sub_attr, values);
                        Ok(())
                    }
                    Some(DataValue::Data(data)) => {
                        data.insert_raw(sub_attr.to_string(), DataValue::List(values));
                        Ok(())
                    }
                    _ => Err(ScimError::incompatible_target(attr.as_str(), sub_attr.as_str())),
                }
            }
            (
                DataKey::Extension {
                    schema,
                    attr,
                    sub_attr,
                },
                value,
            ) => self
                .namespace_mut(schema, attr)?
                .set_expanded(DataKey::Attr { attr, sub_attr }, value),
            (DataKey::Path(path), value) => match self.resolve(path) {
                Some((schema, rep)) => self.set_expanded(path_key(schema.as_ref(), &rep), value),
                None => self.set(DataKey::Key(path), value),
            },
            (key, value) => self.set(key, value),
        }
    }

    /// Remove and return the value addressed by `key`, or `Missing`.
    ///
    /// Popping an extension attribute leaves the namespace container in place.
    pub fn pop<'k>(&mut self, key: impl Into<DataKey<'k>>) -> DataValue {
        match key.into() {
            DataKey::Key(key) => self.remove_raw(key).unwrap_or_default(),
            DataKey::Path(path) => match self.resolve(path) {
                Some((schema, rep)) => self.pop(path_key(schema.as_ref(), &rep)),
                None => self.remove_raw(path).unwrap_or_default(),
            },
            DataKey::Schema(schema) => self.remove_raw(schema.as_str()).unwrap_or_default(),
            DataKey::Attr {
                attr,
                sub_attr: None,
            } => self.remove_raw(attr.as_str()).unwrap_or_default(),
            DataKey::Attr {
                attr,
                sub_attr: Some(sub_attr),
            } => match self.raw_mut(attr.as_str()) {
                Some(DataValue::Data(data)) => data.remove_raw(sub_attr.as_str()).unwrap_or_default(),
                Some(DataValue::List(items)) => DataValue::List(
                    items
                        .iter_mut()
                        .map(|item| match item {
                            DataValue::Data(data) => {
                                data.remove_raw(sub_attr.as_str()).unwrap_or_default()
                            }
                            _ => DataValue::Missing,
                        })
                        .collect(),
                ),
                _ => DataValue::Missing,
            },
            DataKey::Extension {
                schema,
                attr,
                sub_attr,
            } => match self.raw_mut(schema.as_str()) {
                Some(DataValue::Data(data)) => data.pop(DataKey::Attr { attr, sub_attr }),
                _ => DataValue::Missing,
            },
        }
    }

    /// Get the value at a textual path resolved through `registry`.
    ///
    /// A registered schema URI addresses its namespace container; anything
    /// else must parse as `[schema:]attr[.subAttr]` with a registered schema.
    pub fn get_path(&self, path: &str, registry: &SchemaRegistry) -> ScimResult<DataValue> {
        if let Some((schema, _)) = registry.find_schema(path) {
            return Ok(self.get(&schema));
        }
        Ok(self.get(&AttrPath::parse(path, registry)?))
    }

    /// Write `value` at a textual path resolved through `registry`.
    ///
    /// Unlike [`set`](Self::set) with a plain string, an extension-qualified
    /// path creates the namespace container when it is absent, and a
    /// core-qualified path writes a top-level attribute.
    pub fn set_path(
        &mut self,
        path: &str,
        value: impl Into<DataValue>,
        registry: &SchemaRegistry,
    ) -> ScimResult<()> {
        if let Some((schema, _)) = registry.find_schema(path) {
            return self.set(&schema, value);
        }
        self.set(&AttrPath::parse(path, registry)?, value)
    }

    /// Remove and return the value at a textual path resolved through
    /// `registry`.
    pub fn pop_path(&mut self, path: &str, registry: &SchemaRegistry) -> ScimResult<DataValue> {
        if let Some((schema, _)) = registry.find_schema(path) {
            return Ok(self.pop(&schema));
        }
        Ok(self.pop(&AttrPath::parse(path, registry)?))
    }

    /// Convert back to a plain JSON object with the stored key casing.
    pub fn to_plain(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_plain()))
                .collect(),
        )
    }
}

fn distribute(items: &mut Vec<DataValue>, sub_attr: &AttrName, values: Vec<DataValue>) {
    for (i, value) in values.into_iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        if i >= items.len() {
            items.resize_with(i + 1, || DataValue::Data(ScimData::new()));
        }
        match &mut items[i] {
            DataValue::Data(data) => data.insert_raw(sub_attr.to_string(), value),
            item @ (DataValue::Missing | DataValue::Null) => {
                let mut data = ScimData::new();
                data.insert_raw(sub_attr.to_string(), value);
                *item = DataValue::Data(data);
            }
            _ => trace!("Skipping non-container element {} while setting '{}'", i, sub_attr),
        }
    }
}

impl ScimData {
    /// Check that every entry has an equal counterpart in `other`.
    ///
    /// An extension namespace container matches the same attributes written
    /// under schema-qualified keys (`urn:...:attr`), and the other way round.
    fn contained_in(&self, other: &ScimData) -> bool {
        self.entries.iter().all(|(key, value)| match (other.raw(key), value) {
            (Some(other_value), _) => other_value == value,
            (None, DataValue::Data(namespace)) => namespace.iter().all(|(attr, value)| {
                other
                    .raw(&format!("{}:{}", key, attr))
                    .is_some_and(|other_value| other_value == value)
            }),
            (None, _) => key
                .rsplit_once(':')
                .and_then(|(schema, attr)| other.raw(schema)?.as_data()?.raw(attr))
                .is_some_and(|other_value| other_value == value),
        })
    }
}

impl PartialEq for ScimData {
    fn eq(&self, other: &Self) -> bool {
        self.contained_in(other) && other.contained_in(self)
    }
}

impl From<Map<String, Value>> for ScimData {
    fn from(value: Map<String, Value>) -> Self {
        Self::from_mapping(value)
    }
}

impl Serialize for ScimData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_plain().serialize(serializer)
    }
}
