//! Ordering of resources by an attribute value.
//!
//! Implements the `sortBy` / `sortOrder` semantics of RFC 7644 section
//! 3.4.2.3. Values are resolved through the resource's attribute
//! declarations, so string comparison honours `caseExact` and multi-valued
//! attributes sort by their primary value.
//!
//! Two ordering rules hold in both directions:
//!
//! - Resources without a value for the sort attribute come last, in
//!   descending order too.
//! - A missing or unrecognised `sortOrder` sorts ascending, as RFC 7644
//!   prescribes.

use crate::attributes::{Attribute, AttributeKind, BoundedAttrs};
use crate::data::{DataValue, ScimData};
use crate::error::{ScimError, ScimResult};
use crate::path::AttrPath;
use crate::registry::SchemaRegistry;

use log::trace;
use std::cmp::Ordering;

/// Sort key of one resource.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Absent,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn kind(&self) -> Option<&'static str> {
        match self {
            SortKey::Absent => None,
            SortKey::Bool(_) => Some("boolean"),
            SortKey::Number(_) => Some("number"),
            SortKey::Text(_) => Some("string"),
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Sorts resources by the value of one attribute. The sort is stable.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use scim_schema::SchemaRegistry;
/// use scim_schema::attributes::{Attribute, AttributeKind};
/// use scim_schema::data::ScimData;
/// use scim_schema::path::AttrPath;
/// use scim_schema::schema::ResourceSchema;
/// use scim_schema::sorter::Sorter;
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Arc::new(SchemaRegistry::new());
/// let user = ResourceSchema::builder("urn:example:User", "User")
///     .with_attributes([Attribute::builder("userName", AttributeKind::String).build()?])
///     .build(registry.clone())?;
///
/// let users: Vec<ScimData> = ["bob", "Alice"]
///     .iter()
///     .map(|name| ScimData::from(json!({"userName": name}).as_object().cloned().unwrap_or_default()))
///     .collect();
///
/// let sorter = Sorter::new(AttrPath::parse("userName", &registry)?, true);
/// let sorted = sorter.sort(users, user.attrs())?;
/// assert_eq!(sorted[0].get("userName").as_str(), Some("Alice"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sorter {
    path: AttrPath,
    ascending: bool,
}

impl Sorter {
    pub fn new(path: AttrPath, ascending: bool) -> Self {
        Self { path, ascending }
    }

    /// Build a sorter from the `sortBy` and `sortOrder` parameters of a
    /// query. Returns `None` when `sortBy` is not given.
    pub fn from_query(query: &ScimData, registry: &SchemaRegistry) -> ScimResult<Option<Self>> {
        let sort_by = query.get("sortBy");
        let Some(sort_by) = sort_by.as_str().filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        let descending = query
            .get("sortOrder")
            .as_str()
            .is_some_and(|order| order.eq_ignore_ascii_case("descending"));
        Ok(Some(Self::new(AttrPath::parse(sort_by, registry)?, !descending)))
    }

    pub fn path(&self) -> &AttrPath {
        &self.path
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Sort `data`, resolving the sort attribute through `attrs`.
    ///
    /// Data is returned unchanged when no resource has a value to sort by.
    /// Fails with `SortTypeMismatch` when the values are of different kinds.
    pub fn sort(&self, data: Vec<ScimData>, attrs: &BoundedAttrs) -> ScimResult<Vec<ScimData>> {
        let attr = attrs.get(&self.path)?;
        let keys: Vec<SortKey> = data.iter().map(|item| self.key(item, attr)).collect();
        if keys.iter().all(|key| *key == SortKey::Absent) {
            trace!("No values to sort by '{}'", self.path);
            return Ok(data);
        }

        let mut kinds = keys.iter().filter_map(SortKey::kind);
        if let Some(first) = kinds.next() {
            if let Some(other) = kinds.find(|kind| *kind != first) {
                return Err(ScimError::SortTypeMismatch {
                    left: first.to_string(),
                    right: other.to_string(),
                });
            }
        }

        let mut keyed: Vec<(SortKey, ScimData)> = keys.into_iter().zip(data).collect();
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (SortKey::Absent, SortKey::Absent) => Ordering::Equal,
            (SortKey::Absent, _) => Ordering::Greater,
            (_, SortKey::Absent) => Ordering::Less,
            (a, b) if self.ascending => a.compare(b),
            (a, b) => b.compare(a),
        });
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }

    fn key(&self, item: &ScimData, attr: Option<&Attribute>) -> SortKey {
        let Some(attr) = attr else {
            return SortKey::Absent;
        };
        let value = item.get(&self.path);
        if !attr.multi_valued() || value.is_missing() {
            return to_key(first_value(value), attr);
        }
        let Some(sub_attrs) = attr.sub_attributes() else {
            return to_key(first_value(value), attr);
        };
        match sub_attrs.get_by_name("value") {
            Some(value_attr) => to_key(primary_value(&value), value_attr),
            None => SortKey::Absent,
        }
    }
}

/// Get the `value` of the element marked primary, else of the first element.
fn primary_value(value: &DataValue) -> DataValue {
    let items: Vec<&ScimData> = value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(DataValue::as_data)
        .collect();
    items
        .iter()
        .find(|item| item.get("primary").as_bool() == Some(true))
        .or(items.first())
        .map(|item| item.get("value"))
        .unwrap_or_default()
}

fn first_value(value: DataValue) -> DataValue {
    match value {
        DataValue::List(items) => items.into_iter().next().unwrap_or_default(),
        value => value,
    }
}

fn to_key(value: DataValue, attr: &Attribute) -> SortKey {
    match value {
        DataValue::Bool(value) => SortKey::Bool(value),
        DataValue::Number(number) => number.as_f64().map_or(SortKey::Absent, SortKey::Number),
        DataValue::String(text) if text.is_empty() || !holds_text(attr.kind()) => SortKey::Absent,
        DataValue::String(text) if attr.case_exact() => SortKey::Text(text),
        DataValue::String(text) => SortKey::Text(text.to_lowercase()),
        _ => SortKey::Absent,
    }
}

fn holds_text(kind: &AttributeKind) -> bool {
    matches!(
        kind,
        AttributeKind::Unknown
            | AttributeKind::String
            | AttributeKind::Binary
            | AttributeKind::DateTime
            | AttributeKind::Reference(_)
    )
}
