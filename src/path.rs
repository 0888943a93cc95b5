//! Attribute names, schema URIs and attribute paths.
//!
//! Every identifier in this module compares and hashes case-insensitively while
//! preserving the casing it was created with for display. Paths yield a
//! [`Location`], the segment list used both to address values inside a
//! [`ScimData`](crate::data::ScimData) container and to report issues in a
//! [`ValidationIssues`](crate::issues::ValidationIssues) tree.

use crate::error::{ScimError, ScimResult};
use crate::issues::{ValidationError, ValidationIssues};
use crate::registry::SchemaRegistry;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

static ATTR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z][\w$-]*|\$ref)$").unwrap());

static URI_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[\w.-]+:)*$").unwrap());

static ATTR_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:[\w.-]+:)*)([a-zA-Z][\w$-]*|\$ref)(?:\.([a-zA-Z][\w$-]*|\$ref))?$").unwrap()
});

macro_rules! case_insensitive_str {
    ($name:ident) => {
        impl $name {
            /// Get the value with its original casing.
            pub fn as_str(&self) -> &str {
                &self.original
            }

            /// Get the lower-cased comparison key.
            pub fn folded(&self) -> &str {
                &self.folded
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.folded == other.folded
            }
        }

        impl Eq for $name {}

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.folded == other.to_lowercase()
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.folded == other.to_lowercase()
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.folded.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.original)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.original.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ScimError;

            fn try_from(value: &str) -> ScimResult<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ScimError;

            fn try_from(value: String) -> ScimResult<Self> {
                Self::new(value)
            }
        }
    };
}

/// A validated attribute name, e.g. `userName` or `$ref`.
///
/// Names must match `[a-zA-Z][\w$-]*` or be exactly `$ref`. Equality and
/// hashing ignore case.
#[derive(Debug, Clone)]
pub struct AttrName {
    original: String,
    folded: String,
}

impl AttrName {
    /// Create a new attribute name, failing with `InvalidAttrName` on bad input.
    pub fn new(value: impl Into<String>) -> ScimResult<Self> {
        let original = value.into();
        if !ATTR_NAME.is_match(&original) {
            return Err(ScimError::invalid_attr_name(original));
        }
        let folded = original.to_lowercase();
        Ok(Self { original, folded })
    }
}

case_insensitive_str!(AttrName);

/// A validated schema URI, e.g. `urn:ietf:params:scim:schemas:core:2.0:User`.
///
/// The URI must be a sequence of `[\w.-]+` segments separated by colons.
/// Equality and hashing ignore case.
#[derive(Debug, Clone)]
pub struct SchemaUri {
    original: String,
    folded: String,
}

impl SchemaUri {
    /// Create a new schema URI, failing with `InvalidSchemaUri` on bad input.
    pub fn new(value: impl Into<String>) -> ScimResult<Self> {
        let original = value.into();
        if !URI_PREFIX.is_match(&format!("{}:", original)) {
            return Err(ScimError::invalid_schema_uri(original));
        }
        let folded = original.to_lowercase();
        Ok(Self { original, folded })
    }
}

case_insensitive_str!(SchemaUri);

/// One step of a location: an attribute or schema key, or a list index.
///
/// Keys compare case-insensitively so that issues recorded under one casing
/// are found under another.
#[derive(Debug, Clone)]
pub enum Segment {
    Key(String),
    Index(usize),
}

fn folded_chars(key: &str) -> impl Iterator<Item = char> + '_ {
    key.chars().flat_map(char::to_lowercase)
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Segment::Key(a), Segment::Key(b)) => folded_chars(a).eq(folded_chars(b)),
            (Segment::Index(a), Segment::Index(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Segment::Key(key) => {
                0u8.hash(state);
                for c in folded_chars(key) {
                    c.hash(state);
                }
            }
            Segment::Index(index) => {
                1u8.hash(state);
                index.hash(state);
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Segment::Key(value.to_string())
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Segment::Key(value)
    }
}

impl From<usize> for Segment {
    fn from(value: usize) -> Self {
        Segment::Index(value)
    }
}

impl From<&AttrName> for Segment {
    fn from(value: &AttrName) -> Self {
        Segment::Key(value.as_str().to_string())
    }
}

impl From<&SchemaUri> for Segment {
    fn from(value: &SchemaUri) -> Self {
        Segment::Key(value.as_str().to_string())
    }
}

/// Ordered path segments addressing a value or an issue.
pub type Location = Vec<Segment>;

/// Build a [`Location`] from keys and indexes.
///
/// ```rust
/// use scim_schema::location;
/// use scim_schema::path::Segment;
///
/// let loc = location!["emails", 1usize, "value"];
/// assert_eq!(loc[1], Segment::Index(1));
/// ```
#[macro_export]
macro_rules! location {
    ($($segment:expr),* $(,)?) => {
        vec![$($crate::path::Segment::from($segment)),*]
    };
}

/// An attribute path that is not bound to any schema: `attr` or `attr.subAttr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrRep {
    attr: AttrName,
    sub_attr: Option<AttrName>,
}

impl AttrRep {
    /// Create a path from already validated names.
    pub fn new(attr: AttrName, sub_attr: Option<AttrName>) -> Self {
        Self { attr, sub_attr }
    }

    /// Create a path from raw strings, validating both names.
    pub fn from_names(attr: &str, sub_attr: Option<&str>) -> ScimResult<Self> {
        Ok(Self {
            attr: AttrName::new(attr)?,
            sub_attr: sub_attr.map(AttrName::new).transpose()?,
        })
    }

    pub fn attr(&self) -> &AttrName {
        &self.attr
    }

    pub fn sub_attr(&self) -> Option<&AttrName> {
        self.sub_attr.as_ref()
    }

    pub fn is_sub_attr(&self) -> bool {
        self.sub_attr.is_some()
    }

    /// Get the path of the top-level attribute.
    pub fn top_level(&self) -> Self {
        Self::new(self.attr.clone(), None)
    }

    pub fn location(&self) -> Location {
        let mut location = vec![Segment::from(&self.attr)];
        if let Some(sub_attr) = &self.sub_attr {
            location.push(Segment::from(sub_attr));
        }
        location
    }
}

impl fmt::Display for AttrRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_attr {
            Some(sub_attr) => write!(f, "{}.{}", self.attr, sub_attr),
            None => write!(f, "{}", self.attr),
        }
    }
}

/// An attribute path bound to a registered schema.
///
/// The extension flag is resolved from the registry at construction time and
/// decides whether the schema URI becomes the first location segment.
#[derive(Debug, Clone)]
pub struct BoundedAttrRep {
    schema: SchemaUri,
    extension: bool,
    rep: AttrRep,
}

impl BoundedAttrRep {
    /// Bind a path to a schema, failing with `UnknownSchema` when the schema
    /// was never registered.
    pub fn new(schema: SchemaUri, rep: AttrRep, registry: &SchemaRegistry) -> ScimResult<Self> {
        let extension = registry
            .is_extension(&schema)
            .ok_or_else(|| ScimError::unknown_schema(schema.as_str()))?;
        Ok(Self {
            schema,
            extension,
            rep,
        })
    }

    pub fn schema(&self) -> &SchemaUri {
        &self.schema
    }

    pub fn extension(&self) -> bool {
        self.extension
    }

    pub fn rep(&self) -> &AttrRep {
        &self.rep
    }

    pub fn attr(&self) -> &AttrName {
        self.rep.attr()
    }

    pub fn sub_attr(&self) -> Option<&AttrName> {
        self.rep.sub_attr()
    }

    pub fn top_level(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            extension: self.extension,
            rep: self.rep.top_level(),
        }
    }

    /// Get a path to a sub-attribute of this path's top-level attribute.
    pub fn with_sub_attr(&self, sub_attr: AttrName) -> Self {
        Self {
            schema: self.schema.clone(),
            extension: self.extension,
            rep: AttrRep::new(self.rep.attr().clone(), Some(sub_attr)),
        }
    }

    pub fn location(&self) -> Location {
        let mut location = Vec::with_capacity(3);
        if self.extension {
            location.push(Segment::from(&self.schema));
        }
        location.extend(self.rep.location());
        location
    }
}

impl PartialEq for BoundedAttrRep {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.rep == other.rep
    }
}

impl Eq for BoundedAttrRep {}

impl Hash for BoundedAttrRep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.hash(state);
        self.rep.hash(state);
    }
}

impl fmt::Display for BoundedAttrRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.schema, self.rep)
    }
}

/// A parsed attribute path, optionally qualified with a schema URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrPath {
    Unbound(AttrRep),
    Bound(BoundedAttrRep),
}

impl AttrPath {
    /// Parse `[schema:]attr[.subAttr]`.
    ///
    /// A schema prefix must name a registered schema, else `UnknownSchema`.
    pub fn parse(value: &str, registry: &SchemaRegistry) -> ScimResult<Self> {
        match Self::split(value)? {
            (None, rep) => Ok(AttrPath::Unbound(rep)),
            (Some(schema), rep) => Ok(AttrPath::Bound(BoundedAttrRep::new(schema, rep, registry)?)),
        }
    }

    /// Split `[schema:]attr[.subAttr]` into its schema prefix and attribute
    /// path without resolving the schema.
    pub(crate) fn split(value: &str) -> ScimResult<(Option<SchemaUri>, AttrRep)> {
        let captures = ATTR_PATH
            .captures(value)
            .ok_or_else(|| ScimError::invalid_attr_path(value))?;
        let schema = captures
            .get(1)
            .map(|m| m.as_str().trim_end_matches(':'))
            .unwrap_or_default();
        let attr = captures
            .get(2)
            .map(|m| m.as_str())
            .ok_or_else(|| ScimError::invalid_attr_path(value))?;
        let sub_attr = captures.get(3).map(|m| m.as_str());
        let rep = AttrRep::from_names(attr, sub_attr)?;

        if schema.is_empty() {
            return Ok((None, rep));
        }
        Ok((Some(SchemaUri::new(schema)?), rep))
    }

    pub fn rep(&self) -> &AttrRep {
        match self {
            AttrPath::Unbound(rep) => rep,
            AttrPath::Bound(bounded) => bounded.rep(),
        }
    }

    pub fn attr(&self) -> &AttrName {
        self.rep().attr()
    }

    pub fn sub_attr(&self) -> Option<&AttrName> {
        self.rep().sub_attr()
    }

    pub fn schema(&self) -> Option<&SchemaUri> {
        match self {
            AttrPath::Unbound(_) => None,
            AttrPath::Bound(bounded) => Some(bounded.schema()),
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, AttrPath::Bound(bounded) if bounded.extension())
    }

    pub fn top_level(&self) -> Self {
        match self {
            AttrPath::Unbound(rep) => AttrPath::Unbound(rep.top_level()),
            AttrPath::Bound(bounded) => AttrPath::Bound(bounded.top_level()),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            AttrPath::Unbound(rep) => rep.location(),
            AttrPath::Bound(bounded) => bounded.location(),
        }
    }
}

impl From<AttrRep> for AttrPath {
    fn from(value: AttrRep) -> Self {
        AttrPath::Unbound(value)
    }
}

impl From<BoundedAttrRep> for AttrPath {
    fn from(value: BoundedAttrRep) -> Self {
        AttrPath::Bound(value)
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrPath::Unbound(rep) => write!(f, "{}", rep),
            AttrPath::Bound(bounded) => write!(f, "{}", bounded),
        }
    }
}

/// Check an attribute path string, reporting problems as a data issue.
///
/// Used where a path arrives inside instance data (e.g. `sortBy`) and must
/// not abort processing.
pub fn validate_attr_path(value: &str, registry: &SchemaRegistry) -> ValidationIssues {
    let mut issues = ValidationIssues::new();
    if AttrPath::parse(value, registry).is_err() {
        issues.add_error(ValidationError::bad_attribute_name(value), false, &[]);
    }
    issues
}
