//! Attribute declarations.
//!
//! An [`Attribute`] describes one value of a resource: its data type, its
//! characteristics and any custom validation or transformation hooks. The
//! data type is a closed set of variants ([`AttributeKind`]); every variant
//! shares the same validate/serialize/deserialize contract, implemented in
//! the [`validation`] and [`complex`] modules.
//!
//! # Examples
//!
//! ```rust
//! use scim_schema::attributes::{Attribute, AttributeKind, Mutability};
//! use scim_schema::data::DataValue;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let active = Attribute::builder("active", AttributeKind::Boolean)
//!     .with_mutability(Mutability::ReadWrite)
//!     .build()?;
//!
//! let mut value = DataValue::from(json!("yes"));
//! let issues = active.validate(&mut value);
//! assert!(issues.has_errors(&[]));
//! # Ok(())
//! # }
//! ```

pub mod attrs;
pub mod complex;
pub mod types;
pub mod validation;

pub use attrs::{Attrs, BoundedAttrs};
pub use types::{AttributeIssuer, AttributeType, Mutability, Returned, Uniqueness};

use crate::data::DataValue;
use crate::error::{ScimError, ScimResult};
use crate::issues::ValidationIssues;
use crate::path::{AttrName, AttrPath, AttrRep, BoundedAttrRep};
use crate::registry::SchemaRegistry;

use serde_json::{Map, Number, Value, json};
use std::fmt;
use std::sync::Arc;

/// Custom validator run after the built-in checks of an attribute.
pub type Validator = Arc<dyn Fn(&DataValue) -> ValidationIssues + Send + Sync>;

/// Custom serializer or deserializer replacing the built-in transform.
pub type Processor = Arc<dyn Fn(DataValue) -> DataValue + Send + Sync>;

/// Target of a `reference` attribute.
#[derive(Debug, Clone)]
pub enum ReferenceKind {
    /// Absolute URL of a resource outside the service provider
    External,
    /// Any URI, e.g. a schema URN
    Uri,
    /// Reference to a SCIM resource of one of the named resource types
    Scim {
        resource_types: Vec<String>,
        registry: Arc<SchemaRegistry>,
    },
}

impl ReferenceKind {
    /// Names rendered as `referenceTypes`.
    pub fn reference_types(&self) -> Vec<String> {
        match self {
            ReferenceKind::External => vec!["external".to_string()],
            ReferenceKind::Uri => vec!["uri".to_string()],
            ReferenceKind::Scim { resource_types, .. } => resource_types.clone(),
        }
    }
}

impl PartialEq for ReferenceKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReferenceKind::External, ReferenceKind::External) => true,
            (ReferenceKind::Uri, ReferenceKind::Uri) => true,
            (
                ReferenceKind::Scim {
                    resource_types: a, ..
                },
                ReferenceKind::Scim {
                    resource_types: b, ..
                },
            ) => a.len() == b.len() && a.iter().all(|name| b.contains(name)),
            _ => false,
        }
    }
}

/// Data type of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// Accepts any value; used for the default `value` sub-attribute
    Unknown,
    Boolean,
    Integer,
    Decimal,
    String,
    Binary,
    DateTime,
    Reference(ReferenceKind),
    Complex(Attrs),
}

impl AttributeKind {
    /// Shorthand for a SCIM resource reference kind.
    pub fn scim_reference<I, S>(resource_types: I, registry: Arc<SchemaRegistry>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeKind::Reference(ReferenceKind::Scim {
            resource_types: resource_types.into_iter().map(Into::into).collect(),
            registry,
        })
    }

    /// Get the RFC 7643 data type, `None` for [`AttributeKind::Unknown`].
    pub fn attribute_type(&self) -> Option<AttributeType> {
        match self {
            AttributeKind::Unknown => None,
            AttributeKind::Boolean => Some(AttributeType::Boolean),
            AttributeKind::Integer => Some(AttributeType::Integer),
            AttributeKind::Decimal => Some(AttributeType::Decimal),
            AttributeKind::String => Some(AttributeType::String),
            AttributeKind::Binary => Some(AttributeType::Binary),
            AttributeKind::DateTime => Some(AttributeType::DateTime),
            AttributeKind::Reference(_) => Some(AttributeType::Reference),
            AttributeKind::Complex(_) => Some(AttributeType::Complex),
        }
    }

    fn has_case_exact(&self) -> bool {
        matches!(
            self,
            AttributeKind::String | AttributeKind::Binary | AttributeKind::Reference(_)
        )
    }

    fn has_uniqueness(&self) -> bool {
        matches!(
            self,
            AttributeKind::String | AttributeKind::Integer | AttributeKind::Decimal
        )
    }
}

/// Declaration of a single attribute.
///
/// Attributes are immutable once built; [`clone_with`](Self::clone_with)
/// derives rebound or filtered copies.
#[derive(Clone)]
pub struct Attribute {
    path: AttrPath,
    kind: AttributeKind,
    description: String,
    issuer: AttributeIssuer,
    required: bool,
    multi_valued: bool,
    canonical_values: Option<Vec<Value>>,
    restrict_canonical_values: bool,
    mutability: Mutability,
    returned: Returned,
    case_exact: bool,
    uniqueness: Uniqueness,
    validators: Vec<Validator>,
    serializer: Option<Processor>,
    deserializer: Option<Processor>,
}

impl Attribute {
    /// Start declaring an attribute named `name`.
    pub fn builder(name: impl Into<String>, kind: AttributeKind) -> AttributeBuilder {
        AttributeBuilder::new(name, kind)
    }

    pub fn path(&self) -> &AttrPath {
        &self.path
    }

    /// Get the attribute's own name: the sub-attribute name for a bound
    /// sub-attribute, the attribute name otherwise.
    pub fn name(&self) -> &AttrName {
        self.path.sub_attr().unwrap_or_else(|| self.path.attr())
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn issuer(&self) -> AttributeIssuer {
        self.issuer
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn multi_valued(&self) -> bool {
        self.multi_valued
    }

    pub fn canonical_values(&self) -> Option<&[Value]> {
        self.canonical_values.as_deref()
    }

    pub fn restrict_canonical_values(&self) -> bool {
        self.restrict_canonical_values
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn returned(&self) -> Returned {
        self.returned
    }

    pub fn case_exact(&self) -> bool {
        self.case_exact
    }

    pub fn uniqueness(&self) -> Uniqueness {
        self.uniqueness
    }

    /// Get the sub-attributes of a complex attribute.
    pub fn sub_attributes(&self) -> Option<&Attrs> {
        match &self.kind {
            AttributeKind::Complex(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, AttributeKind::Complex(_))
    }

    /// Derive a copy, optionally rebinding its path and filtering the
    /// sub-attributes of a complex attribute.
    ///
    /// Fails with `FilteredOut` when `keep_if` rejects the attribute itself.
    pub fn clone_with(
        &self,
        path: Option<AttrPath>,
        keep_if: Option<&dyn Fn(&Attribute) -> bool>,
    ) -> ScimResult<Attribute> {
        if let Some(keep_if) = keep_if {
            if !keep_if(self) {
                return Err(ScimError::FilteredOut {
                    attribute: self.path.to_string(),
                });
            }
        }
        let mut cloned = self.clone();
        if let Some(path) = path {
            cloned.path = path;
        }
        if let (Some(keep_if), AttributeKind::Complex(attrs)) = (keep_if, &self.kind) {
            cloned.kind = AttributeKind::Complex(attrs.clone_filtered(keep_if));
        }
        Ok(cloned)
    }

    /// Bind the attribute, and the sub-attributes of a complex attribute, to
    /// the schema of `rep`.
    pub(crate) fn bound_to(&self, rep: BoundedAttrRep) -> Attribute {
        let mut bound = self.clone();
        if let AttributeKind::Complex(attrs) = &self.kind {
            bound.kind = AttributeKind::Complex(attrs.map(|sub_attr| {
                let mut sub_attr = sub_attr.clone();
                sub_attr.path = AttrPath::Bound(rep.with_sub_attr(sub_attr.name().clone()));
                sub_attr
            }));
        }
        bound.path = AttrPath::Bound(rep);
        bound
    }

    /// Apply the serializer to `value`.
    ///
    /// A custom serializer replaces the whole operation; otherwise multi-valued
    /// values are serialized element by element.
    pub fn serialize(&self, value: DataValue) -> DataValue {
        if let Some(serializer) = &self.serializer {
            return serializer(value);
        }
        self.fan_out(value, |item| self.serialize_item(item))
    }

    /// Apply the deserializer to `value`, with the same fan-out rules as
    /// [`serialize`](Self::serialize).
    pub fn deserialize(&self, value: DataValue) -> DataValue {
        if let Some(deserializer) = &self.deserializer {
            return deserializer(value);
        }
        self.fan_out(value, |item| self.deserialize_item(item))
    }

    fn fan_out(&self, value: DataValue, transform: impl Fn(DataValue) -> DataValue) -> DataValue {
        match value {
            DataValue::List(items) if self.multi_valued => {
                DataValue::List(items.into_iter().map(transform).collect())
            }
            value => transform(value),
        }
    }

    fn serialize_item(&self, value: DataValue) -> DataValue {
        match (&self.kind, value) {
            (AttributeKind::Complex(attrs), DataValue::Data(data)) => {
                DataValue::Data(attrs.transform(&data, Attribute::serialize))
            }
            (AttributeKind::Decimal, DataValue::Number(number)) => as_float(number),
            (AttributeKind::Integer, DataValue::Number(number)) => as_integer(number),
            (_, value) => value,
        }
    }

    fn deserialize_item(&self, value: DataValue) -> DataValue {
        match (&self.kind, value) {
            (AttributeKind::Complex(attrs), DataValue::Data(data)) => {
                DataValue::Data(attrs.transform(&data, Attribute::deserialize))
            }
            (AttributeKind::Decimal, DataValue::Number(number)) => as_float(number),
            (AttributeKind::Integer, DataValue::Number(number)) => as_integer(number),
            (_, value) => value,
        }
    }

    /// Render the RFC 7643 attribute definition.
    pub fn to_schema_value(&self) -> Value {
        let mut output = Map::new();
        output.insert("name".into(), json!(self.name().as_str()));
        if let Some(attribute_type) = self.kind.attribute_type() {
            output.insert("type".into(), json!(attribute_type.as_str()));
        }
        output.insert("multiValued".into(), json!(self.multi_valued));
        output.insert("description".into(), json!(self.description));
        output.insert("required".into(), json!(self.required));
        output.insert("mutability".into(), json!(self.mutability.as_str()));
        output.insert("returned".into(), json!(self.returned.as_str()));
        if let Some(canonical_values) = self.canonical_values.as_ref().filter(|v| !v.is_empty()) {
            output.insert("canonicalValues".into(), Value::Array(canonical_values.clone()));
        }
        if self.kind.has_case_exact() {
            output.insert("caseExact".into(), json!(self.case_exact));
        }
        if self.kind.has_uniqueness() {
            output.insert("uniqueness".into(), json!(self.uniqueness.as_str()));
        }
        match &self.kind {
            AttributeKind::Reference(reference) => {
                output.insert("referenceTypes".into(), json!(reference.reference_types()));
            }
            AttributeKind::Complex(attrs) => {
                output.insert(
                    "subAttributes".into(),
                    Value::Array(attrs.iter().map(Attribute::to_schema_value).collect()),
                );
            }
            _ => {}
        }
        Value::Object(output)
    }
}

fn as_float(number: Number) -> DataValue {
    number
        .as_f64()
        .and_then(Number::from_f64)
        .map(DataValue::Number)
        .unwrap_or(DataValue::Number(number))
}

/// Integral floats (`4.0`) become integers. Fractions and values outside the
/// `i64` range are kept as given and left for validation to reject.
fn as_integer(number: Number) -> DataValue {
    if number.as_i64().is_some() || number.as_u64().is_some() {
        return DataValue::Number(number);
    }
    let integral = number
        .as_f64()
        .filter(|value| value.fract() == 0.0 && *value >= -(2f64.powi(63)) && *value < 2f64.powi(63))
        .map(|value| Number::from(value as i64));
    DataValue::Number(integral.unwrap_or(number))
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("path", &self.path.to_string())
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("multi_valued", &self.multi_valued)
            .field("mutability", &self.mutability)
            .field("returned", &self.returned)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        fn same_processor(a: &Option<Processor>, b: &Option<Processor>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }

        self.path == other.path
            && self.kind == other.kind
            && self.description == other.description
            && self.issuer == other.issuer
            && self.required == other.required
            && self.multi_valued == other.multi_valued
            && self.canonical_values == other.canonical_values
            && self.restrict_canonical_values == other.restrict_canonical_values
            && self.mutability == other.mutability
            && self.returned == other.returned
            && self.case_exact == other.case_exact
            && self.uniqueness == other.uniqueness
            && self.validators.len() == other.validators.len()
            && self
                .validators
                .iter()
                .zip(&other.validators)
                .all(|(a, b)| Arc::ptr_eq(a, b))
            && same_processor(&self.serializer, &other.serializer)
            && same_processor(&self.deserializer, &other.deserializer)
    }
}

/// Fluent builder for [`Attribute`].
///
/// # Example
/// ```rust
/// use scim_schema::attributes::{Attribute, AttributeKind, Returned, Uniqueness};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let user_name = Attribute::builder("userName", AttributeKind::String)
///     .with_required(true)
///     .with_uniqueness(Uniqueness::Server)
///     .with_returned(Returned::Always)
///     .build()?;
/// assert!(user_name.required());
/// # Ok(())
/// # }
/// ```
pub struct AttributeBuilder {
    name: String,
    kind: AttributeKind,
    description: String,
    issuer: AttributeIssuer,
    required: bool,
    multi_valued: bool,
    canonical_values: Option<Vec<Value>>,
    restrict_canonical_values: bool,
    mutability: Mutability,
    returned: Returned,
    case_exact: bool,
    uniqueness: Uniqueness,
    validators: Vec<Validator>,
    serializer: Option<Processor>,
    deserializer: Option<Processor>,
}

impl AttributeBuilder {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            issuer: AttributeIssuer::default(),
            required: false,
            multi_valued: false,
            canonical_values: None,
            restrict_canonical_values: false,
            mutability: Mutability::default(),
            returned: Returned::default(),
            case_exact: false,
            uniqueness: Uniqueness::default(),
            validators: Vec::new(),
            serializer: None,
            deserializer: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_issuer(mut self, issuer: AttributeIssuer) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    /// Declare canonical values; `restrict` turns a non-canonical value into
    /// an error instead of a warning.
    pub fn with_canonical_values(mut self, values: Vec<Value>, restrict: bool) -> Self {
        self.canonical_values = Some(values);
        self.restrict_canonical_values = restrict;
        self
    }

    pub fn with_mutability(mut self, mutability: Mutability) -> Self {
        self.mutability = mutability;
        self
    }

    pub fn with_returned(mut self, returned: Returned) -> Self {
        self.returned = returned;
        self
    }

    /// Ignored for binary and reference attributes, which are always case-exact.
    pub fn with_case_exact(mut self, case_exact: bool) -> Self {
        self.case_exact = case_exact;
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&DataValue) -> ValidationIssues + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn with_serializer<F>(mut self, serializer: F) -> Self
    where
        F: Fn(DataValue) -> DataValue + Send + Sync + 'static,
    {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    pub fn with_deserializer<F>(mut self, deserializer: F) -> Self
    where
        F: Fn(DataValue) -> DataValue + Send + Sync + 'static,
    {
        self.deserializer = Some(Arc::new(deserializer));
        self
    }

    /// Validate the name and finish the declaration.
    ///
    /// Multi-valued complex attributes without sub-attributes receive the
    /// conventional `value`, `display`, `type`, `primary` and `$ref`
    /// sub-attributes, and structural validators matching their shape.
    pub fn build(self) -> ScimResult<Attribute> {
        let path = AttrPath::Unbound(AttrRep::new(AttrName::new(self.name)?, None));
        let mut kind = self.kind;
        let mut validators = self.validators;

        let case_exact = self.case_exact
            || matches!(kind, AttributeKind::Binary | AttributeKind::Reference(_));

        let mut canonical_values = self.canonical_values;
        if !case_exact {
            for value in canonical_values.iter_mut().flatten() {
                if let Value::String(text) = value {
                    *text = text.to_lowercase();
                }
            }
        }

        if self.multi_valued {
            if let AttributeKind::Complex(attrs) = &mut kind {
                if attrs.is_empty() {
                    *attrs = complex::default_sub_attributes()?;
                }
                validators.extend(complex::structural_validators(attrs));
            }
        }

        Ok(Attribute {
            path,
            kind,
            description: self.description,
            issuer: self.issuer,
            required: self.required,
            multi_valued: self.multi_valued,
            canonical_values,
            restrict_canonical_values: self.restrict_canonical_values,
            mutability: self.mutability,
            returned: self.returned,
            case_exact,
            uniqueness: self.uniqueness,
            validators,
            serializer: self.serializer,
            deserializer: self.deserializer,
        })
    }
}
