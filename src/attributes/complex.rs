//! Complex attribute conventions.
//!
//! Multi-valued complex attributes follow the RFC 7643 section 2.4 shape
//! (`value`, `display`, `type`, `primary`, `$ref`). This module provides the
//! default sub-attributes, the structural validators attached when the shape
//! allows, and projection of complex values onto a subset of sub-attributes.

use super::{Attribute, AttributeKind, Attrs, Mutability, ReferenceKind, Validator};
use crate::data::{DataValue, ScimData};
use crate::error::ScimResult;
use crate::issues::{ValidationError, ValidationIssues, ValidationWarning};

use std::sync::{Arc, LazyLock};

static SINGLE_PRIMARY_VALUE: LazyLock<Validator> =
    LazyLock::new(|| Arc::new(validate_single_primary_value) as Validator);

static TYPE_VALUE_PAIRS: LazyLock<Validator> =
    LazyLock::new(|| Arc::new(validate_type_value_pairs) as Validator);

pub(crate) fn default_sub_attributes() -> ScimResult<Attrs> {
    Ok(Attrs::new([
        Attribute::builder("value", AttributeKind::Unknown).build()?,
        Attribute::builder("display", AttributeKind::String)
            .with_mutability(Mutability::Immutable)
            .build()?,
        Attribute::builder("type", AttributeKind::String).build()?,
        Attribute::builder("primary", AttributeKind::Boolean).build()?,
        Attribute::builder("$ref", AttributeKind::Reference(ReferenceKind::Uri)).build()?,
    ]))
}

/// Validators implied by the sub-attributes of a multi-valued complex
/// attribute.
pub(crate) fn structural_validators(attrs: &Attrs) -> Vec<Validator> {
    let mut validators = Vec::new();
    if attrs.get_by_name("primary").is_some() {
        validators.push(SINGLE_PRIMARY_VALUE.clone());
    }
    if attrs.get_by_name("type").is_some() && attrs.get_by_name("value").is_some() {
        validators.push(TYPE_VALUE_PAIRS.clone());
    }
    validators
}

fn valid_items(value: &DataValue) -> impl Iterator<Item = &ScimData> {
    value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(DataValue::as_data)
}

/// Report more than one element with `primary` set to `true` (error 15).
///
/// The error does not block further checks.
pub fn validate_single_primary_value(value: &DataValue) -> ValidationIssues {
    let mut issues = ValidationIssues::new();
    let primary_entries = valid_items(value)
        .filter(|item| item.get("primary").as_bool() == Some(true))
        .count();
    if primary_entries > 1 {
        issues.add_error(ValidationError::multiple_primary_values(), true, &[]);
    }
    issues
}

/// Warn once for every `(type, value)` pair occurring more than once
/// (warning 2). Elements where either part is empty are ignored.
pub fn validate_type_value_pairs(value: &DataValue) -> ValidationIssues {
    let mut issues = ValidationIssues::new();
    let mut pairs: Vec<((DataValue, DataValue), usize)> = Vec::new();
    for item in valid_items(value) {
        let pair = (item.get("type"), item.get("value"));
        if !pair.0.is_truthy() || !pair.1.is_truthy() {
            continue;
        }
        match pairs.iter_mut().find(|(existing, _)| *existing == pair) {
            Some((_, count)) => *count += 1,
            None => pairs.push((pair, 1)),
        }
    }
    for _ in pairs.iter().filter(|(_, count)| *count > 1) {
        issues.add_warning(ValidationWarning::multiple_type_value_pairs(), &[]);
    }
    issues
}

impl Attribute {
    /// Project a complex value (or list of them) onto the sub-attributes
    /// satisfying `keep_if`. Values of other attributes are returned as is.
    pub fn filter(&self, value: &DataValue, keep_if: &dyn Fn(&Attribute) -> bool) -> DataValue {
        let Some(attrs) = self.sub_attributes() else {
            return value.clone();
        };
        match value {
            DataValue::List(items) => DataValue::List(
                items
                    .iter()
                    .map(|item| self.filter(item, keep_if))
                    .collect(),
            ),
            DataValue::Data(data) => {
                let mut filtered = ScimData::new();
                for attr in attrs.iter().filter(|attr| keep_if(attr)) {
                    let value = data.get(attr.name());
                    if !value.is_missing() {
                        filtered.insert(attr.name(), value);
                    }
                }
                DataValue::Data(filtered)
            }
            other => other.clone(),
        }
    }
}
