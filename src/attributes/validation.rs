//! Attribute validation.
//!
//! Validation runs in two passes over a value. [`Attribute::validate_type`]
//! checks the shape (list or single value) and the base type of every
//! element; [`Attribute::validate`] then applies the value rules of the data
//! type and the attribute's custom validators. Elements that fail with a
//! non-proceedable error are replaced by [`DataValue::Invalid`] so that later
//! steps skip them while their siblings are still checked.

use super::{Attribute, AttributeKind, Attrs, ReferenceKind};
use crate::data::{DataValue, ScimData};
use crate::issues::{ValidationError, ValidationIssues, ValidationWarning};
use crate::path::Segment;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::trace;
use serde_json::Value;

impl Attribute {
    /// Check the multi-valued shape and the base type of `value`.
    ///
    /// For a multi-valued attribute each element failing the type check is
    /// marked `Invalid`; a non-list value yields a single non-proceedable
    /// error at the root.
    pub fn validate_type(&self, value: &mut DataValue) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        if !self.multi_valued {
            issues.merge(self.validate_item_type(value), &[]);
            return issues;
        }

        let DataValue::List(items) = value else {
            issues.add_error(ValidationError::bad_type("list"), false, &[]);
            return issues;
        };
        for (i, item) in items.iter_mut().enumerate() {
            let item_issues = self.validate_item_type(item);
            if !item_issues.can_proceed(&[]) {
                trace!("Marking element {} of '{}' invalid", i, self.path);
                *item = DataValue::Invalid;
            }
            issues.merge(item_issues, &[Segment::Index(i)]);
        }
        issues
    }

    /// Validate `value` against every rule of the attribute.
    ///
    /// Absent values (`Missing` or `Null`) yield no issues; required-ness is
    /// checked by the presence checker, not here.
    pub fn validate(&self, value: &mut DataValue) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        if value.is_absent() {
            return issues;
        }

        issues.merge(self.validate_type(value), &[]);
        if !issues.can_proceed(&[]) {
            trace!("Type check of '{}' failed, skipping value rules", self.path);
            return issues;
        }

        match &mut *value {
            DataValue::List(items) if self.multi_valued => {
                for (i, item) in items.iter_mut().enumerate() {
                    if item.is_invalid() {
                        continue;
                    }
                    let item_issues = self.validate_item(item);
                    if !item_issues.can_proceed(&[]) {
                        trace!("Marking element {} of '{}' invalid", i, self.path);
                        *item = DataValue::Invalid;
                    }
                    issues.merge(item_issues, &[Segment::Index(i)]);
                }
            }
            other => issues.merge(self.validate_item(other), &[]),
        }

        for validator in &self.validators {
            if !issues.can_proceed(&[]) {
                break;
            }
            issues.merge(validator(value), &[]);
        }
        issues
    }

    fn validate_item_type(&self, value: &DataValue) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        let matches = match (&self.kind, value) {
            (AttributeKind::Unknown, _) => true,
            (AttributeKind::Boolean, DataValue::Bool(_)) => true,
            (AttributeKind::Integer, DataValue::Number(number)) => {
                number.is_i64() || number.is_u64()
            }
            (AttributeKind::Decimal, DataValue::Number(_)) => true,
            (
                AttributeKind::String
                | AttributeKind::Binary
                | AttributeKind::DateTime
                | AttributeKind::Reference(_),
                DataValue::String(_),
            ) => true,
            (AttributeKind::Complex(_), DataValue::Data(_)) => true,
            _ => false,
        };
        if !matches {
            let expected = self
                .kind
                .attribute_type()
                .map(|attribute_type| attribute_type.as_str())
                .unwrap_or("any");
            issues.add_error(ValidationError::bad_type(expected), false, &[]);
        }
        issues
    }

    fn validate_item(&self, value: &mut DataValue) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        if let Some(canonical_values) = &self.canonical_values {
            if !self.is_canonical(value, canonical_values) {
                if self.restrict_canonical_values {
                    issues.add_error(
                        ValidationError::must_be_one_of(canonical_values),
                        false,
                        &[],
                    );
                    return issues;
                }
                issues.add_warning(ValidationWarning::should_be_one_of(canonical_values), &[]);
            }
        }

        match (&self.kind, value) {
            (AttributeKind::Binary, DataValue::String(text)) => {
                if text.len() % 4 != 0 || STANDARD.decode(text.as_bytes()).is_err() {
                    issues.add_error(ValidationError::bad_encoding("base64"), false, &[]);
                }
            }
            (AttributeKind::DateTime, DataValue::String(text)) => {
                if !is_xsd_datetime(text) {
                    issues.add_error(ValidationError::bad_value_syntax(), false, &[]);
                }
            }
            (AttributeKind::Reference(ReferenceKind::External), DataValue::String(text)) => {
                let absolute = url::Url::parse(text).is_ok_and(|url| url.has_host());
                if !absolute {
                    issues.add_error(ValidationError::bad_value_syntax(), false, &[]);
                }
            }
            (
                AttributeKind::Reference(ReferenceKind::Scim {
                    resource_types,
                    registry,
                }),
                DataValue::String(text),
            ) => {
                let known = resource_types
                    .iter()
                    .filter_map(|name| registry.resource_endpoint(name))
                    .any(|endpoint| text.contains(&endpoint));
                if !known {
                    issues.add_error(
                        ValidationError::bad_scim_reference(resource_types),
                        false,
                        &[],
                    );
                }
            }
            (AttributeKind::Complex(attrs), DataValue::Data(data)) => {
                issues.merge(validate_sub_attributes(attrs, data), &[]);
            }
            _ => {}
        }
        issues
    }

    fn is_canonical(&self, value: &DataValue, canonical_values: &[Value]) -> bool {
        if canonical_values.iter().any(|canonical| value == canonical) {
            return true;
        }
        match value {
            DataValue::String(text) if !self.case_exact => {
                let folded = text.to_lowercase();
                canonical_values
                    .iter()
                    .any(|canonical| canonical.as_str() == Some(folded.as_str()))
            }
            _ => false,
        }
    }
}

/// Validate every present sub-attribute of a complex value in place.
fn validate_sub_attributes(attrs: &Attrs, data: &mut ScimData) -> ValidationIssues {
    let mut issues = ValidationIssues::new();
    for sub_attr in attrs.iter() {
        let Some(value) = data.get_mut(sub_attr.name().as_str()) else {
            continue;
        };
        if value.is_missing() {
            continue;
        }
        let sub_issues = sub_attr.validate(value);
        if !sub_issues.can_proceed(&[]) {
            *value = DataValue::Invalid;
        }
        issues.merge(sub_issues, &[Segment::from(sub_attr.name())]);
    }
    issues
}

/// Accept full RFC 3339 timestamps, local date-times and plain dates.
fn is_xsd_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
