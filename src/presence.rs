//! Attribute presence rules for requests and responses.
//!
//! Type and value validation never looks at whether an attribute *should* be
//! there. [`AttributePresenceChecker`] covers that side: required attributes
//! that are missing, server-issued attributes sent by a client, and
//! attributes a response must not carry, either because they are never
//! returned or because the client restricted the returned attributes.

use crate::attributes::{Attribute, AttributeIssuer, BoundedAttrs, Returned};
use crate::data::{DataValue, ScimData};
use crate::error::ScimResult;
use crate::issues::{ValidationError, ValidationIssues};
use crate::path::{AttrPath, BoundedAttrRep, Location, Segment};

use log::debug;

/// Direction of the data being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Data sent by a client
    Request,
    /// Data returned by the service provider
    Response,
}

/// Checks which attributes are present in a resource.
///
/// Without an attribute list every required attribute must be present. With
/// one, `include` selects between the `attributes` (only the listed ones are
/// returned) and `excludedAttributes` (the listed ones are not returned)
/// semantics of RFC 7644 section 3.9.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use scim_schema::SchemaRegistry;
/// use scim_schema::attributes::{Attribute, AttributeKind};
/// use scim_schema::data::ScimData;
/// use scim_schema::presence::{AttributePresenceChecker, Direction};
/// use scim_schema::schema::ResourceSchema;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let user = ResourceSchema::builder("urn:example:User", "User")
///     .with_attributes([Attribute::builder("userName", AttributeKind::String)
///         .with_required(true)
///         .build()?])
///     .build(Arc::new(SchemaRegistry::new()))?;
///
/// let issues = AttributePresenceChecker::new().check(&ScimData::new(), user.attrs(), Direction::Request);
/// assert!(issues.has_errors(&scim_schema::location!["userName"]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributePresenceChecker {
    attr_reps: Vec<BoundedAttrRep>,
    include: Option<bool>,
    ignore_issuer: Vec<BoundedAttrRep>,
}

impl AttributePresenceChecker {
    /// Checker without an attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the checked attributes to (or, with `include` false, exclude)
    /// the given paths.
    pub fn with_attributes(
        mut self,
        attr_reps: impl IntoIterator<Item = BoundedAttrRep>,
        include: bool,
    ) -> Self {
        self.attr_reps = attr_reps.into_iter().collect();
        self.include = Some(include);
        self
    }

    /// Accept the given server-issued attributes in requests.
    pub fn with_ignored_issuer(mut self, attr_reps: impl IntoIterator<Item = BoundedAttrRep>) -> Self {
        self.ignore_issuer = attr_reps.into_iter().collect();
        self
    }

    /// Build a checker from textual attribute paths, as found in the
    /// `attributes` or `excludedAttributes` query parameters.
    ///
    /// Paths are resolved through `attrs`; paths naming no known attribute
    /// are ignored.
    pub fn for_attributes(names: &[&str], include: bool, attrs: &BoundedAttrs) -> ScimResult<Self> {
        let mut attr_reps = Vec::new();
        for name in names {
            match attrs.get_by_name(name)? {
                Some(attr) => attr_reps.extend(bound_rep(attr).cloned()),
                None => debug!("Ignoring unknown attribute '{}' in attribute list", name),
            }
        }
        Ok(Self::new().with_attributes(attr_reps, include))
    }

    pub fn attr_reps(&self) -> &[BoundedAttrRep] {
        &self.attr_reps
    }

    pub fn include(&self) -> Option<bool> {
        self.include
    }

    /// Check `data` against every attribute of `attrs`, descending into the
    /// sub-attributes of complex values and into every element of
    /// multi-valued complex values.
    pub fn check(&self, data: &ScimData, attrs: &BoundedAttrs, direction: Direction) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        for attr in attrs.iter() {
            let Some(rep) = bound_rep(attr) else {
                continue;
            };
            let in_scope = !rep.extension()
                || attrs
                    .extension(rep.schema())
                    .is_some_and(BoundedAttrs::required);
            let value = data.get(rep);
            let location = rep.location();
            issues.merge(
                self.check_presence(&value, direction, attr, rep, in_scope),
                &location,
            );

            let Some(sub_attrs) = attr.sub_attributes() else {
                continue;
            };
            if value.is_absent() || value.is_invalid() {
                continue;
            }
            for sub_attr in sub_attrs {
                let Some(sub_rep) = bound_rep(sub_attr) else {
                    continue;
                };
                if !attr.multi_valued() {
                    let Some(complex) = value.as_data() else {
                        continue;
                    };
                    issues.merge(
                        self.check_presence(&complex.get(sub_attr.name()), direction, sub_attr, sub_rep, in_scope),
                        &child(&location, [Segment::from(sub_attr.name())]),
                    );
                    continue;
                }
                let items = value.as_list().unwrap_or_default();
                for (i, item) in items.iter().enumerate() {
                    let Some(item) = item.as_data() else {
                        continue;
                    };
                    let item_value = item.get(sub_attr.name());
                    if item_value.is_invalid() {
                        continue;
                    }
                    issues.merge(
                        self.check_presence(&item_value, direction, sub_attr, sub_rep, in_scope),
                        &child(&location, [Segment::Index(i), Segment::from(sub_attr.name())]),
                    );
                }
            }
        }
        issues
    }

    fn check_presence(
        &self,
        value: &DataValue,
        direction: Direction,
        attr: &Attribute,
        rep: &BoundedAttrRep,
        in_scope: bool,
    ) -> ValidationIssues {
        let mut issues = ValidationIssues::new();
        let server_issued =
            attr.issuer() == AttributeIssuer::Server && !self.ignore_issuer.contains(rep);

        if is_present(value) {
            match direction {
                Direction::Request if server_issued => {
                    issues.add_error(ValidationError::must_not_be_provided(), true, &[]);
                }
                Direction::Request => {}
                Direction::Response if !self.may_return(attr, rep) => {
                    issues.add_error(ValidationError::must_not_be_returned(), true, &[]);
                }
                Direction::Response => {}
            }
            return issues;
        }

        let expected = self.attr_reps.is_empty()
            || (self.include == Some(true) && self.attr_reps.contains(rep))
            || (direction == Direction::Response && attr.returned() == Returned::Always);
        let issued_elsewhere = direction == Direction::Request && server_issued;
        if attr.required() && in_scope && !issued_elsewhere && expected {
            issues.add_error(ValidationError::missing(), false, &[]);
        }
        issues
    }

    fn may_return(&self, attr: &Attribute, rep: &BoundedAttrRep) -> bool {
        let listed = self.attr_reps.contains(rep);
        match attr.returned() {
            Returned::Always => true,
            Returned::Never => false,
            Returned::Request => {
                self.include == Some(true) && (listed || self.related_listed(rep))
            }
            Returned::Default => match self.include {
                Some(true) => listed || self.related_listed(rep),
                Some(false) => !listed,
                None => true,
            },
        }
    }

    /// Check whether a sub-attribute of `rep`, or the parent of `rep`, is
    /// listed.
    fn related_listed(&self, rep: &BoundedAttrRep) -> bool {
        self.attr_reps.iter().any(|listed| match rep.sub_attr() {
            None => listed.sub_attr().is_some() && listed.top_level() == *rep,
            Some(_) => listed.sub_attr().is_none() && rep.top_level() == *listed,
        })
    }
}

fn bound_rep(attr: &Attribute) -> Option<&BoundedAttrRep> {
    match attr.path() {
        AttrPath::Bound(rep) => Some(rep),
        AttrPath::Unbound(_) => None,
    }
}

fn is_present(value: &DataValue) -> bool {
    match value {
        DataValue::Missing | DataValue::Null => false,
        DataValue::String(text) => !text.is_empty(),
        DataValue::List(items) => !items.is_empty(),
        _ => true,
    }
}

fn child<const N: usize>(location: &Location, segments: [Segment; N]) -> Location {
    location.iter().cloned().chain(segments).collect()
}
