//! Attributes shared by every resource schema.
//!
//! RFC 7643 section 3.1 defines `id`, `externalId` and `meta` for all
//! resources, and section 3 the `schemas` attribute listing the schema URIs a
//! resource conforms to.

use crate::attributes::{
    Attribute, AttributeIssuer, AttributeKind, Attrs, Mutability, ReferenceKind, Returned,
    Uniqueness,
};
use crate::error::ScimResult;

/// Names of the attributes excluded from a schema's own attribute list.
pub const COMMON_ATTRIBUTES: [&str; 4] = ["schemas", "id", "externalId", "meta"];

pub fn schemas() -> ScimResult<Attribute> {
    Attribute::builder("schemas", AttributeKind::Reference(ReferenceKind::Uri))
        .with_description("Schema URIs the resource conforms to")
        .with_required(true)
        .with_multi_valued(true)
        .with_mutability(Mutability::ReadOnly)
        .with_returned(Returned::Always)
        .build()
}

pub fn id() -> ScimResult<Attribute> {
    Attribute::builder("id", AttributeKind::String)
        .with_description("Unique identifier for the resource, assigned by the service provider")
        .with_required(true)
        .with_issuer(AttributeIssuer::Server)
        .with_case_exact(true)
        .with_mutability(Mutability::ReadOnly)
        .with_returned(Returned::Always)
        .with_uniqueness(Uniqueness::Server)
        .build()
}

pub fn external_id() -> ScimResult<Attribute> {
    Attribute::builder("externalId", AttributeKind::String)
        .with_description("Identifier of the resource as defined by the provisioning client")
        .with_issuer(AttributeIssuer::Client)
        .with_case_exact(true)
        .build()
}

pub fn meta() -> ScimResult<Attribute> {
    let server_read_only = |name: &str, kind: AttributeKind| {
        Attribute::builder(name, kind)
            .with_issuer(AttributeIssuer::Server)
            .with_mutability(Mutability::ReadOnly)
    };

    Attribute::builder(
        "meta",
        AttributeKind::Complex(Attrs::new([
            server_read_only("resourceType", AttributeKind::String)
                .with_case_exact(true)
                .build()?,
            server_read_only("created", AttributeKind::DateTime).build()?,
            server_read_only("lastModified", AttributeKind::DateTime).build()?,
            server_read_only("location", AttributeKind::Reference(ReferenceKind::Uri)).build()?,
            server_read_only("version", AttributeKind::String)
                .with_case_exact(true)
                .build()?,
        ])),
    )
    .with_description("Resource metadata maintained by the service provider")
    .with_issuer(AttributeIssuer::Server)
    .with_mutability(Mutability::ReadOnly)
    .build()
}

/// Build the common attributes in declaration order.
pub fn common_attributes() -> ScimResult<Vec<Attribute>> {
    Ok(vec![schemas()?, id()?, external_id()?, meta()?])
}
