//! Validation tests module.
//!
//! Each module validates RFC 7643 example resources modified to break one
//! rule, and checks the issues reported at the affected location.

pub mod common_attributes;
pub mod multi_valued;
pub mod schema_structure;

// Re-export commonly used test utilities
pub use crate::common::{
    builders::UserBuilder,
    data, error_codes,
    fixtures::{self, Schemas, schemas},
};

// Re-export assertion macros
pub use crate::{assert_errors_at, assert_no_errors, assert_warnings_at};
