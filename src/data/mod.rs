//! Instance data model.
//!
//! Raw JSON is normalized into a [`ScimData`] container whose keys compare
//! case-insensitively and whose values are [`DataValue`]s. Attribute paths,
//! schema URIs and plain names all address values through [`DataKey`].

pub mod container;
pub mod value;

pub use container::{DataKey, ScimData};
pub use value::DataValue;
