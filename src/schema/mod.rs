//! Transforms between the field forest and the renderer documents.
//!
//! - build: forest -> JSON Schema properties/required
//! - ui: forest -> ui-schema element tree
//! - convert: JSON Schema -> forest

pub mod build;
pub mod convert;
pub mod ui;

pub use build::{SchemaFragment, build_json_schema, build_schema_from_fields};
pub use convert::convert_schema_to_fields;
pub use ui::{build_ui_elements, build_uischema_from_fields};
