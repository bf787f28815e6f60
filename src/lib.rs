//! Form-design core: a tree of field nodes and the transforms that turn it
//! into a JSON Schema plus a renderer ui-schema (and back).

pub mod builder;
pub mod diagnostics;
pub mod export;
pub mod field;
pub mod naming;
pub mod registry;
pub mod render;
pub mod schema;
pub mod starter;
pub mod tree;
pub mod validate;

pub type Result<T> = anyhow::Result<T>;

pub use builder::{BuilderError, FormBuilder};
pub use field::{FieldId, FieldKind, FieldNode, Forest, IdAllocator, RawField};
pub use registry::{FieldTemplate, FieldTypeRegistry};
