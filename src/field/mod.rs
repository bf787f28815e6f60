//! Field node model.
//!
//! A form design is a forest of `FieldNode`s. Every node carries the common
//! fields (id, type tag, label, key, schema/uischema fragments); what it can
//! contain is decided by its `FieldKind`.

pub mod id;
pub mod raw;

pub use id::{FieldId, IdAllocator};
pub use raw::{FieldsInput, RawField};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object used for schema and ui-schema fragments.
pub type JsonObject = Map<String, Value>;

/// Top-level ordered sequence of root nodes.
pub type Forest = Vec<FieldNode>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Collects a single value.
    Leaf,
    /// Nested object property; its children form the object's properties.
    Object { children: Forest },
    /// Array property; children (if any) are the item template.
    Array { children: Forest },
    /// Vertical/horizontal layout or group. Transparent to the schema.
    Layout { children: Forest },
}

impl FieldKind {
    pub fn children(&self) -> &[FieldNode] {
        match self {
            FieldKind::Leaf => &[],
            FieldKind::Object { children }
            | FieldKind::Array { children }
            | FieldKind::Layout { children } => children,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Forest> {
        match self {
            FieldKind::Leaf => None,
            FieldKind::Object { children }
            | FieldKind::Array { children }
            | FieldKind::Layout { children } => Some(children),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct FieldNode {
    pub id: FieldId,
    /// Registry type tag (`text`, `object`, `vertical-layout`, ...).
    pub field_type: String,
    pub label: String,
    pub key: String,
    pub required: bool,
    pub schema: JsonObject,
    pub uischema: JsonObject,
    /// Lookup-only back reference; ownership is the containing `children`.
    pub parent_id: Option<FieldId>,
    pub kind: FieldKind,
}

impl FieldNode {
    fn with_kind(id: FieldId, field_type: &str, label: &str, key: &str, kind: FieldKind) -> Self {
        let mut node = Self {
            id,
            field_type: field_type.to_string(),
            label: label.to_string(),
            key: key.to_string(),
            required: false,
            schema: JsonObject::new(),
            uischema: JsonObject::new(),
            parent_id: None,
            kind,
        };
        node.adopt_children();
        node
    }

    pub fn leaf(id: FieldId, field_type: &str, label: &str, key: &str) -> Self {
        Self::with_kind(id, field_type, label, key, FieldKind::Leaf)
    }

    pub fn object(id: FieldId, label: &str, key: &str, children: Forest) -> Self {
        Self::with_kind(id, "object", label, key, FieldKind::Object { children })
    }

    pub fn array(id: FieldId, label: &str, key: &str, children: Forest) -> Self {
        Self::with_kind(id, "array", label, key, FieldKind::Array { children })
    }

    /// Layout container; `ui_type` is the renderer layout type
    /// (`VerticalLayout`, `HorizontalLayout`, `Group`).
    pub fn layout(id: FieldId, field_type: &str, label: &str, ui_type: &str, children: Forest) -> Self {
        let mut node = Self::with_kind(id, field_type, label, "", FieldKind::Layout { children });
        node.uischema
            .insert("type".to_string(), Value::String(ui_type.to_string()));
        node
    }

    /// Replace the schema fragment. Non-object values are ignored.
    pub fn with_schema(mut self, schema: Value) -> Self {
        if let Value::Object(map) = schema {
            self.schema = map;
        }
        self
    }

    /// Replace the ui-schema fragment. Non-object values are ignored.
    pub fn with_uischema(mut self, uischema: Value) -> Self {
        if let Value::Object(map) = uischema {
            self.uischema = map;
        }
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Objects and layouts arrange children instead of holding a value.
    pub fn is_layout(&self) -> bool {
        matches!(self.kind, FieldKind::Object { .. } | FieldKind::Layout { .. })
    }

    /// Anything that may hold children.
    pub fn is_container(&self) -> bool {
        !matches!(self.kind, FieldKind::Leaf)
    }

    pub fn children(&self) -> &[FieldNode] {
        self.kind.children()
    }

    pub fn children_mut(&mut self) -> Option<&mut Forest> {
        self.kind.children_mut()
    }

    /// `uischema.options.hidden == true`.
    pub fn is_hidden(&self) -> bool {
        self.uischema
            .get("options")
            .and_then(|o| o.get("hidden"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Point every direct child's `parent_id` at this node.
    pub fn adopt_children(&mut self) {
        let id = self.id.clone();
        if let Some(children) = self.kind.children_mut() {
            for child in children {
                child.parent_id = Some(id.clone());
            }
        }
    }
}
