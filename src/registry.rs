//! Catalog of field and layout types offered by the palette.
//!
//! Each template carries the default schema/uischema fragments a freshly
//! added node starts from. Hosts may register their own templates; the core
//! only ever looks types up by id or lists them.

use crate::field::{FieldId, FieldNode};

use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTemplate {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub category: Category,
    pub is_layout: bool,
    pub schema: Value,
    pub uischema: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Input,
    Choice,
    Container,
    Layout,
}

impl FieldTemplate {
    fn new(id: &str, label: &str, icon: &str, category: Category, schema: Value, uischema: Value) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            category,
            is_layout: matches!(category, Category::Layout) || id == "object",
            schema,
            uischema,
        }
    }

    /// Build a node of this type. Containers start empty.
    pub fn instantiate(&self, id: FieldId, label: &str, key: &str) -> FieldNode {
        let node = match self.id.as_str() {
            "object" => FieldNode::object(id, label, key, Vec::new()),
            "array" => FieldNode::array(id, label, key, Vec::new()),
            _ if self.is_layout => {
                let ui_type = self
                    .uischema
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("VerticalLayout");
                FieldNode::layout(id, &self.id, label, ui_type, Vec::new())
            }
            _ => FieldNode::leaf(id, &self.id, label, key),
        };
        node.with_schema(self.schema.clone())
            .with_uischema(self.uischema.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    templates: Vec<FieldTemplate>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FieldTypeRegistry {
    pub fn empty() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        use Category::*;

        let control = || json!({"type": "Control"});
        let templates = vec![
            FieldTemplate::new("text", "Text", "type", Input, json!({"type": "string"}), control()),
            FieldTemplate::new(
                "textarea",
                "Text Area",
                "align-left",
                Input,
                json!({"type": "string"}),
                json!({"type": "Control", "options": {"multi": true}}),
            ),
            FieldTemplate::new("number", "Number", "hash", Input, json!({"type": "number"}), control()),
            FieldTemplate::new("integer", "Integer", "hash", Input, json!({"type": "integer"}), control()),
            FieldTemplate::new(
                "email",
                "Email",
                "mail",
                Input,
                json!({"type": "string", "format": "email"}),
                control(),
            ),
            FieldTemplate::new(
                "password",
                "Password",
                "lock",
                Input,
                json!({"type": "string"}),
                json!({"type": "Control", "options": {"format": "password"}}),
            ),
            FieldTemplate::new(
                "date",
                "Date",
                "calendar",
                Input,
                json!({"type": "string", "format": "date"}),
                control(),
            ),
            FieldTemplate::new(
                "time",
                "Time",
                "clock",
                Input,
                json!({"type": "string", "format": "time"}),
                control(),
            ),
            FieldTemplate::new(
                "datetime",
                "Date & Time",
                "calendar-clock",
                Input,
                json!({"type": "string", "format": "date-time"}),
                control(),
            ),
            FieldTemplate::new("checkbox", "Checkbox", "check-square", Choice, json!({"type": "boolean"}), control()),
            FieldTemplate::new(
                "switch",
                "Switch",
                "toggle-left",
                Choice,
                json!({"type": "boolean"}),
                json!({"type": "Control", "options": {"toggle": true}}),
            ),
            FieldTemplate::new(
                "radio",
                "Radio Group",
                "circle-dot",
                Choice,
                json!({"type": "string", "enum": ["Option 1", "Option 2"]}),
                json!({"type": "Control", "options": {"format": "radio"}}),
            ),
            FieldTemplate::new(
                "select",
                "Select",
                "chevron-down",
                Choice,
                json!({"type": "string", "enum": ["Option 1", "Option 2", "Option 3"]}),
                control(),
            ),
            FieldTemplate::new(
                "multiselect",
                "Multi Select",
                "list-checks",
                Choice,
                json!({"type": "array", "items": {"type": "string", "enum": ["Option 1", "Option 2"]}, "uniqueItems": true}),
                json!({"type": "Control", "options": {"multi": true, "format": "dynamicselect"}}),
            ),
            FieldTemplate::new("object", "Object", "braces", Container, json!({}), json!({"type": "Group"})),
            FieldTemplate::new(
                "array",
                "Array",
                "list",
                Container,
                json!({"type": "array", "items": {"type": "string"}}),
                control(),
            ),
            FieldTemplate::new(
                "vertical-layout",
                "Vertical Layout",
                "rows",
                Layout,
                json!({}),
                json!({"type": "VerticalLayout"}),
            ),
            FieldTemplate::new(
                "horizontal-layout",
                "Horizontal Layout",
                "columns",
                Layout,
                json!({}),
                json!({"type": "HorizontalLayout"}),
            ),
            FieldTemplate::new("group", "Group", "square", Layout, json!({}), json!({"type": "Group"})),
        ];

        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&FieldTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[FieldTemplate] {
        &self.templates
    }

    /// Add a template, replacing any existing one with the same id.
    pub fn register(&mut self, template: FieldTemplate) {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(slot) => *slot = template,
            None => self.templates.push(template),
        }
    }
}
