//! JSON Schema → field forest.
//!
//! The inverse of `build` is lossy: anything the schema does not say about
//! presentation (icons, widget choice, layout) comes from registry defaults.

use crate::field::{FieldNode, Forest, IdAllocator, JsonObject};
use crate::naming::humanize_key;
use crate::registry::FieldTypeRegistry;

use serde_json::{Value, json};

/// Convert `schema.properties` (in order) into a forest of fresh nodes.
pub fn convert_schema_to_fields(
    schema: &Value,
    registry: &FieldTypeRegistry,
    ids: &mut IdAllocator,
) -> Forest {
    let forest = convert_level(schema, registry, ids);
    tracing::debug!(roots = forest.len(), "converted schema to fields");
    forest
}

fn convert_level(schema: &Value, registry: &FieldTypeRegistry, ids: &mut IdAllocator) -> Forest {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(key, property)| {
            convert_property(key, property, registry, ids)
                .with_required(required.contains(&key.as_str()))
        })
        .collect()
}

fn convert_property(
    key: &str,
    property: &Value,
    registry: &FieldTypeRegistry,
    ids: &mut IdAllocator,
) -> FieldNode {
    let label = property
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| humanize_key(key));
    let items = property.get("items");
    let items_type = items.and_then(|i| i.get("type")).and_then(Value::as_str);

    match property.get("type").and_then(Value::as_str) {
        Some("object") if property.get("properties").is_some_and(Value::is_object) => {
            let id = ids.next_id();
            let wrapper_id = ids.next_id();
            let children = convert_level(property, registry, ids);
            let wrapper = FieldNode::layout(wrapper_id, "vertical-layout", "", "VerticalLayout", children);
            FieldNode::object(id, &label, key, vec![wrapper])
                .with_uischema(template_uischema(registry, "object"))
        }
        Some("array") if items_type == Some("object") => {
            let id = ids.next_id();
            let children = items
                .map(|i| convert_level(i, registry, ids))
                .unwrap_or_default();
            FieldNode::array(id, &label, key, children)
                .with_schema(Value::Object(without(property, &["title"])))
                .with_uischema(template_uischema(registry, "array"))
        }
        Some("array") if items.is_some_and(|i| i.get("enum").is_some()) => {
            FieldNode::leaf(ids.next_id(), "multiselect", &label, key)
                .with_schema(Value::Object(without(property, &["title"])))
                .with_uischema(json!({
                    "type": "Control",
                    "options": {"multi": true, "format": "dynamicselect"},
                }))
        }
        _ => {
            let type_id = pick_template(property);
            let id = ids.next_id();
            let mut node = match registry.get(type_id) {
                Some(template) => template.instantiate(id, &label, key),
                None => FieldNode::leaf(id, type_id, &label, key)
                    .with_uischema(json!({"type": "Control"})),
            };
            for (k, v) in without(property, &["title"]) {
                node.schema.insert(k, v);
            }
            node
        }
    }
}

/// Best-fit built-in type for a plain property.
pub fn pick_template(property: &Value) -> &'static str {
    match property.get("enum").and_then(Value::as_array).map(Vec::len) {
        Some(n) if n <= 3 => return "radio",
        Some(_) => return "select",
        None => {}
    }
    match property.get("format").and_then(Value::as_str) {
        Some("email") => return "email",
        Some("date") => return "date",
        Some("date-time") => return "datetime",
        Some("time") => return "time",
        _ => {}
    }
    if property
        .get("maxLength")
        .and_then(Value::as_u64)
        .is_some_and(|n| n > 100)
    {
        return "textarea";
    }
    match property.get("type").and_then(Value::as_str) {
        Some("number") => "number",
        Some("integer") => "integer",
        Some("boolean") => "checkbox",
        Some("array") => "array",
        Some("object") => "object",
        _ => "text",
    }
}

fn template_uischema(registry: &FieldTypeRegistry, type_id: &str) -> Value {
    registry
        .get(type_id)
        .map(|t| t.uischema.clone())
        .unwrap_or_else(|| json!({"type": "Control"}))
}

/// Copy of `value`'s object entries minus `skip`.
fn without(value: &Value, skip: &[&str]) -> JsonObject {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter(|(k, _)| !skip.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}
