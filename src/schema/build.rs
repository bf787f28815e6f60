//! Fold a field forest into JSON Schema `properties` / `required`.
//!
//! Layouts are transparent: their children land in the enclosing level.
//! Objects and item-templated arrays open a new level. Property order
//! follows the forest, and a repeated key overwrites the earlier entry in
//! place (see `validate::duplicate_keys`).

use crate::field::{FieldKind, FieldNode, JsonObject};

use serde::Serialize;
use serde_json::Value;

/// Array constraints carried over from the node's own schema when the array
/// has an item template.
const ARRAY_CONSTRAINTS: [&str; 4] = ["minItems", "maxItems", "uniqueItems", "tableView"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFragment {
    pub properties: JsonObject,
    pub required: Vec<String>,
    /// Dotted key path of every object node (array items as `key[]`) to the
    /// object schema emitted for it.
    pub nested_objects: JsonObject,
}

impl SchemaFragment {
    /// Wrap as a complete root schema.
    pub fn to_json_schema(&self) -> Value {
        let mut root = JsonObject::new();
        root.insert("type".into(), Value::from("object"));
        root.insert("properties".into(), Value::Object(self.properties.clone()));
        root.insert(
            "required".into(),
            Value::Array(self.required.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(root)
    }

    fn push_required(&mut self, key: &str) {
        if !self.required.iter().any(|k| k == key) {
            self.required.push(key.to_string());
        }
    }

    /// `{type: 'object', properties, required?}` for a nested level.
    fn into_object_schema(self, title: Option<&str>) -> JsonObject {
        let mut obj = JsonObject::new();
        obj.insert("type".into(), Value::from("object"));
        if let Some(title) = title {
            obj.insert("title".into(), Value::from(title));
        }
        obj.insert("properties".into(), Value::Object(self.properties));
        if !self.required.is_empty() {
            obj.insert(
                "required".into(),
                Value::Array(self.required.into_iter().map(Value::String).collect()),
            );
        }
        obj
    }
}

pub fn build_schema_from_fields(forest: &[FieldNode]) -> SchemaFragment {
    let mut out = SchemaFragment::default();
    fold(forest, "", &mut out);
    out
}

/// Shorthand for `build_schema_from_fields(forest).to_json_schema()`.
pub fn build_json_schema(forest: &[FieldNode]) -> Value {
    build_schema_from_fields(forest).to_json_schema()
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn fold(forest: &[FieldNode], path: &str, out: &mut SchemaFragment) {
    for node in forest {
        if let FieldKind::Layout { children } = &node.kind {
            fold(children, path, out);
            continue;
        }

        // Value-holding nodes without a key have nowhere to go.
        if node.key.is_empty() {
            tracing::debug!(id = %node.id, "skipping keyless field during schema build");
            continue;
        }

        let property = match &node.kind {
            FieldKind::Layout { .. } => continue,
            FieldKind::Leaf => leaf_schema(node),
            FieldKind::Object { children } => {
                let child_path = join_path(path, &node.key);
                let mut inner = SchemaFragment::default();
                fold(children, &child_path, &mut inner);

                let nested = std::mem::take(&mut inner.nested_objects);
                let obj = inner.into_object_schema(Some(node.label.as_str()));
                out.nested_objects.extend(nested);
                out.nested_objects
                    .insert(child_path, Value::Object(obj.clone()));
                obj
            }
            FieldKind::Array { children } if !children.is_empty() => {
                let item_path = format!("{}[]", join_path(path, &node.key));
                let mut inner = SchemaFragment::default();
                fold(children, &item_path, &mut inner);

                let nested = std::mem::take(&mut inner.nested_objects);
                out.nested_objects.extend(nested);

                let mut arr = JsonObject::new();
                arr.insert("type".into(), Value::from("array"));
                arr.insert("title".into(), Value::from(node.label.as_str()));
                arr.insert("items".into(), Value::Object(inner.into_object_schema(None)));
                for key in ARRAY_CONSTRAINTS {
                    if let Some(v) = node.schema.get(key) {
                        arr.insert(key.into(), v.clone());
                    }
                }
                arr
            }
            FieldKind::Array { .. } => primitive_array_schema(node),
        };

        if node.required {
            out.push_required(&node.key);
        }
        out.properties.insert(node.key.clone(), Value::Object(property));
    }
}

fn leaf_schema(node: &FieldNode) -> JsonObject {
    let mut prop = node.schema.clone();
    prop.insert("title".into(), Value::from(node.label.as_str()));
    prop
}

/// Array without an item template: everything in `schema` except `type`.
fn primitive_array_schema(node: &FieldNode) -> JsonObject {
    let mut prop = JsonObject::new();
    prop.insert("type".into(), Value::from("array"));
    prop.insert("title".into(), Value::from(node.label.as_str()));
    for (k, v) in &node.schema {
        if k != "type" && k != "title" {
            prop.insert(k.clone(), v.clone());
        }
    }
    prop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn id(s: &str) -> FieldId {
        FieldId::new(s)
    }

    #[test]
    fn object_nests_properties_and_required() {
        let city = FieldNode::leaf(id("c"), "text", "City", "city")
            .with_schema(json!({"type": "string"}))
            .with_required(true);
        let forest = vec![FieldNode::object(id("a"), "Address", "address", vec![city])];

        let out = build_schema_from_fields(&forest);
        assert_eq!(
            Value::Object(out.properties.clone()),
            json!({
                "address": {
                    "type": "object",
                    "title": "Address",
                    "properties": {"city": {"type": "string", "title": "City"}},
                    "required": ["city"]
                }
            })
        );
        assert!(out.required.is_empty());
        assert!(out.nested_objects.contains_key("address"));
    }

    #[test]
    fn primitive_array_copies_schema() {
        let tags = FieldNode::array(id("t"), "Tags", "tags", vec![]).with_schema(json!({
            "type": "array",
            "items": {"type": "string"},
            "uniqueItems": true
        }));

        let out = build_schema_from_fields(&[tags]);
        assert_eq!(
            out.properties["tags"],
            json!({"type": "array", "title": "Tags", "items": {"type": "string"}, "uniqueItems": true})
        );
    }

    #[test]
    fn array_without_items_degrades_to_minimal() {
        let list = FieldNode::array(id("l"), "List", "list", vec![]);
        let out = build_schema_from_fields(&[list]);
        assert_eq!(out.properties["list"], json!({"type": "array", "title": "List"}));
    }

    #[test]
    fn templated_array_builds_item_object() {
        let name = FieldNode::leaf(id("n"), "text", "Name", "name")
            .with_schema(json!({"type": "string"}))
            .with_required(true);
        let people = FieldNode::array(id("p"), "People", "people", vec![name])
            .with_schema(json!({"type": "array", "minItems": 1, "tableView": true}));

        let out = build_schema_from_fields(&[people]);
        assert_eq!(
            out.properties["people"],
            json!({
                "type": "array",
                "title": "People",
                "items": {
                    "type": "object",
                    "properties": {"name": {"type": "string", "title": "Name"}},
                    "required": ["name"]
                },
                "minItems": 1,
                "tableView": true
            })
        );
    }

    #[test]
    fn layouts_are_transparent() {
        let first = FieldNode::leaf(id("f"), "text", "First", "first").with_required(true);
        let last = FieldNode::leaf(id("l"), "text", "Last", "last");
        let row = FieldNode::layout(id("row"), "horizontal-layout", "", "HorizontalLayout", vec![first, last]);
        let group = FieldNode::layout(id("g"), "group", "Person", "Group", vec![row]);

        let out = build_schema_from_fields(&[group]);
        let keys: Vec<&String> = out.properties.keys().collect();
        assert_eq!(keys, vec!["first", "last"]);
        assert_eq!(out.required, vec!["first".to_string()]);
    }

    #[test]
    fn empty_layout_emits_nothing() {
        let empty = FieldNode::layout(id("v"), "vertical-layout", "", "VerticalLayout", vec![]);
        let out = build_schema_from_fields(&[empty]);
        assert!(out.properties.is_empty());
    }

    #[test]
    fn duplicate_keys_last_writer_wins() {
        let a = FieldNode::leaf(id("a"), "text", "First", "name").with_schema(json!({"type": "string"}));
        let b = FieldNode::leaf(id("b"), "number", "Second", "name").with_schema(json!({"type": "number"}));
        let forest = vec![FieldNode::object(id("o"), "Obj", "obj", vec![a, b])];

        let out = build_schema_from_fields(&forest);
        let props = out.properties["obj"]["properties"].as_object().unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["name"], json!({"type": "number", "title": "Second"}));
    }

    #[test]
    fn root_schema_always_lists_required() {
        let out = build_json_schema(&[]);
        assert_eq!(out, json!({"type": "object", "properties": {}, "required": []}));
    }
}
