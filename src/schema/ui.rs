//! Fold a field forest into the renderer's ui-schema tree.

use crate::field::{FieldKind, FieldNode, JsonObject};

use serde_json::{Value, json};

/// Root ui-schema: a vertical layout over the whole forest.
pub fn build_uischema_from_fields(forest: &[FieldNode]) -> Value {
    json!({
        "type": "VerticalLayout",
        "elements": build_ui_elements(forest, &[]),
    })
}

/// `#/properties/a/properties/b/properties/<key>`
pub fn scope_for(parent_keys: &[String], key: &str) -> String {
    let mut scope = String::from("#");
    for k in parent_keys.iter().map(String::as_str).chain(std::iter::once(key)) {
        scope.push_str("/properties/");
        scope.push_str(k);
    }
    scope
}

/// Ui-schema elements for `forest`, with scopes nested under `parent_keys`.
/// Keyless value nodes get no control, matching the schema builder.
pub fn build_ui_elements(forest: &[FieldNode], parent_keys: &[String]) -> Vec<Value> {
    forest
        .iter()
        .filter(|node| !node.is_hidden())
        .filter(|node| matches!(node.kind, FieldKind::Layout { .. }) || !node.key.is_empty())
        .map(|node| match &node.kind {
            FieldKind::Layout { children } => {
                let ui_type = match node.field_type.as_str() {
                    "group" => "Group",
                    _ => node
                        .uischema
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("VerticalLayout"),
                };
                container_element(node, ui_type, build_ui_elements(children, parent_keys))
            }
            FieldKind::Object { children } => {
                let mut keys = parent_keys.to_vec();
                keys.push(node.key.clone());
                container_element(node, "Group", build_ui_elements(children, &keys))
            }
            FieldKind::Array { children } => array_element(node, parent_keys, children),
            FieldKind::Leaf => {
                let mut el = node.uischema.clone();
                el.insert("scope".into(), Value::from(scope_for(parent_keys, &node.key)));
                el.insert("label".into(), Value::from(node.label.as_str()));
                Value::Object(el)
            }
        })
        .collect()
}

fn container_element(node: &FieldNode, ui_type: &str, elements: Vec<Value>) -> Value {
    let mut el = JsonObject::new();
    el.insert("type".into(), Value::from(ui_type));
    el.insert("label".into(), Value::from(node.label.as_str()));
    if let Some(icon) = node.uischema.get("icon") {
        el.insert("icon".into(), icon.clone());
    }
    if let Some(options) = node.uischema.get("options") {
        el.insert("options".into(), options.clone());
    }
    el.insert("elements".into(), Value::Array(elements));
    Value::Object(el)
}

/// Arrays render as one control; an item template becomes `options.detail`
/// whose scopes are relative to a single item.
fn array_element(node: &FieldNode, parent_keys: &[String], children: &[FieldNode]) -> Value {
    let mut options = JsonObject::new();
    options.insert("addable".into(), Value::Bool(true));
    if let Some(Value::Object(own)) = node.uischema.get("options") {
        for (k, v) in own {
            options.insert(k.clone(), v.clone());
        }
    }
    options.insert("showSortButtons".into(), Value::Bool(true));
    if !children.is_empty() {
        options.insert(
            "detail".into(),
            json!({
                "type": "VerticalLayout",
                "elements": build_ui_elements(children, &[]),
            }),
        );
    }

    json!({
        "type": "Control",
        "scope": scope_for(parent_keys, &node.key),
        "options": options,
    })
}
