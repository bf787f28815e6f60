//! Wire shape of a field forest.
//!
//! JSON shape:
//! [
//!   {
//!     "id": "field_1",
//!     "type": "object",              // registry type tag
//!     "label": "Address",            // display title
//!     "key": "address",              // property name
//!     "required": false,
//!     "schema": {},                  // JSON-Schema fragment
//!     "uischema": {"type": "Group"}, // renderer fragment
//!     "isLayout": true,
//!     "children": [ ... ],           // containers only
//!     "parentId": null
//!   }
//! ]
//!
//! The same array may also arrive wrapped as `{"fields": [...]}` (the export
//! document). We validate ids, derive each node's kind and repair stale
//! parent references.

use crate::Result;
use crate::diagnostics;
use crate::field::{FieldId, FieldKind, FieldNode, Forest, JsonObject};

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub id: FieldId,

    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub schema: JsonObject,

    #[serde(default)]
    pub uischema: JsonObject,

    #[serde(default)]
    pub is_layout: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawField>>,

    #[serde(default)]
    pub parent_id: Option<FieldId>,
}

impl From<RawField> for FieldNode {
    fn from(raw: RawField) -> Self {
        let children: Forest = raw
            .children
            .unwrap_or_default()
            .into_iter()
            .map(FieldNode::from)
            .collect();

        let kind = match raw.field_type.as_str() {
            "object" => FieldKind::Object { children },
            "array" => FieldKind::Array { children },
            _ if raw.is_layout => FieldKind::Layout { children },
            _ => {
                if !children.is_empty() {
                    diagnostics::warn(format!(
                        "field {} is not a container; dropping {} children",
                        raw.id,
                        children.len()
                    ));
                }
                FieldKind::Leaf
            }
        };

        FieldNode {
            id: raw.id,
            field_type: raw.field_type,
            label: raw.label,
            key: raw.key,
            required: raw.required,
            schema: raw.schema,
            uischema: raw.uischema,
            parent_id: raw.parent_id,
            kind,
        }
    }
}

impl From<FieldNode> for RawField {
    fn from(node: FieldNode) -> Self {
        let is_layout = node.is_layout();
        let children = match node.kind {
            FieldKind::Leaf => None,
            FieldKind::Object { children }
            | FieldKind::Array { children }
            | FieldKind::Layout { children } => {
                Some(children.into_iter().map(RawField::from).collect())
            }
        };

        RawField {
            id: node.id,
            field_type: node.field_type,
            label: node.label,
            key: node.key,
            required: node.required,
            schema: node.schema,
            uischema: node.uischema,
            is_layout,
            children,
            parent_id: node.parent_id,
        }
    }
}

/// Accepted top-level shapes for a fields file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldsInput {
    Bare(Vec<RawField>),
    Wrapped { fields: Vec<RawField> },
}

impl FieldsInput {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check ids and build the typed forest.
    ///
    /// 1) Every id is non-empty and unique across the whole forest.
    /// 2) Nodes are converted to their typed kind.
    /// 3) `parentId` back references are made to match containment.
    pub fn validate_and_build(self) -> Result<Forest> {
        let raw = match self {
            FieldsInput::Bare(fields) | FieldsInput::Wrapped { fields } => fields,
        };

        // Phase 1: ids.
        let mut seen: BTreeSet<FieldId> = BTreeSet::new();
        let mut stack: Vec<&RawField> = raw.iter().collect();
        while let Some(field) = stack.pop() {
            if field.id.as_str().trim().is_empty() {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "field of type '{}' has an empty id",
                        field.field_type
                    ))
                );
            }
            if !seen.insert(field.id.clone()) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!("duplicate field id: {}", field.id))
                );
            }
            if let Some(children) = &field.children {
                stack.extend(children.iter());
            }
        }

        // Phase 2: typed nodes.
        let mut forest: Forest = raw.into_iter().map(FieldNode::from).collect();

        // Phase 3: parent links.
        let repaired = crate::tree::relink_parents(&mut forest);
        if repaired > 0 {
            diagnostics::warn(format!("repaired {} stale parentId reference(s)", repaired));
        }

        Ok(forest)
    }
}

/// Read and validate a fields file.
pub fn load_forest(path: &str) -> Result<Forest> {
    use anyhow::Context;

    let text = std::fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read fields file {}", path)))?;
    FieldsInput::parse(&text)
        .with_context(|| diagnostics::error_message(format!("parse fields file {}", path)))?
        .validate_and_build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn kinds_follow_type_and_layout_flag() {
        let input = json!([
            {"id": "a", "type": "object", "key": "addr", "isLayout": true, "children": []},
            {"id": "b", "type": "array", "key": "tags"},
            {"id": "c", "type": "vertical-layout", "isLayout": true, "children": []},
            {"id": "d", "type": "text", "key": "name"}
        ]);
        let forest = serde_json::from_value::<FieldsInput>(input)
            .unwrap()
            .validate_and_build()
            .unwrap();

        assert!(matches!(forest[0].kind, FieldKind::Object { .. }));
        assert!(matches!(forest[1].kind, FieldKind::Array { .. }));
        assert!(matches!(forest[2].kind, FieldKind::Layout { .. }));
        assert!(matches!(forest[3].kind, FieldKind::Leaf));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let input = json!([
            {"id": "a", "type": "vertical-layout", "isLayout": true,
             "children": [{"id": "a", "type": "text", "key": "x"}]}
        ]);
        let err = serde_json::from_value::<FieldsInput>(input)
            .unwrap()
            .validate_and_build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate field id: a"));
    }

    #[test]
    fn stale_parent_ids_are_repaired() {
        let input = json!({"fields": [
            {"id": "g", "type": "group", "isLayout": true, "parentId": "nope",
             "children": [{"id": "t", "type": "text", "key": "x", "parentId": "elsewhere"}]}
        ]});
        let forest = serde_json::from_value::<FieldsInput>(input)
            .unwrap()
            .validate_and_build()
            .unwrap();
        assert_eq!(forest[0].parent_id, None);
        assert_eq!(forest[0].children()[0].parent_id, Some(FieldId::new("g")));
    }

    #[test]
    fn serialized_shape_uses_camel_case() {
        let node = FieldNode::object(
            FieldId::new("o"),
            "Address",
            "address",
            vec![FieldNode::leaf(FieldId::new("c"), "text", "City", "city")],
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["isLayout"], json!(true));
        assert_eq!(value["parentId"], json!(null));
        assert_eq!(value["children"][0]["parentId"], json!("o"));
        assert!(value["children"][0].get("children").is_none());
    }
}
