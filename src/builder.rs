//! Builder controller: the single owner of the field forest.
//!
//! Every edit goes through here. After each successful mutation the schema
//! and ui-schema are rebuilt from scratch, preview data is fitted to the new
//! schema, and the host is told if anything it persists changed.

use crate::diagnostics;
use crate::export::ExportDocument;
use crate::field::{FieldId, FieldNode, Forest, IdAllocator, JsonObject};
use crate::naming::{slugify_label, unique_key};
use crate::registry::FieldTypeRegistry;
use crate::render::{FormRenderer, RenderInput, RendererConfig, reconcile_data};
use crate::schema::{build_json_schema, build_uischema_from_fields, convert_schema_to_fields};
use crate::starter::{StarterSchema, find_starter};
use crate::tree::{self, PlacementHint};
use crate::validate::{self, DuplicateKey};

use serde_json::{Value, json};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Editor text that does not parse. `detail` carries the parser message.
    #[error("Invalid JSON format")]
    InvalidJson { detail: String },

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("unknown starter schema: {0}")]
    UnknownStarter(String),

    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("field cannot be placed there")]
    InvalidPlacement,

    #[error("field id already in use: {0}")]
    DuplicateId(FieldId),
}

/// Called with `(schema, uischema)` whenever either changes.
pub type ChangeCallback = Box<dyn FnMut(&Value, &Value)>;

/// Receives the export document instead of it being returned for download.
pub type ExportCallback = Box<dyn FnMut(&ExportDocument)>;

pub struct FormBuilder {
    fields: Forest,
    ids: IdAllocator,
    registry: FieldTypeRegistry,
    starters: Vec<StarterSchema>,
    config: RendererConfig,
    schema: Value,
    uischema: Value,
    data: Value,
    selected: Option<FieldId>,
    on_change: Option<ChangeCallback>,
    on_export: Option<ExportCallback>,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new(FieldTypeRegistry::builtin())
    }
}

impl FormBuilder {
    pub fn new(registry: FieldTypeRegistry) -> Self {
        let fields = Forest::new();
        Self {
            schema: build_json_schema(&fields),
            uischema: build_uischema_from_fields(&fields),
            fields,
            ids: IdAllocator::new(),
            registry,
            starters: Vec::new(),
            config: RendererConfig::default(),
            data: json!({}),
            selected: None,
            on_change: None,
            on_export: None,
        }
    }

    pub fn with_starters(mut self, starters: Vec<StarterSchema>) -> Self {
        self.starters = starters;
        self
    }

    pub fn with_config(mut self, config: RendererConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_change(&mut self, callback: impl FnMut(&Value, &Value) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn on_export(&mut self, callback: impl FnMut(&ExportDocument) + 'static) {
        self.on_export = Some(Box::new(callback));
    }

    pub fn fields(&self) -> &[FieldNode] {
        &self.fields
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn uischema(&self) -> &Value {
        &self.uischema
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }

    pub fn starters(&self) -> &[StarterSchema] {
        &self.starters
    }

    pub fn selected(&self) -> Option<&FieldNode> {
        self.selected
            .as_ref()
            .and_then(|id| tree::find_by_id(&self.fields, id))
    }

    /// Replace the whole forest (e.g. a loaded fields file). Id allocation
    /// resumes after the highest id present.
    pub fn load_fields(&mut self, fields: Forest) {
        self.ids = IdAllocator::resume_after(&fields);
        self.fields = fields;
        self.selected = None;
        self.recompute();
    }

    pub fn select(&mut self, id: &FieldId) -> bool {
        if tree::find_by_id(&self.fields, id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Add a node of `type_id`.
    ///
    /// With a placement the node goes into that container; otherwise it
    /// follows the selected node, or is appended at the root. The new node
    /// becomes the selection.
    pub fn add_field(
        &mut self,
        type_id: &str,
        placement: Option<&PlacementHint>,
    ) -> Result<FieldId, BuilderError> {
        let template = self
            .registry
            .get(type_id)
            .ok_or_else(|| BuilderError::UnknownFieldType(type_id.to_string()))?;

        let key = if template.is_layout && template.id != "object" {
            String::new()
        } else {
            unique_key(&slugify_label(&template.label), &self.all_keys())
        };
        let id = self.ids.next_id();
        let node = template.instantiate(id.clone(), &template.label, &key);

        let after = match placement {
            Some(_) => None,
            None => self.selected.clone(),
        };
        tree::insert_after(&mut self.fields, node, after.as_ref(), placement)
            .map_err(|_| BuilderError::InvalidPlacement)?;

        tracing::debug!(%id, type_id, "added field");
        self.selected = Some(id.clone());
        self.recompute();
        Ok(id)
    }

    pub fn move_field(&mut self, id: &FieldId, target_parent: Option<&FieldId>, index: usize) -> bool {
        let moved = tree::move_to(&mut self.fields, id, target_parent, index);
        if moved {
            tracing::debug!(%id, ?target_parent, index, "moved field");
            self.recompute();
        }
        moved
    }

    pub fn reorder_field(&mut self, active: &FieldId, over: &FieldId, hint: Option<&PlacementHint>) -> bool {
        let moved = tree::reorder_relative(&mut self.fields, active, over, hint);
        if moved {
            tracing::debug!(%active, %over, "reordered field");
            self.recompute();
        }
        moved
    }

    /// Commit an edited node, replacing the one with the same id.
    ///
    /// Ids inside `updated` may only repeat ids from the subtree being
    /// replaced; anything else would leave two nodes with one id.
    pub fn update_field(&mut self, updated: FieldNode) -> Result<(), BuilderError> {
        let Some(current) = tree::find_by_id(&self.fields, &updated.id) else {
            return Err(BuilderError::FieldNotFound(updated.id));
        };
        let replaced: HashSet<FieldId> =
            tree::collect_all_ids(std::slice::from_ref(current)).into_iter().collect();
        let elsewhere: HashSet<FieldId> = tree::collect_all_ids(&self.fields)
            .into_iter()
            .filter(|id| !replaced.contains(id))
            .collect();

        let mut seen = HashSet::new();
        for id in tree::collect_all_ids(std::slice::from_ref(&updated)) {
            if elsewhere.contains(&id) || !seen.insert(id.clone()) {
                return Err(BuilderError::DuplicateId(id));
            }
        }

        tracing::debug!(id = %updated.id, "updated field");
        let fields = std::mem::take(&mut self.fields);
        self.fields = tree::replace_by_id(fields, updated);
        self.ids.observe(&self.fields);
        self.recompute();
        Ok(())
    }

    /// Remove a node and its subtree.
    pub fn delete_field(&mut self, id: &FieldId) -> Option<FieldNode> {
        let removed = tree::remove_by_id(&mut self.fields, id)?;
        if let Some(sel) = &self.selected {
            if tree::find_by_id(std::slice::from_ref(&removed), sel).is_some() {
                self.selected = None;
            }
        }
        tracing::debug!(%id, removed = tree::subtree_size(&removed), "deleted field");
        self.recompute();
        Some(removed)
    }

    /// Properties editor: replace one node's schema fragment from text.
    pub fn edit_field_schema_text(&mut self, id: &FieldId, text: &str) -> Result<(), BuilderError> {
        let fragment = parse_object(text)?;
        let node = tree::find_by_id_mut(&mut self.fields, id)
            .ok_or_else(|| BuilderError::FieldNotFound(id.clone()))?;
        node.schema = fragment;
        self.recompute();
        Ok(())
    }

    /// Properties editor: replace one node's ui-schema fragment from text.
    pub fn edit_field_uischema_text(&mut self, id: &FieldId, text: &str) -> Result<(), BuilderError> {
        let fragment = parse_object(text)?;
        let node = tree::find_by_id_mut(&mut self.fields, id)
            .ok_or_else(|| BuilderError::FieldNotFound(id.clone()))?;
        node.uischema = fragment;
        self.recompute();
        Ok(())
    }

    /// Replace the design with one converted from a whole JSON Schema.
    pub fn import_schema(&mut self, schema: &Value) {
        self.fields = convert_schema_to_fields(schema, &self.registry, &mut self.ids);
        self.selected = None;
        self.recompute();
    }

    /// Schema editor surface: the forest is untouched unless `text` parses.
    pub fn apply_schema_text(&mut self, text: &str) -> Result<(), BuilderError> {
        let schema = Value::Object(parse_object(text)?);
        self.import_schema(&schema);
        Ok(())
    }

    /// Ui-schema editor surface. The hand-edited ui-schema stands until the
    /// next change to the forest rebuilds it.
    pub fn apply_uischema_text(&mut self, text: &str) -> Result<(), BuilderError> {
        let uischema = Value::Object(parse_object(text)?);
        if uischema != self.uischema {
            self.uischema = uischema;
            self.notify_change();
        }
        Ok(())
    }

    pub fn load_starter(&mut self, starter_id: &str) -> Result<(), BuilderError> {
        let schema = find_starter(&self.starters, starter_id)
            .map(|s| s.schema.clone())
            .ok_or_else(|| BuilderError::UnknownStarter(starter_id.to_string()))?;
        tracing::debug!(starter_id, "loading starter schema");
        self.import_schema(&schema);
        Ok(())
    }

    /// Data edited in the preview comes back through here.
    pub fn on_data_change(&mut self, data: Value) {
        self.data = reconcile_data(&self.schema, &data);
    }

    pub fn render_input(&self) -> RenderInput {
        RenderInput {
            schema: self.schema.clone(),
            uischema: self.uischema.clone(),
            data: self.data.clone(),
            config: self.config.clone(),
        }
    }

    pub fn render(&self, renderer: &mut dyn FormRenderer) {
        renderer.render(&self.render_input());
    }

    /// Build the export document, handing it to the export callback when
    /// one is registered.
    pub fn export(&mut self) -> ExportDocument {
        let doc = ExportDocument {
            schema: self.schema.clone(),
            uischema: self.uischema.clone(),
            fields: self.fields.clone(),
        };
        if let Some(callback) = self.on_export.as_mut() {
            callback(&doc);
        }
        doc
    }

    pub fn duplicate_keys(&self) -> Vec<DuplicateKey> {
        validate::duplicate_keys(&self.fields)
    }

    fn all_keys(&self) -> Vec<String> {
        fn walk(forest: &[FieldNode], out: &mut Vec<String>) {
            for node in forest {
                if !node.key.is_empty() {
                    out.push(node.key.clone());
                }
                walk(node.children(), out);
            }
        }
        let mut out = Vec::new();
        walk(&self.fields, &mut out);
        out
    }

    fn recompute(&mut self) {
        for dup in validate::duplicate_keys(&self.fields) {
            diagnostics::warn(&dup);
        }

        let schema = build_json_schema(&self.fields);
        let uischema = build_uischema_from_fields(&self.fields);
        self.data = reconcile_data(&schema, &self.data);

        let changed = schema != self.schema || uischema != self.uischema;
        self.schema = schema;
        self.uischema = uischema;
        if changed {
            self.notify_change();
        }
    }

    fn notify_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.schema, &self.uischema);
        }
    }
}

fn parse_object(text: &str) -> Result<JsonObject, BuilderError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BuilderError::NotAnObject),
        Err(e) => Err(BuilderError::InvalidJson {
            detail: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn add_generates_unique_keys_and_selects() {
        let mut builder = FormBuilder::default();
        let a = builder.add_field("text", None).unwrap();
        let b = builder.add_field("text", None).unwrap();

        assert_eq!(builder.selected().map(|n| &n.id), Some(&b));
        let keys: Vec<&str> = builder.fields().iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["text", "text_2"]);
        assert_ne!(a, b);
        assert!(builder.duplicate_keys().is_empty());
    }

    #[test]
    fn add_follows_selection_and_respects_placement() {
        let mut builder = FormBuilder::default();
        let group = builder.add_field("group", None).unwrap();
        let hint = PlacementHint::into_parent(group.clone(), None);
        let inner = builder.add_field("email", Some(&hint)).unwrap();
        let after = builder.add_field("number", None).unwrap();

        let group_node = tree::find_by_id(builder.fields(), &group).unwrap();
        let ids: Vec<&FieldId> = group_node.children().iter().map(|n| &n.id).collect();
        assert_eq!(ids, vec![&inner, &after]);
        assert!(group_node.key.is_empty());
    }

    #[test]
    fn unknown_type_and_bad_placement_are_errors() {
        let mut builder = FormBuilder::default();
        assert_eq!(
            builder.add_field("nope", None),
            Err(BuilderError::UnknownFieldType("nope".into()))
        );

        let leaf = builder.add_field("text", None).unwrap();
        let hint = PlacementHint::into_parent(leaf, None);
        assert_eq!(builder.add_field("text", Some(&hint)), Err(BuilderError::InvalidPlacement));
        assert_eq!(builder.fields().len(), 1);
    }

    #[test]
    fn change_callback_fires_on_schema_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut builder = FormBuilder::default();
        builder.on_change(move |schema, _ui| sink.borrow_mut().push(schema.clone()));

        let id = builder.add_field("text", None).unwrap();
        assert_eq!(seen.borrow().len(), 1);

        // A failed move changes nothing and notifies nobody.
        assert!(!builder.move_field(&id, Some(&FieldId::new("ghost")), 0));
        assert_eq!(seen.borrow().len(), 1);

        builder.delete_field(&id).unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(builder.selected(), None);
    }

    #[test]
    fn invalid_json_leaves_forest_untouched() {
        let mut builder = FormBuilder::default();
        let id = builder.add_field("text", None).unwrap();
        let before = builder.fields().to_vec();

        let err = builder.apply_schema_text("{not json").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format");
        assert_eq!(builder.edit_field_schema_text(&id, "[1]"), Err(BuilderError::NotAnObject));
        assert_eq!(builder.fields(), &before[..]);
    }

    #[test]
    fn field_schema_edit_flows_into_schema() {
        let mut builder = FormBuilder::default();
        let id = builder.add_field("text", None).unwrap();
        builder
            .edit_field_schema_text(&id, r#"{"type": "string", "minLength": 2}"#)
            .unwrap();
        assert_eq!(builder.schema()["properties"]["text"]["minLength"], json!(2));
    }

    #[test]
    fn update_replaces_node() {
        let mut builder = FormBuilder::default();
        let id = builder.add_field("text", None).unwrap();
        let mut node = builder.selected().unwrap().clone();
        node.label = "Full name".into();
        node.key = "full_name".into();
        node.required = true;
        builder.update_field(node).unwrap();

        assert_eq!(builder.schema()["required"], json!(["full_name"]));
        assert_eq!(
            builder.update_field(FieldNode::leaf(FieldId::new("ghost"), "text", "", "")),
            Err(BuilderError::FieldNotFound(FieldId::new("ghost")))
        );
        assert!(tree::find_by_id(builder.fields(), &id).is_some());
    }

    #[test]
    fn update_rejects_ids_used_elsewhere() {
        let mut builder = FormBuilder::default();
        let text = builder.add_field("text", None).unwrap();
        let group = builder.add_field("group", None).unwrap();

        let mut edited = tree::find_by_id(builder.fields(), &group).unwrap().clone();
        let before = builder.fields().to_vec();
        edited
            .children_mut()
            .unwrap()
            .push(FieldNode::leaf(text.clone(), "text", "Copy", "copy"));

        assert_eq!(builder.update_field(edited), Err(BuilderError::DuplicateId(text)));
        assert_eq!(builder.fields(), &before[..]);
        assert_eq!(tree::collect_all_ids(builder.fields()).len(), 2);
    }

    #[test]
    fn update_keeps_own_subtree_ids_and_advances_counter() {
        let mut builder = FormBuilder::default();
        let group = builder.add_field("group", None).unwrap();
        let hint = PlacementHint::into_parent(group.clone(), None);
        let inner = builder.add_field("text", Some(&hint)).unwrap();

        let mut edited = tree::find_by_id(builder.fields(), &group).unwrap().clone();
        edited.label = "Renamed".into();
        edited
            .children_mut()
            .unwrap()
            .push(FieldNode::leaf(FieldId::new("field_9"), "text", "Extra", "extra"));
        builder.update_field(edited).unwrap();

        assert!(tree::find_by_id(builder.fields(), &inner).is_some());
        let next = builder.add_field("text", None).unwrap();
        assert_eq!(next.as_str(), "field_10");
    }

    #[test]
    fn load_with_oversized_id_keeps_allocating() {
        let mut builder = FormBuilder::default();
        builder.load_fields(vec![FieldNode::leaf(
            FieldId::new("field_18446744073709551615"),
            "text",
            "Big",
            "big",
        )]);
        let id = builder.add_field("text", None).unwrap();
        assert_eq!(id.as_str(), "field_1");
    }

    #[test]
    fn starters_load_and_ids_keep_counting() {
        let starter = StarterSchema {
            id: "contact".into(),
            name: "Contact".into(),
            description: None,
            tags: vec![],
            schema: json!({"properties": {"email": {"type": "string", "format": "email"}}}),
        };
        let mut builder = FormBuilder::default().with_starters(vec![starter]);
        builder.load_starter("contact").unwrap();
        builder.load_starter("contact").unwrap();

        assert_eq!(builder.fields()[0].id.as_str(), "field_2");
        assert_eq!(
            builder.load_starter("missing"),
            Err(BuilderError::UnknownStarter("missing".into()))
        );
    }

    #[test]
    fn data_is_reconciled_with_defaults() {
        let mut builder = FormBuilder::default();
        builder.import_schema(&json!({
            "properties": {"country": {"type": "string", "default": "NZ"}}
        }));
        assert_eq!(builder.data(), &json!({"country": "NZ"}));

        builder.on_data_change(json!({"country": "AU", "stale": true}));
        assert_eq!(builder.data(), &json!({"country": "AU"}));
    }

    #[test]
    fn export_goes_to_callback_when_registered() {
        let exported = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&exported);

        let mut builder = FormBuilder::default();
        builder.add_field("number", None).unwrap();
        builder.on_export(move |doc| *sink.borrow_mut() = Some(doc.clone()));

        let doc = builder.export();
        assert_eq!(exported.borrow().as_ref(), Some(&doc));
        assert_eq!(doc.fields.len(), 1);
    }

    #[test]
    fn uischema_override_lasts_until_next_edit() {
        let mut builder = FormBuilder::default();
        builder.apply_uischema_text(r#"{"type": "HorizontalLayout", "elements": []}"#).unwrap();
        assert_eq!(builder.uischema()["type"], json!("HorizontalLayout"));

        builder.add_field("text", None).unwrap();
        assert_eq!(builder.uischema()["type"], json!("VerticalLayout"));
    }

    #[test]
    fn render_receives_current_state() {
        struct Capture(Option<RenderInput>);
        impl FormRenderer for Capture {
            fn render(&mut self, input: &RenderInput) {
                self.0 = Some(input.clone());
            }
        }

        let mut builder = FormBuilder::default().with_config(RendererConfig {
            trim: true,
            ..RendererConfig::default()
        });
        builder.add_field("checkbox", None).unwrap();

        let mut capture = Capture(None);
        builder.render(&mut capture);
        let input = capture.0.unwrap();
        assert!(input.config.trim);
        assert_eq!(input.schema, *builder.schema());
    }
}
