//! Hand-off to the external forms renderer.
//!
//! The renderer is a collaborator: it receives `{schema, uischema, data}`
//! plus a small option map, and reports data edits back to the builder.

use crate::Result;
use crate::diagnostics;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options understood by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
    /// Enforce `maxLength` while typing.
    pub restrict: bool,
    pub hide_required_asterisk: bool,
    pub show_unfocused_description: bool,
    /// Let controls take the grid cell width instead of full width.
    pub trim: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            restrict: true,
            hide_required_asterisk: false,
            show_unfocused_description: false,
            trim: false,
        }
    }
}

impl RendererConfig {
    /// Read a config document; missing keys keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| diagnostics::error_message(format!("read config file {}", path)))?;
        serde_json::from_str(&text)
            .with_context(|| diagnostics::error_message(format!("parse config file {}", path)))
    }
}

/// Everything the renderer needs for one preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInput {
    pub schema: Value,
    pub uischema: Value,
    pub data: Value,
    pub config: RendererConfig,
}

pub trait FormRenderer {
    fn render(&mut self, input: &RenderInput);
}

/// Fit preview `data` to `schema`: drop values whose property no longer
/// exists and fill absent ones that declare a `default`. Nested objects are
/// reconciled recursively; arrays and scalars are left alone.
pub fn reconcile_data(schema: &Value, data: &Value) -> Value {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return data.clone();
    };
    let current = data.as_object();

    let mut out = Map::new();
    for (key, property) in properties {
        match current.and_then(|d| d.get(key)) {
            Some(value) if property.get("type").and_then(Value::as_str) == Some("object") => {
                out.insert(key.clone(), reconcile_data(property, value));
            }
            Some(value) => {
                out.insert(key.clone(), value.clone());
            }
            None => {
                if let Some(default) = property.get("default") {
                    out.insert(key.clone(), default.clone());
                }
            }
        }
    }
    Value::Object(out)
}
