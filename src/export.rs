//! The `{schema, uischema, fields}` document offered for download.

use crate::Result;
use crate::diagnostics;
use crate::field::{FieldNode, Forest};
use crate::schema::{build_json_schema, build_uischema_from_fields};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const EXPORT_FILE_NAME: &str = "form-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub schema: Value,
    pub uischema: Value,
    pub fields: Forest,
}

impl ExportDocument {
    pub fn from_fields(fields: &[FieldNode]) -> Self {
        Self {
            schema: build_json_schema(fields),
            uischema: build_uischema_from_fields(fields),
            fields: fields.to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)
            .with_context(|| diagnostics::error_message(format!("write {}", path.display())))
    }
}

/// `<dir>/form-config.json`
pub fn default_export_path(dir: &Path) -> PathBuf {
    dir.join(EXPORT_FILE_NAME)
}
