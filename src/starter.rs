//! Named starter schemas supplied by the host.
//!
//! JSON shape (either a bare array or wrapped in `{"starters": [...]}`):
//! [
//!   {
//!     "id": "contact",
//!     "name": "Contact form",
//!     "description": "Name, email and message",   // optional
//!     "tags": ["basic"],                           // optional
//!     "schema": { "type": "object", "properties": { ... } }
//!   }
//! ]

use crate::Result;
use crate::diagnostics;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarterSchema {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StarterFile {
    List(Vec<StarterSchema>),
    Wrapped { starters: Vec<StarterSchema> },
}

/// Unique, non-empty ids and an object `schema` for every starter.
pub fn validate_starters(starters: &[StarterSchema]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for starter in starters {
        if starter.id.trim().is_empty() {
            bail!(
                "{}",
                diagnostics::error_message(format!("starter '{}' has an empty id", starter.name))
            );
        }
        if !seen.insert(starter.id.as_str()) {
            bail!(
                "{}",
                diagnostics::error_message(format!("duplicate starter id: {}", starter.id))
            );
        }
        if !starter.schema.is_object() {
            bail!(
                "{}",
                diagnostics::error_message(format!("starter '{}' schema must be an object", starter.id))
            );
        }
    }
    Ok(())
}

pub fn parse_starters(text: &str) -> Result<Vec<StarterSchema>> {
    let starters = match serde_json::from_str::<StarterFile>(text)? {
        StarterFile::List(list) | StarterFile::Wrapped { starters: list } => list,
    };
    validate_starters(&starters)?;
    Ok(starters)
}

pub fn load_starters(path: &str) -> Result<Vec<StarterSchema>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read starters file {}", path)))?;
    parse_starters(&text)
        .with_context(|| diagnostics::error_message(format!("load starters file {}", path)))
}

pub fn find_starter<'a>(starters: &'a [StarterSchema], id: &str) -> Option<&'a StarterSchema> {
    starters.iter().find(|s| s.id == id)
}
