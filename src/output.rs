use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OutputError;
use crate::record::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Object keyed by position.
    Json,
    /// Array of `{fields, model, pk}` entries for bulk loading.
    #[default]
    Fixture,
}

/// Position → record. Keys serialize as strings in ascending order.
pub type JsonPayload = BTreeMap<usize, Record>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub fields: Record,
    pub model: String,
    pub pk: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(JsonPayload),
    Fixture(Vec<FixtureEntry>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Json(map) => map.len(),
            Payload::Fixture(entries) => entries.len(),
        }
    }

    pub fn render(&self, pretty: bool) -> Result<String, OutputError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

pub fn to_json(batch: &[Record]) -> JsonPayload {
    batch.iter().cloned().enumerate().collect()
}

/// Fixture entries are always built from the positional JSON form.
pub fn to_fixtures(batch: &[Record], model: &str) -> Vec<FixtureEntry> {
    to_json(batch)
        .into_iter()
        .map(|(pk, fields)| FixtureEntry {
            fields,
            model: model.to_string(),
            pk,
        })
        .collect()
}

pub fn serialize(batch: &[Record], mode: OutputMode, model: &str) -> Payload {
    match mode {
        OutputMode::Json => Payload::Json(to_json(batch)),
        OutputMode::Fixture => Payload::Fixture(to_fixtures(batch, model)),
    }
}

/// Overwrite `path` with the rendered payload, creating parent directories.
pub fn write(payload: &Payload, path: &Path, pretty: bool) -> Result<(), OutputError> {
    let text = payload.render(pretty)?;
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, text).map_err(io_err)
}
