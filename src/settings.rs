use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::output::OutputMode;

const GOV_HOSP_URL: &str = "http://www.mycen.com.my/malaysia/hospital_government.html";
const PRI_HOSP_URL: &str = "http://www.mycen.com.my/malaysia/hospital_private.html";
const AMBULANCE_URL: &str = "http://www.mycen.com.my/malaysia/ambulance.html";

const HOSPITAL_MODEL: &str = "hospital.hospital";
const AMBULANCE_MODEL: &str = "hospital.ambulanceservice";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    /// Indent output files.
    #[serde(default)]
    pub pretty: bool,
}

/// One listing page and where its records go.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Tag applied to every record, e.g. 0 = government, 1 = private.
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub mode: OutputMode,
    /// Where to write the payload. Without one the payload is kept in memory.
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub dump_raw: bool,
    #[serde(default)]
    pub raw_path: Option<PathBuf>,
}

impl SourceConfig {
    fn builtin(id: &str, url: &str, category: Option<i64>, model: &str, output: &str) -> Self {
        SourceConfig {
            id: id.to_string(),
            url: Some(url.to_string()),
            category,
            model: model.to_string(),
            mode: OutputMode::Fixture,
            output: Some(PathBuf::from(output)),
            dump_raw: false,
            raw_path: None,
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::builtin(
            "government_hospitals",
            GOV_HOSP_URL,
            Some(0),
            HOSPITAL_MODEL,
            "../fixtures/hospitals.json",
        ),
        SourceConfig::builtin(
            "private_hospitals",
            PRI_HOSP_URL,
            Some(1),
            HOSPITAL_MODEL,
            "../fixtures/private_hospitals.json",
        ),
        SourceConfig::builtin(
            "ambulance_services",
            AMBULANCE_URL,
            None,
            AMBULANCE_MODEL,
            "../fixtures/ambulanceservices.json",
        ),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sources: default_sources(),
            pretty: false,
        }
    }
}

impl Settings {
    /// Built-in sources, overlaid by an optional TOML/JSON file. Nothing is
    /// read from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.id.as_str()) {
                return Err(ConfigError::DuplicateSource(source.id.clone()));
            }
            if source.mode == OutputMode::Fixture && source.model.trim().is_empty() {
                return Err(ConfigError::MissingModel(source.id.clone()));
            }
        }
        Ok(())
    }

    /// Sources to run, in configured order. An empty `only` selects all.
    pub fn select(&self, only: &[String]) -> Result<Vec<&SourceConfig>, ConfigError> {
        if let Some(unknown) = only.iter().find(|id| !self.sources.iter().any(|s| &s.id == *id)) {
            return Err(ConfigError::UnknownSource(unknown.clone()));
        }
        Ok(self
            .sources
            .iter()
            .filter(|s| only.is_empty() || only.contains(&s.id))
            .collect())
    }
}
