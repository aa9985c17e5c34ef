use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::fetcher::Fetcher;
use crate::output::{self, Payload};
use crate::parser::table::Mismatch;
use crate::parser::{self, Listing};
use crate::record;
use crate::settings::SourceConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub pretty: bool,
    /// Dump raw pages even for sources that don't ask for it.
    pub dump_raw: bool,
    /// Keep payloads in memory instead of writing configured output files.
    pub to_stdout: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Written { path: PathBuf, records: usize },
    InMemory(Payload),
    /// Page fetched, but the listing table could not be located.
    Missing(Mismatch),
    /// Source has no URL configured.
    NoUrl,
}

/// Fetch one source and turn it into a payload. Fetch and output-write
/// failures propagate; an unrecognised page layout does not.
pub fn run_source(fetcher: &Fetcher, source: &SourceConfig, opts: &RunOptions) -> Result<Outcome> {
    let page = fetcher
        .fetch(
            source.url.as_deref(),
            source.dump_raw || opts.dump_raw,
            source.raw_path.as_deref(),
        )
        .with_context(|| format!("Failed to fetch source '{}'", source.id))?;

    match page {
        Some(html) => process(&html, source, opts),
        None => {
            warn!("Source '{}' has no URL, skipping", source.id);
            Ok(Outcome::NoUrl)
        }
    }
}

/// Parse an already-fetched page for `source` and deliver its payload.
pub fn process(html: &str, source: &SourceConfig, opts: &RunOptions) -> Result<Outcome> {
    let payload = match build_payload(html, source) {
        Ok(p) => p,
        Err(m) => {
            warn!("Source '{}': listing not found ({})", source.id, m);
            return Ok(Outcome::Missing(m));
        }
    };
    info!("Source '{}': {} records", source.id, payload.len());

    match &source.output {
        Some(path) if !opts.to_stdout => {
            output::write(&payload, path, opts.pretty)
                .with_context(|| format!("Failed to write output for '{}'", source.id))?;
            info!("Wrote {:?}", path);
            Ok(Outcome::Written {
                path: path.clone(),
                records: payload.len(),
            })
        }
        _ => Ok(Outcome::InMemory(payload)),
    }
}

pub fn build_payload(html: &str, source: &SourceConfig) -> Result<Payload, Mismatch> {
    let batch = match parser::parse_listing(html) {
        Listing::Found(batch) => batch,
        Listing::Missing(m) => return Err(m),
    };
    let batch = record::tag_optional(batch, source.category);
    Ok(output::serialize(&batch, source.mode, &source.model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{FixtureEntry, OutputMode};
    use crate::settings::Settings;
    use tempfile::tempdir;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn source(idx: usize) -> SourceConfig {
        Settings::default().sources[idx].clone()
    }

    #[test]
    fn private_hospitals_tagged_fixtures() {
        let payload = build_payload(&fixture("hospital_private"), &source(1)).unwrap();
        let Payload::Fixture(entries) = payload else {
            panic!("expected fixture payload");
        };
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.model == "hospital.hospital"));
        assert!(entries.iter().all(|e| e.fields.category == Some(1)));
        assert_eq!(entries.iter().map(|e| e.pk).collect::<Vec<_>>(), [0, 1]);
    }

    #[test]
    fn ambulance_fixtures_untagged() {
        let payload = build_payload(&fixture("ambulance"), &source(2)).unwrap();
        let text = payload.render(false).unwrap();
        assert!(!text.contains("category"));
        assert!(text.contains("\"model\":\"hospital.ambulanceservice\""));
    }

    #[test]
    fn json_mode_source() {
        let mut src = source(0);
        src.mode = OutputMode::Json;
        let payload = build_payload(&fixture("hospital_government"), &src).unwrap();
        assert!(matches!(&payload, Payload::Json(map) if map.len() == 4 && map[&0].category == Some(0)));
    }

    #[test]
    fn mismatch_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hospitals.json");
        let mut src = source(0);
        src.output = Some(path.clone());

        let outcome = process(&fixture("no_banner"), &src, &RunOptions::default()).unwrap();
        assert!(matches!(outcome, Outcome::Missing(Mismatch::NoAnchor)));
        assert!(!path.exists());
    }

    #[test]
    fn writes_configured_output() {
        let dir = tempdir().unwrap();
        let mut src = source(0);
        src.output = Some(dir.path().join("fixtures").join("hospitals.json"));

        let outcome = process(&fixture("hospital_government"), &src, &RunOptions::default()).unwrap();
        let Outcome::Written { path, records } = outcome else {
            panic!("expected a written file");
        };
        assert_eq!(records, 4);

        let entries: Vec<FixtureEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries[0].fields.name, "Hospital Kuala Lumpur");
        assert_eq!(entries[0].fields.category, Some(0));
    }

    #[test]
    fn stdout_keeps_payload_in_memory() {
        let opts = RunOptions {
            to_stdout: true,
            ..Default::default()
        };
        let outcome = process(&fixture("ambulance"), &source(2), &opts).unwrap();
        assert!(matches!(outcome, Outcome::InMemory(ref p) if p.len() == 3));
    }

    #[test]
    fn no_url_is_skipped() {
        let mut src = source(2);
        src.url = None;
        let fetcher = Fetcher::new().unwrap();
        let outcome = run_source(&fetcher, &src, &RunOptions::default()).unwrap();
        assert!(matches!(outcome, Outcome::NoUrl));
    }
}
