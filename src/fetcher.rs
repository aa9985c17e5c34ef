use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use reqwest::blocking::Client;
use tracing::{debug, error, info};

use crate::error::FetchError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Fetcher { client })
    }

    /// GET `url` and return the body text. No URL means nothing to fetch.
    ///
    /// With `dump_raw` the body is also saved, to `raw_path` or to the last
    /// segment of the URL. Dump failures are logged and otherwise ignored.
    pub fn fetch(
        &self,
        url: Option<&str>,
        dump_raw: bool,
        raw_path: Option<&Path>,
    ) -> Result<Option<String>, FetchError> {
        let Some(url) = url else {
            return Ok(None);
        };

        info!("Fetching {}", url);
        let start = Instant::now();
        let unavailable = |source| FetchError::SourceUnavailable {
            url: url.to_string(),
            source,
        };
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(unavailable)?;
        debug!(
            "Fetched {} bytes from {} in {}ms",
            body.len(),
            url,
            start.elapsed().as_millis()
        );

        if dump_raw {
            let path = raw_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| raw_dump_path(url));
            dump(&path, &body);
        }

        Ok(Some(body))
    }
}

/// File name for a raw dump: the last path segment of the URL.
pub fn raw_dump_path(url: &str) -> PathBuf {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let name = without_query.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(name)
    }
}

fn dump(path: &Path, body: &str) {
    match fs::write(path, body) {
        Ok(()) => debug!("Saved raw page to {:?}", path),
        Err(e) => error!("Failed to save raw page to {:?}: {}", path, e),
    }
}
