pub mod classify;
pub mod table;

use crate::record::RecordBatch;
use table::{Extraction, Mismatch};
use tracing::debug;

/// Records found on a listing page, or the reason none could be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Found(RecordBatch),
    Missing(Mismatch),
}

/// Two-pass pipeline: html → blocks → records.
pub fn parse_listing(html: &str) -> Listing {
    match table::extract_blocks(html) {
        Extraction::Blocks(blocks) => {
            debug!("Located {} blocks", blocks.len());
            Listing::Found(classify::classify_all(&blocks))
        }
        Extraction::Missing(m) => Listing::Missing(m),
    }
}

// ── Tests ──
