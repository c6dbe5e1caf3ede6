use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Raw exhibition data as parsed out of a source page, before normalization.
/// Keyed lookups with defaults; not every source fills every key.
pub type RawExhibition = serde_json::Value;

/// The canonical exhibition record shared by every source. Exactly these ten
/// fields, in this order, on every record; absent values are empty strings so
/// downstream sinks can assume a fixed column set. `museum` is always set by
/// the crawler and never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitionRecord {
    pub museum: String,
    pub title: String,
    pub date: String,
    pub topic: String,
    pub url: String,
    pub image_url: String,
    pub location: String,
    pub time: String,
    pub category: String,
    pub extra: String,
}

impl ExhibitionRecord {
    /// Canonical field values in serialization order.
    pub fn fields(&self) -> [&str; 10] {
        [
            &self.museum,
            &self.title,
            &self.date,
            &self.topic,
            &self.url,
            &self.image_url,
            &self.location,
            &self.time,
            &self.category,
            &self.extra,
        ]
    }
}

/// What one source produced in one run: the raw records plus the counts that
/// feed the per-source tally.
#[derive(Debug, Default)]
pub struct SourceHarvest {
    pub records: Vec<RawExhibition>,
    /// Detail pages discovered, whether or not they parsed.
    pub discovered: usize,
    /// Discovered items dropped by fetch or parse failures.
    pub skipped: usize,
}

impl SourceHarvest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RawExhibition) {
        self.records.push(record);
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }
}

/// Core trait that every museum source must implement.
///
/// `harvest` follows a two-phase shape: discover the detail page addresses
/// for the source, then fetch and parse each one. Per-item failures are
/// absorbed inside the implementation and only shrink the result; an `Err`
/// from `harvest` means the source failed as a whole, and the orchestrator
/// records it as fully skipped without stopping the run.
#[async_trait::async_trait]
pub trait ExhibitionSource: Send + Sync {
    /// Short identifier for this source (CLI name, tally key).
    fn source_name(&self) -> &'static str;

    /// Display name of the museum, stored in every record.
    fn museum_name(&self) -> &'static str;

    /// Fetch all currently listed exhibitions from this source.
    async fn harvest(&self) -> Result<SourceHarvest>;
}
