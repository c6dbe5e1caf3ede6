use crate::normalize::normalize;
use crate::types::{ExhibitionRecord, ExhibitionSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument};

/// Per-source tally for one run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub museum: String,
    /// Detail pages the source discovered.
    pub attempted: usize,
    /// Records that made it through parsing and normalization.
    pub succeeded: usize,
    /// Discovered items dropped by fetch or parse failures.
    pub skipped: usize,
}

/// One complete execution over all configured sources: the ordered record
/// sequence plus the per-source tallies. Mutated only while `run` is in
/// flight; read-only afterwards.
#[derive(Debug, Serialize)]
pub struct HarvestRun {
    pub records: Vec<ExhibitionRecord>,
    pub outcomes: Vec<SourceOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Orchestrator;

impl Orchestrator {
    /// Run every source exactly once, in the given order, and collect the
    /// normalized records into one sequence. A source that fails outright is
    /// tallied with zero successes; it never stops the remaining sources.
    #[instrument(skip(sources))]
    pub async fn run(sources: &[Box<dyn ExhibitionSource>]) -> HarvestRun {
        let started_at = Utc::now();
        let mut records = Vec::new();
        let mut outcomes = Vec::new();

        for source in sources {
            match source.harvest().await {
                Ok(harvest) => {
                    let succeeded = harvest.records.len();
                    records.extend(harvest.records.iter().map(normalize));
                    info!(
                        "{}: {} discovered, {} harvested, {} skipped",
                        source.source_name(),
                        harvest.discovered,
                        succeeded,
                        harvest.skipped
                    );
                    outcomes.push(SourceOutcome {
                        source: source.source_name().to_string(),
                        museum: source.museum_name().to_string(),
                        attempted: harvest.discovered,
                        succeeded,
                        skipped: harvest.skipped,
                    });
                }
                Err(e) => {
                    error!("Source {} failed: {}", source.source_name(), e);
                    outcomes.push(SourceOutcome {
                        source: source.source_name().to_string(),
                        museum: source.museum_name().to_string(),
                        attempted: 0,
                        succeeded: 0,
                        skipped: 0,
                    });
                }
            }
        }

        HarvestRun {
            records,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
