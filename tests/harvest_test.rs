use museum_scraper::error::{Result, ScraperError};
use museum_scraper::harvest::Orchestrator;
use museum_scraper::normalize::normalize;
use museum_scraper::types::{ExhibitionSource, SourceHarvest};
use serde_json::json;

/// A source that yields a fixed number of records, optionally dropping some
/// of its discovered items the way a mid-parse failure would.
struct StubSource {
    name: &'static str,
    museum: &'static str,
    records: usize,
    skipped: usize,
}

#[async_trait::async_trait]
impl ExhibitionSource for StubSource {
    fn source_name(&self) -> &'static str {
        self.name
    }

    fn museum_name(&self) -> &'static str {
        self.museum
    }

    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();
        harvest.discovered = self.records + self.skipped;
        harvest.skipped = self.skipped;
        for i in 0..self.records {
            harvest.push(json!({
                "museum": self.museum,
                "title": format!("{} 展覽 {}", self.museum, i + 1),
                "url": format!("https://example.org/{}/{}", self.name, i + 1),
            }));
        }
        Ok(harvest)
    }
}

/// A source whose discovery permanently fails: zero records, no error.
struct EmptySource;

#[async_trait::async_trait]
impl ExhibitionSource for EmptySource {
    fn source_name(&self) -> &'static str {
        "empty"
    }

    fn museum_name(&self) -> &'static str {
        "空館"
    }

    async fn harvest(&self) -> Result<SourceHarvest> {
        Ok(SourceHarvest::empty())
    }
}

/// A source that fails outright with a framework-level error.
struct BrokenSource;

#[async_trait::async_trait]
impl ExhibitionSource for BrokenSource {
    fn source_name(&self) -> &'static str {
        "broken"
    }

    fn museum_name(&self) -> &'static str {
        "壞掉的館"
    }

    async fn harvest(&self) -> Result<SourceHarvest> {
        Err(ScraperError::Source {
            message: "unexpected crawler failure".to_string(),
        })
    }
}

#[tokio::test]
async fn partial_failure_keeps_source_order_and_counts() {
    // Source A yields 5, source B's discovery fails (empty), source C loses
    // one of two items mid-parse.
    let sources: Vec<Box<dyn ExhibitionSource>> = vec![
        Box::new(StubSource {
            name: "a",
            museum: "館A",
            records: 5,
            skipped: 0,
        }),
        Box::new(EmptySource),
        Box::new(StubSource {
            name: "c",
            museum: "館C",
            records: 1,
            skipped: 1,
        }),
    ];

    let run = Orchestrator::run(&sources).await;

    assert_eq!(run.records.len(), 6);
    // A's records first, C's record last; B contributes nothing but does not
    // reorder.
    assert!(run.records[..5].iter().all(|r| r.museum == "館A"));
    assert_eq!(run.records[5].museum, "館C");

    assert_eq!(run.outcomes.len(), 3);
    assert_eq!(run.outcomes[0].succeeded, 5);
    assert_eq!(run.outcomes[1].succeeded, 0);
    assert_eq!(run.outcomes[2].attempted, 2);
    assert_eq!(run.outcomes[2].succeeded, 1);
    assert_eq!(run.outcomes[2].skipped, 1);
}

#[tokio::test]
async fn a_failing_source_does_not_stop_the_run() {
    let sources: Vec<Box<dyn ExhibitionSource>> = vec![
        Box::new(StubSource {
            name: "a",
            museum: "館A",
            records: 2,
            skipped: 0,
        }),
        Box::new(BrokenSource),
        Box::new(StubSource {
            name: "c",
            museum: "館C",
            records: 3,
            skipped: 0,
        }),
    ];

    let run = Orchestrator::run(&sources).await;

    assert_eq!(run.records.len(), 5);
    let broken = &run.outcomes[1];
    assert_eq!(broken.source, "broken");
    assert_eq!(broken.succeeded, 0);
    assert_eq!(run.outcomes[2].succeeded, 3);
}

#[tokio::test]
async fn every_normalized_record_has_the_full_field_set() {
    let sources: Vec<Box<dyn ExhibitionSource>> = vec![Box::new(StubSource {
        name: "a",
        museum: "館A",
        records: 3,
        skipped: 0,
    })];

    let run = Orchestrator::run(&sources).await;

    for record in &run.records {
        // Exactly ten string fields, never missing; unset ones are empty.
        let value = serde_json::to_value(record).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 10);
        assert!(map.values().all(|v| v.is_string()));
        assert!(!record.museum.is_empty());
        assert_eq!(record.date, "");
    }
}

#[tokio::test]
async fn serialization_preserves_canonical_column_order() {
    let raw = json!({ "museum": "館A", "title": "展", "extra": "備註" });
    let record = normalize(&raw);
    let serialized = serde_json::to_string(&record).unwrap();

    let order = [
        "\"museum\"",
        "\"title\"",
        "\"date\"",
        "\"topic\"",
        "\"url\"",
        "\"image_url\"",
        "\"location\"",
        "\"time\"",
        "\"category\"",
        "\"extra\"",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|key| serialized.find(key).expect("field missing"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}
