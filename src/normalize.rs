use crate::types::{ExhibitionRecord, RawExhibition};

fn field(raw: &RawExhibition, key: &str) -> String {
    raw.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Map a raw source record onto the canonical ten-field schema. Total: every
/// field is read by its fixed key and defaults to the empty string when the
/// key is absent, so normalization can never fail.
pub fn normalize(raw: &RawExhibition) -> ExhibitionRecord {
    ExhibitionRecord {
        museum: field(raw, "museum"),
        title: field(raw, "title"),
        date: field(raw, "date"),
        topic: field(raw, "topic"),
        url: field(raw, "url"),
        image_url: field(raw, "image_url"),
        location: field(raw, "location"),
        time: field(raw, "time"),
        category: field(raw, "category"),
        extra: field(raw, "extra"),
    }
}
