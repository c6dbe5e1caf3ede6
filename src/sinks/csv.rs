use crate::error::Result;
use crate::sinks::COLUMN_HEADERS;
use crate::types::ExhibitionRecord;
use chrono::Local;
use std::fs;
use std::path::Path;
use tracing::info;

/// RFC 4180 quoting: only fields containing a delimiter, quote, or line
/// break need wrapping.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(fields: &[&str]) -> String {
    fields.iter().map(|f| escape(f)).collect::<Vec<_>>().join(",")
}

/// Write all records to a timestamped CSV under `output_dir` and return the
/// file path. Header row first, then one row per record, UTF-8 with BOM so
/// spreadsheet applications pick up the Chinese headers.
pub fn write_csv(records: &[ExhibitionRecord], output_dir: &str) -> Result<String> {
    fs::create_dir_all(output_dir)?;

    let timestamp = Local::now().format("%Y%m%d%H%M");
    let filename = format!("all_museums_exhibitions_{timestamp}.csv");
    let filepath = Path::new(output_dir).join(&filename);

    let mut content = String::from('\u{feff}');
    content.push_str(&row(&COLUMN_HEADERS));
    content.push_str("\r\n");
    for record in records {
        content.push_str(&row(&record.fields()));
        content.push_str("\r\n");
    }

    fs::write(&filepath, content)?;
    info!("Wrote {} records to {}", records.len(), filepath.display());

    Ok(filepath.to_string_lossy().to_string())
}
