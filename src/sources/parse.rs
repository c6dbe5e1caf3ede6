//! Field-extraction policies shared by every museum crawler.

use url::Url;

/// Join exhibition date fragments: the first two are joined with `" - "`, a
/// single fragment is used as-is, none yields an empty date.
pub fn join_date_fragments(fragments: &[String]) -> String {
    fragments
        .iter()
        .take(2)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Keep an opening-hours string only when it starts with a digit. Museum
/// pages reuse the hours block for placeholder text like 依公告; a leading
/// digit is what distinguishes a real time range.
pub fn numeric_time(raw: &str) -> String {
    if raw.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        raw.to_string()
    } else {
        String::new()
    }
}

/// A discovered address is only worth fetching when it is a well-formed
/// absolute http(s) URL.
pub fn is_absolute_http(address: &str) -> bool {
    match Url::parse(address) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Resolve `relative` against `base` into an absolute, percent-escaped
/// address. Returns an empty string when resolution fails so callers can
/// store the field unconditionally.
pub fn resolve_url(base: &str, relative: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(relative))
        .map(|u| u.to_string())
        .unwrap_or_default()
}
