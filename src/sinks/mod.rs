//! Downstream consumers of a finished harvest run. Both sinks assume the
//! fixed ten-column record shape and perform a pure append per run.

pub mod csv;
pub mod sqlite;

/// Column headers in canonical field order, as they appear in the exported
/// spreadsheet.
pub const COLUMN_HEADERS: [&str; 10] = [
    "館別",
    "展覽名稱",
    "展覽日期",
    "展覽主題",
    "展覽連結",
    "展覽圖片",
    "展覽地點",
    "展覽時間",
    "展覽類別",
    "備註",
];
