//! Export formatters: CSV, pretty JSON and clipboard text.
//!
//! Every formatter rejects empty input with [`ExportError::Empty`] so callers
//! can show a notice instead of writing an empty file.

mod leads;
mod posts;

use chrono::NaiveDate;

pub use leads::{analyses_to_csv, analyses_to_json};
pub use posts::{posts_to_clipboard_text, posts_to_csv, posts_to_json};

/// Prepended to CSV output so spreadsheet tools decode UTF-8 correctly.
pub const BOM: char = '\u{feff}';

const FILE_NAME_MAX_CHARS: usize = 50;

/// Output format chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(format!("unknown export format '{other}' (expected csv, json or text)")),
        }
    }
}

/// `<base>_<YYYY-MM-DD>.<ext>` with path-hostile characters in `base`
/// replaced by `_` and `base` cut to 50 characters.
#[must_use]
pub fn export_file_name(base: &str, ext: &str, date: NaiveDate) -> String {
    let cleaned: String = base
        .chars()
        .map(|c| if "/\\?*:\"<>|".contains(c) { '_' } else { c })
        .take(FILE_NAME_MAX_CHARS)
        .collect();
    let base = if cleaned.trim().is_empty() {
        "export"
    } else {
        cleaned.as_str()
    };
    format!("{base}_{}.{ext}", date.format("%Y-%m-%d"))
}

/// Quote a CSV field when it contains a comma, quote or line break.
pub(crate) fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub(crate) fn csv_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_csv(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}
