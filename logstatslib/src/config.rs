//! Analysis run configuration.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::LogStatsError;
use crate::filter::EntryFilter;
use crate::report::ReportFormat;
use crate::Result;

const MARKDOWN_PATH: &str = "statistics.md";
const ADOC_PATH: &str = "statistics.adoc";

/// Longest data-source URL rendered verbatim in the report.
const MAX_LABEL_URL_LEN: usize = 30;

/// Read-only configuration for one analysis run, constructed once before the
/// pass: the inclusive time bounds, the report format, the resolved input
/// files or URL, and the optional field/value filter pair.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// Inclusive lower time bound
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper time bound
    pub to: Option<NaiveDateTime>,
    /// Report dialect
    pub format: ReportFormat,
    /// Local log files to read, in source order
    pub files: Vec<PathBuf>,
    /// Remote log URL; takes precedence over `files` when present
    pub url: Option<String>,
    /// Field name for the value filter
    pub filter_field: Option<String>,
    /// Glob-like value pattern for the field filter
    pub filter_value: Option<String>,
}

impl AnalyzerConfig {
    /// Create a configuration with no bounds, no inputs, and no filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the inclusive time range.
    pub fn date_range(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Builder: set the field/value filter pair.
    pub fn field_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_field = Some(field.into());
        self.filter_value = Some(value.into());
        self
    }

    /// Compile the per-entry filter for this configuration.
    pub fn entry_filter(&self) -> Result<EntryFilter> {
        EntryFilter::new(
            self.from,
            self.to,
            self.filter_field.as_deref(),
            self.filter_value.as_deref(),
        )
    }

    /// Where the rendered report is written by default.
    pub fn output_path(&self) -> PathBuf {
        match self.format {
            ReportFormat::Markdown => PathBuf::from(MARKDOWN_PATH),
            ReportFormat::Adoc => PathBuf::from(ADOC_PATH),
        }
    }

    /// Describe the configured data source for the report's general-info
    /// section: a (middle-truncated) URL, the backticked file names, or `-`
    /// when there is no input at all.
    pub fn data_source_label(&self) -> String {
        if let Some(url) = &self.url {
            if url.len() > MAX_LABEL_URL_LEN {
                let half = MAX_LABEL_URL_LEN / 2;
                return format!(
                    "URL: `{}...{}`",
                    &url[..half],
                    &url[url.len() - half..]
                );
            }
            return format!("URL: {url}");
        }

        if !self.files.is_empty() {
            return self
                .files
                .iter()
                .map(|file| format!("`{}`", file_name(file)))
                .collect::<Vec<_>>()
                .join(", ");
        }

        "-".to_string()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Parse a `--from`/`--to` bound: a full date-time (`2015-05-17T08:05:32`,
/// seconds optional) or a bare date taken as midnight.
pub fn parse_date_bound(value: &str) -> Result<NaiveDateTime> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(datetime);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| LogStatsError::InvalidDate(value.to_string()))
}
