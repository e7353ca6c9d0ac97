//! Multi-section tabular report rendering.
//!
//! The report is plain-text markup in one of two dialects. Both share the
//! same section/table structure; only the surrounding syntax differs:
//!
//! - Markdown: `#### title` headers, `| cell |` rows with a `|:---:|`
//!   alignment row under the header.
//! - AsciiDoc: `==== title` headers, the table fenced by `|===` lines, rows
//!   without the trailing pipe and no alignment row.
//!
//! Cells are padded to the widest value in their column so the raw text stays
//! readable before it is ever rendered.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::error::LogStatsError;
use crate::stats::StatisticsAggregator;
use crate::status::status_description;
use crate::Result;

/// Rows per top-N table.
const TOP_COUNT: usize = 10;
/// The percentile reported alongside the average response size.
const REPORT_PERCENTILE: u8 = 95;

/// The two supported report dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportFormat {
    /// GitHub-flavored Markdown tables
    #[default]
    Markdown,
    /// AsciiDoc tables
    Adoc,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "adoc" | "asciidoc" => Ok(ReportFormat::Adoc),
            _ => Err(format!("Unknown report format: {s}")),
        }
    }
}

/// Render the full report as lines of text.
pub fn render_report(config: &AnalyzerConfig, stats: &StatisticsAggregator) -> Vec<String> {
    let format = config.format;
    let mut lines = Vec::new();

    add_section(
        &mut lines,
        "General information",
        general_info_table(config, stats, format),
        format,
    );
    add_section(
        &mut lines,
        "Requested resources",
        resources_table(stats, format),
        format,
    );
    add_section(
        &mut lines,
        "Response codes",
        status_codes_table(stats, format),
        format,
    );
    add_section(
        &mut lines,
        "HTTP methods",
        methods_table(stats, format),
        format,
    );
    add_section(
        &mut lines,
        "Most active IP addresses",
        ip_table(stats, format),
        format,
    );

    lines
}

/// Write rendered report lines to `path`.
pub fn save_report(path: &Path, lines: &[String]) -> Result<()> {
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).map_err(|source| LogStatsError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn add_section(lines: &mut Vec<String>, title: &str, table: Vec<String>, format: ReportFormat) {
    match format {
        ReportFormat::Markdown => lines.push(format!("#### {title}")),
        ReportFormat::Adoc => {
            lines.push(format!("==== {title}"));
            lines.push("|===".to_string());
        }
    }
    lines.extend(table);
    lines.push(String::new());
}

fn general_info_table(
    config: &AnalyzerConfig,
    stats: &StatisticsAggregator,
    format: ReportFormat,
) -> Vec<String> {
    let rows = vec![
        row(["Metric", "Value"]),
        row(["Data source", &config.data_source_label()]),
        row(["Start date", &bound_label(config.from)]),
        row(["End date", &bound_label(config.to)]),
        row(["Request count", &format_count(stats.total_requests())]),
        row([
            "Average response size",
            &format_size(stats.average_response_size()),
        ]),
        row([
            "95p response size",
            &format_size(stats.percentile_response_size(REPORT_PERCENTILE)),
        ]),
    ];
    render_table(&rows, format)
}

fn resources_table(stats: &StatisticsAggregator, format: ReportFormat) -> Vec<String> {
    let mut rows = vec![row(["Resource", "Count"])];
    for (resource, count) in stats.top_resources(TOP_COUNT) {
        rows.push(vec![format!("`{resource}`"), format_count(count)]);
    }
    render_table(&rows, format)
}

fn status_codes_table(stats: &StatisticsAggregator, format: ReportFormat) -> Vec<String> {
    let mut rows = vec![row(["Code", "Name", "Count"])];
    for (code, count) in stats.top_status_codes(TOP_COUNT) {
        rows.push(vec![
            code.to_string(),
            status_description(code).to_string(),
            format_count(count),
        ]);
    }
    render_table(&rows, format)
}

fn methods_table(stats: &StatisticsAggregator, format: ReportFormat) -> Vec<String> {
    let mut rows = vec![row(["Method", "Count"])];
    for (method, count) in stats.top_http_methods(TOP_COUNT) {
        rows.push(vec![format!("`{method}`"), format_count(count)]);
    }
    render_table(&rows, format)
}

fn ip_table(stats: &StatisticsAggregator, format: ReportFormat) -> Vec<String> {
    let mut rows = vec![row(["IP address", "Count"])];
    for (ip, count) in stats.top_ip_addresses(TOP_COUNT) {
        rows.push(vec![ip, format_count(count)]);
    }
    render_table(&rows, format)
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn bound_label(bound: Option<NaiveDateTime>) -> String {
    bound
        .map(|value| value.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Lay out header and data rows with column-width padding. The first row is
/// the header; every row must have the same number of cells.
fn render_table(rows: &[Vec<String>], format: ReportFormat) -> Vec<String> {
    let widths = column_widths(rows);
    let mut table = Vec::new();

    for (i, cells) in rows.iter().enumerate() {
        table.push(format_row(cells, &widths, format));
        if i == 0 && format == ReportFormat::Markdown {
            table.push(separator_row(&widths));
        }
    }

    if format == ReportFormat::Adoc {
        table.push("|===".to_string());
    }

    table
}

fn format_row(cells: &[String], widths: &[usize], format: ReportFormat) -> String {
    let mut line: String = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("| {cell:<width$} "))
        .collect();
    if format == ReportFormat::Markdown {
        line.push('|');
    }
    line
}

fn separator_row(widths: &[usize]) -> String {
    let mut line: String = widths
        .iter()
        .map(|width| format!("|:{}:", "-".repeat(*width)))
        .collect();
    line.push('|');
    line
}

fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let columns = rows.first().map_or(0, Vec::len);
    let mut widths = vec![0; columns];
    for cells in rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }
    widths
}

/// Group digits in threes with `_`: `1234567` renders as `1_234_567`.
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('_');
        }
        grouped.push(digit);
    }
    grouped
}

fn format_size(value: u64) -> String {
    format!("{}b", format_count(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::filter::EntryFilter;

    fn sample_stats() -> StatisticsAggregator {
        let lines = vec![
            r#"192.168.1.1 - - [17/May/2015:08:05:32 +0000] "GET /home HTTP/1.1" 200 500 "-" "Mozilla/5.0""#,
            r#"192.168.1.1 - - [17/May/2015:09:05:32 +0000] "GET /home HTTP/1.1" 200 1500 "-" "Mozilla/5.0""#,
            r#"10.0.0.1 - - [17/May/2015:10:05:32 +0000] "POST /login HTTP/1.1" 404 1000 "-" "curl/7.68.0""#,
        ];
        analyze(
            lines.into_iter().map(str::to_string),
            &EntryFilter::default(),
        )
    }

    fn sample_config(format: ReportFormat) -> AnalyzerConfig {
        AnalyzerConfig {
            from: Some("2015-05-17T00:00:00".parse().unwrap()),
            to: Some("2015-05-18T00:00:00".parse().unwrap()),
            files: vec!["access.log".into()],
            format,
            ..AnalyzerConfig::new()
        }
    }

    #[test]
    fn markdown_report_has_all_sections() {
        let lines = render_report(&sample_config(ReportFormat::Markdown), &sample_stats());

        for header in [
            "#### General information",
            "#### Requested resources",
            "#### Response codes",
            "#### HTTP methods",
            "#### Most active IP addresses",
        ] {
            assert!(
                lines.iter().any(|line| line == header),
                "missing {header}"
            );
        }
    }

    #[test]
    fn markdown_tables_are_aligned_and_separated() {
        let lines = render_report(&sample_config(ReportFormat::Markdown), &sample_stats());

        assert!(lines.contains(&"| Metric                | Value               |".to_string()));
        assert!(lines.contains(&"| Data source           | `access.log`        |".to_string()));
        assert!(lines.contains(&"| Start date            | 2015-05-17T00:00:00 |".to_string()));
        assert!(lines.contains(&"| Request count         | 3                   |".to_string()));
        assert!(lines.contains(&"| Average response size | 1_000b              |".to_string()));
        assert!(lines.contains(&"| 95p response size     | 1_500b              |".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("|:---") && line.ends_with(":|")));
    }

    #[test]
    fn markdown_ranks_resources_and_codes() {
        let lines = render_report(&sample_config(ReportFormat::Markdown), &sample_stats());

        assert!(lines.contains(&"| `/home`  | 2     |".to_string()));
        assert!(lines.contains(&"| `/login` | 1     |".to_string()));
        assert!(lines.contains(&"| 200  | OK        | 2     |".to_string()));
        assert!(lines.contains(&"| 404  | Not Found | 1     |".to_string()));
    }

    #[test]
    fn adoc_report_uses_fences_and_no_trailing_pipe() {
        let lines = render_report(&sample_config(ReportFormat::Adoc), &sample_stats());

        for header in [
            "==== General information",
            "==== Requested resources",
            "==== Response codes",
            "==== HTTP methods",
            "==== Most active IP addresses",
        ] {
            assert!(
                lines.iter().any(|line| line == header),
                "missing {header}"
            );
        }

        // every section opens and closes a |=== fence
        let fences = lines.iter().filter(|line| *line == "|===").count();
        assert_eq!(fences, 10);

        // no markdown separator rows, rows keep the trailing space
        assert!(!lines.iter().any(|line| line.starts_with("|:---")));
        assert!(lines.contains(&"| Metric                | Value               ".to_string()));
        assert!(lines.contains(&"| Start date            | 2015-05-17T00:00:00 ".to_string()));
    }

    #[test]
    fn absent_bounds_render_as_placeholder() {
        let config = AnalyzerConfig {
            format: ReportFormat::Markdown,
            ..AnalyzerConfig::new()
        };
        let lines = render_report(&config, &StatisticsAggregator::new());

        assert!(lines.contains(&"| Data source           | -     |".to_string()));
        assert!(lines.contains(&"| Start date            | -     |".to_string()));
        assert!(lines.contains(&"| Request count         | 0     |".to_string()));
    }

    #[test]
    fn top_tables_are_bounded_at_ten_rows() {
        let lines: Vec<String> = (0..15)
            .map(|i| {
                format!(
                    r#"10.0.0.{i} - - [17/May/2015:08:05:32 +0000] "GET /r{i} HTTP/1.1" 200 10 "-" "Mozilla/5.0""#
                )
            })
            .collect();
        let stats = analyze(lines, &EntryFilter::default());
        let config = AnalyzerConfig {
            format: ReportFormat::Markdown,
            ..AnalyzerConfig::new()
        };

        let report = render_report(&config, &stats);
        let resource_rows = report
            .iter()
            .filter(|line| line.starts_with("| `/r"))
            .count();
        assert_eq!(resource_rows, 10);
    }

    #[test]
    fn groups_digits_with_underscores() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1_000");
        assert_eq!(format_count(1_234_567), "1_234_567");
    }

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!("markdown".parse(), Ok(ReportFormat::Markdown));
        assert_eq!("Adoc".parse(), Ok(ReportFormat::Adoc));
        assert!("html".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn save_report_writes_all_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statistics.md");
        let lines = render_report(&sample_config(ReportFormat::Markdown), &sample_stats());

        save_report(&path, &lines).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("#### General information"));
        assert!(written.ends_with('\n'));
    }
}
