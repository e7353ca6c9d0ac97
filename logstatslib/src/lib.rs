//! # logstatslib
//!
//! An nginx access-log analyzer library: parses combined-format log lines,
//! filters them by time range and field predicates, aggregates statistics
//! over the accepted entries, and renders a multi-section report in Markdown
//! or AsciiDoc.
//!
//! ## Overview
//!
//! The analysis is a single sequential pass: parse → filter → aggregate.
//!
//! - **Parsing** is all-or-nothing per line: a fixed combined-format grammar
//!   plus independent semantic validation of every field. A line with any bad
//!   field is rejected (with a diagnostic) and the pass continues.
//! - **Filtering** combines an inclusive time range with an optional
//!   field/glob predicate (`agent`, `status`, `resource`, `method`, `ip`).
//! - **Aggregation** tracks the accepted count, response-size samples
//!   (average and percentile on demand), and per-status/resource/method/IP
//!   frequency tables with deterministic top-N ranking.
//!
//! Line sources (local files found by path or glob, or a remote URL) degrade
//! to empty on failure; an all-zero report is the signal that nothing was
//! accepted.
//!
//! ## Example
//!
//! ```rust
//! use logstatslib::{analyze, EntryFilter};
//!
//! let lines = vec![
//!     r#"93.180.71.3 - - [17/May/2015:08:05:32 +0000] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.21)""#.to_string(),
//!     "not a log line at all".to_string(),
//! ];
//!
//! let stats = analyze(lines, &EntryFilter::default());
//!
//! assert_eq!(stats.total_requests(), 1);
//! assert_eq!(stats.top_http_methods(10), vec![("GET".to_string(), 1)]);
//! ```

pub mod analyzer;
pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod parse;
pub mod report;
pub mod source;
pub mod stats;
pub mod status;

pub use analyzer::{analyze, analyze_source};
pub use config::{parse_date_bound, AnalyzerConfig};
pub use entry::LogEntry;
pub use error::LogStatsError;
pub use filter::{EntryFilter, FilterField};
pub use parse::{parse_line, ParseError};
pub use report::{render_report, save_report, ReportFormat};
pub use source::{finder::find_log_files, LogSource};
pub use stats::{FreqTable, StatisticsAggregator};
pub use status::status_description;

/// Result type for logstatslib operations
pub type Result<T> = std::result::Result<T, LogStatsError>;
