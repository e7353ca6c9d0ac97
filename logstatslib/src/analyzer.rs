//! The analysis pipeline: parse, filter, aggregate.

use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::filter::EntryFilter;
use crate::parse::parse_line;
use crate::source::LogSource;
use crate::stats::StatisticsAggregator;
use crate::Result;

/// Run one sequential pass over `lines` and return the populated aggregator.
///
/// Each line is parsed, then checked against the time range and the field
/// predicate; entries passing both are aggregated. A rejected or filtered
/// line is skipped — with the rejection reason and the offending line going
/// to the diagnostic channel — and the pass continues. No individual line can
/// abort the pass.
pub fn analyze<I>(lines: I, filter: &EntryFilter) -> StatisticsAggregator
where
    I: IntoIterator<Item = String>,
{
    let mut stats = StatisticsAggregator::new();

    for line in lines {
        let entry = match parse_line(&line) {
            Ok(entry) => entry,
            Err(reason) => {
                warn!(%reason, %line, "rejected log line");
                continue;
            }
        };

        if !filter.in_time_range(&entry) {
            continue;
        }
        if !filter.matches_field_filter(&entry) {
            continue;
        }

        stats.add_entry(&entry);
    }

    stats
}

/// Convenience entry point: compile the configured filter and drain the
/// source through [`analyze`].
pub fn analyze_source(source: &LogSource, config: &AnalyzerConfig) -> Result<StatisticsAggregator> {
    let filter = config.entry_filter()?;
    Ok(analyze(source.lines(), &filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_date_bound;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    const GOOD_17TH: &str = r#"93.180.71.3 - - [17/May/2015:08:05:32 +0000] "GET /downloads/product_1 HTTP/1.1" 304 100 "-" "Debian APT-HTTP/1.3""#;
    const GOOD_18TH: &str = r#"217.168.17.5 - - [18/May/2015:08:05:32 +0000] "POST /downloads/product_2 HTTP/1.1" 200 3316 "-" "Mozilla/5.0""#;

    #[test]
    fn aggregates_only_parsable_lines() {
        let input = lines(&[GOOD_17TH, "not a log line", GOOD_18TH, ""]);

        let stats = analyze(input, &EntryFilter::default());

        assert_eq!(stats.total_requests(), 2);
        assert_eq!(stats.top_status_codes(10), vec![(304, 1), (200, 1)]);
    }

    #[test]
    fn time_range_limits_the_result_set() {
        let filter = EntryFilter::new(
            Some(parse_date_bound("2015-05-18").unwrap()),
            None,
            None,
            None,
        )
        .unwrap();

        let stats = analyze(lines(&[GOOD_17TH, GOOD_18TH]), &filter);

        assert_eq!(stats.total_requests(), 1);
        assert_eq!(stats.top_http_methods(10), vec![("POST".to_string(), 1)]);
    }

    #[test]
    fn field_filter_limits_the_result_set() {
        let filter = EntryFilter::new(None, None, Some("agent"), Some("Mozilla*")).unwrap();

        let stats = analyze(lines(&[GOOD_17TH, GOOD_18TH]), &filter);

        assert_eq!(stats.total_requests(), 1);
        assert_eq!(
            stats.top_ip_addresses(10),
            vec![("217.168.17.5".to_string(), 1)]
        );
    }

    #[test]
    fn empty_input_yields_an_empty_aggregator() {
        let stats = analyze(Vec::new(), &EntryFilter::default());
        assert_eq!(stats.total_requests(), 0);
    }
}
