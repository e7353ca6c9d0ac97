//! Per-entry filtering: time range and field/glob predicates.
//!
//! Both predicates are pure. An entry is aggregated only if it passes both;
//! their order only affects short-circuiting cost, never the result set.

use chrono::NaiveDateTime;
use regex::{Regex, RegexBuilder};

use crate::entry::LogEntry;
use crate::error::LogStatsError;
use crate::Result;

/// The entry fields a value pattern can be matched against.
///
/// This enumeration is a stable contract with the CLI: exactly `agent`,
/// `status`, `resource`, `method`, and `ip`, case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// User agent header
    Agent,
    /// Status code, matched as its decimal string
    Status,
    /// Request target
    Resource,
    /// HTTP method
    Method,
    /// Client IP address
    Ip,
}

impl FilterField {
    /// Resolve a field name, case-insensitively. Unknown names resolve to
    /// `None`; the filter treats them as never matching rather than erroring.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "agent" => Some(Self::Agent),
            "status" => Some(Self::Status),
            "resource" => Some(Self::Resource),
            "method" => Some(Self::Method),
            "ip" => Some(Self::Ip),
            _ => None,
        }
    }
}

/// A compiled field predicate. `field` is `None` when the configured name did
/// not resolve; such a predicate exists but never matches.
#[derive(Debug, Clone)]
struct FieldPredicate {
    field: Option<FilterField>,
    pattern: Regex,
}

/// Decides per-entry inclusion for one analysis pass.
///
/// Built once from the configured time range and optional field/value pair;
/// the glob-like value pattern is compiled a single time. The default filter
/// accepts everything.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
    predicate: Option<FieldPredicate>,
}

impl EntryFilter {
    /// Build a filter. The field predicate is only armed when both a field
    /// name and a value pattern are supplied; a partial pair disables it.
    pub fn new(
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
        field: Option<&str>,
        value: Option<&str>,
    ) -> Result<Self> {
        let predicate = match (field, value) {
            (Some(field), Some(value)) => Some(FieldPredicate {
                field: FilterField::from_name(field),
                pattern: compile_value_pattern(value)?,
            }),
            _ => None,
        };

        Ok(Self {
            from,
            to,
            predicate,
        })
    }

    /// True when the entry's timestamp falls inside the configured range.
    /// Both bounds are inclusive; an absent bound is unconstrained. The
    /// comparison uses the entry's naive local time, matching how the bounds
    /// are given (date or date-time, no offset).
    pub fn in_time_range(&self, entry: &LogEntry) -> bool {
        let timestamp = entry.timestamp.naive_local();
        let after_from = self.from.map_or(true, |from| timestamp >= from);
        let before_to = self.to.map_or(true, |to| timestamp <= to);
        after_from && before_to
    }

    /// True when no field predicate is armed, or when the resolved field
    /// value matches the pattern. An unknown field name or an absent field
    /// value is a hard `false`, not an error.
    pub fn matches_field_filter(&self, entry: &LogEntry) -> bool {
        let Some(predicate) = &self.predicate else {
            return true;
        };
        let Some(field) = predicate.field else {
            return false;
        };
        match resolve_field(field, entry) {
            Some(value) => predicate.pattern.is_match(&value),
            None => false,
        }
    }

    /// Both predicates combined, in the order the pipeline applies them.
    pub fn accepts(&self, entry: &LogEntry) -> bool {
        self.in_time_range(entry) && self.matches_field_filter(entry)
    }
}

/// Compile a glob-like value pattern into an anchored, case-insensitive
/// regex: everything is literal except `*`, which matches any sequence.
fn compile_value_pattern(value: &str) -> Result<Regex> {
    let expanded = regex::escape(value).replace(r"\*", ".*");
    RegexBuilder::new(&format!("^{expanded}$"))
        .case_insensitive(true)
        .build()
        .map_err(|err| LogStatsError::InvalidGlob {
            pattern: value.to_string(),
            message: err.to_string(),
        })
}

fn resolve_field(field: FilterField, entry: &LogEntry) -> Option<String> {
    match field {
        FilterField::Agent => Some(entry.http_user_agent.clone()),
        FilterField::Status => Some(entry.status_code.to_string()),
        FilterField::Resource => entry.resource.clone(),
        FilterField::Method => Some(entry.http_method.clone()),
        FilterField::Ip => Some(entry.client_ip.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    fn entry_at(timestamp: &str) -> LogEntry {
        let line = format!(
            r#"93.180.71.3 - - [{timestamp}] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.21)""#
        );
        parse_line(&line).unwrap()
    }

    fn bound(value: &str) -> Option<NaiveDateTime> {
        Some(value.parse().unwrap())
    }

    fn ranged_filter() -> EntryFilter {
        EntryFilter::new(
            bound("2015-05-17T00:00:00"),
            bound("2015-05-19T00:00:00"),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn accepts_timestamps_inside_the_range() {
        let filter = ranged_filter();

        assert!(filter.in_time_range(&entry_at("17/May/2015:08:05:32 +0000")));
        assert!(filter.in_time_range(&entry_at("18/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn bounds_are_inclusive() {
        let filter = ranged_filter();

        assert!(filter.in_time_range(&entry_at("17/May/2015:00:00:00 +0000")));
        assert!(filter.in_time_range(&entry_at("19/May/2015:00:00:00 +0000")));
        // one second outside either bound
        assert!(!filter.in_time_range(&entry_at("16/May/2015:23:59:59 +0000")));
        assert!(!filter.in_time_range(&entry_at("19/May/2015:00:00:01 +0000")));
    }

    #[test]
    fn absent_bounds_are_unconstrained() {
        let filter = EntryFilter::default();

        assert!(filter.in_time_range(&entry_at("16/May/2015:08:05:32 +0000")));
        assert!(filter.in_time_range(&entry_at("19/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn glob_pattern_matches_case_insensitively() {
        let filter = EntryFilter::new(None, None, Some("agent"), Some("debian*")).unwrap();
        assert!(filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));

        let filter = EntryFilter::new(None, None, Some("method"), Some("get")).unwrap();
        assert!(filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn pattern_must_cover_the_whole_value() {
        // no wildcard, so a prefix alone must not match
        let filter = EntryFilter::new(None, None, Some("agent"), Some("Debian")).unwrap();
        assert!(!filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn status_matches_as_decimal_string() {
        let filter = EntryFilter::new(None, None, Some("status"), Some("30*")).unwrap();
        assert!(filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));

        let filter = EntryFilter::new(None, None, Some("status"), Some("200")).unwrap();
        assert!(!filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn unknown_field_never_matches() {
        let filter = EntryFilter::new(None, None, Some("protocol"), Some("*")).unwrap();
        assert!(!filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn absent_resource_never_matches() {
        let mut entry = entry_at("17/May/2015:08:05:32 +0000");
        entry.resource = None;

        let filter = EntryFilter::new(None, None, Some("resource"), Some("*")).unwrap();
        assert!(!filter.matches_field_filter(&entry));
    }

    #[test]
    fn partial_field_value_pair_disables_the_predicate() {
        let filter = EntryFilter::new(None, None, Some("agent"), None).unwrap();
        assert!(filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));

        let filter = EntryFilter::new(None, None, None, Some("Mozilla*")).unwrap();
        assert!(filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn glob_dot_is_literal() {
        let filter = EntryFilter::new(None, None, Some("ip"), Some("93.180.71.*")).unwrap();
        assert!(filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));

        // the dots must not act as regex wildcards
        let filter = EntryFilter::new(None, None, Some("ip"), Some("93x180x71x3")).unwrap();
        assert!(!filter.matches_field_filter(&entry_at("17/May/2015:08:05:32 +0000")));
    }

    #[test]
    fn field_names_resolve_case_insensitively() {
        assert_eq!(FilterField::from_name("AGENT"), Some(FilterField::Agent));
        assert_eq!(FilterField::from_name("Ip"), Some(FilterField::Ip));
        assert_eq!(FilterField::from_name("referer"), None);
    }

    #[test]
    fn accepts_combines_both_predicates() {
        let filter = EntryFilter::new(
            bound("2015-05-17T00:00:00"),
            bound("2015-05-19T00:00:00"),
            Some("agent"),
            Some("Debian*"),
        )
        .unwrap();

        assert!(filter.accepts(&entry_at("17/May/2015:08:05:32 +0000")));
        assert!(!filter.accepts(&entry_at("16/May/2015:08:05:32 +0000")));
    }
}
