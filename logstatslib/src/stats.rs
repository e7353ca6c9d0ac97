//! Streaming statistics aggregation over accepted log entries.

use std::collections::HashMap;
use std::hash::Hash;

use crate::entry::LogEntry;
use crate::parse::FIELD_PLACEHOLDER;

/// A frequency table that remembers first-insertion order.
///
/// Ranking ties by the order keys were first seen keeps `top` deterministic;
/// iterating a bare `HashMap` would not be.
#[derive(Debug, Clone, Default)]
pub struct FreqTable<K> {
    counts: HashMap<K, u64>,
    order: Vec<K>,
}

impl<K: Eq + Hash + Clone> FreqTable<K> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Count one occurrence of `key`.
    pub fn increment(&mut self, key: K) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.clone(), 1);
                self.order.push(key);
            }
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// The count recorded for `key`, zero when unseen.
    pub fn count(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// The `n` highest-count entries, descending by count. Equal counts keep
    /// their first-seen order (stable sort over the insertion sequence).
    pub fn top(&self, n: usize) -> Vec<(K, u64)> {
        let mut ranked: Vec<(K, u64)> = self
            .order
            .iter()
            .map(|key| (key.clone(), self.count(key)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Running statistics for one analysis pass.
///
/// Fed one accepted entry at a time via [`add_entry`](Self::add_entry); every
/// accepted entry contributes exactly one unit to the total, the size sample
/// set, and each of the four frequency tables. All queries are computed on
/// demand and degrade to zero/empty on an empty aggregator rather than
/// erroring — an all-zero report is the defined "nothing accepted" signal.
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    total_requests: u64,
    response_sizes: Vec<u64>,
    status_codes: FreqTable<u16>,
    resources: FreqTable<String>,
    http_methods: FreqTable<String>,
    ip_addresses: FreqTable<String>,
}

impl StatisticsAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one accepted entry. O(1) amortized.
    ///
    /// An entry without a resource (cannot happen for parsed entries, but the
    /// model allows it) is tallied under the `-` placeholder so each table
    /// still receives one unit per entry.
    pub fn add_entry(&mut self, entry: &LogEntry) {
        self.status_codes.increment(entry.status_code);
        self.resources.increment(
            entry
                .resource
                .clone()
                .unwrap_or_else(|| FIELD_PLACEHOLDER.to_string()),
        );
        self.http_methods.increment(entry.http_method.clone());
        self.ip_addresses.increment(entry.client_ip.clone());

        self.response_sizes.push(entry.body_bytes_sent);
        self.total_requests += 1;
    }

    /// Number of accepted entries.
    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    /// Arithmetic mean of the recorded response sizes, rounded half-up.
    /// Zero when no data has been recorded.
    pub fn average_response_size(&self) -> u64 {
        if self.response_sizes.is_empty() {
            return 0;
        }
        let sum: u64 = self.response_sizes.iter().sum();
        let average = sum as f64 / self.response_sizes.len() as f64;
        average.round() as u64
    }

    /// Response size at the given percentile, using the rank formula
    /// `ceil(p/100 * n) - 1` over the ascending-sorted sizes. The formula is
    /// kept verbatim for stable report output; the resulting index is clamped
    /// into range so boundary percentiles cannot step outside the sample set.
    /// Zero when no data has been recorded.
    pub fn percentile_response_size(&self, percentile: u8) -> u64 {
        if self.response_sizes.is_empty() {
            return 0;
        }

        let mut sorted = self.response_sizes.clone();
        sorted.sort_unstable();

        let rank = (f64::from(percentile) / 100.0 * sorted.len() as f64).ceil() as usize;
        let index = rank.saturating_sub(1).min(sorted.len() - 1);
        sorted[index]
    }

    /// Top `n` request targets by count.
    pub fn top_resources(&self, n: usize) -> Vec<(String, u64)> {
        self.resources.top(n)
    }

    /// Top `n` status codes by count.
    pub fn top_status_codes(&self, n: usize) -> Vec<(u16, u64)> {
        self.status_codes.top(n)
    }

    /// Top `n` HTTP methods by count.
    pub fn top_http_methods(&self, n: usize) -> Vec<(String, u64)> {
        self.http_methods.top(n)
    }

    /// Top `n` client IPs by count.
    pub fn top_ip_addresses(&self, n: usize) -> Vec<(String, u64)> {
        self.ip_addresses.top(n)
    }
}
