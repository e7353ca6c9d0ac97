//! The structured access-log record produced by the parser.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One parsed line of an nginx combined-format access log.
///
/// Entries are immutable values: they are created once by
/// [`crate::parse::parse_line`], carry no identity beyond field equality, and
/// are only held transiently while the pipeline decides whether to aggregate
/// them.
///
/// `http_method` and `resource` are derived from `request` rather than parsed
/// from the raw line: the method is the first whitespace-delimited token, the
/// resource the second. Since the request line is validated before extraction,
/// `resource` is `None` only if the request sub-grammar fails to match, which
/// a validated request cannot do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Remote client address: IPv4 dotted quad or an IPv6-ish token
    pub client_ip: String,
    /// Authenticated user, absent when logged as `-`
    pub remote_user: Option<String>,
    /// Request time, including the log's UTC offset
    pub timestamp: DateTime<FixedOffset>,
    /// The full request line: `METHOD resource HTTP/major.minor`
    pub request: String,
    /// First token of the request line
    pub http_method: String,
    /// Second token of the request line
    pub resource: Option<String>,
    /// Response status, 100..=599
    pub status_code: u16,
    /// Response body size in bytes
    pub body_bytes_sent: u64,
    /// Referer header, absent when logged as `-`
    pub http_referer: Option<String>,
    /// User agent header, never blank
    pub http_user_agent: String,
}
