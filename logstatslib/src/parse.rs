//! Combined-format log line parsing and validation.
//!
//! Parsing is all-or-nothing per line: the whole line must match the fixed
//! 9-group combined-format grammar, and every captured field must pass its own
//! semantic validation. A corrupt numeric or time field would silently skew
//! every downstream aggregate, so a line with any bad field is rejected rather
//! than defaulted. Rejections are per-line and never abort a pass.

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::entry::LogEntry;

/// The literal nginx writes for an absent field.
pub(crate) const FIELD_PLACEHOLDER: &str = "-";

const MIN_STATUS_CODE: u16 = 100;
const MAX_STATUS_CODE: u16 = 599;
const MAX_IP_OCTET: u32 = 255;
const IPV4_PARTS: usize = 4;

/// Local time as nginx logs it: `17/May/2015:08:05:32 +0000`
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// The whole combined-format line, anchored, with exactly 9 capture groups:
/// client IP, literal hyphen, remote user, bracketed local time, quoted
/// request, 3-digit status, body size, quoted referer, quoted user agent.
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\S+)\s+(-)\s+(\S+)\s+\[(.*?)\]\s+"(.*?)"\s+(\d{3})\s+(\d+)\s+"(.*?)"\s+"(.*?)"$"#,
    )
    .expect("combined log line pattern is valid")
});

/// Dotted quad or a generic hex/colon token. Matched with find semantics;
/// the per-octet range check below does the strict part for IPv4.
static IP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[0-9]{1,3}\.){3}[0-9]{1,3}|[a-fA-F0-9:]+")
        .expect("client IP pattern is valid")
});

/// `METHOD SP target SP HTTP/major.minor`, full match, fixed method set.
static REQUEST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:GET|POST|PUT|DELETE|HEAD|CONNECT|OPTIONS|TRACE|PATCH) [^ ]+ HTTP/[0-9]\.[0-9]$")
        .expect("request line pattern is valid")
});

/// Sub-grammar that extracts the resource target from a request line.
static RESOURCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\S+\s(\S+)\sHTTP/[0-9]\.[0-9]").expect("resource pattern is valid")
});

/// Why a single line was rejected.
///
/// Each semantic rule has its own variant so the diagnostic channel can report
/// what exactly was wrong with the offending line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not match the combined-format grammar at all
    #[error("line does not match the combined log format")]
    MalformedStructure,

    /// Client IP is neither a valid dotted quad nor an IPv6-ish token
    #[error("invalid client IP address: {0}")]
    InvalidClientIp(String),

    /// Bracketed local time failed to parse
    #[error("invalid local time: {0}")]
    InvalidTimestamp(String),

    /// Request line has a disallowed method or a malformed shape
    #[error("invalid request line: {0}")]
    InvalidRequest(String),

    /// Status code outside 100..=599
    #[error("invalid HTTP status code: {0}")]
    InvalidStatusCode(String),

    /// Body size is not a non-negative integer
    #[error("invalid response body size: {0}")]
    InvalidBodyBytes(String),

    /// User agent is empty after trimming
    #[error("blank user agent")]
    BlankUserAgent,
}

/// Parse one raw log line into a [`LogEntry`].
///
/// Structural mismatch and every semantic validation failure reject the whole
/// line; there are no partial entries. The function is pure — callers that
/// want the rejection observable (the pipeline does) log the returned reason
/// themselves.
pub fn parse_line(line: &str) -> Result<LogEntry, ParseError> {
    let caps = LINE_PATTERN
        .captures(line)
        .ok_or(ParseError::MalformedStructure)?;

    let client_ip = validate_ip(&caps[1])?;
    let remote_user = present_unless_placeholder(&caps[3]);
    let timestamp = validate_timestamp(&caps[4])?;
    let request = validate_request(&caps[5])?;
    let status_code = validate_status_code(&caps[6])?;
    let body_bytes_sent = validate_body_bytes(&caps[7])?;
    let http_referer = present_unless_placeholder(&caps[8]);
    let http_user_agent = validate_user_agent(&caps[9])?;

    let http_method = extract_method(&request);
    let resource = extract_resource(&request);

    Ok(LogEntry {
        client_ip,
        remote_user,
        timestamp,
        request,
        http_method,
        resource,
        status_code,
        body_bytes_sent,
        http_referer,
        http_user_agent,
    })
}

/// Map the `-` placeholder to an absent field, keep anything else verbatim.
pub(crate) fn present_unless_placeholder(value: &str) -> Option<String> {
    if value == FIELD_PLACEHOLDER {
        None
    } else {
        Some(value.to_string())
    }
}

fn validate_ip(raw: &str) -> Result<String, ParseError> {
    if !IP_PATTERN.is_match(raw) {
        return Err(ParseError::InvalidClientIp(raw.to_string()));
    }

    // A token with exactly four dot-separated parts must be a real dotted
    // quad; anything else (IPv6, hostname-ish hex) passed the generic check.
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() == IPV4_PARTS {
        for part in parts {
            let octet: u32 = part
                .parse()
                .map_err(|_| ParseError::InvalidClientIp(raw.to_string()))?;
            if octet > MAX_IP_OCTET {
                return Err(ParseError::InvalidClientIp(raw.to_string()));
            }
        }
    }

    Ok(raw.to_string())
}

fn validate_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| ParseError::InvalidTimestamp(raw.to_string()))
}

fn validate_request(raw: &str) -> Result<String, ParseError> {
    if !REQUEST_PATTERN.is_match(raw) {
        return Err(ParseError::InvalidRequest(raw.to_string()));
    }
    Ok(raw.to_string())
}

fn validate_status_code(raw: &str) -> Result<u16, ParseError> {
    let code: u16 = raw
        .parse()
        .map_err(|_| ParseError::InvalidStatusCode(raw.to_string()))?;
    if !(MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&code) {
        return Err(ParseError::InvalidStatusCode(raw.to_string()));
    }
    Ok(code)
}

fn validate_body_bytes(raw: &str) -> Result<u64, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::InvalidBodyBytes(raw.to_string()))
}

fn validate_user_agent(raw: &str) -> Result<String, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::BlankUserAgent);
    }
    Ok(raw.to_string())
}

fn extract_method(request: &str) -> String {
    request
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn extract_resource(request: &str) -> Option<String> {
    RESOURCE_PATTERN
        .captures(request)
        .map(|caps| caps[1].to_string())
}
