//! Rate-limit bookkeeping.
//!
//! The registry reports its limits through three response headers. They are
//! parsed on every response, successful or not, and remembered per request
//! path for the lifetime of the client.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;

/// Header carrying the request quota for the current window.
pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
/// Header carrying the requests left in the current window.
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
/// Header carrying the RFC 3339 time at which the window resets.
pub const HEADER_RESET: &str = "X-RateLimit-Reset";

/// Rate-limit state reported by the registry.
///
/// Missing or malformed headers leave the corresponding field at its zero
/// value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rate {
    /// Requests allowed per window.
    pub limit: i64,
    /// Requests left in the current window.
    pub remaining: i64,
    /// When the current window resets.
    pub reset: Option<DateTime<Utc>>,
}

impl Rate {
    /// Parse rate-limit headers. Never fails.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_int(headers, HEADER_LIMIT),
            remaining: header_int(headers, HEADER_REMAINING),
            reset: header_str(headers, HEADER_RESET)
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn header_int(headers: &HeaderMap, name: &str) -> i64 {
    header_str(headers, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

/// Last known [`Rate`] per request path.
#[derive(Debug, Default)]
pub(crate) struct RateCache {
    entries: Mutex<HashMap<String, Rate>>,
}

impl RateCache {
    pub(crate) fn record(&self, path: &str, rate: Rate) {
        self.entries.lock().insert(path.to_string(), rate);
    }

    pub(crate) fn get(&self, path: &str) -> Option<Rate> {
        self.entries.lock().get(path).copied()
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, Rate> {
        self.entries.lock().clone()
    }
}
