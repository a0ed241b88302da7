//! Query-string encoding for list and get options.
//!
//! Each options type enumerates its own fields through [`QueryParams`];
//! empty strings, zero numbers and unset values are omitted.

use chrono::{DateTime, SecondsFormat, Utc};
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Cursor-based pagination options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Continue after this cursor.
    pub cursor: Option<String>,
    /// Maximum number of items per page.
    pub limit: Option<u32>,
}

/// Options for listing servers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerListOptions {
    /// Pagination.
    pub list: ListOptions,
    /// Free-text search over server names.
    pub search: Option<String>,
    /// Only servers updated at or after this time.
    pub updated_since: Option<DateTime<Utc>>,
    /// Version filter, e.g. `latest`.
    pub version: Option<String>,
}

/// Options for fetching a single server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerGetOptions {
    /// Version to fetch; `latest` when unset.
    pub version: Option<String>,
}

/// Explicit mapping from an options value to query parameters.
pub trait QueryParams {
    /// Non-empty parameters as `(name, value)` pairs.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

fn push_str(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        pairs.push((name, v.to_string()));
    }
}

impl QueryParams for ListOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_str(&mut pairs, "cursor", &self.cursor);
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

impl QueryParams for ServerListOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.list.query_pairs();
        push_str(&mut pairs, "search", &self.search);
        if let Some(since) = self.updated_since {
            pairs.push((
                "updated_since",
                since.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ));
        }
        push_str(&mut pairs, "version", &self.version);
        pairs
    }
}

impl<T: QueryParams> QueryParams for Option<T> {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.as_ref().map(T::query_pairs).unwrap_or_default()
    }
}

impl<T: QueryParams + ?Sized> QueryParams for &T {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        (**self).query_pairs()
    }
}

/// Whether the part of `path` before any query names a scheme.
///
/// A query may legitimately carry `://`, e.g. `search=https://github.com/x`.
pub(crate) fn has_scheme(path: &str) -> bool {
    path.split_once('?')
        .map_or(path, |(before, _)| before)
        .contains("://")
}

/// Append the parameters of `opts` to the query of the relative `path`.
///
/// Existing parameters are kept and the encoded options are joined after
/// them with `&`. Encoded keys are emitted in sorted order.
pub fn append_query(path: &str, opts: &impl QueryParams) -> Result<String> {
    if has_scheme(path) {
        return Err(Error::config(format!(
            "expected a relative path, got {:?}",
            path
        )));
    }

    let mut pairs = opts.query_pairs();
    if pairs.is_empty() {
        return Ok(path.to_string());
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();

    let (base, existing) = match path.split_once('?') {
        Some((base, query)) => (base, query),
        None => (path, ""),
    };

    if existing.is_empty() {
        Ok(format!("{}?{}", base, encoded))
    } else {
        Ok(format!("{}?{}&{}", base, existing, encoded))
    }
}
