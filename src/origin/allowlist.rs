//! Permitted-origin set construction.

use std::collections::HashSet;

use crate::origin::blocklist::BlockedHostSet;

/// The set of origins explicitly permitted to call the edge functions.
///
/// Entries are raw origin strings kept in configured order: callers
/// compare the incoming `Origin` header by exact match, and the first
/// surviving entry doubles as the CORS fallback value. Any origin whose
/// host appears in the [`BlockedHostSet`] is excluded at construction:
/// the blocklist wins over operator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOriginSet {
    origins: Vec<String>,
}

impl AllowedOriginSet {
    /// Merge one or more comma-separated origin list strings, dropping
    /// empties, duplicates, and anything the blocklist forbids.
    pub fn from_sources<I, S>(configured: I, blocked: &BlockedHostSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut origins = Vec::new();
        let mut seen = HashSet::new();

        for list in configured {
            for token in list.as_ref().split(',') {
                let origin = token.trim();
                if origin.is_empty() || blocked.contains_origin(origin) {
                    continue;
                }
                if seen.insert(origin.to_string()) {
                    origins.push(origin.to_string());
                }
            }
        }

        Self { origins }
    }

    /// An empty allowlist means "no restriction configured".
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    /// Exact raw-string membership test against the `Origin` header.
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// First surviving entry, used as the CORS fallback header value.
    pub fn first(&self) -> Option<&str> {
        self.origins.first().map(String::as_str)
    }

    /// Enumeration in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    /// Stable signature: sorted, comma-joined origin list.
    pub fn signature(&self) -> String {
        let mut sorted: Vec<&str> = self.origins.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.join(",")
    }
}
