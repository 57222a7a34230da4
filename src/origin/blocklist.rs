//! Denied-host set construction.

use std::collections::BTreeSet;

use crate::origin::host::host_of;

/// Hosts that are categorically denied regardless of configuration.
pub const BUILTIN_BLOCKED_HOSTS: &[&str] = &["infragrid.v.network"];

/// The definitive set of hostnames that are never admitted.
///
/// Entries are lowercase, trimmed, non-empty, and deduplicated.
/// Malformed configured entries are skipped rather than failing the
/// request: this is a defence-in-depth denylist, not a
/// correctness-critical parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedHostSet {
    hosts: BTreeSet<String>,
}

impl Default for BlockedHostSet {
    /// The built-in hosts are part of every set, configured or not.
    fn default() -> Self {
        Self::from_sources(Vec::<String>::new())
    }
}

impl BlockedHostSet {
    /// Build the set from the built-in list plus zero or more
    /// configured comma-separated origin list strings.
    pub fn from_sources<I, S>(configured: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hosts: BTreeSet<String> = BUILTIN_BLOCKED_HOSTS
            .iter()
            .map(|h| (*h).to_string())
            .collect();

        for list in configured {
            for token in list.as_ref().split(',') {
                if let Some(host) = host_of(token) {
                    hosts.insert(host);
                }
            }
        }

        Self { hosts }
    }

    /// Membership test for an already-extracted host.
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(&host.trim().to_lowercase())
    }

    /// Whether the host derived from an origin string is blocked.
    ///
    /// Origins with no extractable host are not blocked; the gate
    /// handles them via the missing-origin path.
    pub fn contains_origin(&self, origin: &str) -> bool {
        host_of(origin).map_or(false, |h| self.hosts.contains(&h))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Sorted enumeration for diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Stable signature of the set: sorted, comma-joined host list.
    ///
    /// Identical configuration always yields an identical signature, so
    /// reloads can skip the swap when nothing effective changed.
    pub fn signature(&self) -> String {
        self.hosts
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_hosts_always_present() {
        let set = BlockedHostSet::from_sources(Vec::<String>::new());
        assert!(set.contains("infragrid.v.network"));
        assert!(set.contains_origin("https://infragrid.v.network"));
    }

    #[test]
    fn test_configured_lists_are_merged_and_normalized() {
        let set = BlockedHostSet::from_sources([
            "https://Evil.TEST, rogue.test/path ,",
            "https://evil.test",
        ]);
        assert!(set.contains("evil.test"));
        assert!(set.contains("rogue.test"));
        // Deduplicated: builtin + evil.test + rogue.test.
        assert_eq!(set.len(), BUILTIN_BLOCKED_HOSTS.len() + 2);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let set = BlockedHostSet::from_sources([" , ,https://, "]);
        assert_eq!(set.len(), BUILTIN_BLOCKED_HOSTS.len());
    }

    #[test]
    fn test_enumeration_is_sorted() {
        let set = BlockedHostSet::from_sources(["zzz.test,aaa.test"]);
        let hosts: Vec<&str> = set.iter().collect();
        let mut sorted = hosts.clone();
        sorted.sort();
        assert_eq!(hosts, sorted);
    }

    #[test]
    fn test_signature_is_stable_across_input_order() {
        let a = BlockedHostSet::from_sources(["one.test,two.test"]);
        let b = BlockedHostSet::from_sources(["two.test", "one.test"]);
        assert_eq!(a.signature(), b.signature());
    }
}
