//! Admission decisions for cross-origin requests.
//!
//! The gate is a pure decision function over an immutable configuration
//! snapshot: no states, no transitions, input → output. Snapshots are
//! shared across concurrent requests without locking and replaced
//! wholesale when configuration changes.

use crate::origin::allowlist::AllowedOriginSet;
use crate::origin::blocklist::BlockedHostSet;

/// Wildcard value for `Access-Control-Allow-Origin` when nothing better
/// can be offered.
pub const ANY_ORIGIN: &str = "*";

/// Decides, for a single incoming request, whether to admit it and what
/// `Access-Control-Allow-Origin` value to return.
#[derive(Debug, Clone, Default)]
pub struct OriginGate {
    blocked: BlockedHostSet,
    allowed: AllowedOriginSet,
}

impl OriginGate {
    pub fn new(blocked: BlockedHostSet, allowed: AllowedOriginSet) -> Self {
        Self { blocked, allowed }
    }

    /// Build a gate from raw configured list strings (blocklist first,
    /// so the allowlist can be filtered through it).
    pub fn from_lists<B, A, S, T>(blocked_lists: B, allowed_lists: A) -> Self
    where
        B: IntoIterator<Item = S>,
        A: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let blocked = BlockedHostSet::from_sources(blocked_lists);
        let allowed = AllowedOriginSet::from_sources(allowed_lists, &blocked);
        Self { blocked, allowed }
    }

    /// Whether a request declaring `origin` may proceed.
    ///
    /// A missing `Origin` header, or one whose host is blocked, is
    /// admitted only when no allowlist is configured at all (the
    /// fail-open default for same-origin and non-browser callers).
    /// With a non-empty allowlist, admission requires exact raw-string
    /// membership and a non-blocked host.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        let origin = match origin {
            Some(o) if !self.blocked.contains_origin(o) => o,
            // No origin, or a blocked host: open only when unrestricted.
            _ => return self.allowed.is_empty(),
        };

        self.allowed.is_empty() || self.allowed.contains(origin)
    }

    /// The `Access-Control-Allow-Origin` value for a request.
    ///
    /// Admitted origins are echoed verbatim so credentialed requests
    /// get the exact-match echo they require. Everything else falls
    /// back to the first allowlist entry, then to `"*"`. The result is
    /// never a blocked host.
    pub fn resolve_allow_origin<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        if let Some(o) = origin {
            if self.is_allowed(Some(o)) && !self.blocked.contains_origin(o) {
                return o;
            }
        }
        // Allowlist entries are filtered at construction, so the first
        // one is already non-blocked.
        self.allowed.first().unwrap_or(ANY_ORIGIN)
    }

    pub fn blocked(&self) -> &BlockedHostSet {
        &self.blocked
    }

    pub fn allowed(&self) -> &AllowedOriginSet {
        &self.allowed
    }

    /// Combined signature of both sets, used to decide whether a
    /// reloaded configuration actually changes anything.
    pub fn signature(&self) -> String {
        format!("{}|{}", self.blocked.signature(), self.allowed.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(blocked: &[&str], allowed: &[&str]) -> OriginGate {
        OriginGate::from_lists(blocked.iter().copied(), allowed.iter().copied())
    }

    #[test]
    fn test_blocklist_wins_over_allowlist_membership() {
        let g = gate(&["evil.test"], &["https://evil.test", "https://safe.test"]);
        assert!(!g.is_allowed(Some("https://evil.test")));
        assert!(g.is_allowed(Some("https://safe.test")));
    }

    #[test]
    fn test_empty_allowlist_fails_open() {
        let g = gate(&[], &[]);
        assert!(g.is_allowed(None));
        assert!(g.is_allowed(Some("https://anywhere.test")));
        assert_eq!(g.resolve_allow_origin(None), ANY_ORIGIN);
    }

    #[test]
    fn test_missing_origin_denied_when_allowlist_configured() {
        let g = gate(&[], &["https://one.test"]);
        assert!(!g.is_allowed(None));
    }

    #[test]
    fn test_allowed_origin_is_echoed_verbatim() {
        let g = gate(&[], &["https://one.test", "https://two.test"]);
        assert_eq!(
            g.resolve_allow_origin(Some("https://two.test")),
            "https://two.test"
        );
    }

    #[test]
    fn test_rejected_origin_resolves_to_first_allowlist_entry() {
        let g = gate(&[], &["https://one.test", "https://two.test"]);
        assert!(!g.is_allowed(Some("https://three.test")));
        assert_eq!(
            g.resolve_allow_origin(Some("https://three.test")),
            "https://one.test"
        );
    }

    #[test]
    fn test_resolved_header_is_never_a_blocked_host() {
        // Even fail-open admission of a blocked host must not echo it.
        let g = gate(&["evil.test"], &[]);
        assert!(g.is_allowed(Some("https://evil.test")));
        assert_eq!(g.resolve_allow_origin(Some("https://evil.test")), ANY_ORIGIN);
    }

    #[test]
    fn test_builtin_blocklist_worked_example() {
        // Blocklist contains infragrid.v.network; the allowlist names it
        // anyway. The effective allowlist is {https://safe.test}.
        let g = gate(&[], &["https://infragrid.v.network", "https://safe.test"]);
        assert_eq!(g.allowed().len(), 1);
        assert!(!g.is_allowed(Some("https://infragrid.v.network")));
        assert_eq!(
            g.resolve_allow_origin(Some("https://infragrid.v.network")),
            "https://safe.test"
        );
    }

    #[test]
    fn test_unconfigured_worked_example() {
        let g = OriginGate::default();
        assert!(g.is_allowed(None));
        assert_eq!(g.resolve_allow_origin(None), ANY_ORIGIN);
    }

    #[test]
    fn test_signature_reflects_effective_sets() {
        let a = gate(&["evil.test"], &["https://one.test"]);
        let b = gate(&["https://evil.test"], &["https://one.test"]);
        // Same effective sets, same signature, regardless of spelling.
        assert_eq!(a.signature(), b.signature());

        let c = gate(&["evil.test"], &["https://two.test"]);
        assert_ne!(a.signature(), c.signature());
    }
}
