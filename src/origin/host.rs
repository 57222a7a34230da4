//! Canonical host extraction from origin strings.

use url::Url;

/// Extract the canonical host from an origin or URL-ish token.
///
/// Tries a full URL parse first and takes the parsed host. Tokens that
/// do not parse as a URL, or parse without a host (bare hostnames parse
/// as scheme-only URLs), fall back to stripping a leading `scheme://`
/// and taking everything before the first `/`.
///
/// The result is trimmed and lowercased; empty results yield `None`.
pub fn host_of(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(token) {
        if let Some(host) = url.host_str() {
            let host = host.trim().to_lowercase();
            if !host.is_empty() {
                return Some(host);
            }
        }
    }

    let rest = match token.find("://") {
        Some(idx) => &token[idx + 3..],
        None => token,
    };
    let host = rest
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_origin() {
        assert_eq!(host_of("https://app.nexus.test"), Some("app.nexus.test".into()));
        assert_eq!(host_of("http://app.nexus.test/path"), Some("app.nexus.test".into()));
    }

    #[test]
    fn test_port_is_discarded_when_url_parses() {
        assert_eq!(host_of("https://app.nexus.test:8443"), Some("app.nexus.test".into()));
    }

    #[test]
    fn test_bare_hostname_falls_back() {
        assert_eq!(host_of("app.nexus.test"), Some("app.nexus.test".into()));
        // A bare host:port parses as a scheme-only URL, so the fallback
        // keeps the port suffix intact.
        assert_eq!(host_of("app.nexus.test:8080"), Some("app.nexus.test:8080".into()));
    }

    #[test]
    fn test_lowercased_and_trimmed() {
        assert_eq!(host_of("  HTTPS://App.Nexus.TEST  "), Some("app.nexus.test".into()));
        assert_eq!(host_of("App.Nexus.TEST/path"), Some("app.nexus.test".into()));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(host_of(""), None);
        assert_eq!(host_of("   "), None);
        assert_eq!(host_of("https://"), None);
    }
}
