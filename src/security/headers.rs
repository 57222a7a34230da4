//! Header hygiene for relayed traffic and responses.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Headers that describe the client connection rather than the request,
/// and must not be forwarded upstream or back to the client.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "proxy-connection",
    "keep-alive",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "host",
    // Bodies are re-framed after buffering.
    "content-length",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Copy a header map, dropping hop-by-hop entries.
pub fn filter_forwarded(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Security response headers applied when `security.enable_headers` is
/// set.
pub fn standard_response_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("edge.test"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));

        let filtered = filter_forwarded(&headers);
        assert!(filtered.get(header::HOST).is_none());
        assert!(filtered.get(header::CONNECTION).is_none());
        assert!(filtered.get(header::CONTENT_TYPE).is_some());
        assert!(filtered.get(header::AUTHORIZATION).is_some());
    }
}
