//! Source URL handling shared by capture and lint.
//!
//! `domain` in a record is always the [`netloc`] of its parsed `source`, so
//! both sides normalize through [`url::Url`] (IDNA hosts, default ports).

use url::Url;

/// Parse an http(s) URL with a host.
#[must_use]
pub fn parse_source_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => Some(parsed),
        _ => None,
    }
}

/// Host plus explicit port, as written in `domain`.
#[must_use]
pub fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// [`netloc`] of an http(s) source URL.
#[must_use]
pub fn source_host(raw: &str) -> Option<String> {
    parse_source_url(raw).map(|url| netloc(&url))
}

/// Whether a stored `domain` names the host of `source`.
///
/// The domain is normalized under the source's scheme, so `example.com:443`
/// matches `https://example.com/` and a Unicode host matches its IDNA form.
#[must_use]
pub fn domain_matches(domain: &str, source: &Url) -> bool {
    let expected = netloc(source);
    let domain = domain.trim();
    match Url::parse(&format!("{}://{domain}/", source.scheme())) {
        Ok(parsed) if parsed.path() == "/" => netloc(&parsed).eq_ignore_ascii_case(&expected),
        _ => domain.eq_ignore_ascii_case(&expected),
    }
}
