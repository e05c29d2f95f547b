//! Domain keys.
//!
//! Every comparison between a live page and a stored site goes through this
//! module. A key is a hostname with one leading `www.` removed. Matching is
//! exact and case-sensitive: no subdomain or wildcard matching.
//!
//! Anything that cannot be read as a URL or a bare hostname becomes the empty
//! key, which never matches a record.

use url::Url;

const WWW: &str = "www.";

/// Canonicalize a URL or bare hostname to a domain key.
///
/// Returns `""` when the input is neither a URL with a host nor something
/// that parses as a host on its own (`"not a url"`).
pub fn normalize(url_or_host: &str) -> String {
    let input = url_or_host.trim();
    if input.is_empty() {
        return String::new();
    }

    let host = match Url::parse(input) {
        Ok(url) => match url.host_str().filter(|host| !host.is_empty()) {
            Some(host) => Some(host.to_string()),
            // "example.com:8080" parses with "example.com" as its scheme.
            None if url.scheme().contains('.') => host_of(&format!("http://{input}")),
            // mailto:, tel:, about:blank and friends have no host.
            None => None,
        },
        // Bare hosts ("example.com", "www.example.com/path") have no scheme.
        Err(_) if !input.contains("://") => host_of(&format!("http://{input}")),
        Err(_) => None,
    };

    match host {
        Some(host) => strip_www(&host).to_string(),
        None => String::new(),
    }
}

/// Comparison key for a stored `site` value.
///
/// Stored sites are kept as the user typed them; a pasted URL is reduced to
/// its host, anything else only loses its `www.` prefix.
pub fn site_key(site: &str) -> String {
    let site = site.trim();
    if site.contains("://") {
        return normalize(site);
    }
    strip_www(site).to_string()
}

/// True when a live domain key refers to the stored `site`.
pub fn matches(live_key: &str, site: &str) -> bool {
    !live_key.is_empty() && live_key == site_key(site)
}

fn host_of(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix(WWW).unwrap_or(host)
}
