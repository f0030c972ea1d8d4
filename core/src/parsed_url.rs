//! Endpoint URL parsing (`parseURL`).

use crate::Value;
use serde::Serialize;
use url::{Host, Url};

/// An endpoint override broken into the parts rules interpolate.
///
/// `authority` and `path` are taken verbatim from the input so that a
/// custom endpoint is reproduced exactly; `url` only validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUrl {
    /// Lowercased scheme, e.g. `https`.
    pub scheme: String,
    /// Host plus optional userinfo and port, as written.
    pub authority: String,
    /// Path as written; empty when the input has none.
    pub path: String,
    /// `path` with exactly one leading and one trailing `/`.
    pub normalized_path: String,
    /// Host is an IPv4 or IPv6 literal.
    pub is_ip: bool,
}

impl ParsedUrl {
    /// Parse an absolute URL with a host.
    ///
    /// Returns `None` on any malformed input, on a URL without a host, and
    /// on a URL carrying a query string.
    ///
    /// ```
    /// use s3rules::ParsedUrl;
    ///
    /// let url = ParsedUrl::parse("http://127.0.0.1:8080/prefix").unwrap();
    /// assert_eq!(url.authority, "127.0.0.1:8080");
    /// assert_eq!(url.normalized_path, "/prefix/");
    /// assert!(url.is_ip);
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let parsed = Url::parse(input).ok()?;
        if parsed.query().is_some() {
            return None;
        }
        let is_ip = match parsed.host()? {
            Host::Domain(_) => false,
            Host::Ipv4(_) | Host::Ipv6(_) => true,
        };

        let (_, rest) = input.split_once("://")?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return None;
        }

        Some(Self {
            scheme: parsed.scheme().to_string(),
            authority: authority.to_string(),
            path: path.to_string(),
            normalized_path: normalize_path(path),
            is_ip,
        })
    }

    pub(crate) fn attr(&self, name: &str) -> Option<Value> {
        let value = match name {
            "scheme" => Value::from(self.scheme.as_str()),
            "authority" => Value::from(self.authority.as_str()),
            "path" => Value::from(self.path.as_str()),
            "normalizedPath" => Value::from(self.normalized_path.as_str()),
            "isIp" => Value::Bool(self.is_ip),
            _ => return None,
        };
        Some(value)
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut normalized = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(path);
    if !path.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
