//! Function library: the pure primitives rule conditions call.
//!
//! Every function is total. Where a precondition does not hold the result
//! is `None` (or `false` for predicates), which the evaluator treats as
//! "try the next rule".

use regex::Regex;
use std::sync::LazyLock;

pub use crate::arn::Arn;
pub use crate::parsed_url::ParsedUrl;

static HOST_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\d][a-zA-Z\d\-]{0,62}$").expect("static regex"));

static BUCKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z\d][a-z\d\-]{1,61}[a-z\d]$").expect("static regex"));

static BUCKET_SUBDOMAINS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z\d][a-z\d\-.]{1,61}[a-z\d]$").expect("static regex"));

static IPV4_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.){3}\d+$").expect("static regex"));

static ADJACENT_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.\-]{2}").expect("static regex"));

/// ASCII-only slice of `input` over `[start, stop)`.
///
/// With `reverse`, both bounds are measured from the end of the string.
/// Returns `None` when `start >= stop`, when `input` is shorter than
/// `stop` bytes, or when the slice contains a non-ASCII byte.
///
/// ```
/// use s3rules::functions::substring;
///
/// assert_eq!(substring("hello", 0, 3, false), Some("hel"));
/// assert_eq!(substring("hello", 0, 3, true), Some("llo"));
/// assert_eq!(substring("hi", 0, 5, false), None);
/// ```
#[must_use]
pub fn substring(input: &str, start: usize, stop: usize, reverse: bool) -> Option<&str> {
    if start >= stop || input.len() < stop {
        return None;
    }
    let (from, to) = if reverse {
        (input.len() - stop, input.len() - start)
    } else {
        (start, stop)
    };
    let bytes = input.as_bytes().get(from..to)?;
    if !bytes.is_ascii() {
        return None;
    }
    input.get(from..to)
}

/// Percent-encode with form-encoding rules, then use `%20` for space,
/// encode `*`, and leave `~` bare.
///
/// ```
/// use s3rules::functions::uri_encode;
///
/// assert_eq!(uri_encode("a b+c*d~e"), "a%20b%2Bc%2Ad~e");
/// ```
#[must_use]
pub fn uri_encode(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Parse an endpoint URL. See [`ParsedUrl::parse`].
#[must_use]
pub fn parse_url(input: &str) -> Option<ParsedUrl> {
    ParsedUrl::parse(input)
}

/// A single DNS label (1–63 chars, alphanumeric first), or with
/// `allow_sub_domains` a dotted name whose every label is one.
#[must_use]
pub fn is_valid_host_label(value: &str, allow_sub_domains: bool) -> bool {
    if allow_sub_domains {
        value.split('.').all(|label| HOST_LABEL.is_match(label))
    } else {
        HOST_LABEL.is_match(value)
    }
}

/// Whether `label` can be placed in a host name as an S3 bucket.
///
/// Lowercase letters, digits and `-`, 3–63 chars, alphanumeric at both
/// ends. With `allow_sub_domains` dots are allowed too, but IPv4-shaped
/// names and any two adjacent separators (`..`, `--`, `.-`, `-.`) are
/// rejected.
#[must_use]
pub fn is_virtual_hostable_s3_bucket(label: &str, allow_sub_domains: bool) -> bool {
    if !allow_sub_domains {
        return BUCKET.is_match(label);
    }
    BUCKET_SUBDOMAINS.is_match(label)
        && !IPV4_SHAPE.is_match(label)
        && !ADJACENT_SEPARATORS.is_match(label)
}

/// Bounds-safe list read.
#[must_use]
pub fn list_access<T>(list: Option<&[T]>, index: usize) -> Option<&T> {
    list?.get(index)
}

/// Null-safe string equality. A missing side never equals anything,
/// including another missing side.
#[must_use]
pub fn string_equals(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Null-safe boolean equality, with the same rule as [`string_equals`].
#[must_use]
pub fn boolean_equals(a: Option<bool>, b: Option<bool>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Parse an ARN. See [`Arn::parse`].
#[must_use]
pub fn parse_arn(input: &str) -> Option<Arn> {
    Arn::parse(input)
}
