//! `Value` — Erased data that flows between expressions.
//!
//! Expressions evaluate to `Option<Value>`: `None` is "no value" and makes
//! the enclosing condition fail. Derived values (ARNs, URLs, partitions)
//! are shared behind `Arc` so binding them into a scope and reading them
//! back from nested rules never copies the parse result.

use crate::{functions, Arn, ParsedUrl, PartitionOutputs};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The erased value type.
///
/// # Example
///
/// ```
/// use s3rules::Value;
///
/// let v = Value::from("us-west-2");
/// assert_eq!(v.as_str(), Some("us-west-2"));
/// assert_eq!(v.type_name(), "string");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String data (parameters, substrings, encoded names).
    String(String),
    /// Boolean data (flags, function results).
    Bool(bool),
    /// Ordered list, e.g. an ARN's resource components.
    Array(Vec<Value>),
    /// Parsed ARN.
    Arn(Arc<Arn>),
    /// Parsed endpoint URL.
    Url(Arc<ParsedUrl>),
    /// Partition lookup result.
    Partition(Arc<PartitionOutputs>),
}

impl Value {
    /// Returns the string if this is `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bool if this is `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text used when the value is interpolated into a template.
    ///
    /// Only strings and booleans render; structured values do not.
    #[must_use]
    pub fn as_template_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) => Some(Cow::Borrowed(s)),
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            _ => None,
        }
    }

    /// A condition passes unless its value is missing or `false`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Bool(false))
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Array(_) => "array",
            Self::Arn(_) => "arn",
            Self::Url(_) => "url",
            Self::Partition(_) => "partition",
        }
    }

    /// Walk an attribute path (`getAttr`).
    ///
    /// Returns `None` if any segment does not apply to the value it is
    /// applied to, or an index is out of range.
    #[must_use]
    pub fn get_attr(&self, path: &AttrPath) -> Option<Value> {
        let mut current = Cow::Borrowed(self);
        for segment in &path.0 {
            let next = current.attr(segment)?;
            current = Cow::Owned(next);
        }
        Some(current.into_owned())
    }

    fn attr(&self, segment: &PathSegment) -> Option<Value> {
        match (self, segment) {
            (Self::Array(items), PathSegment::Index(i)) => {
                functions::list_access(Some(items.as_slice()), *i).cloned()
            }
            (Self::Arn(arn), PathSegment::Field(name)) => arn.attr(name),
            (Self::Url(url), PathSegment::Field(name)) => url.attr(name),
            (Self::Partition(p), PathSegment::Field(name)) => p.attr(name),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Arn(arn) => write!(f, "{arn}"),
            Self::Url(url) => write!(f, "{}://{}{}", url.scheme, url.authority, url.path),
            Self::Partition(p) => write!(f, "partition({})", p.name),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Attribute paths
// ═══════════════════════════════════════════════════════════════════════════════

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named field, e.g. `region`.
    Field(String),
    /// List index, e.g. `[0]`.
    Index(usize),
}

/// Attribute path as written in `getAttr` and `{name#path}` templates.
///
/// `resourceId[1]` is `[Field("resourceId"), Index(1)]`; dots separate
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPath(Vec<PathSegment>);

impl AttrPath {
    /// Parse a path, rejecting empty fields and malformed indices.
    ///
    /// # Errors
    ///
    /// Returns a description of the first malformed segment.
    pub fn parse(path: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        for part in path.split('.') {
            let (field, mut rest) = match part.find('[') {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };
            if !field.is_empty() {
                segments.push(PathSegment::Field(field.to_string()));
            } else if rest.is_empty() {
                return Err(format!("empty segment in path `{path}`"));
            }
            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| format!("unclosed index in path `{path}`"))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| format!("index `{}` in path `{path}` is not a number", &rest[1..close]))?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(format!("unexpected `{rest}` after index in path `{path}`"));
                }
            }
        }
        Ok(Self(segments))
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl From<&str> for AttrPath {
    /// Lenient parse: a malformed segment is kept as a literal field name,
    /// which simply never resolves.
    fn from(path: &str) -> Self {
        Self::parse(path).unwrap_or_else(|_| Self(vec![PathSegment::Field(path.to_string())]))
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i > 0 => write!(f, ".{name}")?,
                PathSegment::Field(name) => f.write_str(name)?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
