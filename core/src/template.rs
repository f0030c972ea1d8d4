//! String templates with `{name}` and `{name#path}` placeholders.
//!
//! `{Bucket}` reads a parameter or binding; `{url#authority}` reads an
//! attribute of a bound value. `{{` and `}}` are literal braces.

use crate::{AttrPath, RuleSetError, Scope};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Ref(String),
    Attr(String, AttrPath),
}

/// A parsed string template.
///
/// ```
/// use s3rules::Template;
///
/// let t = Template::parse("https://{Bucket}.s3.{Region}.amazonaws.com").unwrap();
/// assert_eq!(t.references().collect::<Vec<_>>(), ["Bucket", "Region"]);
/// assert!(Template::parse("{unclosed").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Strict parse, for rule-set documents.
    ///
    /// # Errors
    ///
    /// Returns [`RuleSetError::InvalidTemplate`] on an unclosed or empty
    /// placeholder, a stray `}`, or a malformed attribute path.
    pub fn parse(text: &str) -> Result<Self, RuleSetError> {
        parse(text, true)
    }

    /// Template without placeholders.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Literal(text.into())],
        }
    }

    /// Render against a scope. `None` if a placeholder has no value or its
    /// value is not a string or bool.
    #[must_use]
    pub fn render(&self, scope: &Scope<'_>) -> Option<String> {
        if let [Part::Literal(text)] = self.parts.as_slice() {
            return Some(text.clone());
        }
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Ref(name) => out.push_str(&scope.get(name)?.as_template_str()?),
                Part::Attr(name, path) => {
                    let value = scope.get(name)?.get_attr(path)?;
                    out.push_str(&value.as_template_str()?);
                }
            }
        }
        Some(out)
    }

    /// Names the template reads, in order of appearance.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Literal(_) => None,
            Part::Ref(name) | Part::Attr(name, _) => Some(name.as_str()),
        })
    }
}

impl From<&str> for Template {
    /// Lenient parse: malformed braces are kept as literal text.
    fn from(text: &str) -> Self {
        match parse(text, false) {
            Ok(template) => template,
            Err(_) => Self::literal(text),
        }
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

fn parse(text: &str, strict: bool) -> Result<Template, RuleSetError> {
    let invalid = |reason: &str| RuleSetError::InvalidTemplate {
        template: text.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = text;
    while let Some(i) = rest.find(['{', '}']) {
        literal.push_str(&rest[..i]);
        let tail = &rest[i..];
        if tail.starts_with("{{") {
            literal.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            literal.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            if strict {
                return Err(invalid("unmatched `}`"));
            }
            literal.push('}');
            rest = &tail[1..];
        } else {
            let Some(close) = tail.find('}') else {
                if strict {
                    return Err(invalid("unclosed `{`"));
                }
                literal.push_str(tail);
                rest = "";
                break;
            };
            let placeholder = &tail[1..close];
            let part = match placeholder.split_once('#') {
                Some((name, path)) if !name.is_empty() => {
                    AttrPath::parse(path).map(|path| Part::Attr(name.to_string(), path))
                }
                None if !placeholder.is_empty() && !placeholder.contains('{') => {
                    Ok(Part::Ref(placeholder.to_string()))
                }
                _ => Err("empty or malformed placeholder".to_string()),
            };
            match part {
                Ok(part) => {
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(part);
                }
                Err(reason) if strict => return Err(invalid(&reason)),
                Err(_) => literal.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() || parts.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(Template { parts })
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Literal(text) => f.write_str(&text.replace('{', "{{").replace('}', "}}"))?,
                Part::Ref(name) => write!(f, "{{{name}}}")?,
                Part::Attr(name, path) => write!(f, "{{{name}#{path}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Params, PartitionTable, Value};

    fn params() -> Params {
        Params::builder()
            .default_flags()
            .region("us-west-2")
            .bucket("my-bucket")
            .build()
            .unwrap()
    }

    #[test]
    fn renders_refs_and_attrs() {
        let params = params();
        let table = PartitionTable::bundled();
        let mut scope = Scope::new(&params, &table);
        scope.bind("partitionResult", Value::Partition(table.lookup("us-west-2")));

        let t = Template::from("https://{Bucket}.s3.{Region}.{partitionResult#dnsSuffix}");
        assert_eq!(
            t.render(&scope).as_deref(),
            Some("https://my-bucket.s3.us-west-2.amazonaws.com")
        );
    }

    #[test]
    fn unset_reference_does_not_render() {
        let params = params();
        let table = PartitionTable::bundled();
        let scope = Scope::new(&params, &table);
        assert_eq!(Template::from("{Endpoint}").render(&scope), None);
    }

    #[test]
    fn escaped_braces() {
        let params = params();
        let table = PartitionTable::bundled();
        let scope = Scope::new(&params, &table);
        let t = Template::parse("{{literal}} {Region}").unwrap();
        assert_eq!(t.render(&scope).as_deref(), Some("{literal} us-west-2"));
        assert_eq!(t.to_string(), "{{literal}} {Region}");
    }

    #[test]
    fn strict_rejects_malformed() {
        assert!(Template::parse("{Bucket").is_err());
        assert!(Template::parse("Bucket}").is_err());
        assert!(Template::parse("{}").is_err());
        assert!(Template::parse("{#path}").is_err());
        assert!(Template::parse("{arn#resourceId[x]}").is_err());
    }

    #[test]
    fn lenient_keeps_malformed_as_text() {
        let t = Template::from("a } {Region} {");
        assert_eq!(t.references().collect::<Vec<_>>(), ["Region"]);
    }

    #[test]
    fn literal_only() {
        let t = Template::from("Accelerate cannot be used with FIPS");
        assert_eq!(t.references().count(), 0);
    }

    #[test]
    fn attr_with_index() {
        let t = Template::parse("{bucketArn#resourceId[1]}").unwrap();
        assert_eq!(t.references().collect::<Vec<_>>(), ["bucketArn"]);
        assert_eq!(t.to_string(), "{bucketArn#resourceId[1]}");
    }
}
