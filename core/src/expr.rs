//! Expressions and conditions.
//!
//! An [`Expr`] evaluates to `Option<Value>` against a [`Scope`]. A
//! [`Condition`] wraps an expression: it passes when the value is present
//! and not `false`, and may bind the value under a name for later
//! conditions and nested rules.
//!
//! # INV: None → false
//!
//! A missing value (unset parameter, failed parse, out-of-range slice)
//! fails the condition. It is never an error.

use crate::functions;
use crate::{Arn, AttrPath, ParsedUrl, Scope, Template, Value};
use std::fmt;
use std::sync::Arc;

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// String literal, possibly with placeholders.
    Literal(Template),
    /// Boolean literal.
    Bool(bool),
    /// Parameter or binding by name.
    Ref(String),
    /// Function call.
    Call(Box<Function>),
}

/// Built-in functions. Integer and flag arguments are literals, fixed when
/// the rule is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    IsSet(Expr),
    /// Logical not. Yields no value for a non-boolean argument.
    Not(Expr),
    BooleanEquals(Expr, Expr),
    StringEquals(Expr, Expr),
    Substring {
        input: Expr,
        start: usize,
        stop: usize,
        reverse: bool,
    },
    UriEncode(Expr),
    ParseUrl(Expr),
    IsValidHostLabel {
        value: Expr,
        allow_sub_domains: bool,
    },
    IsVirtualHostableS3Bucket {
        value: Expr,
        allow_sub_domains: bool,
    },
    Partition(Expr),
    ParseArn(Expr),
    GetAttr {
        target: Expr,
        path: AttrPath,
    },
}

impl Expr {
    /// Evaluate against `scope`.
    #[must_use]
    pub fn eval(&self, scope: &Scope<'_>) -> Option<Value> {
        match self {
            Self::Literal(template) => template.render(scope).map(Value::String),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Ref(name) => scope.get(name).cloned(),
            Self::Call(function) => function.eval(scope),
        }
    }

    /// Push every name this expression reads onto `out`.
    pub(crate) fn references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(template) => out.extend(template.references()),
            Self::Bool(_) => {}
            Self::Ref(name) => out.push(name),
            Self::Call(function) => function.references(out),
        }
    }

    pub(crate) fn call(function: Function) -> Self {
        Self::Call(Box::new(function))
    }
}

impl Function {
    /// Canonical rule-set name of the function.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::IsSet(_) => "isSet",
            Self::Not(_) => "not",
            Self::BooleanEquals(..) => "booleanEquals",
            Self::StringEquals(..) => "stringEquals",
            Self::Substring { .. } => "substring",
            Self::UriEncode(_) => "uriEncode",
            Self::ParseUrl(_) => "parseURL",
            Self::IsValidHostLabel { .. } => "isValidHostLabel",
            Self::IsVirtualHostableS3Bucket { .. } => "aws.isVirtualHostableS3Bucket",
            Self::Partition(_) => "aws.partition",
            Self::ParseArn(_) => "aws.parseArn",
            Self::GetAttr { .. } => "getAttr",
        }
    }

    fn eval(&self, scope: &Scope<'_>) -> Option<Value> {
        let string = |e: &Expr| e.eval(scope).and_then(|v| v.as_str().map(str::to_owned));
        let flag = |e: &Expr| e.eval(scope).and_then(|v| v.as_bool());

        let value = match self {
            Self::IsSet(e) => Value::Bool(e.eval(scope).is_some()),
            Self::Not(e) => Value::Bool(!flag(e)?),
            Self::BooleanEquals(a, b) => Value::Bool(functions::boolean_equals(flag(a), flag(b))),
            Self::StringEquals(a, b) => {
                Value::Bool(functions::string_equals(string(a).as_deref(), string(b).as_deref()))
            }
            Self::Substring {
                input,
                start,
                stop,
                reverse,
            } => {
                let input = string(input)?;
                Value::from(functions::substring(&input, *start, *stop, *reverse)?)
            }
            Self::UriEncode(e) => Value::String(functions::uri_encode(&string(e)?)),
            Self::ParseUrl(e) => Value::Url(Arc::new(ParsedUrl::parse(&string(e)?)?)),
            Self::IsValidHostLabel {
                value,
                allow_sub_domains,
            } => Value::Bool(functions::is_valid_host_label(&string(value)?, *allow_sub_domains)),
            Self::IsVirtualHostableS3Bucket {
                value,
                allow_sub_domains,
            } => Value::Bool(functions::is_virtual_hostable_s3_bucket(
                &string(value)?,
                *allow_sub_domains,
            )),
            Self::Partition(e) => Value::Partition(scope.partitions().lookup(&string(e)?)),
            Self::ParseArn(e) => Value::Arn(Arc::new(Arn::parse(&string(e)?)?)),
            Self::GetAttr { target, path } => target.eval(scope)?.get_attr(path)?,
        };
        Some(value)
    }

    fn references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::IsSet(e)
            | Self::Not(e)
            | Self::UriEncode(e)
            | Self::ParseUrl(e)
            | Self::Partition(e)
            | Self::ParseArn(e)
            | Self::Substring { input: e, .. }
            | Self::IsValidHostLabel { value: e, .. }
            | Self::IsVirtualHostableS3Bucket { value: e, .. }
            | Self::GetAttr { target: e, .. } => e.references(out),
            Self::BooleanEquals(a, b) | Self::StringEquals(a, b) => {
                a.references(out);
                b.references(out);
            }
        }
    }
}

/// A rule guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub expr: Expr,
    /// Name to bind the value to when the condition passes.
    pub assign: Option<String>,
}

impl Condition {
    /// Guard without a binding.
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self { expr, assign: None }
    }

    /// Guard that binds its value to `name`.
    #[must_use]
    pub fn assign(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            expr,
            assign: Some(name.into()),
        }
    }

    /// Evaluate. `Some` only when the condition passes.
    #[must_use]
    pub fn test(&self, scope: &Scope<'_>) -> Option<Value> {
        self.expr.eval(scope).filter(Value::is_truthy)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Display (rule-set call syntax, used by traces)
// ═══════════════════════════════════════════════════════════════════════════════

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(template) => write!(f, "\"{template}\""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Ref(name) => f.write_str(name),
            Self::Call(function) => write!(f, "{function}"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::IsSet(e)
            | Self::Not(e)
            | Self::UriEncode(e)
            | Self::ParseUrl(e)
            | Self::Partition(e)
            | Self::ParseArn(e) => write!(f, "{name}({e})"),
            Self::BooleanEquals(a, b) | Self::StringEquals(a, b) => write!(f, "{name}({a}, {b})"),
            Self::Substring {
                input,
                start,
                stop,
                reverse,
            } => write!(f, "{name}({input}, {start}, {stop}, {reverse})"),
            Self::IsValidHostLabel {
                value,
                allow_sub_domains,
            }
            | Self::IsVirtualHostableS3Bucket {
                value,
                allow_sub_domains,
            } => write!(f, "{name}({value}, {allow_sub_domains})"),
            Self::GetAttr { target, path } => write!(f, "{name}({target}, \"{path}\")"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.assign {
            Some(name) => write!(f, "{name} = {}", self.expr),
            None => write!(f, "{}", self.expr),
        }
    }
}
