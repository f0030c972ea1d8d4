//! Small DSL for writing rule sets in Rust.
//!
//! ```
//! use s3rules::build::*;
//! use s3rules::{AuthSchemeSpec, EndpointSpec, RuleSet};
//!
//! let rules = RuleSet::new(vec![
//!     when([is_true("UseFIPS"), is_true("Accelerate")]).error("Accelerate cannot be used with FIPS"),
//!     when([is_set("Region"), bind("partitionResult", partition(r("Region")))]).endpoint(
//!         EndpointSpec::new("https://s3.{Region}.{partitionResult#dnsSuffix}")
//!             .auth(AuthSchemeSpec::sigv4("s3", "{Region}")),
//!     ),
//!     error("A region must be set when sending requests to S3."),
//! ]);
//! assert!(rules.validate().is_ok());
//! ```
//!
//! Expression helpers never guess: a `&str` given to a function that takes
//! a name is a name, and literals go through [`s`].

use crate::{AttrPath, Condition, EndpointSpec, Expr, Function, Rule, RuleAction, Template};

// ═══════════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════════

/// Reference to a parameter or binding.
#[must_use]
pub fn r(name: &str) -> Expr {
    Expr::Ref(name.to_string())
}

/// String literal. Placeholders are rendered.
#[must_use]
pub fn s(text: &str) -> Expr {
    Expr::Literal(Template::from(text))
}

/// Boolean literal.
#[must_use]
pub fn b(value: bool) -> Expr {
    Expr::Bool(value)
}

/// `name#path` shorthand: `at("url#authority")` is
/// `getAttr(url, "authority")`. Without `#` it is a plain reference.
#[must_use]
pub fn at(reference: &str) -> Expr {
    match reference.split_once('#') {
        Some((name, path)) => attr(r(name), path),
        None => r(reference),
    }
}

/// `getAttr(target, path)`.
#[must_use]
pub fn attr(target: Expr, path: &str) -> Expr {
    Expr::call(Function::GetAttr {
        target,
        path: AttrPath::from(path),
    })
}

/// `substring(input, start, stop, reverse)`.
#[must_use]
pub fn substring(input: Expr, start: usize, stop: usize, reverse: bool) -> Expr {
    Expr::call(Function::Substring {
        input,
        start,
        stop,
        reverse,
    })
}

/// `uriEncode(e)`.
#[must_use]
pub fn uri_encode(e: Expr) -> Expr {
    Expr::call(Function::UriEncode(e))
}

/// `parseURL(e)`.
#[must_use]
pub fn parse_url(e: Expr) -> Expr {
    Expr::call(Function::ParseUrl(e))
}

/// `aws.partition(e)`.
#[must_use]
pub fn partition(e: Expr) -> Expr {
    Expr::call(Function::Partition(e))
}

/// `aws.parseArn(e)`.
#[must_use]
pub fn parse_arn(e: Expr) -> Expr {
    Expr::call(Function::ParseArn(e))
}

/// `not(e)`.
#[must_use]
pub fn not(e: Expr) -> Expr {
    Expr::call(Function::Not(e))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conditions
// ═══════════════════════════════════════════════════════════════════════════════

/// `isSet(name)`.
#[must_use]
pub fn is_set(name: &str) -> Condition {
    present(r(name))
}

/// `not(isSet(name))`.
#[must_use]
pub fn not_set(name: &str) -> Condition {
    absent(r(name))
}

/// `isSet(e)`.
#[must_use]
pub fn present(e: Expr) -> Condition {
    Condition::new(Expr::call(Function::IsSet(e)))
}

/// `not(isSet(e))`.
#[must_use]
pub fn absent(e: Expr) -> Condition {
    Condition::new(not(Expr::call(Function::IsSet(e))))
}

/// `booleanEquals(name, true)`.
#[must_use]
pub fn is_true(name: &str) -> Condition {
    bool_eq(r(name), true)
}

/// `booleanEquals(name, false)`.
#[must_use]
pub fn is_false(name: &str) -> Condition {
    bool_eq(r(name), false)
}

/// `booleanEquals(e, value)`.
#[must_use]
pub fn bool_eq(e: Expr, value: bool) -> Condition {
    Condition::new(Expr::call(Function::BooleanEquals(e, b(value))))
}

/// `stringEquals(a, b)`.
#[must_use]
pub fn eq(a: Expr, b: Expr) -> Condition {
    Condition::new(Expr::call(Function::StringEquals(a, b)))
}

/// `not(stringEquals(a, b))`.
#[must_use]
pub fn ne(a: Expr, b: Expr) -> Condition {
    Condition::new(not(Expr::call(Function::StringEquals(a, b))))
}

/// Bind the value of `e` to `name`; fails when `e` has no value.
#[must_use]
pub fn bind(name: &str, e: Expr) -> Condition {
    Condition::assign(name, e)
}

/// `isValidHostLabel(e, allow_sub_domains)`.
#[must_use]
pub fn host_label(e: Expr, allow_sub_domains: bool) -> Condition {
    Condition::new(Expr::call(Function::IsValidHostLabel {
        value: e,
        allow_sub_domains,
    }))
}

/// `aws.isVirtualHostableS3Bucket(e, allow_sub_domains)`.
#[must_use]
pub fn virtual_hostable(e: Expr, allow_sub_domains: bool) -> Condition {
    Condition::new(Expr::call(Function::IsVirtualHostableS3Bucket {
        value: e,
        allow_sub_domains,
    }))
}

/// Any expression as a guard.
#[must_use]
pub fn truthy(e: Expr) -> Condition {
    Condition::new(e)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Conditions waiting for an action. See [`when`].
#[derive(Debug, Clone)]
#[must_use]
pub struct When {
    conditions: Vec<Condition>,
}

/// Start a guarded rule.
pub fn when(conditions: impl IntoIterator<Item = Condition>) -> When {
    When {
        conditions: conditions.into_iter().collect(),
    }
}

impl When {
    /// Nested rules.
    #[must_use]
    pub fn tree(self, rules: Vec<Rule>) -> Rule {
        Rule::new(self.conditions, RuleAction::Tree(rules))
    }

    /// Endpoint result.
    #[must_use]
    pub fn endpoint(self, spec: EndpointSpec) -> Rule {
        Rule::new(self.conditions, RuleAction::Endpoint(spec))
    }

    /// Error result. The message is a template.
    #[must_use]
    pub fn error(self, message: impl Into<Template>) -> Rule {
        Rule::new(self.conditions, RuleAction::Error(message.into()))
    }
}

/// Unconditional error rule.
#[must_use]
pub fn error(message: impl Into<Template>) -> Rule {
    Rule::new(Vec::new(), RuleAction::Error(message.into()))
}

/// Unconditional endpoint rule.
#[must_use]
pub fn endpoint(spec: EndpointSpec) -> Rule {
    Rule::new(Vec::new(), RuleAction::Endpoint(spec))
}
