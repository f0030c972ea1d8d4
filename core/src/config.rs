//! Config types for rule-set documents.
//!
//! These types mirror the runtime rule types but are serde-deserializable,
//! so a JSON endpoint rule-set document can be loaded via
//! [`RuleSet::from_json()`](crate::RuleSet::from_json) or
//! [`RuleSet::from_config()`](crate::RuleSet::from_config).
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type |
//! |-------------|-------------|
//! | [`RuleSetConfig`] | [`RuleSet`](crate::RuleSet) |
//! | [`RuleConfig`] | [`Rule`](crate::Rule) |
//! | [`ConditionConfig`] | [`Condition`](crate::Condition) |
//! | [`ExprConfig`] | [`Expr`](crate::Expr) |
//! | [`EndpointConfig`] | [`EndpointSpec`](crate::EndpointSpec) |
//! | [`AuthSchemeConfig`] | [`AuthSchemeSpec`](crate::AuthSchemeSpec) |

use crate::endpoint::SigningScopeSpec;
use crate::{
    AttrPath, AuthSchemeSpec, Condition, EndpointSpec, Expr, Function, Params, Rule, RuleAction, RuleSet,
    RuleSetError, Template,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A rule-set document.
///
/// ```json
/// { "version": "1.0", "parameters": { "Region": { "type": "String" } }, "rules": [ ... ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSetConfig {
    /// Document format version. Informational.
    #[serde(default)]
    pub version: Option<String>,

    /// Declared parameters. Only these may be referenced by the rules.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterConfig>,

    /// Top-level rules (first-match-wins).
    pub rules: Vec<RuleConfig>,
}

/// A parameter declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterConfig {
    /// `String` or `Boolean`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub built_in: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// Configuration for a [`Rule`](crate::Rule).
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "endpoint", "conditions": [...], "endpoint": { "url": "..." } }
/// { "type": "error", "conditions": [...], "error": "..." }
/// { "type": "tree", "conditions": [...], "rules": [...] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleConfig {
    /// Produces an endpoint.
    Endpoint {
        #[serde(default)]
        conditions: Vec<ConditionConfig>,
        endpoint: EndpointConfig,
        #[serde(default)]
        documentation: Option<String>,
    },

    /// Produces an error message (a template).
    Error {
        #[serde(default)]
        conditions: Vec<ConditionConfig>,
        error: String,
        #[serde(default)]
        documentation: Option<String>,
    },

    /// Nested rules.
    Tree {
        #[serde(default)]
        conditions: Vec<ConditionConfig>,
        rules: Vec<RuleConfig>,
        #[serde(default)]
        documentation: Option<String>,
    },
}

/// A function call used as a guard, optionally assigning its value.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionConfig {
    #[serde(rename = "fn")]
    pub function: String,
    #[serde(default)]
    pub argv: Vec<ExprConfig>,
    #[serde(default)]
    pub assign: Option<String>,
}

/// A function argument.
///
/// Integers are only accepted as `substring` bounds; strings are templates.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExprConfig {
    /// `{ "ref": "Region" }`
    Ref {
        #[serde(rename = "ref")]
        name: String,
    },
    /// `{ "fn": "parseURL", "argv": [...] }`
    Call {
        #[serde(rename = "fn")]
        function: String,
        #[serde(default)]
        argv: Vec<ExprConfig>,
    },
    Bool(bool),
    Int(i64),
    String(String),
}

/// An endpoint as written in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// A template string or a reference.
    pub url: ExprConfig,
    #[serde(default)]
    pub properties: EndpointPropertiesConfig,
}

/// Endpoint properties the engine understands. Others are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPropertiesConfig {
    #[serde(default)]
    pub auth_schemes: Vec<AuthSchemeConfig>,
    #[serde(default)]
    pub backend: Option<String>,
}

/// An auth scheme as written in a document. Exactly one of
/// `signingRegion` and `signingRegionSet` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSchemeConfig {
    pub name: String,
    pub signing_name: String,
    #[serde(default)]
    pub signing_region: Option<String>,
    #[serde(default)]
    pub signing_region_set: Option<Vec<String>>,
    #[serde(default = "default_disable_double_encoding")]
    pub disable_double_encoding: bool,
}

fn default_disable_double_encoding() -> bool {
    true
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn load_rule_set(config: RuleSetConfig) -> Result<RuleSet, RuleSetError> {
    for (name, parameter) in &config.parameters {
        if !Params::NAMES.contains(&name.as_str()) {
            return Err(RuleSetError::UnknownParameter { name: name.clone() });
        }
        if !matches!(parameter.kind.to_ascii_lowercase().as_str(), "string" | "boolean") {
            return Err(RuleSetError::InvalidConfig {
                reason: format!("parameter `{name}` has unsupported type `{}`", parameter.kind),
            });
        }
    }
    tracing::debug!(
        version = config.version.as_deref().unwrap_or("unversioned"),
        parameters = config.parameters.len(),
        rules = config.rules.len(),
        "loading rule set"
    );

    let parameters = config.parameters.into_keys().collect();
    let rules = config
        .rules
        .into_iter()
        .map(load_rule)
        .collect::<Result<Vec<_>, _>>()?;
    let rule_set = RuleSet::with_parameters(rules, parameters);
    rule_set.validate()?;
    Ok(rule_set)
}

fn load_rule(config: RuleConfig) -> Result<Rule, RuleSetError> {
    let (conditions, action, documentation) = match config {
        RuleConfig::Endpoint {
            conditions,
            endpoint,
            documentation,
        } => (conditions, RuleAction::Endpoint(load_endpoint(endpoint)?), documentation),
        RuleConfig::Error {
            conditions,
            error,
            documentation,
        } => (conditions, RuleAction::Error(Template::parse(&error)?), documentation),
        RuleConfig::Tree {
            conditions,
            rules,
            documentation,
        } => {
            let rules = rules.into_iter().map(load_rule).collect::<Result<Vec<_>, _>>()?;
            (conditions, RuleAction::Tree(rules), documentation)
        }
    };
    let conditions = conditions
        .into_iter()
        .map(load_condition)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rule {
        conditions,
        action,
        documentation,
    })
}

fn load_condition(config: ConditionConfig) -> Result<Condition, RuleSetError> {
    Ok(Condition {
        expr: Expr::call(load_function(&config.function, config.argv)?),
        assign: config.assign,
    })
}

fn load_expr(config: ExprConfig) -> Result<Expr, RuleSetError> {
    match config {
        ExprConfig::Ref { name } => Ok(Expr::Ref(name)),
        ExprConfig::Call { function, argv } => load_function(&function, argv).map(Expr::call),
        ExprConfig::Bool(value) => Ok(Expr::Bool(value)),
        ExprConfig::Int(value) => Err(RuleSetError::InvalidConfig {
            reason: format!("integer literal {value} is only valid as a substring bound"),
        }),
        ExprConfig::String(text) => Template::parse(&text).map(Expr::Literal),
    }
}

fn load_function(name: &str, argv: Vec<ExprConfig>) -> Result<Function, RuleSetError> {
    let function = match name {
        "isSet" => {
            let [e] = args(name, argv)?;
            Function::IsSet(load_expr(e)?)
        }
        "not" => {
            let [e] = args(name, argv)?;
            Function::Not(load_expr(e)?)
        }
        "booleanEquals" => {
            let [a, b] = args(name, argv)?;
            Function::BooleanEquals(load_expr(a)?, load_expr(b)?)
        }
        "stringEquals" => {
            let [a, b] = args(name, argv)?;
            Function::StringEquals(load_expr(a)?, load_expr(b)?)
        }
        "substring" => {
            let [input, start, stop, reverse] = args(name, argv)?;
            Function::Substring {
                input: load_expr(input)?,
                start: int_arg(name, start)?,
                stop: int_arg(name, stop)?,
                reverse: bool_arg(name, reverse)?,
            }
        }
        "uriEncode" => {
            let [e] = args(name, argv)?;
            Function::UriEncode(load_expr(e)?)
        }
        "parseURL" => {
            let [e] = args(name, argv)?;
            Function::ParseUrl(load_expr(e)?)
        }
        "isValidHostLabel" => {
            let [value, flag] = args(name, argv)?;
            Function::IsValidHostLabel {
                value: load_expr(value)?,
                allow_sub_domains: bool_arg(name, flag)?,
            }
        }
        "aws.isVirtualHostableS3Bucket" => {
            let [value, flag] = args(name, argv)?;
            Function::IsVirtualHostableS3Bucket {
                value: load_expr(value)?,
                allow_sub_domains: bool_arg(name, flag)?,
            }
        }
        "aws.partition" => {
            let [e] = args(name, argv)?;
            Function::Partition(load_expr(e)?)
        }
        "aws.parseArn" => {
            let [e] = args(name, argv)?;
            Function::ParseArn(load_expr(e)?)
        }
        "getAttr" => {
            let [target, path] = args(name, argv)?;
            let ExprConfig::String(path) = path else {
                return Err(invalid_argument(name, "the path must be a string literal"));
            };
            Function::GetAttr {
                target: load_expr(target)?,
                path: AttrPath::parse(&path).map_err(|reason| invalid_argument(name, &reason))?,
            }
        }
        _ => {
            return Err(RuleSetError::UnknownFunction {
                name: name.to_string(),
            })
        }
    };
    Ok(function)
}

fn args<const N: usize>(name: &str, argv: Vec<ExprConfig>) -> Result<[ExprConfig; N], RuleSetError> {
    <[ExprConfig; N]>::try_from(argv).map_err(|argv| RuleSetError::Arity {
        name: name.to_string(),
        expected: N,
        actual: argv.len(),
    })
}

fn int_arg(function: &str, config: ExprConfig) -> Result<usize, RuleSetError> {
    match config {
        ExprConfig::Int(value) => {
            usize::try_from(value).map_err(|_| invalid_argument(function, "bounds must not be negative"))
        }
        _ => Err(invalid_argument(function, "bounds must be integer literals")),
    }
}

fn bool_arg(function: &str, config: ExprConfig) -> Result<bool, RuleSetError> {
    match config {
        ExprConfig::Bool(value) => Ok(value),
        _ => Err(invalid_argument(function, "flag must be a boolean literal")),
    }
}

fn invalid_argument(function: &str, reason: &str) -> RuleSetError {
    RuleSetError::InvalidArgument {
        function: function.to_string(),
        reason: reason.to_string(),
    }
}

fn load_endpoint(config: EndpointConfig) -> Result<EndpointSpec, RuleSetError> {
    let url = match config.url {
        ExprConfig::String(text) => Template::parse(&text)?,
        ExprConfig::Ref { name } => Template::parse(&format!("{{{name}}}"))?,
        _ => {
            return Err(RuleSetError::InvalidConfig {
                reason: "endpoint url must be a string or a reference".to_string(),
            })
        }
    };
    let auth_schemes = config
        .properties
        .auth_schemes
        .into_iter()
        .map(load_auth_scheme)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EndpointSpec {
        url,
        backend: config.properties.backend,
        auth_schemes,
    })
}

fn load_auth_scheme(config: AuthSchemeConfig) -> Result<AuthSchemeSpec, RuleSetError> {
    let scope = match (config.signing_region, config.signing_region_set) {
        (Some(region), None) => SigningScopeSpec::Region(Template::parse(&region)?),
        (None, Some(set)) => SigningScopeSpec::RegionSet(set),
        _ => {
            return Err(RuleSetError::InvalidConfig {
                reason: format!(
                    "auth scheme `{}` needs exactly one of signingRegion and signingRegionSet",
                    config.name
                ),
            })
        }
    };
    Ok(AuthSchemeSpec {
        name: config.name,
        signing_name: config.signing_name,
        scope,
        disable_double_encoding: config.disable_double_encoding,
    })
}
