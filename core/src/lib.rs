//! s3rules - endpoint rule evaluation engine for Amazon S3
//!
//! Maps client parameters (region, bucket, feature flags, an optional
//! endpoint override) to either a resolved endpoint (URL + candidate auth
//! schemes) or a rule error, by walking an ordered, nested rule set with
//! first-match-wins semantics.
//!
//! # Architecture
//!
//! - [`Value`] — Erased value flowing between expressions (string, bool, ARN, URL, partition)
//! - [`Expr`] / [`Function`] — Pure expressions over parameters and bindings
//! - [`Condition`] — An expression that gates a rule and may bind its value
//! - [`Rule`] — Conditions plus an action: nested rules, an endpoint, or an error
//! - [`RuleSet`] — Top-level rule list with first-match-wins semantics
//! - [`EndpointResolver`] — Turns a [`RuleResult`] into `Result<Endpoint, ResolveError>`
//!
//! # Key Design Insights
//!
//! 1. **Rules are data**: the S3 rules live in [`s3`] as a value built with
//!    the [`build`] DSL, and the same interpreter runs JSON rule-set documents.
//!
//! 2. **`CarryOn` falls through**: a nested rule list that yields no terminal
//!    result makes its parent try the next sibling.
//!
//! 3. **None → false**: a condition whose expression yields no value fails,
//!    it never raises an error.
//!
//! # Example
//!
//! ```
//! use s3rules::prelude::*;
//!
//! let params = Params::builder()
//!     .default_flags()
//!     .region("us-west-2")
//!     .bucket("my-bucket")
//!     .build()
//!     .unwrap();
//!
//! let endpoint = EndpointResolver::new().resolve(&params).unwrap();
//! assert_eq!(endpoint.url, "https://my-bucket.s3.us-west-2.amazonaws.com");
//! assert_eq!(endpoint.auth_schemes[0].name, "sigv4");
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod arn;
mod config;
mod endpoint;
mod expr;
mod parsed_url;
mod params;
mod partition;
mod resolver;
mod rule;
mod rule_set;
mod scope;
mod template;
mod trace;
mod value;

pub mod build;
pub mod functions;
pub mod s3;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use arn::Arn;
pub use endpoint::{
    AuthScheme, AuthSchemeSpec, Endpoint, EndpointSpec, RuleResult, SigningScope,
    SigningScopeSpec, DEFAULT_AUTH_PRIORITY,
};
pub use expr::{Condition, Expr, Function};
pub use params::{Params, ParamsBuilder};
pub use parsed_url::ParsedUrl;
pub use partition::{Partition, PartitionOutputs, PartitionTable};
pub use resolver::{resolve_endpoint, EndpointResolver};
pub use rule::{Rule, RuleAction};
pub use rule_set::RuleSet;
pub use scope::Scope;
pub use template::Template;
pub use value::{AttrPath, PathSegment, Value};

// Rule-set documents
pub use config::{
    AuthSchemeConfig, ConditionConfig, EndpointConfig, EndpointPropertiesConfig, ExprConfig,
    ParameterConfig, RuleConfig, RuleSetConfig,
};

// Trace types
pub use trace::{ActionTrace, ConditionTrace, EvalStep, EvalTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use s3rules::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Endpoint model
        AuthScheme,
        Endpoint,
        // Resolution
        EndpointResolver,
        // Trace types
        EvalStep,
        EvalTrace,
        // Inputs
        Params,
        ParamsBuilder,
        PartitionTable,
        // Errors
        ResolveError,
        RuleResult,
        RuleSet,
        RuleSetError,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth for nested rules.
///
/// Evaluation recurses once per nesting level. Validate at load time via
/// [`RuleSet::validate`].
pub const MAX_DEPTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors surfaced to callers of [`EndpointResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A required parameter was never set. Detected before evaluation.
    #[error("missing required parameter `{name}`")]
    MissingParameter {
        /// Rule-set name of the parameter (e.g. `"UseFIPS"`).
        name: &'static str,
    },

    /// A parameter was set by name with an unknown name or the wrong type.
    #[error("`{name}` is not a {expected} parameter")]
    InvalidParameter {
        /// The name that was passed.
        name: String,
        /// `"string"` or `"boolean"`.
        expected: &'static str,
    },

    /// A terminal error rule matched. The message is client-facing.
    #[error("{message}")]
    Rule {
        /// The rendered rule message.
        message: String,
    },

    /// Evaluation ran off the end of the rule set without a terminal result.
    #[error("endpoint resolution did not converge: no rule produced an endpoint or an error")]
    NoMatch,

    /// None of an endpoint's auth schemes appear in the caller's priority list.
    #[error("no recognized auth scheme among candidates [{}]", candidates.join(", "))]
    UnknownAuthScheme {
        /// Names of the schemes the endpoint offered.
        candidates: Vec<String>,
    },
}

/// Errors from rule-set construction and validation.
///
/// These are caught at load time, not evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    /// Rule nesting exceeds [`MAX_DEPTH`].
    #[error("rule nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Actual depth of the rule tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A reference names neither a parameter nor an assignment in scope.
    #[error("`{name}` is not a parameter or an assignment visible at this point")]
    UnknownReference {
        /// The dangling name.
        name: String,
    },

    /// A rule-set document declares a parameter the resolver cannot supply.
    #[error("unknown parameter `{name}`")]
    UnknownParameter {
        /// The declared name.
        name: String,
    },

    /// A condition calls a function the engine does not provide.
    #[error("unknown function `{name}`")]
    UnknownFunction {
        /// The function name as written.
        name: String,
    },

    /// A function was called with the wrong number of arguments.
    #[error("function `{name}` takes {expected} arguments, got {actual}")]
    Arity {
        /// The function name.
        name: String,
        /// Expected argument count.
        expected: usize,
        /// Actual argument count.
        actual: usize,
    },

    /// An argument has the wrong shape (e.g. a non-literal substring bound).
    #[error("invalid argument to `{function}`: {reason}")]
    InvalidArgument {
        /// The function name.
        function: String,
        /// What was wrong.
        reason: String,
    },

    /// A string template has unbalanced braces or an empty placeholder.
    #[error("invalid template \"{template}\": {reason}")]
    InvalidTemplate {
        /// The template text.
        template: String,
        /// What was wrong.
        reason: String,
    },

    /// Document deserialization failed.
    #[error("invalid rule set: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
}

/// Errors from loading a partition dataset.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// The document is not valid JSON for the partitions shape.
    #[error("invalid partition document: {0}")]
    Json(#[from] serde_json::Error),

    /// A partition's region pattern does not compile.
    #[error("partition `{partition}` has an invalid region regex")]
    InvalidRegex {
        /// Partition id.
        partition: String,
        /// The regex error.
        #[source]
        source: regex::Error,
    },

    /// The dataset has no `aws` partition to fall back to.
    #[error("partition dataset has no `{0}` partition to fall back to")]
    MissingFallback(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolveError>();
        assert_send_sync::<RuleSetError>();
        assert_send_sync::<PartitionError>();
    }

    #[test]
    fn resolve_error_rule_displays_message_verbatim() {
        let err = ResolveError::Rule {
            message: "Accelerate cannot be used with FIPS".into(),
        };
        assert_eq!(err.to_string(), "Accelerate cannot be used with FIPS");
    }

    #[test]
    fn unknown_auth_scheme_lists_candidates() {
        let err = ResolveError::UnknownAuthScheme {
            candidates: vec!["custom-a".into(), "custom-b".into()],
        };
        assert_eq!(
            err.to_string(),
            "no recognized auth scheme among candidates [custom-a, custom-b]"
        );
    }

    #[test]
    fn missing_parameter_names_the_flag() {
        let err = ResolveError::MissingParameter { name: "UseFIPS" };
        assert!(err.to_string().contains("UseFIPS"));
    }
}
