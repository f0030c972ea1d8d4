//! `EndpointResolver` — turns a [`RuleResult`] into a caller-facing result.

use crate::{s3, Endpoint, EvalTrace, Params, PartitionTable, ResolveError, RuleResult, RuleSet};
use std::sync::Arc;

const SIMPLE_BUCKET_ARN_HINT: &str =
    ". Use the bucket name instead of simple bucket ARNs in GetBucketLocationRequest.";

/// Resolves [`Params`] to an [`Endpoint`] using a rule set and a partition
/// table. Cheap to clone; both are shared.
///
/// ```
/// use s3rules::prelude::*;
///
/// let params = Params::builder()
///     .default_flags()
///     .region("us-east-1")
///     .use_fips(true)
///     .accelerate(true)
///     .build()
///     .unwrap();
/// let err = EndpointResolver::new().resolve(&params).unwrap_err();
/// assert_eq!(err.to_string(), "Accelerate cannot be used with FIPS");
/// ```
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    rules: Arc<RuleSet>,
    partitions: Arc<PartitionTable>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointResolver {
    /// Built-in S3 rules over the bundled partition table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: s3::rule_set(),
            partitions: PartitionTable::bundled(),
        }
    }

    /// Replace the rule set.
    #[must_use]
    pub fn with_rule_set(mut self, rules: impl Into<Arc<RuleSet>>) -> Self {
        self.rules = rules.into();
        self
    }

    /// Replace the partition table.
    #[must_use]
    pub fn with_partitions(mut self, partitions: impl Into<Arc<PartitionTable>>) -> Self {
        self.partitions = partitions.into();
        self
    }

    /// The rule set in use.
    #[must_use]
    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    /// The partition table in use.
    #[must_use]
    pub fn partitions(&self) -> &PartitionTable {
        &self.partitions
    }

    /// Raw rule result.
    #[must_use]
    pub fn evaluate(&self, params: &Params) -> RuleResult {
        self.rules.evaluate(params, &self.partitions)
    }

    /// Raw rule result with a trace of every rule tried.
    #[must_use]
    pub fn evaluate_with_trace(&self, params: &Params) -> EvalTrace {
        self.rules.evaluate_with_trace(params, &self.partitions)
    }

    /// Resolve to an endpoint.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Rule`] when a rule rejects the parameters
    /// - [`ResolveError::NoMatch`] when no rule produced a result
    pub fn resolve(&self, params: &Params) -> Result<Endpoint, ResolveError> {
        match self.evaluate(params) {
            RuleResult::Endpoint(endpoint) => {
                tracing::debug!(url = %endpoint.url, "resolved endpoint");
                Ok(endpoint)
            }
            RuleResult::Error(message) => {
                let message = with_remediation(message);
                tracing::debug!(%message, "rules rejected parameters");
                Err(ResolveError::Rule { message })
            }
            RuleResult::CarryOn => {
                tracing::warn!("no rule produced a result");
                Err(ResolveError::NoMatch)
            }
        }
    }
}

/// Resolve with the built-in rules and bundled partitions.
///
/// # Errors
///
/// As [`EndpointResolver::resolve`].
pub fn resolve_endpoint(params: &Params) -> Result<Endpoint, ResolveError> {
    EndpointResolver::new().resolve(params)
}

/// Simple bucket ARNs (`arn:aws:s3:::bucket`) are rejected by the rules
/// with an `Invalid ARN` message; point the caller at the bucket name.
fn with_remediation(mut message: String) -> String {
    if message.contains("Invalid ARN") && message.contains(":s3:::") {
        message.push_str(SIMPLE_BUCKET_ARN_HINT);
    }
    message
}
