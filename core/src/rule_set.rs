//! `RuleSet` — Top-level rule list with first-match-wins semantics.

use crate::config::{self, RuleSetConfig};
use crate::rule::{evaluate_rules, evaluate_rules_with_trace};
use crate::{EvalTrace, Params, PartitionTable, Rule, RuleAction, RuleResult, RuleSetError, Scope, MAX_DEPTH};

/// An ordered list of rules evaluated against [`Params`].
///
/// Rules are tried in order; the first terminal result wins. If every rule
/// carries on, the result is [`RuleResult::CarryOn`], which a well-formed
/// rule set never produces: it ends in an unconditional error.
///
/// # Example
///
/// ```
/// use s3rules::build::*;
/// use s3rules::{Params, PartitionTable, RuleResult, RuleSet};
///
/// let rules = RuleSet::new(vec![
///     when([is_true("UseFIPS")]).error("no FIPS here"),
///     error("fallback"),
/// ]);
/// let params = Params::builder().default_flags().use_fips(true).build().unwrap();
/// let result = rules.evaluate(&params, &PartitionTable::bundled());
/// assert_eq!(result, RuleResult::Error("no FIPS here".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    parameters: Vec<String>,
}

impl RuleSet {
    /// Rule set over every parameter [`Params`] supplies.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self::with_parameters(rules, Params::NAMES.iter().map(|name| (*name).to_string()).collect())
    }

    pub(crate) fn with_parameters(rules: Vec<Rule>, parameters: Vec<String>) -> Self {
        Self { rules, parameters }
    }

    /// Compile a rule-set document. The result is validated.
    ///
    /// # Errors
    ///
    /// Any [`RuleSetError`] from compilation or [`validate`](Self::validate).
    pub fn from_config(config: RuleSetConfig) -> Result<Self, RuleSetError> {
        config::load_rule_set(config)
    }

    /// Parse and compile a JSON rule-set document.
    ///
    /// # Errors
    ///
    /// [`RuleSetError::InvalidConfig`] if the JSON does not have the
    /// rule-set shape, otherwise as [`from_config`](Self::from_config).
    pub fn from_json(json: &str) -> Result<Self, RuleSetError> {
        let config: RuleSetConfig = serde_json::from_str(json).map_err(|e| RuleSetError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Self::from_config(config)
    }

    /// Top-level rules.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Parameter names the rules may reference.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Number of top-level rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate against `params`.
    #[must_use]
    pub fn evaluate(&self, params: &Params, partitions: &PartitionTable) -> RuleResult {
        let mut scope = Scope::new(params, partitions);
        evaluate_rules(&self.rules, &mut scope)
    }

    /// Evaluate with a trace of every rule tried.
    ///
    /// The trace's `result` equals [`evaluate`](Self::evaluate)'s.
    #[must_use]
    pub fn evaluate_with_trace(&self, params: &Params, partitions: &PartitionTable) -> EvalTrace {
        let mut scope = Scope::new(params, partitions);
        evaluate_rules_with_trace(&self.rules, &mut scope)
    }

    /// Depth of the deepest rule (0 for an empty set).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.rules.iter().map(Rule::depth).max().unwrap_or(0)
    }

    /// Validate that this rule set satisfies depth constraints and that
    /// every name it reads is bound where it is read.
    ///
    /// # Errors
    ///
    /// - [`RuleSetError::DepthExceeded`] if nesting exceeds [`MAX_DEPTH`]
    /// - [`RuleSetError::UnknownReference`] for a name that is neither a
    ///   parameter nor assigned by an earlier condition of an enclosing rule
    pub fn validate(&self) -> Result<(), RuleSetError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(RuleSetError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        let mut visible: Vec<&str> = self.parameters.iter().map(String::as_str).collect();
        check_rules(&self.rules, &mut visible)
    }
}

fn check_rules<'a>(rules: &'a [Rule], visible: &mut Vec<&'a str>) -> Result<(), RuleSetError> {
    for rule in rules {
        let mark = visible.len();
        let mut refs = Vec::new();
        for condition in &rule.conditions {
            refs.clear();
            condition.expr.references(&mut refs);
            check_refs(refs.iter().copied(), visible)?;
            if let Some(name) = &condition.assign {
                visible.push(name);
            }
        }
        match &rule.action {
            RuleAction::Tree(children) => check_rules(children, visible)?,
            RuleAction::Endpoint(spec) => {
                for template in spec.templates() {
                    check_refs(template.references(), visible)?;
                }
            }
            RuleAction::Error(message) => check_refs(message.references(), visible)?,
        }
        visible.truncate(mark);
    }
    Ok(())
}

fn check_refs<'r>(mut refs: impl Iterator<Item = &'r str>, visible: &[&str]) -> Result<(), RuleSetError> {
    match refs.find(|name| !visible.contains(name)) {
        Some(name) => Err(RuleSetError::UnknownReference {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::{AuthSchemeSpec, EndpointSpec};

    fn params() -> Params {
        Params::builder()
            .default_flags()
            .region("us-west-2")
            .bucket("b")
            .build()
            .unwrap()
    }

    fn nested(levels: usize) -> Rule {
        let mut rule = error("leaf");
        for _ in 1..levels {
            rule = when([is_set("Region")]).tree(vec![rule]);
        }
        rule
    }

    #[test]
    fn test_rule_set_first_match_wins() {
        let rules = RuleSet::new(vec![
            when([is_set("Region")]).error("first"),
            when([is_set("Bucket")]).error("second"),
        ]);
        assert_eq!(
            rules.evaluate(&params(), &PartitionTable::bundled()),
            RuleResult::Error("first".into())
        );
    }

    #[test]
    fn test_rule_set_all_carry_on() {
        let rules = RuleSet::new(vec![when([is_true("UseFIPS")]).error("fips")]);
        assert_eq!(
            rules.evaluate(&params(), &PartitionTable::bundled()),
            RuleResult::CarryOn
        );
    }

    #[test]
    fn test_rule_set_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleSet>();
    }

    #[test]
    fn test_validate_shallow_rule_set_ok() {
        assert!(RuleSet::new(vec![nested(3)]).validate().is_ok());
    }

    #[test]
    fn test_validate_at_max_depth_ok() {
        let rules = RuleSet::new(vec![nested(MAX_DEPTH)]);
        assert_eq!(rules.depth(), MAX_DEPTH);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_validate_deeply_nested_rule_set_fails() {
        let rules = RuleSet::new(vec![nested(MAX_DEPTH + 1)]);
        assert_eq!(
            rules.validate(),
            Err(RuleSetError::DepthExceeded {
                depth: MAX_DEPTH + 1,
                max: MAX_DEPTH
            })
        );
    }

    #[test]
    fn test_validate_rejects_unknown_reference() {
        let rules = RuleSet::new(vec![when([is_set("Regoin")]).error("typo")]);
        assert_eq!(
            rules.validate(),
            Err(RuleSetError::UnknownReference {
                name: "Regoin".into()
            })
        );
    }

    #[test]
    fn test_validate_binding_not_visible_to_sibling() {
        let rules = RuleSet::new(vec![
            when([bind("partitionResult", partition(r("Region")))]).tree(vec![error("{partitionResult#name}")]),
            error("{partitionResult#name}"),
        ]);
        assert_eq!(
            rules.validate(),
            Err(RuleSetError::UnknownReference {
                name: "partitionResult".into()
            })
        );
    }

    #[test]
    fn test_validate_checks_endpoint_templates() {
        let rules = RuleSet::new(vec![endpoint(
            EndpointSpec::new("https://s3.{Region}.amazonaws.com").auth(AuthSchemeSpec::sigv4("s3", "{signingRegion}")),
        )]);
        assert_eq!(
            rules.validate(),
            Err(RuleSetError::UnknownReference {
                name: "signingRegion".into()
            })
        );
    }

    #[test]
    fn test_trace_result_equals_evaluate() {
        let rules = RuleSet::new(vec![
            when([is_true("UseFIPS")]).error("fips"),
            when([is_set("Region")]).tree(vec![when([is_true("Accelerate")]).error("accel")]),
            when([bind("p", partition(r("Region")))]).endpoint(EndpointSpec::new("https://{Bucket}.{p#dnsSuffix}")),
        ]);
        let table = PartitionTable::bundled();
        let trace = rules.evaluate_with_trace(&params(), &table);
        assert_eq!(trace.result, rules.evaluate(&params(), &table));
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(trace.matched_path(), vec![2]);
    }

    const DOCUMENT: &str = r#"{
        "version": "1.0",
        "parameters": {
            "Region": { "type": "String", "builtIn": "AWS::Region" },
            "UseFIPS": { "type": "Boolean", "required": true, "default": false }
        },
        "rules": [
            {
                "type": "error",
                "conditions": [ { "fn": "booleanEquals", "argv": [ { "ref": "UseFIPS" }, true ] } ],
                "error": "FIPS is not supported"
            },
            {
                "type": "tree",
                "conditions": [
                    { "fn": "isSet", "argv": [ { "ref": "Region" } ] },
                    { "fn": "aws.partition", "argv": [ { "ref": "Region" } ], "assign": "partitionResult" }
                ],
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [],
                        "endpoint": {
                            "url": "https://example.{Region}.{partitionResult#dnsSuffix}",
                            "properties": {
                                "authSchemes": [
                                    { "name": "sigv4", "signingName": "example", "signingRegion": "{Region}", "disableDoubleEncoding": true }
                                ]
                            }
                        }
                    }
                ]
            },
            { "type": "error", "conditions": [], "error": "Region must be set" }
        ]
    }"#;

    #[test]
    fn test_from_json_evaluates() {
        let rules = RuleSet::from_json(DOCUMENT).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.parameters(), ["Region", "UseFIPS"]);

        let params = Params::builder()
            .default_flags()
            .region("cn-north-1")
            .build()
            .unwrap();
        let RuleResult::Endpoint(endpoint) = rules.evaluate(&params, &PartitionTable::bundled()) else {
            panic!("expected endpoint");
        };
        assert_eq!(endpoint.url, "https://example.cn-north-1.amazonaws.com.cn");
        assert_eq!(endpoint.auth_schemes[0].signing_name, "example");
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        let err = RuleSet::from_json("{\"rules\": 3}").unwrap_err();
        assert!(matches!(err, RuleSetError::InvalidConfig { .. }));
    }
}
