//! Evaluation trace types for debugging rule-set behavior.
//!
//! Trace types mirror the runtime types ([`Rule`](crate::Rule),
//! [`RuleSet`](crate::RuleSet)) but capture evaluation results instead of
//! inputs. Use `evaluate_with_trace()` to see which rules were tried, which
//! condition stopped each one, and where the result came from.
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
//! let trace = EndpointResolver::new().evaluate_with_trace(&params);
//! assert!(trace.result.is_terminal());
//! for step in &trace.steps {
//!     println!("rule[{}]: matched={}", step.index, step.matched);
//! }
//! ```

use crate::RuleResult;
use std::fmt;

/// Trace of a rule list evaluation.
///
/// # INV: `result` == `evaluate()` result
///
/// The `result` field always equals what
/// [`RuleSet::evaluate()`](crate::RuleSet::evaluate) returns for the same
/// parameters.
#[derive(Debug, Clone)]
pub struct EvalTrace {
    /// The final result (identical to what `evaluate()` returns).
    pub result: RuleResult,
    /// Each rule tried, in order. Stops after the first terminal result.
    pub steps: Vec<EvalStep>,
}

/// One rule's evaluation in a trace.
#[derive(Debug, Clone)]
pub struct EvalStep {
    /// Index in the enclosing rule list (0-based).
    pub index: usize,
    /// Did every condition pass?
    pub matched: bool,
    /// Conditions evaluated, up to and including the first that failed.
    pub conditions: Vec<ConditionTrace>,
    /// If the conditions passed, what the action produced.
    pub action: Option<ActionTrace>,
}

/// One condition's evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionTrace {
    /// The condition in call syntax, e.g. `url = parseURL(Endpoint)`.
    pub condition: String,
    /// The value it produced, if any.
    pub value: Option<String>,
    /// Whether it passed.
    pub passed: bool,
}

/// What happened when a rule's conditions passed.
#[derive(Debug, Clone)]
pub enum ActionTrace {
    /// An endpoint or error rule produced this result. `CarryOn` here
    /// means a template could not be rendered.
    Terminal(RuleResult),
    /// A tree rule evaluated its children (recursive trace).
    Nested(Box<EvalTrace>),
}

impl EvalTrace {
    /// Indices of the matched rules from the root down to the one that
    /// produced the result.
    #[must_use]
    pub fn matched_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self;
        while let Some(step) = current.steps.iter().find(|s| s.matched && s.produced_result()) {
            path.push(step.index);
            match &step.action {
                Some(ActionTrace::Nested(nested)) => current = nested,
                _ => break,
            }
        }
        path
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        for step in &self.steps {
            let mark = if step.matched { "+" } else { "-" };
            writeln!(f, "{pad}{mark} rule[{}]", step.index)?;
            for c in &step.conditions {
                let value = c.value.as_deref().unwrap_or("<none>");
                let mark = if c.passed { "ok" } else { "no" };
                writeln!(f, "{pad}    {mark} {} => {value}", c.condition)?;
            }
            match &step.action {
                Some(ActionTrace::Terminal(result)) => {
                    writeln!(f, "{pad}    => {}", describe(result))?;
                }
                Some(ActionTrace::Nested(nested)) => nested.write_indented(f, depth + 2)?,
                None => {}
            }
        }
        Ok(())
    }
}

impl EvalStep {
    fn produced_result(&self) -> bool {
        match &self.action {
            Some(ActionTrace::Terminal(result)) => result.is_terminal(),
            Some(ActionTrace::Nested(nested)) => nested.result.is_terminal(),
            None => false,
        }
    }
}

fn describe(result: &RuleResult) -> String {
    match result {
        RuleResult::CarryOn => "carry on".to_string(),
        RuleResult::Endpoint(endpoint) => format!("endpoint {}", endpoint.url),
        RuleResult::Error(message) => format!("error {message:?}"),
    }
}

impl fmt::Display for EvalTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)?;
        writeln!(f, "result: {}", describe(&self.result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize, matched: bool, action: Option<ActionTrace>) -> EvalStep {
        EvalStep {
            index,
            matched,
            conditions: vec![ConditionTrace {
                condition: "isSet(Region)".into(),
                value: Some(matched.to_string()),
                passed: matched,
            }],
            action,
        }
    }

    #[test]
    fn matched_path_follows_nested_results() {
        let inner = EvalTrace {
            result: RuleResult::Error("boom".into()),
            steps: vec![
                step(0, false, None),
                step(1, true, Some(ActionTrace::Terminal(RuleResult::Error("boom".into())))),
            ],
        };
        let outer = EvalTrace {
            result: RuleResult::Error("boom".into()),
            steps: vec![step(0, true, Some(ActionTrace::Nested(Box::new(inner))))],
        };
        assert_eq!(outer.matched_path(), vec![0, 1]);
    }

    #[test]
    fn matched_path_skips_carry_on_trees() {
        let empty = EvalTrace {
            result: RuleResult::CarryOn,
            steps: vec![],
        };
        let outer = EvalTrace {
            result: RuleResult::Error("fallback".into()),
            steps: vec![
                step(0, true, Some(ActionTrace::Nested(Box::new(empty)))),
                step(1, true, Some(ActionTrace::Terminal(RuleResult::Error("fallback".into())))),
            ],
        };
        assert_eq!(outer.matched_path(), vec![1]);
    }

    #[test]
    fn display_lists_conditions_and_result() {
        let trace = EvalTrace {
            result: RuleResult::Error("boom".into()),
            steps: vec![step(0, true, Some(ActionTrace::Terminal(RuleResult::Error("boom".into()))))],
        };
        let text = trace.to_string();
        assert!(text.contains("+ rule[0]"));
        assert!(text.contains("isSet(Region)"));
        assert!(text.contains("result: error \"boom\""));
    }
}
