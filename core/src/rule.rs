//! `Rule` — Conditions plus an action.
//!
//! The action is exclusive: nested rules, an endpoint, or an error.

use crate::trace::{ActionTrace, ConditionTrace, EvalStep, EvalTrace};
use crate::{Condition, EndpointSpec, RuleResult, Scope, Template};

/// What a rule does once its conditions pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Evaluate nested rules. If none is terminal the rule carries on.
    Tree(Vec<Rule>),
    /// Produce an endpoint.
    Endpoint(EndpointSpec),
    /// Produce an error message.
    Error(Template),
}

/// A guarded rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// All must pass, evaluated left to right, short-circuiting.
    pub conditions: Vec<Condition>,
    pub action: RuleAction,
    pub documentation: Option<String>,
}

impl Rule {
    /// Create a rule.
    #[must_use]
    pub fn new(conditions: Vec<Condition>, action: RuleAction) -> Self {
        Self {
            conditions,
            action,
            documentation: None,
        }
    }

    /// Attach documentation (shown by traces and kept from documents).
    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Evaluate this rule. Bindings made by its conditions are dropped
    /// before returning.
    pub fn evaluate<'a>(&'a self, scope: &mut Scope<'a>) -> RuleResult {
        let mark = scope.mark();
        let result = self.evaluate_in_place(scope);
        scope.truncate(mark);
        result
    }

    fn evaluate_in_place<'a>(&'a self, scope: &mut Scope<'a>) -> RuleResult {
        for condition in &self.conditions {
            let Some(value) = condition.test(scope) else {
                return RuleResult::CarryOn;
            };
            if let Some(name) = &condition.assign {
                scope.bind(name, value);
            }
        }
        match &self.action {
            RuleAction::Tree(rules) => evaluate_rules(rules, scope),
            RuleAction::Endpoint(spec) => render_endpoint(spec, scope),
            RuleAction::Error(message) => render_error(message, scope),
        }
    }

    /// Evaluate with a trace.
    pub fn evaluate_with_trace<'a>(&'a self, scope: &mut Scope<'a>, index: usize) -> (RuleResult, EvalStep) {
        let mark = scope.mark();
        let mut conditions = Vec::with_capacity(self.conditions.len());
        let mut matched = true;
        for condition in &self.conditions {
            let value = condition.expr.eval(scope);
            let passed = value.as_ref().is_some_and(crate::Value::is_truthy);
            conditions.push(ConditionTrace {
                condition: condition.to_string(),
                value: value.as_ref().map(ToString::to_string),
                passed,
            });
            if !passed {
                matched = false;
                break;
            }
            if let (Some(name), Some(value)) = (&condition.assign, value) {
                scope.bind(name, value);
            }
        }

        let (result, action) = if matched {
            let (result, action) = match &self.action {
                RuleAction::Tree(rules) => {
                    let nested = evaluate_rules_with_trace(rules, scope);
                    (nested.result.clone(), ActionTrace::Nested(Box::new(nested)))
                }
                RuleAction::Endpoint(spec) => {
                    let result = render_endpoint(spec, scope);
                    (result.clone(), ActionTrace::Terminal(result))
                }
                RuleAction::Error(message) => {
                    let result = render_error(message, scope);
                    (result.clone(), ActionTrace::Terminal(result))
                }
            };
            (result, Some(action))
        } else {
            (RuleResult::CarryOn, None)
        };
        scope.truncate(mark);

        (
            result,
            EvalStep {
                index,
                matched,
                conditions,
                action,
            },
        )
    }

    /// Nesting depth: 1 for a leaf, 1 + deepest child for a tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        match &self.action {
            RuleAction::Tree(rules) => 1 + rules.iter().map(Rule::depth).max().unwrap_or(0),
            RuleAction::Endpoint(_) | RuleAction::Error(_) => 1,
        }
    }
}

/// First-match-wins over `rules`.
pub(crate) fn evaluate_rules<'a>(rules: &'a [Rule], scope: &mut Scope<'a>) -> RuleResult {
    for (index, rule) in rules.iter().enumerate() {
        let result = rule.evaluate(scope);
        tracing::trace!(index, terminal = result.is_terminal(), "rule evaluated");
        if result.is_terminal() {
            return result;
        }
    }
    RuleResult::CarryOn
}

pub(crate) fn evaluate_rules_with_trace<'a>(rules: &'a [Rule], scope: &mut Scope<'a>) -> EvalTrace {
    let mut steps = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        let (result, step) = rule.evaluate_with_trace(scope, index);
        steps.push(step);
        if result.is_terminal() {
            return EvalTrace { result, steps };
        }
    }
    EvalTrace {
        result: RuleResult::CarryOn,
        steps,
    }
}

fn render_endpoint(spec: &EndpointSpec, scope: &Scope<'_>) -> RuleResult {
    match spec.render(scope) {
        Some(endpoint) => RuleResult::Endpoint(endpoint),
        None => {
            tracing::warn!(url = %spec.url, "endpoint template did not render, carrying on");
            RuleResult::CarryOn
        }
    }
}

fn render_error(message: &Template, scope: &Scope<'_>) -> RuleResult {
    match message.render(scope) {
        Some(message) => RuleResult::Error(message),
        None => {
            tracing::warn!(template = %message, "error template did not render, carrying on");
            RuleResult::CarryOn
        }
    }
}
