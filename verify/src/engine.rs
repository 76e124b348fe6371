//! Ordered, short-circuiting rule evaluation.
//!
//! Rules run in declaration order and evaluation stops at the first failure.
//! Later rules may rely on earlier ones having passed (e.g. `min` after
//! `required`), so the short-circuit is part of the contract.

use crate::error::Result;
use crate::parser::RuleDescriptor;
use crate::rules::RuleRegistry;

/// Per-rule outcomes of one pass, up to and including the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    outcomes: Vec<bool>,
    failed: Option<RuleDescriptor>,
}

impl ValidationResult {
    /// One entry per evaluated rule. A `false` can only be the last entry.
    pub fn outcomes(&self) -> &[bool] {
        &self.outcomes
    }

    /// True when no rule failed. An empty pass is vacuously valid.
    pub fn is_valid(&self) -> bool {
        self.outcomes.last().copied().unwrap_or(true)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The rule that stopped evaluation, if any.
    pub fn failed_rule(&self) -> Option<&RuleDescriptor> {
        self.failed.as_ref()
    }

    /// Render the failing rule's message, or an empty string on success.
    pub fn message(&self, registry: &RuleRegistry, value: &str, name: &str) -> String {
        self.failed
            .as_ref()
            .map(|rule| registry.render_message(rule, value, name))
            .unwrap_or_default()
    }
}

/// Evaluate `rules` against `value` in order.
pub fn validate(
    value: &str,
    rules: &[RuleDescriptor],
    registry: &RuleRegistry,
) -> Result<ValidationResult> {
    let mut result = ValidationResult::default();

    for rule in rules {
        let passed = registry.check(rule, value)?;
        result.outcomes.push(passed);
        if !passed {
            result.failed = Some(rule.clone());
            break;
        }
    }

    log::trace!(
        "validate {:?}: {}/{} rules evaluated, valid={}",
        value,
        result.outcomes.len(),
        rules.len(),
        result.is_valid()
    );
    Ok(result)
}

/// A finished pass: whether it passed and the message to display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub passed: bool,
    pub message: String,
    pub failed_rule: Option<RuleDescriptor>,
}

impl Outcome {
    pub fn failed(&self) -> bool {
        !self.passed
    }
}

/// [`validate`] followed by message resolution for the field `name`.
pub fn evaluate(
    value: &str,
    rules: &[RuleDescriptor],
    registry: &RuleRegistry,
    name: &str,
) -> Result<Outcome> {
    let result = validate(value, rules, registry)?;
    Ok(Outcome {
        passed: result.is_valid(),
        message: result.message(registry, value, name),
        failed_rule: result.failed,
    })
}
