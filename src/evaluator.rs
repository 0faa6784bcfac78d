// 🏷️ Rule Evaluator - apply a template's rules to one import row
//
// The condition language is external: conditions are handed to a
// `ConditionEvaluator` and only its boolean answer is used here.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rows::Row;
use crate::template::Rule;

// ============================================================================
// CONDITION EVALUATOR
// ============================================================================

pub trait ConditionEvaluator {
    fn evaluate(&self, condition: &str, row: &Row) -> anyhow::Result<bool>;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&str, &Row) -> anyhow::Result<bool>,
{
    fn evaluate(&self, condition: &str, row: &Row) -> anyhow::Result<bool> {
        self(condition, row)
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Only the first matching rule applies
    #[default]
    FirstMatch,

    /// Every matching rule adds its tags; a matching skip rule stops evaluation
    /// without adding its own tags
    Accumulate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub tags: Vec<String>,

    /// Row is excluded from import
    pub skip: bool,

    /// Positions of the rules that applied, in evaluation order
    pub matched: Vec<usize>,
}

impl Classification {
    /// Append ` #tag` markers to the first line of a rendered entry
    pub fn tag_first_line(&self, rendered: &str) -> String {
        if self.tags.is_empty() || rendered.is_empty() {
            return rendered.to_string();
        }

        let markers: Vec<String> = self.tags.iter().map(|tag| format!("#{}", tag)).collect();
        let (first, rest) = match rendered.find('\n') {
            Some(idx) => rendered.split_at(idx),
            None => (rendered, ""),
        };
        format!("{} {}{}", first, markers.join(" "), rest)
    }
}

// ============================================================================
// RULE EVALUATOR
// ============================================================================

pub struct RuleEvaluator<E> {
    conditions: E,
    policy: MatchPolicy,
}

impl<E: ConditionEvaluator> RuleEvaluator<E> {
    pub fn new(conditions: E) -> Self {
        RuleEvaluator {
            conditions,
            policy: MatchPolicy::default(),
        }
    }

    /// Builder: choose how multiple matches combine
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Classify a row; `None` when no rule matched.
    pub fn classify(&self, rules: &[Rule], row: &Row) -> Option<Classification> {
        let mut result = Classification::default();

        for (idx, rule) in rules.iter().enumerate() {
            if !self.matches(idx, rule, row) {
                continue;
            }

            result.matched.push(idx);
            match self.policy {
                MatchPolicy::FirstMatch => {
                    result.skip = rule.skip;
                    result.tags.extend(rule.tags.iter().cloned());
                    break;
                }
                // A skip rule drops the row; its own tags are never applied
                MatchPolicy::Accumulate if rule.skip => {
                    result.skip = true;
                    break;
                }
                MatchPolicy::Accumulate => result.tags.extend(rule.tags.iter().cloned()),
            }
        }

        if result.matched.is_empty() {
            None
        } else {
            Some(result)
        }
    }

    /// A condition that fails to evaluate counts as a non-match
    fn matches(&self, idx: usize, rule: &Rule, row: &Row) -> bool {
        match self.conditions.evaluate(&rule.condition, row) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(
                    rule = idx,
                    condition = %rule.condition,
                    error = %err,
                    "rule condition failed"
                );
                false
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
