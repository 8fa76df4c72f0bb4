//! The rule store and matcher.
//!
//! [`RuleSet`] is an immutable, pre-compiled snapshot of the active rules;
//! matching runs against a snapshot and is side-effect-free. [`RuleStore`]
//! is the single shared handle: readers clone the current snapshot `Arc`,
//! reloads build a complete new snapshot and swap it in one assignment.
//! A concurrent matcher therefore always sees either the old or the new
//! rule set, never a partially updated one.

use crate::pattern::PathPattern;
use crate::rule::Rule;
use crate::validate::validate_rules;
use gatehouse_core::GatehouseError;
use http::Method;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A rule compiled for matching.
#[derive(Debug, Clone)]
struct CompiledRule {
    rule: Arc<Rule>,
    pattern: PathPattern,
}

/// The result of a successful match: the rule plus the path parameters its
/// pattern captured.
#[derive(Debug, Clone)]
pub struct MatchedRule {
    /// The matched rule.
    pub rule: Arc<Rule>,
    /// Parameters captured by the rule's path pattern.
    pub params: HashMap<String, String>,
}

/// An immutable snapshot of the active rule set.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    by_id: HashMap<String, usize>,
}

impl RuleSet {
    /// Validates and compiles a rule set.
    ///
    /// This is the only way to construct a non-empty set, so every active
    /// rule is guaranteed to have passed [`validate_rules`].
    pub fn compile(rules: Vec<Rule>) -> Result<Self, GatehouseError> {
        validate_rules(&rules)?;

        let mut compiled = Vec::with_capacity(rules.len());
        let mut by_id = HashMap::with_capacity(rules.len());
        for rule in rules {
            let pattern = PathPattern::compile(&rule.match_.path)?;
            by_id.insert(rule.id.clone(), compiled.len());
            compiled.push(CompiledRule {
                rule: Arc::new(rule),
                pattern,
            });
        }

        Ok(Self {
            rules: compiled,
            by_id,
        })
    }

    /// Returns the rule with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Rule>> {
        self.by_id.get(id).map(|&index| self.rules[index].rule.clone())
    }

    /// Iterates over all rules in the set.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Returns the number of rules in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finds the rule matching the given method and path.
    ///
    /// Candidates are filtered by method set, then by compiled pattern. When
    /// several rules match, the most specific pattern wins (see
    /// [`PathPattern::cmp_specificity`]); the rule id is the final
    /// tie-break, so the result is deterministic for any rule set.
    ///
    /// Pure and safe to call concurrently against one snapshot.
    #[must_use]
    pub fn match_request(&self, method: &Method, path: &str) -> Option<MatchedRule> {
        let mut best: Option<(&CompiledRule, HashMap<String, String>)> = None;

        for candidate in &self.rules {
            if !candidate.rule.match_.matches_method(method) {
                continue;
            }
            let Some(params) = candidate.pattern.matches(path) else {
                continue;
            };
            let more_specific = best.as_ref().map_or(true, |(current, _)| {
                candidate
                    .pattern
                    .cmp_specificity(&current.pattern)
                    .then_with(|| candidate.rule.id.cmp(&current.rule.id))
                    .is_lt()
            });
            if more_specific {
                best = Some((candidate, params));
            }
        }

        best.map(|(compiled, params)| {
            tracing::trace!(
                rule_id = %compiled.rule.id,
                method = %method,
                path = %path,
                "request matched rule"
            );
            MatchedRule {
                rule: compiled.rule.clone(),
                params,
            }
        })
    }
}

/// The shared, hot-reloadable rule store.
///
/// # Example
///
/// ```
/// use gatehouse_rule::RuleStore;
///
/// let store = RuleStore::new();
/// assert!(store.snapshot().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RuleStore {
    active: RwLock<Arc<RuleSet>>,
}

impl RuleStore {
    /// Creates a store with an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current immutable snapshot.
    ///
    /// The snapshot stays valid for the caller's lifetime even if the store
    /// is reloaded concurrently.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.active.read().clone()
    }

    /// Atomically replaces the active rule set.
    ///
    /// The new set is validated and compiled before the swap; on error the
    /// active set is left untouched.
    pub fn replace(&self, rules: Vec<Rule>) -> Result<(), GatehouseError> {
        let next = Arc::new(RuleSet::compile(rules)?);
        let count = next.len();
        *self.active.write() = next;
        tracing::debug!(rules = count, "rule set replaced");
        Ok(())
    }

    /// Returns the rule with the given id from the current snapshot.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Rule>> {
        self.snapshot().get(id)
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns true if no rules are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
