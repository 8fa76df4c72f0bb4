//! Load-time rule validation.
//!
//! Every rule set is validated as a whole before it can become active; a
//! malformed set is rejected in full and the previously active set stays in
//! place. Nothing validated here can fail again inside the pipeline.

use crate::pattern::PathPattern;
use crate::rule::{Rule, RULE_ID_MAX_LEN};
use gatehouse_core::GatehouseError;
use std::collections::{HashMap, HashSet};

/// Validates a rule set.
///
/// Checks, per rule:
/// - id is non-empty and at most [`RULE_ID_MAX_LEN`] characters
/// - the method set is non-empty
/// - the authenticator chain is non-empty
/// - the path pattern compiles
///
/// And across the set:
/// - ids are unique
/// - no two rules share identical pattern text with overlapping method sets
///   (such rules would be indistinguishable by specificity and are a
///   configuration error)
pub fn validate_rules(rules: &[Rule]) -> Result<(), GatehouseError> {
    let mut seen_ids = HashSet::new();
    let mut by_pattern: HashMap<&str, Vec<&Rule>> = HashMap::new();

    for rule in rules {
        if rule.id.is_empty() {
            return Err(GatehouseError::config("rule id must not be empty"));
        }
        if rule.id.len() > RULE_ID_MAX_LEN {
            return Err(GatehouseError::config(format!(
                "rule id {:?} exceeds {RULE_ID_MAX_LEN} characters",
                rule.id
            )));
        }
        if !seen_ids.insert(rule.id.as_str()) {
            return Err(GatehouseError::config(format!(
                "duplicate rule id {:?}",
                rule.id
            )));
        }
        if rule.match_.methods.is_empty() {
            return Err(GatehouseError::config(format!(
                "rule {:?} has an empty method set",
                rule.id
            )));
        }
        if rule.authenticators.is_empty() {
            return Err(GatehouseError::config(format!(
                "rule {:?} has no authenticators",
                rule.id
            )));
        }

        PathPattern::compile(&rule.match_.path).map_err(|err| {
            GatehouseError::config(format!("rule {:?}: {err}", rule.id))
        })?;

        let same_pattern = by_pattern.entry(rule.match_.path.as_str()).or_default();
        for earlier in same_pattern.iter() {
            let overlap = earlier.match_.methods.iter().any(|m| {
                rule.match_
                    .methods
                    .iter()
                    .any(|n| n.eq_ignore_ascii_case(m))
            });
            if overlap {
                return Err(GatehouseError::config(format!(
                    "rules {:?} and {:?} share pattern {:?} with overlapping methods",
                    earlier.id, rule.id, rule.match_.path
                )));
            }
        }
        same_pattern.push(rule);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{HandlerRef, RuleMatch};
    use gatehouse_core::Upstream;

    fn rule(id: &str, methods: &[&str], path: &str) -> Rule {
        Rule {
            id: id.to_string(),
            description: None,
            match_: RuleMatch {
                methods: methods.iter().map(ToString::to_string).collect(),
                path: path.to_string(),
            },
            authenticators: vec![HandlerRef::new("anonymous")],
            authorizer: HandlerRef::new("allow"),
            mutator: HandlerRef::new("noop"),
            upstream: Upstream::new("http://upstream.internal"),
        }
    }

    #[test]
    fn test_valid_rule_set() {
        let rules = vec![
            rule("r1", &["GET"], "/api/*"),
            rule("r2", &["POST"], "/api/users"),
        ];
        assert!(validate_rules(&rules).is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(validate_rules(&[rule("", &["GET"], "/")]).is_err());
    }

    #[test]
    fn test_oversized_id_rejected() {
        let long_id = "x".repeat(RULE_ID_MAX_LEN + 1);
        assert!(validate_rules(&[rule(&long_id, &["GET"], "/")]).is_err());
    }

    #[test]
    fn test_id_at_limit_accepted() {
        let id = "x".repeat(RULE_ID_MAX_LEN);
        assert!(validate_rules(&[rule(&id, &["GET"], "/")]).is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let rules = vec![rule("r1", &["GET"], "/a"), rule("r1", &["POST"], "/b")];
        let err = validate_rules(&rules).unwrap_err();
        assert!(err.to_string().contains("duplicate rule id"));
    }

    #[test]
    fn test_empty_authenticators_rejected() {
        let mut bad = rule("r1", &["GET"], "/");
        bad.authenticators.clear();
        assert!(validate_rules(&[bad]).is_err());
    }

    #[test]
    fn test_empty_method_set_rejected() {
        assert!(validate_rules(&[rule("r1", &[], "/")]).is_err());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let err = validate_rules(&[rule("r1", &["GET"], "/users/{}")]).unwrap_err();
        assert!(err.to_string().contains("r1"));
    }

    #[test]
    fn test_identical_pattern_overlapping_methods_rejected() {
        let rules = vec![
            rule("r1", &["GET", "POST"], "/api/users"),
            rule("r2", &["post"], "/api/users"),
        ];
        let err = validate_rules(&rules).unwrap_err();
        assert!(err.to_string().contains("overlapping methods"));
    }

    #[test]
    fn test_identical_pattern_disjoint_methods_accepted() {
        let rules = vec![
            rule("r1", &["GET"], "/api/users"),
            rule("r2", &["POST"], "/api/users"),
        ];
        assert!(validate_rules(&rules).is_ok());
    }
}
