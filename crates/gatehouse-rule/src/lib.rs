//! # gatehouse-rule
//!
//! The rule layer of Gatehouse: the declarative [`Rule`] document, compiled
//! path patterns, load-time validation, and the hot-reloadable [`RuleStore`].
//!
//! Rules bind a URL match pattern to an ordered authenticator chain, one
//! authorizer, one mutator, and an upstream destination. The store holds an
//! immutable, pre-compiled snapshot of the active set; reloads build a
//! complete new snapshot and swap it atomically, so concurrent matchers
//! always observe either the old or the new set, never a mix.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod pattern;
pub mod rule;
pub mod store;
pub mod validate;

pub use pattern::PathPattern;
pub use rule::{HandlerRef, Rule, RuleMatch, RULE_ID_MAX_LEN};
pub use store::{MatchedRule, RuleSet, RuleStore};
pub use validate::validate_rules;

// Upstream lives in gatehouse-core so decisions can carry it without a
// dependency cycle; re-exported here because it is part of the rule schema.
pub use gatehouse_core::Upstream;
