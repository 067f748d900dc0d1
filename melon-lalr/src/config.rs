//! LR(0) configurations (struct.h's `MlnConfig`) and the propagation links
//! used to carry follow sets between them (plink.c's `MlnPLink`).

use melon_grammar::{RuleId, TermSet};

/// Identifies a configuration by the state that owns it and its index in
/// that state's configuration list. Used by forward propagation links,
/// which may point into a different state than the one they originate in
/// (a GOTO/shift link) or into the same state (a within-closure link).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ConfigRef {
    pub state: u32,
    pub config: u32,
}

/// One LR(0) item, `rule . dot`, together with its LALR(1) follow set.
///
/// `is_basis` marks configurations that are either the root productions of
/// the augmented grammar or were shifted in from a predecessor state, as
/// opposed to configurations added purely by closure. The distinction
/// matters for state identity (only the basis is part of a state's hash
/// key) and for reporting (`-b`/`--basis` prints only the basis).
#[derive(Clone, Debug)]
pub struct Configuration {
    pub rule: RuleId,
    pub dot: u32,
    pub is_basis: bool,
    pub follow: TermSet,
    /// Other configurations whose follow set must receive whatever is
    /// later added to this one's, set up once during construction and then
    /// walked repeatedly to a fixed point.
    pub forward_links: Vec<ConfigRef>,
}

impl Configuration {
    pub fn new(rule: RuleId, dot: u32, is_basis: bool, follow_width: usize) -> Self {
        Configuration {
            rule,
            dot,
            is_basis,
            follow: TermSet::new(follow_width),
            forward_links: vec![],
        }
    }

    pub fn key(&self) -> (RuleId, u32) {
        (self.rule, self.dot)
    }
}
