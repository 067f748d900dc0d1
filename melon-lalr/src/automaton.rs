//! LR(0) state construction and LALR(1) follow-set propagation (§4.4).
//!
//! Grounded in configlist.c's closure and basis-sort routines and plink.c's
//! propagation links. The original tool's `MlnFindStates`/`MlnFindLinks`/
//! `MlnFindFollowSets` live in a `build.c` that was not part of the kept
//! source set, so the fixed-point shape here follows the standard
//! DeRemer/Pennello "LALR by propagation" construction those names
//! describe, using the same `MlnConfig`/`MlnPLink` data shapes as the rest
//! of the tool.

use std::collections::{BTreeMap, HashMap, VecDeque};

use melon_grammar::{Grammar, RuleId, Symbol, SymbolKind};

use crate::config::{ConfigRef, Configuration};
use crate::error::LalrError;
use crate::state::State;

/// The constructed automaton: every LR(0) state, with LALR(1) follow sets
/// already propagated to a fixed point.
pub struct Automaton {
    pub states: Vec<State>,
}

type BasisKey = Vec<(RuleId, u32)>;

/// Builds the LR(0)/LALR(1) automaton for `grammar`.
///
/// `grammar` must already have gone through [`Grammar::prepare`] so lambda
/// and FIRST sets are available. The initial state's basis is the closure
/// seed: dot-zero configurations for every rule whose LHS is the grammar's
/// start symbol (`grammar.roots[0]`), each with `$` in its follow set.
pub fn build_states(grammar: &Grammar) -> Result<Automaton, LalrError> {
    if !grammar.is_finalized() {
        return Err(LalrError::GrammarNotPrepared);
    }
    let Some(&start_symbol) = grammar.roots.first() else {
        return Err(LalrError::NoStartSymbol);
    };
    let width = grammar.nterminal() + 1;

    let mut states: Vec<State> = vec![];
    let mut index_of: HashMap<BasisKey, u32> = HashMap::new();
    let mut queue: VecDeque<u32> = VecDeque::new();

    let start_rules = grammar.symbols.get(start_symbol).rules.clone();
    let initial_basis = sort_basis(start_rules.into_iter().map(|r| (r, 0)).collect());
    let initial_index = intern_state(&mut states, &mut index_of, &mut queue, initial_basis, width);
    let eoi = grammar.symbols.end_of_input();
    for config in &mut states[initial_index as usize].configs {
        config.follow.add(eoi);
    }

    while let Some(state_index) = queue.pop_front() {
        close_state(grammar, &mut states[state_index as usize], width);

        let mut by_symbol: BTreeMap<Symbol, Vec<(usize, RuleId, u32)>> = BTreeMap::new();
        for (config_index, config) in states[state_index as usize].configs.iter().enumerate() {
            let rule = &grammar.rules[config.rule as usize];
            if let Some(rhs) = rule.rhs.get(config.dot as usize) {
                by_symbol
                    .entry(rhs.symbol)
                    .or_default()
                    .push((config_index, config.rule, config.dot + 1));
            }
        }

        for (symbol, advanced) in by_symbol {
            let basis = sort_basis(advanced.iter().map(|&(_, r, d)| (r, d)).collect());
            let target_index = intern_state(&mut states, &mut index_of, &mut queue, basis, width);
            states[state_index as usize]
                .successors
                .insert(symbol, target_index);

            for &(config_index, rule, dot) in &advanced {
                let target_config = states[target_index as usize]
                    .find_config(rule, dot)
                    .expect("basis config was just interned for this transition");
                states[state_index as usize].configs[config_index]
                    .forward_links
                    .push(ConfigRef {
                        state: target_index,
                        config: target_config as u32,
                    });
            }
        }
    }

    propagate_follow_sets(&mut states);

    Ok(Automaton { states })
}

fn intern_state(
    states: &mut Vec<State>,
    index_of: &mut HashMap<BasisKey, u32>,
    queue: &mut VecDeque<u32>,
    basis: BasisKey,
    width: usize,
) -> u32 {
    if let Some(&index) = index_of.get(&basis) {
        return index;
    }
    let index = states.len() as u32;
    let configs = basis
        .iter()
        .map(|&(rule, dot)| Configuration::new(rule, dot, true, width))
        .collect();
    states.push(State {
        index,
        configs,
        successors: BTreeMap::new(),
    });
    index_of.insert(basis, index);
    queue.push_back(index);
    index
}

/// Sorts a basis set by `(rule.index, dot)` so that two shift sequences
/// which land on the same set of items, built in a different order, hash to
/// the same state.
///
/// The original tool's `MlnConfigListSortBasis` sorted `current` (the full
/// closure) instead of `basis`, which could leave equivalent states
/// un-merged depending on shift order; this sorts the actual basis.
fn sort_basis(mut basis: BasisKey) -> BasisKey {
    basis.sort_unstable();
    basis.dedup();
    basis
}

/// Expands a state's basis into its full closure (configlist.c's
/// `MlnConfigListClosure`), seeding each newly-added configuration's follow
/// set from the FIRST set of what follows the nonterminal in the source
/// item, and recording a forward link from the source configuration when
/// that remainder is fully nullable (so the source's own follow set must
/// also flow through).
fn close_state(grammar: &Grammar, state: &mut State, width: usize) {
    let mut existing: HashMap<(RuleId, u32), usize> = state
        .configs
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key(), i))
        .collect();

    let mut worklist: VecDeque<usize> = (0..state.configs.len()).collect();
    while let Some(config_index) = worklist.pop_front() {
        let (rule_id, dot) = state.configs[config_index].key();
        let rule = &grammar.rules[rule_id as usize];
        let Some(postdot) = rule.rhs.get(dot as usize) else {
            continue;
        };
        if grammar.symbols.get(postdot.symbol).kind != SymbolKind::NonTerminal {
            continue;
        }

        let tail: Vec<Symbol> = rule.rhs[(dot as usize + 1)..]
            .iter()
            .map(|s| s.symbol)
            .collect();
        let (tail_first, tail_nullable) = grammar.first_of_sequence(&tail);

        let candidate_rules: Vec<RuleId> = grammar.symbols.get(postdot.symbol).rules.clone();
        for new_rule_id in candidate_rules {
            let key = (new_rule_id, 0);
            let new_index = match existing.get(&key) {
                Some(&i) => i,
                None => {
                    let i = state.configs.len();
                    state
                        .configs
                        .push(Configuration::new(new_rule_id, 0, false, width));
                    existing.insert(key, i);
                    worklist.push_back(i);
                    i
                }
            };
            for sym in tail_first.iter() {
                state.configs[new_index].follow.add(sym);
            }
            if tail_nullable {
                state.configs[config_index].forward_links.push(ConfigRef {
                    state: state.index,
                    config: new_index as u32,
                });
            }
        }
    }
}

/// Propagates follow sets along every forward link to a fixed point
/// (set.c's `MlnSetUnion`, repeated until nothing changes anywhere).
fn propagate_follow_sets(states: &mut [State]) {
    let mut changed = true;
    while changed {
        changed = false;
        for state_index in 0..states.len() {
            let num_configs = states[state_index].configs.len();
            for config_index in 0..num_configs {
                let links = states[state_index].configs[config_index]
                    .forward_links
                    .clone();
                if links.is_empty() {
                    continue;
                }
                let follow = states[state_index].configs[config_index].follow.clone();
                for link in links {
                    let target = &mut states[link.state as usize].configs[link.config as usize];
                    if target.follow.union(&follow) {
                        changed = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melon_grammar::{Associativity, Rule, RhsSymbol};

    fn rhs(sym: Symbol) -> RhsSymbol {
        RhsSymbol {
            symbol: sym,
            alias: None,
        }
    }

    fn rule(lhs: Symbol, rhs_syms: Vec<Symbol>) -> Rule {
        Rule {
            index: 0,
            lhs,
            lhs_alias: None,
            rhs: rhs_syms.into_iter().map(rhs).collect(),
            prec_sym: None,
            precedence: None,
            associativity: Associativity::Unknown,
            code: None,
            source_line: 0,
        }
    }

    #[test]
    fn trivial_grammar_has_shift_then_accept_states() {
        let mut g = Grammar::new("t.y");
        let id = g.intern("ID");
        let start = g.intern("start");
        g.add_rule(rule(start, vec![id]));
        g.prepare();

        let automaton = build_states(&g).unwrap();
        assert_eq!(automaton.states.len(), 2);
        assert!(automaton.states[0].successors.contains_key(&id));

        let eoi = g.symbols.end_of_input();
        assert!(automaton.states[0].configs[0].follow.contains(eoi));
    }

    #[test]
    fn left_recursive_grammar_builds_without_panicking() {
        let mut g = Grammar::new("t.y");
        let plus = g.intern("PLUS");
        let id = g.intern("ID");
        let expr = g.intern("expr");
        g.add_rule(rule(expr, vec![expr, plus, id]));
        g.add_rule(rule(expr, vec![id]));
        g.prepare();

        let automaton = build_states(&g).unwrap();
        assert!(automaton.states.len() > 2);

        // The state reached after shifting `expr` must be able to shift `PLUS`
        // in turn, witnessing the closure re-adding the recursive item.
        let after_expr = automaton.states[0].successors[&expr];
        assert!(automaton.states[after_expr as usize]
            .successors
            .contains_key(&plus));
    }

    #[test]
    fn reduce_config_follow_set_propagates_through_recursion() {
        let mut g = Grammar::new("t.y");
        let plus = g.intern("PLUS");
        let id = g.intern("ID");
        let expr = g.intern("expr");
        g.add_rule(rule(expr, vec![expr, plus, id]));
        g.add_rule(rule(expr, vec![id]));
        g.prepare();

        let automaton = build_states(&g).unwrap();
        let eoi = g.symbols.end_of_input();

        // `expr -> ID .` is reached by shifting `ID` out of the initial
        // state. Its follow set must contain both `$` (the whole input can
        // end there) and `PLUS` (more recursion can follow), propagated
        // from the initial state's `expr -> . ID` item via the GOTO link.
        let after_id = automaton.states[0].successors[&id];
        let target = &automaton.states[after_id as usize];
        let config_index = target
            .find_config(1, 1)
            .expect("ID . is the basis of the state reached by shifting ID");
        let follow = &target.configs[config_index].follow;
        assert!(follow.contains(eoi));
        assert!(follow.contains(plus));
    }
}
