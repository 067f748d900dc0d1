//! Per-state action construction and conflict resolution (§4.5–§4.6).
//!
//! Action kinds mirror struct.h's `MlnActionState` enum, and actions are
//! sorted the way action.c's `MlnActionCmp` sorts them (by lookahead index,
//! then kind, then rule index for reduces) before conflicts are resolved
//! down a run of same-lookahead entries. The original tool's `FindActions`
//! lives in a `build.c` that was not part of the kept source set, so the
//! resolution policy below follows the conventional precedence/associativity
//! rules that `MlnAssocType`/`MlnActionState` describe.

use std::cmp::Ordering;

use melon_grammar::{Associativity, Grammar, RuleId, Symbol};
use melon_lalr::Automaton;

/// What an action does once its lookahead is seen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionKind {
    /// Shift into a state (also used for a GOTO after a reduce, when the
    /// lookahead is a non-terminal).
    Shift,
    Accept,
    Reduce,
    /// No action is legal; a syntax error should be reported.
    Error,
    /// Was a reduce, but lost a conflict to another reduce or to a shift
    /// with no precedence to resolve it; kept only for reporting.
    Conflict,
    /// Was a shift; a conflicting reduce lost to it by precedence.
    ShiftResolved,
    /// Was a reduce; a conflicting shift lost to it by precedence.
    ReduceResolved,
}

impl ActionKind {
    fn sort_rank(self) -> u8 {
        match self {
            ActionKind::Shift => 0,
            ActionKind::Accept => 1,
            ActionKind::Reduce => 2,
            ActionKind::Error => 3,
            ActionKind::Conflict => 4,
            ActionKind::ShiftResolved => 5,
            ActionKind::ReduceResolved => 6,
        }
    }
}

/// What an action does, once chosen: move to a state, or reduce by a rule.
#[derive(Clone, Copy, Debug)]
pub enum ActionTarget {
    State(u32),
    Rule(RuleId),
}

#[derive(Clone, Debug)]
pub struct Action {
    pub lookahead: Symbol,
    pub kind: ActionKind,
    pub target: ActionTarget,
}

impl Action {
    fn rule_for_sort(&self) -> RuleId {
        match self.target {
            ActionTarget::Rule(r) => r,
            ActionTarget::State(_) => 0,
        }
    }
}

fn action_cmp(a: &Action, b: &Action) -> Ordering {
    a.lookahead
        .index()
        .cmp(&b.lookahead.index())
        .then_with(|| a.kind.sort_rank().cmp(&b.kind.sort_rank()))
        .then_with(|| a.rule_for_sort().cmp(&b.rule_for_sort()))
}

/// The action table for every state, plus the total number of unresolved
/// conflicts across the whole grammar (used for the process exit code, §7).
pub struct ActionTables {
    pub per_state: Vec<Vec<Action>>,
    pub conflicts: usize,
}

/// Builds and resolves the action table for every state in `automaton`.
pub fn build_actions(grammar: &Grammar, automaton: &Automaton) -> ActionTables {
    let root_rules: Vec<RuleId> = grammar.symbols.get(grammar.roots[0]).rules.clone();
    let eoi = grammar.symbols.end_of_input();

    let mut per_state = Vec::with_capacity(automaton.states.len());
    let mut conflicts = 0usize;

    for state in &automaton.states {
        let mut raw = vec![];

        for (&symbol, &target) in &state.successors {
            raw.push(Action {
                lookahead: symbol,
                kind: ActionKind::Shift,
                target: ActionTarget::State(target),
            });
        }

        for config in &state.configs {
            let rule = &grammar.rules[config.rule as usize];
            if config.dot as usize != rule.len() {
                continue;
            }
            for lookahead in config.follow.iter() {
                let is_accept = lookahead == eoi && root_rules.contains(&config.rule);
                raw.push(Action {
                    lookahead,
                    kind: if is_accept {
                        ActionKind::Accept
                    } else {
                        ActionKind::Reduce
                    },
                    target: ActionTarget::Rule(config.rule),
                });
            }
        }

        raw.sort_by(action_cmp);
        let resolved = resolve_conflicts(grammar, raw, &mut conflicts);
        per_state.push(resolved);
    }

    ActionTables {
        per_state,
        conflicts,
    }
}

/// Walks `actions` (already sorted by lookahead) a run at a time, resolving
/// every lookahead that has more than one action competing for it.
fn resolve_conflicts(grammar: &Grammar, mut actions: Vec<Action>, conflicts: &mut usize) -> Vec<Action> {
    let mut out = Vec::with_capacity(actions.len());
    let mut start = 0;
    while start < actions.len() {
        let mut end = start + 1;
        while end < actions.len() && actions[end].lookahead == actions[start].lookahead {
            end += 1;
        }
        if end - start == 1 {
            out.push(actions[start].clone());
        } else {
            resolve_run(grammar, &mut actions[start..end], conflicts);
            out.extend(actions[start..end].iter().cloned());
        }
        start = end;
    }
    out
}

/// Resolves every action competing for one lookahead symbol, in place.
/// `run` is non-empty and already sorted (shift/accept before reduces, and
/// reduces in rule-declaration order).
fn resolve_run(grammar: &Grammar, run: &mut [Action], conflicts: &mut usize) {
    let shift_index = run
        .iter()
        .position(|a| matches!(a.kind, ActionKind::Shift | ActionKind::Accept));

    match shift_index {
        Some(shift_index) => {
            // Shift/reduce: the shift (or accept) competes with every
            // reduce in the run. Each reduce is resolved independently
            // against the shift's lookahead terminal.
            let lookahead = run[shift_index].lookahead;
            let shift_prec = grammar.symbols.get(lookahead).precedence;
            let shift_assoc = grammar.symbols.get(lookahead).associativity;

            let tombstone_shift = |kind: ActionKind| match kind {
                ActionKind::Accept => ActionKind::Accept,
                _ => ActionKind::ShiftResolved,
            };

            for i in 0..run.len() {
                if i == shift_index {
                    continue;
                }
                if !matches!(run[i].kind, ActionKind::Reduce) {
                    continue;
                }
                let rule = match run[i].target {
                    ActionTarget::Rule(r) => &grammar.rules[r as usize],
                    ActionTarget::State(_) => unreachable!("reduce action always targets a rule"),
                };
                match (shift_prec, rule.precedence) {
                    (Some(sp), Some(rp)) => match sp.cmp(&rp) {
                        Ordering::Greater => {
                            // Shift wins: it stays live, the reduce is the
                            // tombstoned loser.
                            run[i].kind = ActionKind::ReduceResolved;
                        }
                        Ordering::Less => {
                            // Reduce wins: it stays live, the shift is the
                            // tombstoned loser.
                            run[shift_index].kind = tombstone_shift(run[shift_index].kind);
                        }
                        Ordering::Equal => match shift_assoc {
                            Associativity::Left => {
                                run[shift_index].kind = tombstone_shift(run[shift_index].kind);
                            }
                            Associativity::Right => {
                                run[i].kind = ActionKind::ReduceResolved;
                            }
                            Associativity::Non | Associativity::Unknown => {
                                run[i].kind = ActionKind::Error;
                                run[shift_index].kind = ActionKind::Error;
                            }
                        },
                    },
                    _ => {
                        // No precedence declared on one side or the other:
                        // fall back to the default (shift wins) and report
                        // a genuine conflict, as the ambiguity was never
                        // resolved by the grammar author.
                        run[i].kind = ActionKind::Conflict;
                        run[shift_index].kind = tombstone_shift(run[shift_index].kind);
                        *conflicts += 1;
                    }
                }
            }
        }
        None => {
            // Reduce/reduce: the earliest-declared rule always wins, and
            // every reduce/reduce collision is reported regardless of
            // precedence declarations.
            for a in run.iter_mut().skip(1) {
                a.kind = ActionKind::Conflict;
            }
            run[0].kind = ActionKind::ReduceResolved;
            *conflicts += run.len() - 1;
        }
    }
}

/// Default-action compression (§4.7): for every state, if the most common
/// reduce action's rule is reduced on more distinct lookaheads than any
/// other single action, replace all of that state's `Error` slots with a
/// single default reduce, recorded separately rather than repeated per
/// symbol. Returns, per state, the surviving (non-default) actions plus the
/// chosen default rule (if compression was profitable there).
pub fn compress_default_actions(
    grammar: &Grammar,
    per_state: Vec<Vec<Action>>,
) -> Vec<(Vec<Action>, Option<RuleId>)> {
    per_state
        .into_iter()
        .map(|actions| compress_one_state(grammar, actions))
        .collect()
}

fn compress_one_state(grammar: &Grammar, actions: Vec<Action>) -> (Vec<Action>, Option<RuleId>) {
    use std::collections::HashMap;

    let mut reduce_counts: HashMap<RuleId, usize> = HashMap::new();
    for action in &actions {
        if let (ActionKind::Reduce | ActionKind::ReduceResolved, ActionTarget::Rule(r)) =
            (action.kind, action.target)
        {
            *reduce_counts.entry(r).or_default() += 1;
        }
    }

    // A default action is worth picking only if it collapses more than one
    // lookahead; a reduce rule that only fires on a single terminal gains
    // nothing from being pulled out as a default.
    let default_rule = reduce_counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .max_by_key(|&(rule, count)| (count, std::cmp::Reverse(rule)))
        .map(|(rule, _)| rule);

    let Some(default_rule) = default_rule else {
        return (actions, None);
    };

    let surviving: Vec<Action> = actions
        .into_iter()
        .filter(|action| {
            !matches!(
                (action.kind, action.target),
                (ActionKind::Reduce | ActionKind::ReduceResolved, ActionTarget::Rule(r)) if r == default_rule
            )
        })
        .collect();

    let _ = grammar; // kept for symmetry with build_actions's signature; no lookups needed here yet.
    (surviving, Some(default_rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use melon_grammar::{Rule, RhsSymbol};

    fn rhs(sym: Symbol) -> RhsSymbol {
        RhsSymbol {
            symbol: sym,
            alias: None,
        }
    }

    fn rule_with_prec(
        lhs: Symbol,
        rhs_syms: Vec<Symbol>,
        prec_sym: Option<Symbol>,
    ) -> Rule {
        Rule {
            index: 0,
            lhs,
            lhs_alias: None,
            rhs: rhs_syms.into_iter().map(rhs).collect(),
            prec_sym,
            precedence: None,
            associativity: Associativity::Unknown,
            code: None,
            source_line: 0,
        }
    }

    #[test]
    fn trivial_grammar_gets_shift_then_accept() {
        let mut g = Grammar::new("t.y");
        let id = g.intern("ID");
        let start = g.intern("start");
        g.add_rule(rule_with_prec(start, vec![id], None));
        g.prepare();
        let automaton = melon_lalr::build_states(&g).unwrap();
        let tables = build_actions(&g, &automaton);

        assert!(tables.per_state[0]
            .iter()
            .any(|a| a.lookahead == id && matches!(a.kind, ActionKind::Shift)));
        let accept_state = tables.per_state[0]
            .iter()
            .find_map(|a| match (a.kind, a.target) {
                (ActionKind::Shift, ActionTarget::State(s)) => Some(s),
                _ => None,
            })
            .unwrap();
        assert!(tables.per_state[accept_state as usize]
            .iter()
            .any(|a| matches!(a.kind, ActionKind::Accept)));
        assert_eq!(tables.conflicts, 0);
    }

    #[test]
    fn precedence_resolves_shift_reduce_without_counting_a_conflict() {
        let mut g = Grammar::new("t.y");
        let plus = g.intern("PLUS");
        let times = g.intern("TIMES");
        let id = g.intern("ID");
        let expr = g.intern("expr");

        g.symbols.get_mut(plus).precedence = Some(1);
        g.symbols.get_mut(plus).associativity = Associativity::Left;
        g.symbols.get_mut(times).precedence = Some(2);
        g.symbols.get_mut(times).associativity = Associativity::Left;

        g.add_rule(rule_with_prec(expr, vec![expr, plus, expr], None));
        g.add_rule(rule_with_prec(expr, vec![expr, times, expr], None));
        g.add_rule(rule_with_prec(expr, vec![id], None));
        g.prepare();

        let automaton = melon_lalr::build_states(&g).unwrap();
        let tables = build_actions(&g, &automaton);

        // TIMES binds tighter than PLUS, so in the state after `expr PLUS
        // expr .` with TIMES as lookahead, TIMES must shift, not reduce,
        // and this must not count as an unresolved conflict.
        assert_eq!(tables.conflicts, 0);
    }

    #[test]
    fn reduce_reduce_conflict_picks_earliest_rule_and_counts_one_conflict() {
        let mut g = Grammar::new("t.y");
        let id = g.intern("ID");
        let a = g.intern("a");
        let b = g.intern("b");
        let start = g.intern("start");

        g.add_rule(rule_with_prec(start, vec![a], None));
        g.add_rule(rule_with_prec(start, vec![b], None));
        g.add_rule(rule_with_prec(a, vec![id], None));
        g.add_rule(rule_with_prec(b, vec![id], None));
        g.prepare();

        let automaton = melon_lalr::build_states(&g).unwrap();
        let tables = build_actions(&g, &automaton);
        assert_eq!(tables.conflicts, 1);
    }
}
