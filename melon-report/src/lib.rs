//! Renders the human-readable `y.output`-style report: every state's
//! configurations followed by its resolved actions (§6, the non-quiet
//! default output).
//!
//! Formatting is grounded directly on report.c's `MlnConfigPrint` and
//! `MlnPrintAction`, down to the field widths and the
//! `** Parsing conflict **` suffix.

#![deny(unsafe_code)]

use std::fmt::Write as _;

use melon_action::{Action, ActionKind, ActionTarget};
use melon_grammar::Grammar;
use melon_lalr::{Automaton, Configuration};

/// Renders the full report for every state, in state-index order.
///
/// `per_state_actions` is the resolved (but not yet packed or
/// default-compressed) action list for each state, as returned by
/// [`melon_action::build_actions`]. `basis_only` mirrors the `-b` CLI flag:
/// when set, only basis configurations are printed per state.
pub fn render(
    grammar: &Grammar,
    automaton: &Automaton,
    per_state_actions: &[Vec<Action>],
    basis_only: bool,
) -> String {
    let mut out = String::new();
    for state in &automaton.states {
        writeln!(out, "State {}:", state.index).unwrap();

        let configs: Vec<&Configuration> = if basis_only {
            state.basis().collect()
        } else {
            state.configs.iter().collect()
        };
        for config in configs {
            let rule = &grammar.rules[config.rule as usize];
            if config.dot as usize == rule.len() {
                write!(out, "{:>9} ", format!("({})", config.rule)).unwrap();
            } else {
                write!(out, "{:>10}", "").unwrap();
            }
            write_config(&mut out, grammar, config);
            out.push('\n');
        }

        out.push('\n');
        for action in &per_state_actions[state.index as usize] {
            if let Some(line) = action_line(grammar, action) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

fn write_config(out: &mut String, grammar: &Grammar, config: &Configuration) {
    let rule = &grammar.rules[config.rule as usize];
    let lhs_name = &grammar.symbols.get(rule.lhs).name;
    write!(out, "{} ::=", lhs_name).unwrap();
    for i in 0..=rule.len() {
        if i == config.dot as usize {
            out.push_str(" *");
        }
        if i == rule.len() {
            break;
        }
        let name = &grammar.symbols.get(rule.rhs[i].symbol).name;
        write!(out, " {}", name).unwrap();
    }
}

/// Renders one action line, or `None` for kinds the original report omits
/// entirely (a resolved winner is folded into the table silently; only its
/// losing counterpart, if any, is worth calling out).
fn action_line(grammar: &Grammar, action: &Action) -> Option<String> {
    let name = &grammar.symbols.get(action.lookahead).name;
    let text = match (action.kind, action.target) {
        (ActionKind::Shift, ActionTarget::State(state)) => {
            format!("{:>30} shift  {}", name, state)
        }
        (ActionKind::Reduce, ActionTarget::Rule(rule)) => {
            format!("{:>30} reduce {}", name, rule)
        }
        (ActionKind::Accept, _) => format!("{:>30} accept", name),
        (ActionKind::Error, _) => format!("{:>30} error", name),
        (ActionKind::Conflict, ActionTarget::Rule(rule)) => {
            format!("{:>30} reduce {:<3} ** Parsing conflict **", name, rule)
        }
        (ActionKind::ShiftResolved, _) | (ActionKind::ReduceResolved, _) => return None,
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use melon_grammar::{Associativity, Rule, RhsSymbol, Symbol};

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
    fn trivial_grammar_report_has_expected_shape() {
        let mut g = Grammar::new("t.y");
        let id = g.intern("ID");
        let start = g.intern("start");
        g.add_rule(rule(start, vec![id]));
        g.prepare();

        let automaton = melon_lalr::build_states(&g).unwrap();
        let tables = melon_action::build_actions(&g, &automaton);
        let text = render(&g, &automaton, &tables.per_state, false);

        assert!(text.contains("State 0:"));
        assert!(text.contains("start ::= * ID"));
        assert!(text.contains("shift  1"));
        assert!(text.contains("State 1:"));
        assert!(text.contains("start ::= ID *"));
        assert!(text.contains("accept"));
    }

    #[test]
    fn conflict_line_matches_legacy_suffix() {
        let mut g = Grammar::new("t.y");
        let id = g.intern("ID");
        let a = g.intern("a");
        let b = g.intern("b");
        let start = g.intern("start");
        g.add_rule(rule(start, vec![a]));
        g.add_rule(rule(start, vec![b]));
        g.add_rule(rule(a, vec![id]));
        g.add_rule(rule(b, vec![id]));
        g.prepare();

        let automaton = melon_lalr::build_states(&g).unwrap();
        let tables = melon_action::build_actions(&g, &automaton);
        let text = render(&g, &automaton, &tables.per_state, false);
        assert!(text.contains("** Parsing conflict **"));
    }
}
