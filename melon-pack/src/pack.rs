//! Drives [`ActionTable`] over every state's action list, producing the
//! per-state offsets (struct.h's `tkn_off`/`ntkn_off`/`dflt_act`) that the
//! emitter needs to generate a parser's driver tables (§4.8).

use melon_action::{Action, ActionKind, ActionTarget};
use melon_grammar::{Grammar, SymbolKind};

use crate::encode::CodeSpace;
use crate::table::ActionTable;

/// Packed offsets for one state.
#[derive(Clone, Copy, Debug)]
pub struct StateOffsets {
    /// Offset into the shared action table for this state's terminal
    /// lookaheads, or `None` if the state has no terminal actions at all.
    pub tkn_off: Option<i64>,
    /// Offset into the shared action table for this state's non-terminal
    /// (GOTO) lookaheads, or `None` if there are none.
    pub ntkn_off: Option<i64>,
    /// The default action code, if default-action compression (§4.7)
    /// chose one for this state.
    pub dflt_act: Option<u32>,
}

/// The result of packing every state's action list.
pub struct PackedTables {
    pub action: Vec<i64>,
    pub lookahead: Vec<i64>,
    pub per_state: Vec<StateOffsets>,
}

/// Packs `per_state` (one action list and optional default rule per state,
/// as returned by [`melon_action::compress_default_actions`]) into one
/// shared action table.
pub fn pack_tables(
    grammar: &Grammar,
    per_state: &[(Vec<Action>, Option<u32>)],
    code_space: CodeSpace,
) -> PackedTables {
    let mut table = ActionTable::new();
    let mut offsets = Vec::with_capacity(per_state.len());

    for (actions, default_rule) in per_state {
        let mut terminal_txn = vec![];
        let mut nonterminal_txn = vec![];

        for action in actions {
            if matches!(action.kind, ActionKind::Conflict) {
                continue;
            }
            if let ActionTarget::Rule(rule) = action.target {
                if Some(rule) == *default_rule {
                    continue;
                }
            }
            let code = code_space.encode(action);
            let entry = (action.lookahead.index(), code);
            match grammar.symbols.get(action.lookahead).kind {
                SymbolKind::Terminal => terminal_txn.push(entry),
                SymbolKind::NonTerminal => nonterminal_txn.push(entry),
            }
        }

        let tkn_off = if terminal_txn.is_empty() {
            None
        } else {
            Some(table.insert(&terminal_txn))
        };
        let ntkn_off = if nonterminal_txn.is_empty() {
            None
        } else {
            Some(table.insert(&nonterminal_txn))
        };
        let dflt_act = default_rule.as_ref().map(|&rule| code_space.num_states + rule);

        offsets.push(StateOffsets {
            tkn_off,
            ntkn_off,
            dflt_act,
        });
    }

    PackedTables {
        action: table.actions(),
        lookahead: table.lookaheads(),
        per_state: offsets,
    }
}
