//! The grammar context: owns the symbol table and rule list, and runs the
//! preparation passes of §4.3 (precedence inference, lambda fixed point,
//! FIRST sets).

use crate::bitset::TermSet;
use crate::error::GrammarError;
use crate::rule::{Rule, RuleId};
use crate::symbol::{Associativity, Symbol, SymbolKind, SymbolTable, DEFAULT_NAME};

/// Owns every per-run table: symbols, rules, roots. No two generator runs
/// share a `Grammar` (§5) — it is an ordinary owned value, not global state.
#[derive(Debug)]
pub struct Grammar {
    pub symbols: SymbolTable,
    pub rules: Vec<Rule>,
    pub roots: Vec<Symbol>,
    pub filename: String,
    pub errors: Vec<GrammarError>,
    nterminal: usize,
    finalized: bool,
}

impl Grammar {
    pub fn new(filename: impl Into<String>) -> Self {
        let mut symbols = SymbolTable::new();
        // `error` is a terminal by convention, despite its lowercase name; `$`
        // likewise. Both were created by `SymbolTable::new`.
        symbols.get_mut(symbols.error_symbol()).kind = SymbolKind::Terminal;
        symbols.get_mut(symbols.end_of_input()).kind = SymbolKind::Terminal;
        Grammar {
            symbols,
            rules: vec![],
            roots: vec![],
            filename: filename.into(),
            errors: vec![],
            nterminal: 0,
            finalized: false,
        }
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    pub fn add_rule(&mut self, mut rule: Rule) -> RuleId {
        let index = self.rules.len() as RuleId;
        rule.index = index;
        if self.roots.is_empty() {
            self.roots.push(rule.lhs);
        }
        self.symbols.get_mut(rule.lhs).rules.push(index);
        self.rules.push(rule);
        index
    }

    pub fn nterminal(&self) -> usize {
        assert!(self.finalized, "nterminal is only valid after finalize()");
        self.nterminal
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Checks every non-terminal mentioned anywhere has at least one rule
    /// (§3.1's "non-terminal has no rules" diagnostic). Call before or after
    /// finalization; it only reads `kind` and `rules`.
    pub fn check_non_terminals_have_rules(&mut self) {
        let err_sym = self.symbols.error_symbol();
        let mentioned: Vec<Symbol> = self
            .rules
            .iter()
            .flat_map(|r| r.rhs_symbols())
            .chain(self.rules.iter().map(|r| r.lhs))
            .collect();
        for sym in mentioned {
            if sym == err_sym {
                continue;
            }
            let attrs = self.symbols.get(sym);
            if attrs.kind == SymbolKind::NonTerminal && attrs.rules.is_empty() {
                self.errors.push(GrammarError::NonTerminalHasNoRules {
                    file: self.filename.clone(),
                    line: 0,
                    name: attrs.name.clone(),
                });
            }
        }
    }

    /// Reorders symbol indices so that terminals come first (with `$` forced
    /// to index 0), then non-terminals, then a synthetic `{default}` symbol
    /// last (§3 invariants, P1). Every `Symbol` stored anywhere in `self` is
    /// remapped in place. Idempotent: calling twice is a no-op.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        let eoi = self.symbols.end_of_input();
        let old_len = self.symbols.len();

        let mut terminals = vec![];
        let mut non_terminals = vec![];
        for i in 0..old_len {
            let sym = Symbol::from(i);
            if sym == eoi {
                continue;
            }
            match self.symbols.get(sym).kind {
                SymbolKind::Terminal => terminals.push(sym),
                SymbolKind::NonTerminal => non_terminals.push(sym),
            }
        }

        let mut order = Vec::with_capacity(old_len + 1);
        order.push(eoi);
        order.extend(terminals.iter().copied());
        let nterminal = order.len();
        order.extend(non_terminals.iter().copied());

        let default_sym = self.symbols.push_synthetic(DEFAULT_NAME);
        order.push(default_sym);
        debug_assert_eq!(default_sym.usize(), old_len);

        let (new_symbols, remap) = self.symbols.reorder(&order);
        self.symbols = new_symbols;

        for rule in &mut self.rules {
            rule.lhs = Symbol::from(remap[rule.lhs.usize()] as usize);
            if let Some(ps) = rule.prec_sym {
                rule.prec_sym = Some(Symbol::from(remap[ps.usize()] as usize));
            }
            for rhs in &mut rule.rhs {
                rhs.symbol = Symbol::from(remap[rhs.symbol.usize()] as usize);
            }
        }
        for root in &mut self.roots {
            *root = Symbol::from(remap[root.usize()] as usize);
        }
        // `SymbolAttrs::rules` holds `RuleId`s, not `Symbol`s, so it needs no
        // remapping; it was carried over verbatim by `attrs.clone()` above.

        self.nterminal = nterminal;
        self.finalized = true;
    }

    fn is_terminal(&self, sym: Symbol) -> bool {
        self.symbols.get(sym).kind == SymbolKind::Terminal
    }

    /// §4.3 rule precedence inference: for each rule lacking an explicit
    /// precedence symbol, scan the RHS right-to-left and adopt the
    /// precedence/associativity of the rightmost terminal that has one.
    pub fn infer_rule_precedence(&mut self) {
        assert!(self.finalized);
        for rule in &mut self.rules {
            if let Some(ps) = rule.prec_sym {
                let attrs = self.symbols.get(ps);
                rule.precedence = attrs.precedence;
                rule.associativity = attrs.associativity;
                continue;
            }
            for rhs in rule.rhs.iter().rev() {
                let attrs = self.symbols.get(rhs.symbol);
                if attrs.kind == SymbolKind::Terminal && attrs.precedence.is_some() {
                    rule.precedence = attrs.precedence;
                    rule.associativity = attrs.associativity;
                    break;
                }
            }
        }
    }

    /// §4.3 lambda fixed point.
    pub fn compute_lambda(&mut self) {
        assert!(self.finalized);
        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                if self.symbols.get(rule.lhs).lambda {
                    continue;
                }
                let all_lambda_non_terminals = rule.rhs.iter().all(|rhs| {
                    let attrs = self.symbols.get(rhs.symbol);
                    attrs.kind == SymbolKind::NonTerminal && attrs.lambda
                });
                if all_lambda_non_terminals {
                    self.symbols.get_mut(rule.lhs).lambda = true;
                    changed = true;
                }
            }
        }
    }

    /// §4.3 FIRST sets. Requires [`compute_lambda`] to have already run.
    pub fn compute_first_sets(&mut self) {
        assert!(self.finalized);
        let width = self.nterminal + 1;
        for sym in self.symbols.iter() {
            if self.symbols.get(sym).kind == SymbolKind::NonTerminal {
                self.symbols.get_mut(sym).first_set = Some(TermSet::new(width));
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                if self.is_terminal(rule.lhs) {
                    continue;
                }
                let mut additions: Vec<Symbol> = vec![];
                for rhs in &rule.rhs {
                    if self.is_terminal(rhs.symbol) {
                        additions.push(rhs.symbol);
                        break;
                    } else {
                        let attrs = self.symbols.get(rhs.symbol);
                        additions.extend(attrs.first_set.as_ref().unwrap().iter());
                        if !attrs.lambda {
                            break;
                        }
                    }
                }
                let lhs_first = self.symbols.get_mut(rule.lhs).first_set.as_mut().unwrap();
                for sym in additions {
                    changed |= lhs_first.add(sym);
                }
            }
        }
    }

    /// Runs the full §4.3 preparation pipeline in order.
    pub fn prepare(&mut self) {
        self.finalize();
        self.infer_rule_precedence();
        self.compute_lambda();
        self.compute_first_sets();
    }

    /// Follows a `β` sequence (e.g. the tail of a rule after some dot) and
    /// returns its FIRST set plus whether the whole sequence is nullable, used
    /// while seeding follow-sets during LR(0) closure (§4.4).
    pub fn first_of_sequence(&self, seq: &[Symbol]) -> (TermSet, bool) {
        let width = self.nterminal + 1;
        let mut result = TermSet::new(width);
        for &sym in seq {
            if self.is_terminal(sym) {
                result.add(sym);
                return (result, false);
            } else {
                let attrs = self.symbols.get(sym);
                result.union(attrs.first_set.as_ref().unwrap());
                if !attrs.lambda {
                    return (result, false);
                }
            }
        }
        (result, true)
    }
}

impl Associativity {
    pub fn default_for(left: bool) -> Self {
        if left {
            Associativity::Left
        } else {
            Associativity::Right
        }
    }
}
