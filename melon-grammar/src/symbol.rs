//! Full symbol attributes: kind, precedence/associativity, fallback, lambda, FIRST.

use std::borrow::Cow;

pub use melon_symbol::Symbol;
use melon_symbol::SymbolSource;

use crate::bitset::TermSet;
use crate::rule::RuleId;

/// Whether a symbol is a terminal or a non-terminal.
///
/// Determined by the case of the first letter of the symbol's name: uppercase
/// means terminal, lowercase means non-terminal. This mirrors the grammar
/// dialect's convention rather than an explicit declaration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

impl SymbolKind {
    pub fn of_name(name: &str) -> SymbolKind {
        match name.chars().next() {
            Some(c) if c.is_uppercase() => SymbolKind::Terminal,
            _ => SymbolKind::NonTerminal,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Associativity {
    Left,
    Right,
    Non,
    Unknown,
}

/// Everything the generator tracks about one symbol.
#[derive(Clone, Debug)]
pub struct SymbolAttrs {
    pub name: String,
    pub kind: SymbolKind,
    /// `None` means precedence was never declared for this symbol.
    pub precedence: Option<u32>,
    pub associativity: Associativity,
    /// Terminal this one falls back to when it fails to shift. Terminal-only.
    pub fallback: Option<Symbol>,
    /// Only meaningful for non-terminals: can this symbol derive the empty string?
    pub lambda: bool,
    /// FIRST set. Only meaningful for non-terminals; built up in §4.3.
    pub first_set: Option<TermSet>,
    /// Rules with this symbol as LHS, in declaration order. Non-terminal only.
    pub rules: Vec<RuleId>,
    pub destructor: Option<String>,
    pub destructor_line: Option<u32>,
    pub data_type: Option<String>,
}

impl SymbolAttrs {
    fn new(name: String) -> Self {
        let kind = SymbolKind::of_name(&name);
        SymbolAttrs {
            name,
            kind,
            precedence: None,
            associativity: Associativity::Unknown,
            fallback: None,
            lambda: false,
            first_set: None,
            rules: vec![],
            destructor: None,
            destructor_line: None,
            data_type: None,
        }
    }
}

/// The reserved end-of-input symbol. Always index 0 after finalization.
pub const END_OF_INPUT_NAME: &str = "$";
/// The pre-created error-recovery symbol.
pub const ERROR_NAME: &str = "error";
/// The reserved default-lookahead symbol created by compression (§4.7). Always
/// the highest index after finalization and never a real grammar symbol.
pub const DEFAULT_NAME: &str = "{default}";

/// Owns symbol interning and the attribute table indexed in parallel.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    source: SymbolSource,
    attrs: Vec<SymbolAttrs>,
}

impl SymbolTable {
    /// Creates a table pre-seeded with `$` (index reserved for end-of-input)
    /// and the error symbol, as every grammar needs both.
    pub fn new() -> Self {
        let mut source = SymbolSource::new();
        let eoi = source.intern(Cow::Borrowed(END_OF_INPUT_NAME));
        let err = source.intern(Cow::Borrowed(ERROR_NAME));
        let mut attrs = vec![];
        attrs.resize_with(source.num_syms(), || SymbolAttrs::new(String::new()));
        attrs[eoi.usize()] = SymbolAttrs::new(END_OF_INPUT_NAME.to_string());
        attrs[err.usize()] = SymbolAttrs::new(ERROR_NAME.to_string());
        SymbolTable { source, attrs }
    }

    /// Interns a symbol by name, creating a fresh entry if this is the first
    /// mention.
    pub fn intern(&mut self, name: &str) -> Symbol {
        let sym = self.source.intern(name.to_string());
        if sym.usize() == self.attrs.len() {
            self.attrs.push(SymbolAttrs::new(name.to_string()));
        }
        sym
    }

    pub fn find(&self, name: &str) -> Option<Symbol> {
        self.source.find(name)
    }

    pub fn error_symbol(&self) -> Symbol {
        self.source.find(ERROR_NAME).expect("error symbol always present")
    }

    pub fn end_of_input(&self) -> Symbol {
        self.source.find(END_OF_INPUT_NAME).expect("$ always present")
    }

    pub fn get(&self, sym: Symbol) -> &SymbolAttrs {
        &self.attrs[sym.usize()]
    }

    pub fn get_mut(&mut self, sym: Symbol) -> &mut SymbolAttrs {
        &mut self.attrs[sym.usize()]
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.attrs.len()).map(Symbol::from)
    }

    /// Appends a freshly-named synthetic symbol (e.g. `{default}`) and returns
    /// its handle. Callers are responsible for placing it at the correct index
    /// (the caller of this method during finalization ensures it lands last).
    pub fn push_synthetic(&mut self, name: &str) -> Symbol {
        let sym = Symbol::from_index(self.attrs.len() as u32);
        self.attrs.push(SymbolAttrs::new(name.to_string()));
        sym
    }

    /// Rebuilds the table so that symbol `order[i]` (an index into the
    /// *current* table) becomes index `i` in the result. Returns the new
    /// table along with `remap[old_index] = new_index`. Used once, by
    /// `Grammar::finalize`, to place terminals before non-terminals with `$`
    /// pinned at 0 and a synthetic symbol (already appended via
    /// `push_synthetic`) pinned last.
    pub fn reorder(&self, order: &[Symbol]) -> (SymbolTable, Vec<u32>) {
        debug_assert_eq!(order.len(), self.attrs.len());
        let mut remap = vec![0u32; self.attrs.len()];
        for (new_index, &old_sym) in order.iter().enumerate() {
            remap[old_sym.usize()] = new_index as u32;
        }

        let mut source = SymbolSource::new();
        let mut attrs = Vec::with_capacity(self.attrs.len());
        for &old_sym in order {
            let name = self.get(old_sym).name.clone();
            source.intern(name);
            let mut a = self.get(old_sym).clone();
            if let Some(fb) = a.fallback {
                a.fallback = Some(Symbol::from(remap[fb.usize()] as usize));
            }
            attrs.push(a);
        }
        (SymbolTable { source, attrs }, remap)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eoi_and_error_preexist() {
        let table = SymbolTable::new();
        assert_eq!(table.get(table.end_of_input()).name, "$");
        assert_eq!(table.get(table.error_symbol()).name, "error");
    }

    #[test]
    fn kind_follows_first_letter_case() {
        assert_eq!(SymbolKind::of_name("NUM"), SymbolKind::Terminal);
        assert_eq!(SymbolKind::of_name("expr"), SymbolKind::NonTerminal);
    }
}
