//! A source of numeric symbols, tracking how many were generated and their names.

use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::ops;
use std::rc::Rc;

use crate::Symbol;

/// Wrapper for a string holding a symbol's name. Cheap to clone.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SymbolName {
    name: Rc<str>,
}

impl ops::Deref for SymbolName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.name[..]
    }
}

impl<'a> From<&'a str> for SymbolName {
    fn from(value: &'a str) -> Self {
        SymbolName {
            name: Rc::from(value),
        }
    }
}

impl From<Cow<'_, str>> for SymbolName {
    fn from(value: Cow<'_, str>) -> Self {
        SymbolName {
            name: Rc::from(&*value),
        }
    }
}

impl Borrow<str> for SymbolName {
    fn borrow(&self) -> &str {
        &self.name[..]
    }
}

/// Mints fresh [`Symbol`]s and remembers the name each one was given, if any.
///
/// Doubles as the "name → symbol" lookup table: repeated mentions of the same
/// name during grammar parsing collapse to the same `Symbol` through
/// [`SymbolSource::intern`].
#[derive(Clone, Debug, Default)]
pub struct SymbolSource {
    names: Vec<Option<SymbolName>>,
    by_name: HashMap<SymbolName, Symbol>,
}

impl SymbolSource {
    /// Creates a source with an empty symbol space.
    pub fn new() -> Self {
        SymbolSource {
            names: vec![],
            by_name: HashMap::new(),
        }
    }

    /// Generates a new, unnamed symbol.
    pub fn next_sym(&mut self) -> Symbol {
        let sym = Symbol::from(self.names.len());
        self.names.push(None);
        sym
    }

    /// Interns `name`, returning the existing symbol if this name was seen before,
    /// or minting and naming a fresh one otherwise.
    pub fn intern<S>(&mut self, name: S) -> Symbol
    where
        S: Into<Cow<'static, str>> + AsRef<str>,
    {
        if let Some(&sym) = self.by_name.get(name.as_ref()) {
            return sym;
        }
        let sym = Symbol::from(self.names.len());
        let name: SymbolName = name.into().into();
        self.names.push(Some(name.clone()));
        self.by_name.insert(name, sym);
        sym
    }

    /// Looks up a symbol by name without creating one.
    pub fn find(&self, name: &str) -> Option<Symbol> {
        self.by_name.get(name).copied()
    }

    /// Returns the name a symbol was interned with, if any (gensyms have none).
    pub fn name_of(&self, sym: Symbol) -> Option<&str> {
        self.names.get(sym.usize()).and_then(|n| n.as_deref())
    }

    /// Number of symbols minted so far.
    pub fn num_syms(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_collapses_repeated_names() {
        let mut src = SymbolSource::new();
        let a = src.intern("expr");
        let b = src.intern("expr");
        let c = src.intern("NUM");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(src.name_of(a), Some("expr"));
    }

    #[test]
    fn gensyms_have_no_name() {
        let mut src = SymbolSource::new();
        let a = src.next_sym();
        assert_eq!(src.name_of(a), None);
        assert_eq!(src.num_syms(), 1);
    }
}
