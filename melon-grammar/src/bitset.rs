//! A fixed-width set of terminal indices, backed by a bit vector.
//!
//! Width is fixed once at construction (`nterminal + 1`, to also hold the error
//! symbol or `$`) and must not change afterwards; every FIRST set and every
//! configuration follow-set in the generator shares this width.

use bit_vec::BitVec;

use crate::symbol::Symbol;

/// A set of terminal symbols.
#[derive(Clone, Debug)]
pub struct TermSet {
    bits: BitVec,
}

impl TermSet {
    /// Creates an empty set sized to hold `width` terminal indices.
    pub fn new(width: usize) -> Self {
        TermSet {
            bits: BitVec::from_elem(width, false),
        }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Adds `sym` to the set. Returns `true` if the set changed (the symbol was
    /// not already present).
    pub fn add(&mut self, sym: Symbol) -> bool {
        let idx = sym.usize();
        if self.bits[idx] {
            false
        } else {
            self.bits.set(idx, true);
            true
        }
    }

    pub fn contains(&self, sym: Symbol) -> bool {
        self.bits[sym.usize()]
    }

    /// Unions `other` into `self`. Returns `true` if `self` changed.
    pub fn union(&mut self, other: &TermSet) -> bool {
        debug_assert_eq!(self.width(), other.width());
        let before = self.bits.clone();
        self.bits.or(&other.bits);
        before != self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, present)| present)
            .map(|(i, _)| Symbol::from_index(i as u32))
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_whether_new() {
        let mut set = TermSet::new(4);
        assert!(set.add(Symbol::from_index(1)));
        assert!(!set.add(Symbol::from_index(1)));
        assert!(set.contains(Symbol::from_index(1)));
        assert!(!set.contains(Symbol::from_index(2)));
    }

    #[test]
    fn union_reports_change() {
        let mut a = TermSet::new(4);
        let mut b = TermSet::new(4);
        b.add(Symbol::from_index(2));
        assert!(a.union(&b));
        assert!(!a.union(&b));
        assert!(a.contains(Symbol::from_index(2)));
    }
}
