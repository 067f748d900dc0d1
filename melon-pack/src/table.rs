//! Packs transaction sets (one per state, per terminal/non-terminal region)
//! into a single linear action table, sharing space between transactions
//! whenever their lookaheads don't collide.
//!
//! A direct port of acttab.c's `MlnActionTableInsert` scan: find the lowest
//! offset `i` at which the whole transaction set either lands in empty
//! slots, or exactly reproduces a transaction set already placed there (in
//! which case it is free to alias it instead of growing the table).

#[derive(Clone, Copy, Debug)]
struct Cell {
    /// `-1` marks an empty slot.
    lookahead: i64,
    action: u32,
}

const EMPTY: Cell = Cell {
    lookahead: -1,
    action: 0,
};

/// The packed action table under construction.
pub struct ActionTable {
    cells: Vec<Cell>,
    naction: usize,
}

impl ActionTable {
    pub fn new() -> Self {
        ActionTable {
            cells: vec![],
            naction: 0,
        }
    }

    /// Inserts one transaction set — pairs of `(lookahead index, encoded
    /// action)` — and returns the offset to add to a lookahead index to
    /// find its slot in [`actions`](Self::actions)/[`lookaheads`](Self::lookaheads).
    ///
    /// `transaction` must be non-empty and have no repeated lookahead.
    pub fn insert(&mut self, transaction: &[(u32, u32)]) -> i64 {
        assert!(!transaction.is_empty());

        let min_lookahead = transaction.iter().map(|&(la, _)| la as i64).min().unwrap();
        let max_lookahead = transaction.iter().map(|&(la, _)| la as i64).max().unwrap();
        let min_action = transaction
            .iter()
            .find(|&&(la, _)| la as i64 == min_lookahead)
            .unwrap()
            .1;

        let needed = self.naction + (max_lookahead as usize) + 1;
        if needed >= self.cells.len() {
            self.cells.resize(needed + 20, EMPTY);
        }

        let mut i: i64 = 0;
        'scan: while i < self.naction as i64 + min_lookahead {
            if self.cells[i as usize].lookahead < 0 {
                for &(la, _) in transaction {
                    let k = la as i64 - min_lookahead + i;
                    if k < 0 {
                        i += 1;
                        continue 'scan;
                    }
                    if self.cells[k as usize].lookahead >= 0 {
                        i += 1;
                        continue 'scan;
                    }
                }
                let mut aliases_existing_row = false;
                for j in 0..self.naction as i64 {
                    if self.cells[j as usize].lookahead == j + min_lookahead - i {
                        aliases_existing_row = true;
                        break;
                    }
                }
                if aliases_existing_row {
                    i += 1;
                    continue;
                }
                break;
            } else if self.cells[i as usize].lookahead == min_lookahead {
                if self.cells[i as usize].action != min_action {
                    i += 1;
                    continue;
                }
                let mut fits = true;
                for &(la, act) in transaction {
                    let k = la as i64 - min_lookahead + i;
                    if k < 0 || k as usize >= self.naction {
                        fits = false;
                        break;
                    }
                    let cell = self.cells[k as usize];
                    if cell.lookahead != la as i64 || cell.action != act {
                        fits = false;
                        break;
                    }
                }
                if !fits {
                    i += 1;
                    continue;
                }
                let mut count = 0;
                for j in 0..self.naction as i64 {
                    let cell = self.cells[j as usize];
                    if cell.lookahead >= 0 && cell.lookahead == j + min_lookahead - i {
                        count += 1;
                    }
                }
                if count == transaction.len() {
                    break;
                }
                i += 1;
            } else {
                i += 1;
            }
        }

        for &(la, act) in transaction {
            let k = (la as i64 - min_lookahead + i) as usize;
            self.cells[k] = Cell {
                lookahead: la as i64,
                action: act,
            };
            if k >= self.naction {
                self.naction = k + 1;
            }
        }

        i - min_lookahead
    }

    /// The packed `action[]` array, sized to the highest slot used.
    pub fn actions(&self) -> Vec<i64> {
        self.cells[..self.naction].iter().map(|c| c.action as i64).collect()
    }

    /// The packed `lookahead[]` array, parallel to [`actions`](Self::actions);
    /// `-1` marks a slot no transaction ever claimed.
    pub fn lookaheads(&self) -> Vec<i64> {
        self.cells[..self.naction].iter().map(|c| c.lookahead).collect()
    }

    pub fn len(&self) -> usize {
        self.naction
    }

    pub fn is_empty(&self) -> bool {
        self.naction == 0
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_transactions_can_overlap_in_the_same_table() {
        let mut table = ActionTable::new();
        let off_a = table.insert(&[(0, 10), (2, 11)]);
        let off_b = table.insert(&[(1, 20), (3, 21)]);

        assert_eq!(table.lookaheads()[(0 as i64 + off_a) as usize], 0);
        assert_eq!(table.actions()[(0 as i64 + off_a) as usize], 10);
        assert_eq!(table.lookaheads()[(1 as i64 + off_b) as usize], 1);
        assert_eq!(table.actions()[(3 as i64 + off_b) as usize], 21);
    }

    #[test]
    fn identical_transaction_sets_are_reused() {
        let mut table = ActionTable::new();
        let off_a = table.insert(&[(0, 5), (1, 6)]);
        let len_after_first = table.len();
        let off_b = table.insert(&[(0, 5), (1, 6)]);
        assert_eq!(off_a, off_b);
        assert_eq!(table.len(), len_after_first);
    }

    #[test]
    fn colliding_transactions_grow_the_table() {
        let mut table = ActionTable::new();
        table.insert(&[(0, 5), (1, 6)]);
        let off_b = table.insert(&[(0, 9), (1, 9)]);
        assert_ne!(
            table.actions()[(0 as i64 + off_b) as usize],
            table.actions()[0]
        );
    }
}
