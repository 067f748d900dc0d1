//! The numeric action-code contract shared by every emitted table: shift
//! codes are state indices, reduce codes follow immediately after them,
//! then two reserved codes for "no legal action" and "accept", then one
//! more for "truly nothing here" (used to fill compressed-away slots).

use melon_action::{Action, ActionKind, ActionTarget};

#[derive(Clone, Copy, Debug)]
pub struct CodeSpace {
    pub num_states: u32,
    pub num_rules: u32,
}

impl CodeSpace {
    pub fn new(num_states: u32, num_rules: u32) -> Self {
        CodeSpace {
            num_states,
            num_rules,
        }
    }

    pub fn error_code(&self) -> u32 {
        self.num_states + self.num_rules
    }

    pub fn accept_code(&self) -> u32 {
        self.num_states + self.num_rules + 1
    }

    pub fn no_action_code(&self) -> u32 {
        self.num_states + self.num_rules + 2
    }

    /// Encodes one surviving action (a loser of a conflict is never passed
    /// here; callers filter `ActionKind::Conflict` out beforehand).
    pub fn encode(&self, action: &Action) -> u32 {
        match (action.kind, action.target) {
            (ActionKind::Shift | ActionKind::ShiftResolved, ActionTarget::State(state)) => state,
            (ActionKind::Reduce | ActionKind::ReduceResolved, ActionTarget::Rule(rule)) => {
                self.num_states + rule
            }
            (ActionKind::Accept, _) => self.accept_code(),
            (ActionKind::Error, _) => self.error_code(),
            (ActionKind::Conflict, _) => {
                unreachable!("conflict losers must be filtered out before encoding")
            }
            _ => self.no_action_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_occupy_disjoint_ranges() {
        let space = CodeSpace::new(10, 4);
        assert_eq!(space.error_code(), 14);
        assert_eq!(space.accept_code(), 15);
        assert_eq!(space.no_action_code(), 16);
    }
}
