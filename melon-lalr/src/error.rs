use thiserror::Error;

/// A precondition violation in LR(0)/LALR(1) state construction. Unlike
/// `GrammarError` (accumulated diagnostics about the grammar text itself),
/// these are programming errors in how `build_states` is called — the
/// grammar handed in was never prepared, or has nothing to build a start
/// state from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LalrError {
    #[error("grammar must be finalized with Grammar::prepare before building states")]
    GrammarNotPrepared,
    #[error("grammar has no start symbol to build an initial state from")]
    NoStartSymbol,
}
