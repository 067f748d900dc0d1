//! A numeric handle for grammar symbols, plus the source that mints and names them.
//!
//! Symbols are distinguished by their index alone; everything else the generator
//! needs to know about a symbol (terminal vs. non-terminal, precedence, ...) lives
//! in `melon-grammar`, which wraps this handle with the rest of the attribute set.

mod repr;
pub mod source;

pub use repr::Symbol;
pub use source::{SymbolName, SymbolSource};
