use thiserror::Error;

/// A grammar-level diagnostic (§7.1). Carries enough context to print
/// `file:line: message` the way the original tool does, and is accumulated
/// rather than aborting the run.
#[derive(Error, Debug, Clone)]
pub enum GrammarError {
    #[error("{file}:{line}: non-terminal \"{name}\" has no rules")]
    NonTerminalHasNoRules {
        file: String,
        line: u32,
        name: String,
    },
    #[error("{file}:{line}: symbol \"{name}\" used in %fallback was never declared")]
    UnknownFallbackSymbol {
        file: String,
        line: u32,
        name: String,
    },
    #[error("{file}:{line}: alias \"{alias}\" is declared but never used")]
    UnusedAlias {
        file: String,
        line: u32,
        alias: String,
    },
    #[error("{file}:{line}: %start_symbol declared more than once")]
    DuplicateStartSymbol { file: String, line: u32 },
    #[error("{file}:{line}: {message}")]
    Other {
        file: String,
        line: u32,
        message: String,
    },
}

impl GrammarError {
    pub fn line(&self) -> u32 {
        match self {
            GrammarError::NonTerminalHasNoRules { line, .. }
            | GrammarError::UnknownFallbackSymbol { line, .. }
            | GrammarError::UnusedAlias { line, .. }
            | GrammarError::DuplicateStartSymbol { line, .. }
            | GrammarError::Other { line, .. } => *line,
        }
    }
}
