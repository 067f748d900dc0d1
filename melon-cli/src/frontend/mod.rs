//! Grammar text front end (§4.9): lexer, recursive-descent parser, and the
//! lowering of their output into a `melon_grammar::Grammar`.

pub mod lexer;
pub mod parser;
pub mod source;

use melon_grammar::Grammar;

pub use lexer::LexError;
pub use source::GrammarSource;

/// Parses `text` (already read from `filename`) into a prepared `Grammar`,
/// keeping the `GrammarSource` around for the directives (`%include`,
/// `%token_prefix`, ...) that `melon-cli::emit` needs but `Grammar` itself
/// doesn't model. Recoverable syntax diagnostics are returned separately;
/// semantic diagnostics (unknown fallback symbol, non-terminal with no
/// rules, unused alias, duplicate start symbol argument) are accumulated on
/// `grammar.errors` by `GrammarSource::lower`.
pub fn parse_grammar(filename: &str, text: &str) -> Result<(Grammar, GrammarSource, Vec<String>), LexError> {
    let tokens = lexer::Lexer::tokenize(text)?;
    let (source, diagnostics) = parser::Parser::new(filename, tokens).parse();
    let grammar = source.lower(filename);
    Ok((grammar, source, diagnostics))
}
