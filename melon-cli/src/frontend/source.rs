//! The parser's output shape (§4.9's `GrammarSource`) and its lowering into
//! a `melon_grammar::Grammar`. Keeping the two separate means the recursive
//! descent parser never has to know about symbol interning order or
//! finalization — it just accumulates what the text said.

use std::collections::HashSet;

use melon_grammar::{Associativity, CodeBlock, Grammar, GrammarError, Rule, RhsSymbol, Symbol};

#[derive(Clone, Debug)]
pub struct CodeLine {
    pub code: String,
    pub line: u32,
}

#[derive(Clone, Debug)]
pub struct RhsItemSource {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RuleSource {
    pub lhs: String,
    pub lhs_alias: Option<String>,
    pub rhs: Vec<RhsItemSource>,
    pub prec_symbol: Option<String>,
    pub code: Option<CodeLine>,
    pub line: u32,
}

/// Every directive accumulation plus the ordered rule list, exactly as
/// `MlnParse`'s `pstate` builds up a `Melon` one token at a time.
#[derive(Clone, Debug, Default)]
pub struct GrammarSource {
    pub name: Option<String>,
    pub include: Option<CodeLine>,
    pub extra_code: Option<CodeLine>,
    pub token_destructor: Option<CodeLine>,
    pub default_destructor: Option<CodeLine>,
    pub token_prefix: Option<String>,
    pub syntax_error: Option<CodeLine>,
    pub parse_accept: Option<CodeLine>,
    pub parse_failure: Option<CodeLine>,
    pub stack_overflow: Option<CodeLine>,
    pub extra_argument: Option<String>,
    pub token_type: Option<String>,
    pub default_type: Option<String>,
    pub stack_size: Option<String>,
    pub start_symbol: Option<String>,
    /// Source line of a second (or later) `%start_symbol` declaration, if
    /// one was seen; the first declaration always wins.
    pub duplicate_start_symbol_line: Option<u32>,
    /// `(associativity, names)` in declaration order; precedence level is
    /// the 1-based position in this list (later lines bind tighter).
    pub precedences: Vec<(Associativity, Vec<String>)>,
    /// `(fallback target, names that fall back to it)`.
    pub fallbacks: Vec<(String, Vec<String>)>,
    pub destructors: Vec<(String, CodeLine)>,
    pub types: Vec<(String, String)>,
    pub rules: Vec<RuleSource>,
}

/// Scans `text` for `word` as a whole token (not a substring of a longer
/// identifier); used for the best-effort "alias declared but never used"
/// diagnostic, since the core never parses the target-language code block.
fn mentions_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|tok| tok == word)
}

impl GrammarSource {
    /// Lowers this source into a prepared `Grammar`, appending every
    /// diagnostic (§7.1) it finds to `grammar.errors`.
    pub fn lower(&self, filename: &str) -> Grammar {
        let mut grammar = Grammar::new(filename);

        for (level, (assoc, names)) in self.precedences.iter().enumerate() {
            let prec = level as u32 + 1;
            for name in names {
                let sym = grammar.intern(name);
                let attrs = grammar.symbols.get_mut(sym);
                if attrs.precedence.is_some() {
                    grammar.errors.push(GrammarError::Other {
                        file: filename.to_string(),
                        line: 0,
                        message: format!("symbol \"{name}\" has already been given a precedence"),
                    });
                } else {
                    attrs.precedence = Some(prec);
                    attrs.associativity = *assoc;
                }
            }
        }

        for (name, ty) in &self.types {
            let sym = grammar.intern(name);
            grammar.symbols.get_mut(sym).data_type = Some(ty.clone());
        }

        for (name, code) in &self.destructors {
            let sym = grammar.intern(name);
            let attrs = grammar.symbols.get_mut(sym);
            attrs.destructor = Some(code.code.clone());
            attrs.destructor_line = Some(code.line);
        }

        let mut fallback_pairs: Vec<(Symbol, Symbol)> = vec![];
        for (target, names) in &self.fallbacks {
            let target_sym = grammar.intern(target);
            for name in names {
                let sym = grammar.intern(name);
                if grammar.symbols.get(sym).fallback.is_some() {
                    grammar.errors.push(GrammarError::Other {
                        file: filename.to_string(),
                        line: 0,
                        message: format!("more than one fallback assigned to token {name}"),
                    });
                } else {
                    grammar.symbols.get_mut(sym).fallback = Some(target_sym);
                    fallback_pairs.push((sym, target_sym));
                }
            }
        }

        for rule_src in &self.rules {
            let lhs = grammar.intern(&rule_src.lhs);
            let rhs: Vec<RhsSymbol> = rule_src
                .rhs
                .iter()
                .map(|item| RhsSymbol {
                    symbol: grammar.intern(&item.name),
                    alias: item.alias.clone(),
                })
                .collect();
            let prec_sym = rule_src.prec_symbol.as_ref().map(|n| grammar.intern(n));
            let code = rule_src.code.as_ref().map(|c| CodeBlock {
                code: c.code.clone(),
                line: c.line,
            });
            grammar.add_rule(Rule {
                index: 0,
                lhs,
                lhs_alias: rule_src.lhs_alias.clone(),
                rhs,
                prec_sym,
                precedence: None,
                associativity: Associativity::Unknown,
                code,
                source_line: rule_src.line,
            });
        }

        if let Some(name) = &self.start_symbol {
            let sym = grammar.intern(name);
            grammar.roots = vec![sym];
        }

        if let Some(line) = self.duplicate_start_symbol_line {
            grammar.errors.push(GrammarError::DuplicateStartSymbol {
                file: filename.to_string(),
                line,
            });
        }

        grammar.check_non_terminals_have_rules();

        let mentioned: HashSet<Symbol> = grammar
            .rules
            .iter()
            .flat_map(|r| r.rhs_symbols().chain(std::iter::once(r.lhs)))
            .collect();
        for (sym, target) in fallback_pairs {
            let _ = target;
            if !mentioned.contains(&sym) {
                grammar.errors.push(GrammarError::UnknownFallbackSymbol {
                    file: filename.to_string(),
                    line: 0,
                    name: grammar.symbols.get(sym).name.clone(),
                });
            }
        }

        for rule_src in &self.rules {
            let code_text = rule_src.code.as_ref().map(|c| c.code.as_str()).unwrap_or("");
            if let Some(alias) = &rule_src.lhs_alias {
                if !mentions_word(code_text, alias) {
                    grammar.errors.push(GrammarError::UnusedAlias {
                        file: filename.to_string(),
                        line: rule_src.line,
                        alias: alias.clone(),
                    });
                }
            }
            for item in &rule_src.rhs {
                if let Some(alias) = &item.alias {
                    if !mentions_word(code_text, alias) {
                        grammar.errors.push(GrammarError::UnusedAlias {
                            file: filename.to_string(),
                            line: rule_src.line,
                            alias: alias.clone(),
                        });
                    }
                }
            }
        }

        grammar.prepare();
        grammar
    }
}

#[cfg(test)]
mod tests {
    use crate::frontend::parse_grammar;
    use melon_grammar::GrammarError;

    #[test]
    fn duplicate_start_symbol_is_reported_through_grammar_errors() {
        let text = "%start_symbol start.\n%start_symbol other.\nstart ::= ID.\nother ::= ID.\n";
        let (grammar, _, diags) = parse_grammar("t.y", text).unwrap();
        assert!(diags.is_empty());
        assert!(grammar
            .errors
            .iter()
            .any(|e| matches!(e, GrammarError::DuplicateStartSymbol { .. })));
    }
}
