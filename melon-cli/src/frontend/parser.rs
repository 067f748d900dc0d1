//! Recursive-descent parser over the token stream (§4.9). One top-level
//! loop alternates between directive and rule parsing, dispatched on
//! whether the next token is `%` or an identifier — the same dispatch
//! `MlnParse`'s `ParseOneToken` makes from `MLN_PS_WAITING_FOR_DECL_OR_RULE`.
//! Diagnoses are collected rather than aborting the run, mirroring the
//! original's resync-and-continue states.

use crate::frontend::lexer::{Lexeme, Token};
use crate::frontend::source::{CodeLine, GrammarSource, RhsItemSource, RuleSource};
use melon_grammar::Associativity;

pub struct Parser<'a> {
    filename: &'a str,
    tokens: Vec<Lexeme>,
    pos: usize,
    diagnostics: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(filename: &'a str, tokens: Vec<Lexeme>) -> Self {
        Parser {
            filename,
            tokens,
            pos: 0,
            diagnostics: vec![],
        }
    }

    pub fn parse(mut self) -> (GrammarSource, Vec<String>) {
        let mut source = GrammarSource::default();
        while !self.at_eof() {
            match self.peek_token() {
                Token::Percent => self.parse_directive(&mut source),
                Token::Ident(_) => self.parse_rule(&mut source),
                other => {
                    self.error(format!("unexpected token {other:?}, expected a directive or a rule"));
                    self.bump();
                }
            }
        }
        (source, self.diagnostics)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_token(), Token::Eof)
    }

    fn peek_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn peek_line(&self) -> u32 {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn bump(&mut self) -> Lexeme {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn error(&mut self, message: String) {
        self.diagnostics.push(format!("{}:{}: {}", self.filename, self.peek_line(), message));
    }

    /// Skips tokens until `.` (inclusive) or `%` (exclusive), the same
    /// recovery `MLN_PS_RESYNC_AFTER_*` performs.
    fn resync(&mut self) {
        loop {
            match self.peek_token() {
                Token::Dot => {
                    self.bump();
                    return;
                }
                Token::Percent | Token::Eof => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn expect_ident(&mut self) -> Option<String> {
        match self.peek_token().clone() {
            Token::Ident(name) => {
                self.bump();
                Some(name)
            }
            other => {
                self.error(format!("expected an identifier, found {other:?}"));
                None
            }
        }
    }

    fn parse_rule(&mut self, source: &mut GrammarSource) {
        let line = self.peek_line();
        let Some(lhs) = self.expect_ident() else {
            self.resync();
            return;
        };
        let lhs_alias = self.parse_optional_alias();

        if !matches!(self.peek_token(), Token::Arrow) {
            self.error("expected \"::=\" after the rule's left-hand side".to_string());
            self.resync();
            return;
        }
        self.bump();

        let mut rhs = vec![];
        let mut prec_symbol = None;
        loop {
            match self.peek_token().clone() {
                Token::Ident(name) => {
                    self.bump();
                    let alias = self.parse_optional_alias();
                    rhs.push(RhsItemSource { name, alias });
                }
                Token::LBracket => {
                    self.bump();
                    if let Some(name) = self.expect_ident() {
                        prec_symbol = Some(name);
                    }
                    if matches!(self.peek_token(), Token::RBracket) {
                        self.bump();
                    } else {
                        self.error("expected \"]\" after a rule's precedence mark".to_string());
                    }
                }
                Token::Dot => {
                    self.bump();
                    break;
                }
                other => {
                    self.error(format!("illegal token on the right-hand side of a rule: {other:?}"));
                    self.resync();
                    return;
                }
            }
        }

        let code = match self.peek_token().clone() {
            Token::Code(body) => {
                let code_line = self.peek_line();
                self.bump();
                Some(CodeLine { code: body, line: code_line })
            }
            _ => None,
        };

        source.rules.push(RuleSource {
            lhs,
            lhs_alias,
            rhs,
            prec_symbol,
            code,
            line,
        });
    }

    fn parse_optional_alias(&mut self) -> Option<String> {
        if !matches!(self.peek_token(), Token::LParen) {
            return None;
        }
        self.bump();
        let alias = self.expect_ident();
        if matches!(self.peek_token(), Token::RParen) {
            self.bump();
        } else {
            self.error("expected \")\" after an alias name".to_string());
        }
        alias
    }

    fn parse_directive(&mut self, source: &mut GrammarSource) {
        self.bump(); // '%'
        let Some(keyword) = self.expect_ident() else {
            self.resync();
            return;
        };

        match keyword.as_str() {
            "name" => self.parse_string_arg(&mut source.name),
            "include" => self.parse_code_arg(&mut source.include),
            "code" => self.parse_code_arg(&mut source.extra_code),
            "token_destructor" => self.parse_code_arg(&mut source.token_destructor),
            "default_destructor" => self.parse_code_arg(&mut source.default_destructor),
            "token_prefix" => self.parse_string_arg(&mut source.token_prefix),
            "syntax_error" => self.parse_code_arg(&mut source.syntax_error),
            "parse_accept" => self.parse_code_arg(&mut source.parse_accept),
            "parse_failure" => self.parse_code_arg(&mut source.parse_failure),
            "stack_overflow" => self.parse_code_arg(&mut source.stack_overflow),
            "extra_argument" => self.parse_string_arg(&mut source.extra_argument),
            "token_type" => self.parse_string_arg(&mut source.token_type),
            "default_type" => self.parse_string_arg(&mut source.default_type),
            "stack_size" => self.parse_string_arg(&mut source.stack_size),
            "start_symbol" => self.parse_start_symbol(source),
            "left" => self.parse_precedence_line(source, Associativity::Left),
            "right" => self.parse_precedence_line(source, Associativity::Right),
            "nonassoc" => self.parse_precedence_line(source, Associativity::Non),
            "destructor" => self.parse_named_code(&mut source.destructors),
            "type" => self.parse_named_string(&mut source.types),
            "fallback" => self.parse_fallback(source),
            other => {
                self.error(format!("unknown declaration keyword: \"%{other}\""));
                self.resync();
            }
        }
    }

    fn parse_string_arg(&mut self, slot: &mut Option<String>) {
        let value = match self.peek_token().clone() {
            Token::Ident(s) => {
                self.bump();
                s
            }
            Token::Code(s) => {
                self.bump();
                s
            }
            other => {
                self.error(format!("illegal argument to declaration: {other:?}"));
                self.resync();
                return;
            }
        };
        if slot.is_some() {
            self.error("this declaration's argument is not the first".to_string());
        } else {
            *slot = Some(value);
        }
        self.expect_dot();
    }

    fn parse_start_symbol(&mut self, source: &mut GrammarSource) {
        let line = self.peek_line();
        let name = match self.peek_token().clone() {
            Token::Ident(s) => {
                self.bump();
                s
            }
            other => {
                self.error(format!("illegal argument to %start_symbol: {other:?}"));
                self.resync();
                return;
            }
        };
        if source.start_symbol.is_some() {
            source.duplicate_start_symbol_line.get_or_insert(line);
        } else {
            source.start_symbol = Some(name);
        }
        self.expect_dot();
    }

    fn parse_code_arg(&mut self, slot: &mut Option<CodeLine>) {
        let line = self.peek_line();
        let value = match self.peek_token().clone() {
            Token::Code(s) => {
                self.bump();
                s
            }
            Token::Ident(s) => {
                self.bump();
                s
            }
            other => {
                self.error(format!("illegal argument to declaration: {other:?}"));
                self.resync();
                return;
            }
        };
        if slot.is_some() {
            self.error("this declaration's argument is not the first".to_string());
        } else {
            *slot = Some(CodeLine { code: value, line });
        }
        self.expect_dot();
    }

    fn parse_precedence_line(&mut self, source: &mut GrammarSource, assoc: Associativity) {
        let mut names = vec![];
        loop {
            match self.peek_token().clone() {
                Token::Dot => {
                    self.bump();
                    break;
                }
                Token::Ident(name) => {
                    self.bump();
                    names.push(name);
                }
                other => {
                    self.error(format!("can't assign a precedence to {other:?}"));
                    self.resync();
                    return;
                }
            }
        }
        source.precedences.push((assoc, names));
    }

    fn parse_named_code(&mut self, target: &mut Vec<(String, CodeLine)>) {
        let Some(name) = self.expect_ident() else {
            self.resync();
            return;
        };
        let line = self.peek_line();
        match self.peek_token().clone() {
            Token::Code(body) => {
                self.bump();
                target.push((name, CodeLine { code: body, line }));
                self.expect_dot();
            }
            other => {
                self.error(format!("expected a code block, found {other:?}"));
                self.resync();
            }
        }
    }

    fn parse_named_string(&mut self, target: &mut Vec<(String, String)>) {
        let Some(name) = self.expect_ident() else {
            self.resync();
            return;
        };
        match self.peek_token().clone() {
            Token::Code(body) | Token::Ident(body) => {
                self.bump();
                target.push((name, body));
                self.expect_dot();
            }
            other => {
                self.error(format!("expected a type, found {other:?}"));
                self.resync();
            }
        }
    }

    fn parse_fallback(&mut self, source: &mut GrammarSource) {
        let Some(target) = self.expect_ident() else {
            self.resync();
            return;
        };
        let mut names = vec![];
        loop {
            match self.peek_token().clone() {
                Token::Dot => {
                    self.bump();
                    break;
                }
                Token::Ident(name) => {
                    self.bump();
                    names.push(name);
                }
                other => {
                    self.error(format!("%fallback argument should be a token, found {other:?}"));
                    self.resync();
                    return;
                }
            }
        }
        source.fallbacks.push((target, names));
    }

    fn expect_dot(&mut self) {
        if matches!(self.peek_token(), Token::Dot) {
            self.bump();
        } else {
            self.error("expected \".\" to close this declaration".to_string());
            self.resync();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn parse(text: &str) -> (GrammarSource, Vec<String>) {
        let tokens = Lexer::tokenize(text).unwrap();
        Parser::new("t.y", tokens).parse()
    }

    #[test]
    fn parses_a_trivial_rule() {
        let (source, diags) = parse("start ::= ID .");
        assert!(diags.is_empty());
        assert_eq!(source.rules.len(), 1);
        assert_eq!(source.rules[0].lhs, "start");
        assert_eq!(source.rules[0].rhs.len(), 1);
        assert_eq!(source.rules[0].rhs[0].name, "ID");
    }

    #[test]
    fn parses_aliases_precedence_mark_and_code() {
        let (source, diags) = parse("expr(a) ::= expr(b) PLUS expr(c) [PLUS] . { a = b + c; }");
        assert!(diags.is_empty());
        let rule = &source.rules[0];
        assert_eq!(rule.lhs_alias.as_deref(), Some("a"));
        assert_eq!(rule.rhs[1].alias.as_deref(), Some("c"));
        assert_eq!(rule.prec_symbol.as_deref(), Some("PLUS"));
        assert!(rule.code.as_ref().unwrap().code.contains("a = b + c;"));
    }

    #[test]
    fn parses_precedence_and_fallback_directives() {
        let (source, diags) = parse("%left PLUS MINUS.\n%right TIMES.\n%fallback ID NUM STR.\n");
        assert!(diags.is_empty());
        assert_eq!(source.precedences.len(), 2);
        assert_eq!(source.precedences[0].1, vec!["PLUS", "MINUS"]);
        assert_eq!(source.fallbacks[0], ("ID".to_string(), vec!["NUM".to_string(), "STR".to_string()]));
    }

    #[test]
    fn unknown_declaration_keyword_is_a_recoverable_diagnostic() {
        let (_, diags) = parse("%bogus foo.\nstart ::= ID.");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].contains("unknown declaration keyword"));
    }

    #[test]
    fn second_start_symbol_declaration_is_recorded_for_lowering() {
        let (source, diags) = parse("%start_symbol start.\n%start_symbol other.\nstart ::= ID.\nother ::= ID.\n");
        assert!(diags.is_empty(), "duplicate %start_symbol is a semantic diagnostic, not a syntax one");
        assert_eq!(source.start_symbol.as_deref(), Some("start"));
        assert!(source.duplicate_start_symbol_line.is_some());
    }
}
