//! Hand-written character-at-a-time scanner (no lexer-generator dependency),
//! in the shape of `cfg-load`'s `Lexer`/`Token` pair, adapted to the token
//! set a grammar file actually needs. Comment/string/code-block skipping
//! rules are grounded on `parse.c`'s `MlnParse` scan loop.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Ident(String),
    /// A `{ ... }` verbatim block, already stripped of its outer braces.
    Code(String),
    Arrow,
    Dot,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Eof,
}

#[derive(Clone, Debug)]
pub struct Lexeme {
    pub token: Token,
    pub line: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("line {line}: string starting here is not terminated before the end of the file")]
    UnterminatedString { line: u32 },
    #[error("line {line}: code block starting here is not terminated before the end of the file")]
    UnterminatedCode { line: u32 },
    #[error("line {line}: illegal character {ch:?}")]
    IllegalChar { line: u32, ch: char },
}

pub struct Lexer<'a> {
    chars: std::str::Chars<'a>,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn tokenize(text: &'a str) -> Result<Vec<Lexeme>, LexError> {
        let mut lexer = Lexer {
            chars: text.chars(),
            line: 1,
        };
        let mut out = vec![];
        loop {
            lexer.skip_trivia()?;
            let line = lexer.line;
            let Some(c) = lexer.peek() else {
                out.push(Lexeme { token: Token::Eof, line });
                break;
            };
            let token = lexer.eat_token(c)?;
            out.push(Lexeme { token, line });
        }
        Ok(out)
    }

    fn peek(&self) -> Option<char> {
        self.chars.as_str().chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.chars.as_str().chars();
        it.next();
        it.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    /// Skips whitespace, `//` line comments, and `/* */` block comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek2() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek2() == Some('*') => {
                    let start_line = self.line;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            None => return Err(LexError::UnterminatedString { line: start_line }),
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            _ => {}
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn eat_token(&mut self, c: char) -> Result<Token, LexError> {
        match c {
            'a'..='z' | 'A'..='Z' | '_' => {
                let rest = self.chars.as_str();
                let mut len = 0;
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        self.advance();
                        len += c.len_utf8();
                    } else {
                        break;
                    }
                }
                Ok(Token::Ident(rest[..len].to_string()))
            }
            ':' if self.chars.as_str().starts_with("::=") => {
                self.advance();
                self.advance();
                self.advance();
                Ok(Token::Arrow)
            }
            '.' => {
                self.advance();
                Ok(Token::Dot)
            }
            '%' => {
                self.advance();
                Ok(Token::Percent)
            }
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            '[' => {
                self.advance();
                Ok(Token::LBracket)
            }
            ']' => {
                self.advance();
                Ok(Token::RBracket)
            }
            '"' => self.eat_string(),
            '{' => self.eat_code_block(),
            other => Err(LexError::IllegalChar {
                line: self.line,
                ch: other,
            }),
        }
    }

    /// A quoted string, used as the free-form single-token argument form of
    /// a directive (e.g. `%name "MyParser".`).
    fn eat_string(&mut self) -> Result<Token, LexError> {
        let start_line = self.line;
        self.advance(); // opening quote
        let rest = self.chars.as_str();
        let mut len = 0;
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedString { line: start_line }),
                Some('"') => break,
                Some(c) => len += c.len_utf8(),
            }
        }
        Ok(Token::Ident(rest[..len].to_string()))
    }

    /// A `{ ... }` code block. Braces are counted; quoted strings and
    /// character literals inside are scanned over so an embedded `}` in a
    /// string literal can't close the block early. Mirrors `MlnParse`'s
    /// code-block scan in parse.c.
    fn eat_code_block(&mut self) -> Result<Token, LexError> {
        let start_line = self.line;
        self.advance(); // opening brace
        let rest = self.chars.as_str();
        let mut len = 0;
        let mut level = 1;
        loop {
            let Some(c) = self.advance() else {
                return Err(LexError::UnterminatedCode { line: start_line });
            };
            match c {
                '{' => {
                    level += 1;
                    len += 1;
                }
                '}' => {
                    level -= 1;
                    if level == 0 {
                        break;
                    }
                    len += 1;
                }
                '\'' | '"' => {
                    len += c.len_utf8();
                    let quote = c;
                    let mut prev = '\0';
                    loop {
                        let Some(q) = self.advance() else {
                            return Err(LexError::UnterminatedCode { line: start_line });
                        };
                        len += q.len_utf8();
                        if q == quote && prev != '\\' {
                            break;
                        }
                        prev = if prev == '\\' { '\0' } else { q };
                    }
                }
                _ => len += c.len_utf8(),
            }
        }
        Ok(Token::Code(rest[..len].to_string()))
    }
}
