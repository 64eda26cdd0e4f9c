//! Lexer for Tyscript source text.

use crate::error::CoreError;

/// Kind of a token produced by the lexer.
///
/// The lexer is intentionally simple: it recognizes keywords and basic
/// literals and leaves everything else to the parser. Literal and
/// identifier text is retrieved through the byte offsets on [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Eof,

    // Identifiers and literals
    Ident,
    NumberLiteral,
    StringLiteral,
    BoolLiteral, // true / false

    // Punctuation
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    Comma,    // ,
    Semi,     // ;
    Colon,    // :
    Equal,    // =
    At,       // @

    // Operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /

    // Keywords
    Export,
    Const,
    Let,
    Function,
    Return,
}

/// A single token with its kind and source location.
///
/// The `text_start` / `text_end` fields are byte offsets into the
/// original source string, so that the parser can retrieve the
/// concrete text when needed. For string literals the offsets cover
/// the content between the quotes, not the quotes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text_start: u32,
    pub text_end: u32,
}

/// Lex a source string into tokens.
///
/// The returned `Token`s refer to slices of `source` via byte
/// offsets; the caller is responsible for keeping `source` alive
/// as long as those tokens are needed. The token stream always ends
/// with a single `Eof` token.
pub fn lex(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut lexer = Lexer {
        source,
        chars: source.as_bytes(),
        len: source.len(),
        index: 0,
    };
    lexer.run()
}

struct Lexer<'src> {
    source: &'src str,
    chars: &'src [u8],
    len: usize,
    index: usize,
}

impl<'src> Lexer<'src> {
    fn run(&mut self) -> Result<Vec<Token>, CoreError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            if is_whitespace(ch) {
                self.consume_char();
                continue;
            }

            let start = self.index as u32;
            let token = match ch {
                b'(' => {
                    self.consume_char();
                    self.simple_token(TokenKind::LParen, start)
                }
                b')' => {
                    self.consume_char();
                    self.simple_token(TokenKind::RParen, start)
                }
                b'{' => {
                    self.consume_char();
                    self.simple_token(TokenKind::LBrace, start)
                }
                b'}' => {
                    self.consume_char();
                    self.simple_token(TokenKind::RBrace, start)
                }
                b',' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Comma, start)
                }
                b';' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Semi, start)
                }
                b':' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Colon, start)
                }
                b'=' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Equal, start)
                }
                b'@' => {
                    self.consume_char();
                    self.simple_token(TokenKind::At, start)
                }
                b'+' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Plus, start)
                }
                b'-' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Minus, start)
                }
                b'*' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Star, start)
                }
                b'/' => match self.peek_next() {
                    Some(b'/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some(b'*') => {
                        self.skip_block_comment(start as usize)?;
                        continue;
                    }
                    _ => {
                        self.consume_char();
                        self.simple_token(TokenKind::Slash, start)
                    }
                },
                b'"' => self.lex_string(start)?,
                b'0'..=b'9' => self.lex_number(start),
                _ => {
                    if is_ident_start(ch) {
                        self.lex_ident_or_keyword(start)
                    } else {
                        return Err(CoreError::LexError {
                            position: start as usize,
                            message: format!("unexpected character '{}'", ch as char),
                        });
                    }
                }
            };

            tokens.push(token);
        }

        // EOF token at end
        tokens.push(Token {
            kind: TokenKind::Eof,
            text_start: self.len as u32,
            text_end: self.len as u32,
        });

        Ok(tokens)
    }

    fn simple_token(&self, kind: TokenKind, start: u32) -> Token {
        Token {
            kind,
            text_start: start,
            text_end: self.index as u32,
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            self.consume_char();
            if ch == b'\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<(), CoreError> {
        self.consume_char(); // '/'
        self.consume_char(); // '*'
        while let Some(ch) = self.peek_char() {
            if ch == b'*' && self.peek_next() == Some(b'/') {
                self.consume_char();
                self.consume_char();
                return Ok(());
            }
            self.consume_char();
        }
        Err(CoreError::LexError {
            position: start,
            message: "unterminated block comment".to_string(),
        })
    }

    fn lex_string(&mut self, start: u32) -> Result<Token, CoreError> {
        // Consume the opening quote
        self.consume_char();

        let content_start = self.index;
        while let Some(ch) = self.peek_char() {
            match ch {
                b'"' => {
                    let content_end = self.index;
                    self.consume_char(); // closing quote
                    return Ok(Token {
                        kind: TokenKind::StringLiteral,
                        text_start: content_start as u32,
                        text_end: content_end as u32,
                    });
                }
                b'\\' => {
                    // Skip over escape sequence: backslash + next char (if any)
                    self.consume_char();
                    if self.peek_char().is_some() {
                        self.consume_char();
                    }
                }
                _ => {
                    self.consume_char();
                }
            }
        }

        Err(CoreError::LexError {
            position: start as usize,
            message: "unterminated string literal".to_string(),
        })
    }

    fn lex_number(&mut self, start: u32) -> Token {
        // integer or float: digits [ '.' digits ]?
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                self.consume_char();
            } else {
                break;
            }
        }

        if self.peek_char() == Some(b'.') {
            // Look ahead: only treat '.' as part of the number when a
            // digit follows.
            if let Some(next) = self.peek_next() {
                if next.is_ascii_digit() {
                    self.consume_char(); // '.'
                    while let Some(ch) = self.peek_char() {
                        if ch.is_ascii_digit() {
                            self.consume_char();
                        } else {
                            break;
                        }
                    }
                }
            }
        }

        Token {
            kind: TokenKind::NumberLiteral,
            text_start: start,
            text_end: self.index as u32,
        }
    }

    fn lex_ident_or_keyword(&mut self, start: u32) -> Token {
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) {
                self.consume_char();
            } else {
                break;
            }
        }

        let end = self.index as u32;
        let text = &self.source[start as usize..end as usize];

        let kind = match text {
            "export" => TokenKind::Export,
            "const" => TokenKind::Const,
            "let" => TokenKind::Let,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "true" => TokenKind::BoolLiteral,
            "false" => TokenKind::BoolLiteral,
            _ => TokenKind::Ident,
        };

        Token {
            kind,
            text_start: start,
            text_end: end,
        }
    }

    fn peek_char(&self) -> Option<u8> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        if self.index < self.len {
            self.index += 1;
        }
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
