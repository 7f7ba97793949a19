// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Single-lookahead lexer for assembly source

use crate::error::{Error, Result};
use std::{iter::Peekable, str::Chars};

/// What a lexeme is, decided by its first character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of spaces and tabs
    Whitespace,
    /// A single newline
    Newline,
    /// An identifier terminated by `:` (the colon is not part of the text)
    Label,
    /// A mnemonic or a label reference
    Identifier,
    /// A `0x`-prefixed hex literal (prefix kept in the text)
    HexNumber,
    /// A decimal literal, optionally negative
    DecNumber,
    /// A quoted string (text holds the decoded contents, no quotes)
    Str,
    /// `/` to end of line
    Comment,
    /// A single character the lexer cannot classify
    Unknown,
}

/// One lexeme and where it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Classification
    pub kind: TokenKind,
    /// The lexeme text
    pub text: String,
    /// 1-based source line of the token's first character
    pub line: usize,
}

/// Produces one [Token] per call over a source string.
///
/// # Examples
/// ```rust
/// # use adr8::asm::token::{Tokenizer, TokenKind};
/// let mut lexer = Tokenizer::new("SETA 0xFF", "demo.asm");
/// let token = lexer.next_token().unwrap().unwrap();
/// assert_eq!(TokenKind::Identifier, token.kind);
/// assert_eq!("SETA", token.text);
/// ```
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    file: String,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    /// Constructs a tokenizer over `source`; `file` names the input in
    /// diagnostics
    pub fn new(source: &'a str, file: &str) -> Self {
        Tokenizer {
            chars: source.chars().peekable(),
            file: file.to_owned(),
            line: 1,
        }
    }

    /// Lexes the next token, or None at end of input.
    ///
    /// Fails on an unknown escape code or an unterminated string; every
    /// other character sequence produces a token (possibly
    /// [TokenKind::Unknown], which the assembler rejects).
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(first) = self.chars.next() else {
            return Ok(None);
        };
        let line = self.line;
        let token = match first {
            ' ' | '\t' => {
                let mut text = String::from(first);
                while let Some(&c) = self.chars.peek() {
                    if c != ' ' && c != '\t' {
                        break;
                    }
                    text.push(c);
                    self.chars.next();
                }
                Token { kind: TokenKind::Whitespace, text, line }
            }
            '\n' => {
                self.line += 1;
                Token { kind: TokenKind::Newline, text: "\n".into(), line }
            }
            'a'..='z' | 'A'..='Z' => {
                let mut text = String::from(first);
                let mut kind = TokenKind::Identifier;
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_alphabetic() || c == '_' {
                        text.push(c);
                        self.chars.next();
                    } else if c == ':' {
                        // a trailing colon makes this a label definition
                        self.chars.next();
                        kind = TokenKind::Label;
                        break;
                    } else {
                        break;
                    }
                }
                Token { kind, text, line }
            }
            '0'..='9' | '-' => self.number(first, line),
            '/' => {
                let mut text = String::from(first);
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    self.chars.next();
                }
                Token { kind: TokenKind::Comment, text, line }
            }
            '"' => self.string(line)?,
            other => Token {
                kind: TokenKind::Unknown,
                text: other.to_string(),
                line,
            },
        };
        Ok(Some(token))
    }

    /// A `0x` after a leading zero reclassifies the token as hex
    fn number(&mut self, first: char, line: usize) -> Token {
        let mut text = String::from(first);
        let mut kind = TokenKind::DecNumber;
        while let Some(&c) = self.chars.peek() {
            let take = match kind {
                TokenKind::DecNumber if c == 'x' && text == "0" => {
                    kind = TokenKind::HexNumber;
                    true
                }
                TokenKind::DecNumber => c.is_ascii_digit(),
                _ => c.is_ascii_hexdigit(),
            };
            if !take {
                break;
            }
            text.push(c);
            self.chars.next();
        }
        Token { kind, text, line }
    }

    /// Consumes to the closing quote, decoding `\\ \n \0 \r \t`
    fn string(&mut self, line: usize) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.chars.next() {
                None => {
                    return Err(Error::UnterminatedString {
                        file: self.file.clone(),
                        line: self.line,
                    })
                }
                Some('"') => break,
                Some('\\') => {
                    let code = self.chars.next().ok_or(Error::UnterminatedString {
                        file: self.file.clone(),
                        line: self.line,
                    })?;
                    text.push(match code {
                        '\\' => '\\',
                        'n' => '\n',
                        '0' => '\0',
                        'r' => '\r',
                        't' => '\t',
                        other => {
                            return Err(Error::UnknownEscape {
                                file: self.file.clone(),
                                line: self.line,
                                escape: other,
                            })
                        }
                    });
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    text.push(c);
                }
            }
        }
        Ok(Token { kind: TokenKind::Str, text, line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        let mut lexer = Tokenizer::new(source, "test.asm");
        let mut tokens = vec![];
        while let Some(token) = lexer.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn classifies_by_first_character() {
        use TokenKind::*;
        assert_eq!(
            vec![Identifier, Whitespace, HexNumber, Newline, Label, Newline, DecNumber],
            kinds("SETA 0xFF\nloop:\n-3")
        );
    }

    #[test]
    fn label_drops_the_colon() {
        let tokens = lex("loop:");
        assert_eq!("loop", tokens[0].text);
        assert_eq!(TokenKind::Label, tokens[0].kind);
    }

    #[test]
    fn zero_x_reclassifies_to_hex() {
        let tokens = lex("0x1A 12 0 -42");
        assert_eq!(TokenKind::HexNumber, tokens[0].kind);
        assert_eq!("0x1A", tokens[0].text);
        assert_eq!(TokenKind::DecNumber, tokens[2].kind);
        assert_eq!("-42", tokens[6].text);
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        use TokenKind::*;
        assert_eq!(vec![Comment, Newline, Identifier], kinds("/ a comment\nNOP"));
    }

    #[test]
    fn string_decodes_escapes() {
        let tokens = lex(r#""a\n\t\0\\b""#);
        assert_eq!("a\n\t\0\\b", tokens[0].text);
    }

    #[test]
    fn unknown_escape_is_fatal() {
        let mut lexer = Tokenizer::new(r#""\q""#, "test.asm");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut lexer = Tokenizer::new("\"never closed", "test.asm");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn tokens_carry_line_numbers() {
        let tokens = lex("NOP\nNOP\nNOP");
        let lines: Vec<usize> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.line)
            .collect();
        assert_eq!(vec![1, 2, 3], lines);
    }

    #[test]
    fn stray_punctuation_is_unknown() {
        assert_eq!(vec![TokenKind::Unknown], kinds("@"));
    }
}
