use crate::{ParseError, ParseErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Word(String),
    Number(f64),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Eq,
}

/// A byte-offset-tracking lexer over WKT text.
pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<(Token, usize)>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Tokenizer<'a> {
        Tokenizer { input, pos: 0, peeked: None }
    }

    /// Byte offset of the next unconsumed token (or of the end of input).
    pub fn offset(&mut self) -> usize {
        match &self.peeked {
            Some((_, at)) => *at,
            None => {
                self.skip_whitespace();
                self.pos
            }
        }
    }

    pub fn next(&mut self) -> Result<Option<(Token, usize)>, ParseError> {
        if let Some(t) = self.peeked.take() {
            return Ok(Some(t));
        }
        self.lex()
    }

    pub fn peek(&mut self) -> Result<Option<&(Token, usize)>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.lex()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn lex(&mut self) -> Result<Option<(Token, usize)>, ParseError> {
        self.skip_whitespace();
        let bytes = self.input.as_bytes();
        if self.pos >= bytes.len() {
            return Ok(None);
        }
        let at = self.pos;
        let c = bytes[self.pos];
        let token = match c {
            b'(' => {
                self.pos += 1;
                Token::LParen
            }
            b')' => {
                self.pos += 1;
                Token::RParen
            }
            b',' => {
                self.pos += 1;
                Token::Comma
            }
            b';' => {
                self.pos += 1;
                Token::Semicolon
            }
            b'=' => {
                self.pos += 1;
                Token::Eq
            }
            b'0'..=b'9' | b'-' | b'+' | b'.' => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && matches!(bytes[self.pos], b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
                {
                    self.pos += 1;
                }
                let text = &self.input[start..self.pos];
                let value = text.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidGeom,
                        start,
                        format!("invalid number {text:?}"),
                    )
                })?;
                Token::Number(value)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                Token::Word(self.input[start..self.pos].to_ascii_uppercase())
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidGeom,
                    at,
                    format!("unexpected character {:?}", other as char),
                ))
            }
        };
        Ok(Some((token, at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(input: &str) -> Vec<(Token, usize)> {
        let mut t = Tokenizer::new(input);
        let mut out = Vec::new();
        while let Some(tok) = t.next().unwrap() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn words_are_uppercased_and_offsets_tracked() {
        let toks = all("point ( -1.5 2e3 )");
        assert_eq!(
            toks,
            vec![
                (Token::Word("POINT".into()), 0),
                (Token::LParen, 6),
                (Token::Number(-1.5), 8),
                (Token::Number(2000.0), 13),
                (Token::RParen, 17),
            ]
        );
    }

    #[test]
    fn srid_prefix_tokens() {
        let toks = all("SRID=4326;POINT(0 0)");
        assert_eq!(toks[0], (Token::Word("SRID".into()), 0));
        assert_eq!(toks[1], (Token::Eq, 4));
        assert_eq!(toks[2], (Token::Number(4326.0), 5));
        assert_eq!(toks[3], (Token::Semicolon, 9));
    }

    #[test]
    fn bad_number_reports_its_offset() {
        let mut t = Tokenizer::new("POINT(1..2 3)");
        t.next().unwrap();
        t.next().unwrap();
        let err = t.next().unwrap_err();
        assert_eq!(err.offset, 6);
        assert_eq!(err.kind, ParseErrorKind::InvalidGeom);
    }
}
