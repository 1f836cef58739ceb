//! Safe argument parsing.
//!
//! Replaces the unsafe evaluate-the-text approach with a closed
//! recursive-descent grammar over literals only: numbers, quoted strings,
//! booleans, null, and nested lists/mappings, comma-separated at the top
//! level. Identifiers, operators and call syntax are rejected outright.
//! Parsing is a pure function from text to values; nothing here can
//! execute anything.

use crate::error::ArgParseError;
use crate::literal::Literal;

/// Parse the raw text between a tool call's parentheses into an ordered
/// argument list. Empty (or whitespace-only) input yields zero arguments.
pub fn parse_arguments(text: &str) -> Result<Vec<Literal>, ArgParseError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_whitespace();
    if cursor.at_end() {
        return Ok(Vec::new());
    }

    let mut arguments = Vec::new();
    loop {
        arguments.push(cursor.parse_value()?);
        cursor.skip_whitespace();
        if cursor.at_end() {
            return Ok(arguments);
        }
        cursor.expect(',')?;
        cursor.skip_whitespace();
        // Trailing comma before end of input is tolerated; models emit it.
        if cursor.at_end() {
            return Ok(arguments);
        }
    }
}

struct Cursor<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ArgParseError {
        ArgParseError {
            message: message.into(),
            offset: self.pos,
            text: self.text.to_string(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ArgParseError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn parse_value(&mut self) -> Result<Literal, ArgParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected a value, found end of input")),
            Some('"') | Some('\'') => self.parse_string().map(Literal::Str),
            Some('[') => self.parse_list(),
            Some('{') => self.parse_mapping(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    fn parse_string(&mut self) -> Result<String, ArgParseError> {
        let quote = self.advance().unwrap_or('"');
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => match self.advance() {
                    None => return Err(self.error("unterminated escape sequence")),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('"' | '\'' | '\\')) => out.push(c),
                    Some(c) => {
                        return Err(self.error(format!("unsupported escape '\\{}'", c)));
                    }
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Literal, ArgParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        let mut saw_digit = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            saw_digit = true;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
                saw_digit = true;
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) && saw_digit {
            self.pos += 1;
            if matches!(self.peek(), Some('-') | Some('+')) {
                self.pos += 1;
            }
            let mut exp_digits = false;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
                exp_digits = true;
            }
            if !exp_digits {
                return Err(self.error("malformed exponent in number"));
            }
        }
        if !saw_digit {
            return Err(self.error("malformed number"));
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        token
            .parse::<f64>()
            .map(Literal::Number)
            .map_err(|_| self.error(format!("malformed number '{}'", token)))
    }

    /// Bare words: only boolean/null keywords are literals. Any other
    /// identifier is where an expression or code reference would begin,
    /// and is rejected.
    fn parse_word(&mut self) -> Result<Literal, ArgParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" | "True" => Ok(Literal::Bool(true)),
            "false" | "False" => Ok(Literal::Bool(false)),
            "null" | "none" | "None" => Ok(Literal::Null),
            _ => {
                self.pos = start;
                Err(self.error(format!(
                    "identifier '{}' is not a literal (expressions are not evaluated)",
                    word
                )))
            }
        }
    }

    fn parse_list(&mut self) -> Result<Literal, ArgParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Literal::List(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.advance() {
                Some(',') => {
                    self.skip_whitespace();
                    if self.peek() == Some(']') {
                        self.pos += 1;
                        return Ok(Literal::List(items));
                    }
                }
                Some(']') => return Ok(Literal::List(items)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or ']' in list, found '{}'", c)));
                }
                None => return Err(self.error("unterminated list literal")),
            }
        }
    }

    fn parse_mapping(&mut self) -> Result<Literal, ArgParseError> {
        self.expect('{')?;
        let mut pairs: Vec<(String, Literal)> = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Literal::Mapping(pairs));
        }
        loop {
            self.skip_whitespace();
            let key = match self.peek() {
                Some('"') | Some('\'') => self.parse_string()?,
                _ => return Err(self.error("mapping keys must be quoted strings")),
            };
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            pairs.push((key, value));
            self.skip_whitespace();
            match self.advance() {
                Some(',') => {
                    self.skip_whitespace();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        return Ok(Literal::Mapping(pairs));
                    }
                }
                Some('}') => return Ok(Literal::Mapping(pairs)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(
                        self.error(format!("expected ',' or '}}' in mapping, found '{}'", c))
                    );
                }
                None => return Err(self.error("unterminated mapping literal")),
            }
        }
    }
}
