//! Literal coercion: one token in, one typed value out.
//!
//! A small recursive-descent parser for the literal forms we accept: integers,
//! floats, `True`/`False`/`None`, quoted strings and `[]`/`()`/`{}` aggregates.
//! Nothing is ever evaluated.
//!
//! Failures come in two classes:
//! - syntax (bare words, unbalanced brackets, stray characters): the token is
//!   kept as a string, unchanged
//! - structure (unhashable set element or mapping key, runaway nesting): an
//!   [`EngineError::LiteralSyntax`] for the caller

use super::error::EngineError;
use super::joiner;
use super::types::TypedValue;

const MAX_DEPTH: usize = 256;

enum Failure {
    Syntax(String),
    Invalid(String),
}

type Parse<T> = Result<T, Failure>;

/// Coerce one token. A single trailing comma is ignored so `5,` stays a scalar.
pub fn coerce(token: &str) -> Result<TypedValue, EngineError> {
    let candidate = token.strip_suffix(',').unwrap_or(token);
    match Parser::new(candidate).parse_document() {
        Ok(value) => Ok(value),
        Err(Failure::Syntax(reason)) => {
            tracing::trace!(token, %reason, "not a literal, keeping string");
            Ok(TypedValue::String(token.to_string()))
        }
        Err(Failure::Invalid(reason)) => Err(EngineError::literal(token, reason)),
    }
}

/// Join shell-split fragments, then coerce every resulting token.
pub fn coerce_all(tokens: Vec<String>) -> Result<Vec<TypedValue>, EngineError> {
    joiner::joined(tokens)
        .iter()
        .map(|t| coerce(t))
        .collect()
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_quote(c: Option<char>) -> bool {
    matches!(c, Some('\'' | '"'))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    /// First structural problem seen. Reported only if the whole input parses.
    invalid: Option<String>,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            depth: 0,
            invalid: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Parse<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.syntax(format!("expected '{}'", c)))
        }
    }

    fn syntax(&self, msg: impl Into<String>) -> Failure {
        Failure::Syntax(format!("{} at offset {}", msg.into(), self.pos))
    }

    fn mark_invalid(&mut self, reason: String) {
        self.invalid.get_or_insert(reason);
    }

    /// Whole input: one value, or a bare comma-separated tuple.
    fn parse_document(mut self) -> Parse<TypedValue> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(self.syntax("empty literal"));
        }
        let first = self.parse_value()?;
        let value = if self.eat(',') {
            let mut items = vec![first];
            loop {
                self.skip_ws();
                if self.peek().is_none() {
                    break;
                }
                items.push(self.parse_value()?);
                if !self.eat(',') {
                    break;
                }
            }
            TypedValue::Tuple(items)
        } else {
            first
        };
        self.skip_ws();
        if self.peek().is_some() {
            return Err(self.syntax("unexpected trailing input"));
        }
        match self.invalid {
            Some(reason) => Err(Failure::Invalid(reason)),
            None => Ok(value),
        }
    }

    fn parse_value(&mut self) -> Parse<TypedValue> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.syntax("unexpected end of input")),
            Some('[') => self.nested(Self::parse_list),
            Some('(') => self.nested(Self::parse_paren),
            Some('{') => self.nested(Self::parse_brace),
            Some('\'' | '"') => self.parse_strings(),
            Some('r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F') if is_quote(self.peek_at(1)) => {
                self.parse_strings()
            }
            Some('+' | '-') => self.parse_signed(),
            Some(c) if c.is_ascii_digit() => self.parse_number(false),
            Some('.') if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                self.parse_number(false)
            }
            Some(c) if is_ident_start(c) => self.parse_name(),
            Some(c) => Err(self.syntax(format!("unexpected character '{}'", c))),
        }
    }

    fn nested(&mut self, f: fn(&mut Self) -> Parse<TypedValue>) -> Parse<TypedValue> {
        if self.depth >= MAX_DEPTH {
            return Err(Failure::Invalid(format!(
                "nesting deeper than {} levels",
                MAX_DEPTH
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ------------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------------

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn parse_items(&mut self, close: char) -> Parse<Vec<TypedValue>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_value()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(',')?;
        }
    }

    fn parse_list(&mut self) -> Parse<TypedValue> {
        self.pos += 1;
        Ok(TypedValue::List(self.parse_items(']')?))
    }

    /// `()`, `(x)` grouping, or `(x, ...)` tuple.
    fn parse_paren(&mut self) -> Parse<TypedValue> {
        self.pos += 1;
        if self.eat(')') {
            return Ok(TypedValue::Tuple(Vec::new()));
        }
        let first = self.parse_value()?;
        if self.eat(')') {
            return Ok(first);
        }
        self.expect(',')?;
        let mut items = vec![first];
        items.extend(self.parse_items(')')?);
        Ok(TypedValue::Tuple(items))
    }

    /// `{}` empty mapping, `{k: v, ...}` mapping, or `{a, ...}` set.
    fn parse_brace(&mut self) -> Parse<TypedValue> {
        self.pos += 1;
        if self.eat('}') {
            return Ok(TypedValue::Mapping(Vec::new()));
        }
        let first = self.parse_value()?;
        if self.eat(':') {
            let mut pairs = Vec::new();
            let value = self.parse_value()?;
            self.insert_pair(&mut pairs, first, value);
            loop {
                if self.eat('}') {
                    break;
                }
                self.expect(',')?;
                if self.eat('}') {
                    break;
                }
                let key = self.parse_value()?;
                self.expect(':')?;
                let value = self.parse_value()?;
                self.insert_pair(&mut pairs, key, value);
            }
            Ok(TypedValue::Mapping(pairs))
        } else {
            let mut items = Vec::new();
            self.insert_element(&mut items, first);
            loop {
                if self.eat('}') {
                    break;
                }
                self.expect(',')?;
                if self.eat('}') {
                    break;
                }
                let item = self.parse_value()?;
                self.insert_element(&mut items, item);
            }
            Ok(TypedValue::Set(items))
        }
    }

    fn insert_pair(
        &mut self,
        pairs: &mut Vec<(TypedValue, TypedValue)>,
        key: TypedValue,
        value: TypedValue,
    ) {
        if !key.is_hashable() {
            self.mark_invalid(format!("unhashable mapping key of type '{}'", key.kind()));
            return;
        }
        match pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => pairs.push((key, value)),
        }
    }

    fn insert_element(&mut self, items: &mut Vec<TypedValue>, item: TypedValue) {
        if !item.is_hashable() {
            self.mark_invalid(format!("unhashable set element of type '{}'", item.kind()));
            return;
        }
        if !items.contains(&item) {
            items.push(item);
        }
    }

    // ------------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------------

    fn parse_name(&mut self) -> Parse<TypedValue> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "True" => Ok(TypedValue::Boolean(true)),
            "False" => Ok(TypedValue::Boolean(false)),
            "None" => Ok(TypedValue::Null),
            _ => Err(self.syntax(format!("bare name '{}'", name))),
        }
    }

    /// One sign directly applied to a numeric literal.
    fn parse_signed(&mut self) -> Parse<TypedValue> {
        let negative = self.bump() == Some('-');
        self.skip_ws();
        match (self.peek(), self.peek_at(1)) {
            (Some(c), _) if c.is_ascii_digit() => self.parse_number(negative),
            (Some('.'), Some(d)) if d.is_ascii_digit() => self.parse_number(negative),
            _ => Err(self.syntax("sign must precede a number")),
        }
    }

    /// Digits matching `accept`, with single `_` separators between them.
    fn take_digits(&mut self, accept: impl Fn(char) -> bool, leading_underscore: bool) -> Parse<String> {
        let mut digits = String::new();
        let mut last_underscore = false;
        let mut first = true;
        while let Some(c) = self.peek() {
            if c == '_' {
                if last_underscore || (first && !leading_underscore) {
                    return Err(self.syntax("invalid '_' in number"));
                }
                last_underscore = true;
            } else if accept(c) {
                digits.push(c);
                last_underscore = false;
            } else {
                break;
            }
            first = false;
            self.pos += 1;
        }
        if last_underscore {
            return Err(self.syntax("number ends with '_'"));
        }
        Ok(digits)
    }

    fn reject_identifier_suffix(&self) -> Parse<()> {
        match self.peek() {
            Some(c) if is_ident_continue(c) => Err(self.syntax("invalid numeric literal")),
            _ => Ok(()),
        }
    }

    fn finish_int(&self, digits: &str, radix: u32, negative: bool) -> Parse<TypedValue> {
        if digits.is_empty() {
            return Err(self.syntax("missing digits"));
        }
        let magnitude = i128::from_str_radix(digits, radix)
            .map_err(|_| self.syntax("integer literal too large"))?;
        let value = if negative { -magnitude } else { magnitude };
        i64::try_from(value)
            .map(TypedValue::Integer)
            .map_err(|_| self.syntax("integer outside 64-bit range"))
    }

    fn parse_number(&mut self, negative: bool) -> Parse<TypedValue> {
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits = self.take_digits(|c| c.is_digit(radix), true)?;
                self.reject_identifier_suffix()?;
                return self.finish_int(&digits, radix, negative);
            }
        }

        let int_part = self.take_digits(|c| c.is_ascii_digit(), false)?;
        let mut text = if int_part.is_empty() {
            "0".to_string()
        } else {
            int_part.clone()
        };
        let mut is_float = false;

        if self.peek() == Some('.') {
            self.pos += 1;
            is_float = true;
            let fraction = self.take_digits(|c| c.is_ascii_digit(), false)?;
            text.push('.');
            text.push_str(if fraction.is_empty() { "0" } else { &fraction });
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            is_float = true;
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.pos += 1;
                text.push(sign);
            }
            let exponent = self.take_digits(|c| c.is_ascii_digit(), false)?;
            if exponent.is_empty() {
                return Err(self.syntax("malformed exponent"));
            }
            text.push_str(&exponent);
        }
        self.reject_identifier_suffix()?;

        if is_float {
            let v: f64 = text
                .parse()
                .map_err(|_| self.syntax("malformed float"))?;
            return Ok(TypedValue::Float(if negative { -v } else { v }));
        }
        if int_part.len() > 1 && int_part.starts_with('0') && int_part.chars().any(|c| c != '0') {
            return Err(self.syntax("leading zeros in decimal integer"));
        }
        self.finish_int(&int_part, 10, negative)
    }

    // ------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> Parse<TypedValue> {
        let mut out = String::new();
        loop {
            self.skip_ws();
            let raw = match (self.peek(), self.peek_at(1)) {
                (Some('\'' | '"'), _) => false,
                (Some('r' | 'R'), next) if is_quote(next) => {
                    self.pos += 1;
                    true
                }
                (Some('u' | 'U'), next) if is_quote(next) => {
                    self.pos += 1;
                    false
                }
                (Some('b' | 'B' | 'f' | 'F'), next) if is_quote(next) => {
                    return Err(self.syntax("bytes and f-strings are not literals"));
                }
                _ => break,
            };
            self.parse_quoted(raw, &mut out)?;
        }
        Ok(TypedValue::String(out))
    }

    fn parse_quoted(&mut self, raw: bool, out: &mut String) -> Parse<()> {
        let quote = match self.bump() {
            Some(q) => q,
            None => return Err(self.syntax("expected quote")),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.syntax("unterminated string"))?;
            if c == quote {
                if !triple {
                    return Ok(());
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Ok(());
                }
                out.push(c);
                continue;
            }
            match c {
                '\n' if !triple => return Err(self.syntax("unterminated string")),
                '\\' if raw => {
                    let next = self
                        .bump()
                        .ok_or_else(|| self.syntax("unterminated string"))?;
                    out.push('\\');
                    out.push(next);
                }
                '\\' => self.parse_escape(out)?,
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Parse<()> {
        let c = self
            .bump()
            .ok_or_else(|| self.syntax("unterminated string"))?;
        let decoded = match c {
            '\n' => return Ok(()),
            '\\' | '\'' | '"' => c,
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                self.code_point(code)?
            }
            'x' => self.hex_escape(2)?,
            'u' => self.hex_escape(4)?,
            'U' => self.hex_escape(8)?,
            'N' => return Err(self.syntax("named unicode escapes are not supported")),
            other => {
                out.push('\\');
                other
            }
        };
        out.push(decoded);
        Ok(())
    }

    fn hex_escape(&mut self, width: usize) -> Parse<char> {
        let mut code = 0u32;
        for _ in 0..width {
            let digit = self
                .peek()
                .and_then(|d| d.to_digit(16))
                .ok_or_else(|| self.syntax("truncated escape"))?;
            code = code * 16 + digit;
            self.pos += 1;
        }
        self.code_point(code)
    }

    fn code_point(&self, code: u32) -> Parse<char> {
        char::from_u32(code).ok_or_else(|| self.syntax(format!("invalid code point {:#x}", code)))
    }
}
