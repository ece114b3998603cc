//! Attribute extraction for string hooks
//!
//! Splits the attribute section of a hook's opening tag into name/value pairs.
//! Values may be quoted with `"` or `'` and may contain brackets, parentheses and
//! escaped quotes; unquoted values end at the first whitespace.

use crate::chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// `[name]="expr"`
    Input,
    /// `(name)="expr"`
    Output,
    /// `name="text"` or a bare `name`
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute {
    pub kind: AttributeKind,
    pub name: String,
    pub value: String,
}

impl TagAttribute {
    /// Classifies a raw attribute name like `[hero]` or `(saved)`.
    pub fn from_raw(raw_name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let (kind, name) = if let Some(inner) = strip_delimiters(raw_name, chars::LBRACKET, chars::RBRACKET) {
            (AttributeKind::Input, inner)
        } else if let Some(inner) = strip_delimiters(raw_name, chars::LPAREN, chars::RPAREN) {
            (AttributeKind::Output, inner)
        } else {
            (AttributeKind::Plain, raw_name)
        };
        TagAttribute {
            kind,
            name: name.trim().to_string(),
            value,
        }
    }
}

fn strip_delimiters(text: &str, open: char, close: char) -> Option<&str> {
    text.strip_prefix(open)?.strip_suffix(close)
}

/// Parses `text`, the part of an opening tag after the selector and before the
/// closing bracket.
pub fn parse_tag_attributes(text: &str) -> Vec<TagAttribute> {
    let mut attributes = Vec::new();
    let mut cursor = AttributeCursor { text, pos: 0 };

    loop {
        cursor.skip_whitespace();
        if cursor.at_end() {
            break;
        }
        let name = cursor.read_name();
        if name.is_empty() {
            // stray character such as a lone '=' or '/'
            cursor.advance();
            continue;
        }

        cursor.skip_whitespace();
        let value = if cursor.peek() == Some(chars::EQ) {
            cursor.advance();
            cursor.skip_whitespace();
            cursor.read_value()
        } else {
            String::new()
        };
        attributes.push(TagAttribute::from_raw(name, value));
    }

    attributes
}

struct AttributeCursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> AttributeCursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(chars::is_whitespace) {
            self.advance();
        }
    }

    /// Reads a name; bracketed names may contain any character but the bracket.
    fn read_name(&mut self) -> &'a str {
        let rest = self.rest();
        let len = match rest.chars().next() {
            Some(open @ (chars::LBRACKET | chars::LPAREN)) => {
                let close = if open == chars::LBRACKET { chars::RBRACKET } else { chars::RPAREN };
                rest.find(close).map_or(rest.len(), |end| end + 1)
            }
            _ => rest
                .find(|c: char| chars::is_whitespace(c) || c == chars::EQ || c == chars::SLASH)
                .unwrap_or(rest.len()),
        };
        self.pos += len;
        &rest[..len]
    }

    fn read_value(&mut self) -> String {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote) if quote == chars::DQ || quote == chars::SQ => {
                let mut escaped = false;
                for (i, ch) in rest.char_indices().skip(1) {
                    if escaped {
                        escaped = false;
                    } else if ch == chars::BACKSLASH {
                        escaped = true;
                    } else if ch == quote {
                        self.pos += i + 1;
                        return rest[1..i].to_string();
                    }
                }
                self.pos = self.text.len();
                rest[1..].to_string()
            }
            _ => {
                let len = rest.find(chars::is_whitespace).unwrap_or(rest.len());
                self.pos += len;
                rest[..len].to_string()
            }
        }
    }
}
