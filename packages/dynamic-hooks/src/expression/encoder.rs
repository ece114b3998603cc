/**
 * Expression Encoder
 *
 * Replaces string literals, call argument groups and index brackets in a raw
 * binding expression with placeholder tokens, so that splitting object and array
 * literals on `,` and `:` only ever sees structural characters.
 */
use crate::chars;
use crate::error::ExpressionError;

/// Opens a placeholder token. Private-use code point, never valid in expressions.
pub const PLACEHOLDER_START: char = '\u{F8F0}';
/// Closes a placeholder token.
pub const PLACEHOLDER_END: char = '\u{F8F1}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A quoted string literal including its quotes.
    String,
    /// A parenthesized argument list including the parentheses.
    Call,
    /// An index group such as `["a"]` including the brackets.
    Bracket,
}

impl TokenKind {
    fn marker(self) -> char {
        match self {
            TokenKind::String => 's',
            TokenKind::Call => 'c',
            TokenKind::Bracket => 'b',
        }
    }

    fn from_marker(marker: char) -> Option<TokenKind> {
        match marker {
            's' => Some(TokenKind::String),
            'c' => Some(TokenKind::Call),
            'b' => Some(TokenKind::Bracket),
            _ => None,
        }
    }
}

/// A placeholder found in encoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: TokenKind,
    pub index: usize,
    /// Byte offset of the start delimiter.
    pub start: usize,
    /// Byte offset just after the end delimiter.
    pub end: usize,
}

/// Lookup table from placeholder to the original fragment it stands for.
///
/// Fragments are stored verbatim, so they may themselves contain placeholders of
/// earlier passes; decoding resolves them recursively.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    strings: Vec<String>,
    calls: Vec<String>,
    brackets: Vec<String>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&mut self, kind: TokenKind, fragment: String) -> String {
        let list = match kind {
            TokenKind::String => &mut self.strings,
            TokenKind::Call => &mut self.calls,
            TokenKind::Bracket => &mut self.brackets,
        };
        list.push(fragment);
        format!(
            "{}{}{}{}",
            PLACEHOLDER_START,
            kind.marker(),
            list.len() - 1,
            PLACEHOLDER_END
        )
    }

    /// The stored fragment for a placeholder.
    pub fn fragment(&self, kind: TokenKind, index: usize) -> Option<&str> {
        let list = match kind {
            TokenKind::String => &self.strings,
            TokenKind::Call => &self.calls,
            TokenKind::Bracket => &self.brackets,
        };
        list.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len() + self.calls.len() + self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces every quoted string literal with a placeholder.
    pub fn encode_substrings(&mut self, text: &str) -> Result<String, ExpressionError> {
        if text.contains(PLACEHOLDER_START) || text.contains(PLACEHOLDER_END) {
            return Err(ExpressionError::ReservedCharacters {
                expression: text.to_string(),
            });
        }

        let mut result = String::with_capacity(text.len());
        let mut iter = text.char_indices();

        while let Some((start, ch)) = iter.next() {
            if !chars::is_quote(ch) {
                result.push(ch);
                continue;
            }

            let mut end = None;
            let mut escaped = false;
            for (i, c) in iter.by_ref() {
                if escaped {
                    escaped = false;
                } else if c == chars::BACKSLASH {
                    escaped = true;
                } else if c == ch {
                    end = Some(i + c.len_utf8());
                    break;
                }
            }

            match end {
                Some(end) => {
                    let token = self.store(TokenKind::String, text[start..end].to_string());
                    result.push_str(&token);
                }
                None => {
                    return Err(ExpressionError::UnterminatedString {
                        expression: text.to_string(),
                        index: start,
                    })
                }
            }
        }

        Ok(result)
    }

    /// Replaces every outermost `(...)` group with a placeholder.
    ///
    /// Nested groups stay inside the stored fragment and are encoded again when the
    /// fragment's contents are evaluated.
    pub fn encode_subfunctions(&mut self, text: &str) -> Result<String, ExpressionError> {
        let mut result = String::with_capacity(text.len());
        let mut depth = 0usize;
        let mut group_start = 0usize;

        for (i, ch) in text.char_indices() {
            match ch {
                chars::LPAREN => {
                    if depth == 0 {
                        group_start = i;
                    }
                    depth += 1;
                }
                chars::RPAREN => {
                    if depth == 0 {
                        return Err(ExpressionError::Unbalanced {
                            expression: text.to_string(),
                            delimiter: chars::RPAREN,
                            index: i,
                        });
                    }
                    depth -= 1;
                    if depth == 0 {
                        let token =
                            self.store(TokenKind::Call, text[group_start..=i].to_string());
                        result.push_str(&token);
                    }
                }
                _ if depth == 0 => result.push(ch),
                _ => {}
            }
        }

        if depth > 0 {
            return Err(ExpressionError::Unbalanced {
                expression: text.to_string(),
                delimiter: chars::LPAREN,
                index: group_start,
            });
        }

        Ok(result)
    }

    /// Replaces every outermost index group (`a["b"]`, `a[0]`) with a placeholder.
    ///
    /// A `[` counts as indexing when the previous non-whitespace character ends a
    /// value: an identifier character, `]`, `)` or a placeholder. Any other `[`
    /// opens an array literal and is kept.
    pub fn encode_variable_subbrackets(&mut self, text: &str) -> Result<String, ExpressionError> {
        check_bracket_balance(text)?;

        let mut result = String::with_capacity(text.len());
        let mut iter = text.char_indices();
        let mut last_significant: Option<char> = None;

        while let Some((start, ch)) = iter.next() {
            let opens_index = ch == chars::LBRACKET
                && matches!(last_significant, Some(prev)
                    if chars::is_identifier_part(prev)
                        || prev == chars::RBRACKET
                        || prev == chars::RPAREN
                        || prev == PLACEHOLDER_END);

            if !opens_index {
                result.push(ch);
                if !chars::is_whitespace(ch) {
                    last_significant = Some(ch);
                }
                continue;
            }

            let mut depth = 1usize;
            let mut end = start;
            for (i, c) in iter.by_ref() {
                if c == chars::LBRACKET {
                    depth += 1;
                } else if c == chars::RBRACKET {
                    depth -= 1;
                    if depth == 0 {
                        end = i;
                        break;
                    }
                }
            }

            let token = self.store(TokenKind::Bracket, text[start..=end].to_string());
            result.push_str(&token);
            last_significant = Some(PLACEHOLDER_END);
        }

        Ok(result)
    }

    /// Restores every placeholder in `text`, recursively.
    pub fn decode(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut pos = 0;

        while pos < text.len() {
            if let Some(placeholder) = read_placeholder(text, pos) {
                if let Some(fragment) = self.fragment(placeholder.kind, placeholder.index) {
                    result.push_str(&self.decode(fragment));
                    pos = placeholder.end;
                    continue;
                }
            }
            let ch = text[pos..].chars().next().unwrap_or(chars::SPACE);
            result.push(ch);
            pos += ch.len_utf8();
        }

        result
    }
}

fn check_bracket_balance(text: &str) -> Result<(), ExpressionError> {
    let mut open: Vec<usize> = Vec::new();
    for (i, ch) in text.char_indices() {
        if ch == chars::LBRACKET {
            open.push(i);
        } else if ch == chars::RBRACKET && open.pop().is_none() {
            return Err(ExpressionError::Unbalanced {
                expression: text.to_string(),
                delimiter: chars::RBRACKET,
                index: i,
            });
        }
    }
    match open.pop() {
        Some(index) => Err(ExpressionError::Unbalanced {
            expression: text.to_string(),
            delimiter: chars::LBRACKET,
            index,
        }),
        None => Ok(()),
    }
}

/// Reads a placeholder starting exactly at byte offset `pos`.
pub fn read_placeholder(text: &str, pos: usize) -> Option<Placeholder> {
    let rest = text.get(pos..)?;
    let mut iter = rest.char_indices();
    let (_, first) = iter.next()?;
    if first != PLACEHOLDER_START {
        return None;
    }
    let (_, marker) = iter.next()?;
    let kind = TokenKind::from_marker(marker)?;

    let digits_start = PLACEHOLDER_START.len_utf8() + marker.len_utf8();
    let mut digits_end = digits_start;
    for (i, c) in iter {
        if c == PLACEHOLDER_END {
            digits_end = i;
            break;
        }
        if !c.is_ascii_digit() {
            return None;
        }
    }
    if digits_end == digits_start {
        return None;
    }

    let index = rest[digits_start..digits_end].parse().ok()?;
    Some(Placeholder {
        kind,
        index,
        start: pos,
        end: pos + digits_end + PLACEHOLDER_END.len_utf8(),
    })
}

/// If `text` (trimmed) is exactly one placeholder, returns it.
pub fn as_single_placeholder(text: &str) -> Option<Placeholder> {
    let trimmed = text.trim();
    let offset = text.len() - text.trim_start().len();
    read_placeholder(text, offset).filter(|p| p.end - p.start == trimmed.len())
}

/// Result of running all three encoding passes over an expression.
#[derive(Debug, Clone)]
pub struct EncodedExpression {
    pub encoded: String,
    pub table: TokenTable,
}

impl EncodedExpression {
    pub fn decode(&self) -> String {
        self.table.decode(&self.encoded)
    }
}

/// Encodes strings, then call groups, then index brackets.
pub fn encode(expression: &str) -> Result<EncodedExpression, ExpressionError> {
    let mut table = TokenTable::new();
    let encoded = table.encode_substrings(expression)?;
    let encoded = table.encode_subfunctions(&encoded)?;
    let encoded = table.encode_variable_subbrackets(&encoded)?;
    Ok(EncodedExpression { encoded, table })
}

/// Escapes every `"` that is not already escaped.
pub fn escape_double_quotes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut backslashes = 0usize;
    for ch in text.chars() {
        if ch == chars::DQ && backslashes % 2 == 0 {
            result.push(chars::BACKSLASH);
        }
        if ch == chars::BACKSLASH {
            backslashes += 1;
        } else {
            backslashes = 0;
        }
        result.push(ch);
    }
    result
}

/// Resolves backslash escapes in the body of a string literal.
pub fn unescape_string_body(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut iter = body.chars();
    while let Some(ch) = iter.next() {
        if ch != chars::BACKSLASH {
            result.push(ch);
            continue;
        }
        match iter.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push(chars::BACKSLASH),
        }
    }
    result
}
