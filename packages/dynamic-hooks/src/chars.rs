/*
 * Character Codes
 *
 * Characters the expression encoder, evaluator and HTML parser branch on.
 */

//! Character constants and classification helpers

pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';

// Quotes
pub const DQ: char = '"';
pub const SQ: char = '\'';
pub const BACKSLASH: char = '\\';

// Punctuation
pub const COMMA: char = ',';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const UNDERSCORE: char = '_';

// Brackets
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const LBRACKET: char = '[';
pub const RBRACKET: char = ']';
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

/// Check if character is whitespace
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == NBSP || ch < ' '
}

pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ || ch == '`'
}

/// Check if character can start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == UNDERSCORE || ch == '$'
}

/// Check if character can be part of an identifier
pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

/// Characters allowed in a bare word that is read as a plain string
pub fn is_plain_word_char(ch: char) -> bool {
    is_identifier_part(ch) || ch == '-' || ch == PERIOD || ch == SPACE || ch.is_alphanumeric()
}
