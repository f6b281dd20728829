//! Lexical scanner for the mysqldump `INSERT` dialect.
//!
//! A segment is scanned with a fixed list of matcher functions tried in
//! priority order at each position; characters that start no lexeme
//! (whitespace, commas, open parens, the statement terminator) are
//! skipped. The header segment only ever yields identifiers, the values
//! segment everything else.

use bigdecimal::BigDecimal;
use codec_api::Value;

use crate::error::InsertError;

/// One classified lexeme, borrowing the matched text. Tokens are
/// consumed immediately by the assembler and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Backtick-quoted identifier, without the backticks.
    Identifier(&'a str),
    Null,
    /// Single-quoted string body, escapes still applied.
    Str(&'a str),
    /// Hex digits, without the `0x` prefix.
    Hex(&'a str),
    Number(&'a str),
    /// `)`: the current row's values are complete.
    CloseParen,
}

type Matcher = for<'a> fn(&'a str, usize) -> Option<(Token<'a>, usize)>;

/// Matchers for the values segment, in precedence order. Hex must come
/// before number so `0xC0DE` isn't read as the integer 0.
const VALUE_MATCHERS: &[Matcher] = &[
    match_null,
    match_string,
    match_hex,
    match_number,
    match_close_paren,
];

/// Token iterator over the values segment of a statement.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.pos < self.src.len() {
            for matcher in VALUE_MATCHERS {
                if let Some((token, end)) = matcher(self.src, self.pos) {
                    self.pos = end;
                    return Some(token);
                }
            }
            // no lexeme starts here; skip one character
            let c = self.src[self.pos..].chars().next()?;
            self.pos += c.len_utf8();
        }
        None
    }
}

/// Scan a header segment for backtick-quoted identifiers. The first is
/// the table name, the rest are column names in declaration order
/// (duplicates preserved).
pub(crate) fn header_identifiers(header: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut pos = 0;
    while pos < header.len() {
        if let Some((Token::Identifier(name), end)) = match_identifier(header, pos) {
            names.push(name);
            pos = end;
        } else if let Some(c) = header[pos..].chars().next() {
            pos += c.len_utf8();
        } else {
            break;
        }
    }
    names
}

// ---- Matchers ----

/// Backtick-quoted identifier; content taken literally up to the next
/// backtick, no escaping, may be empty.
fn match_identifier(s: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    let body = s[pos..].strip_prefix('`')?;
    let close = body.find('`')?;
    Some((Token::Identifier(&body[..close]), pos + 1 + close + 1))
}

/// The unquoted keyword `NULL`, case-sensitive.
fn match_null(s: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    s[pos..].starts_with("NULL").then(|| (Token::Null, pos + 4))
}

/// `'...'` where the body mixes `\` + one character, `''` quote pairs,
/// and plain characters. A lone quote closes the string; an unterminated
/// body is no match at all.
fn match_string(s: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    let body = s[pos..].strip_prefix('\'')?;
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next()?;
            }
            '\'' => {
                if body[i + 1..].starts_with('\'') {
                    chars.next();
                } else {
                    return Some((Token::Str(&body[..i]), pos + 1 + i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// `0x` followed by one or more hex digits. Both digit cases are
/// accepted; the encoder emits uppercase.
fn match_hex(s: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    let rest = s[pos..].strip_prefix("0x")?;
    let len = rest
        .bytes()
        .take_while(|b| b.is_ascii_hexdigit())
        .count();
    if len == 0 {
        return None;
    }
    Some((Token::Hex(&rest[..len]), pos + 2 + len))
}

/// `[+-]? digits ('.' digits*)? ((e|E) [+-]? digits)?`. Leading digits
/// are required, a trailing dot is tolerated, and the exponent only
/// counts when it has digits of its own.
fn match_number(s: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    let bytes = s.as_bytes();
    let mut i = pos;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
        i += 1;
    }
    if i == int_start {
        return None;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            i += 1;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while matches!(bytes.get(j), Some(b) if b.is_ascii_digit()) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some((Token::Number(&s[pos..i]), i))
}

fn match_close_paren(s: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    (s.as_bytes().get(pos) == Some(&b')')).then_some((Token::CloseParen, pos + 1))
}

// ---- Value decoding ----

/// MySQL string escapes: almost C-style, but there is no `\f`, and `\Z`
/// stands for the Windows EOF character. Any other escaped character
/// maps to itself.
fn unescape_char(c: char) -> char {
    match c {
        'r' => '\r',
        'n' => '\n',
        'b' => '\u{8}',
        't' => '\t',
        '0' => '\0',
        'Z' => '\u{1a}',
        other => other,
    }
}

/// Decode a raw string body: apply the backslash escape table and
/// collapse quote pairs. The scanner guarantees every backslash is
/// followed by a character and every quote in the body is one of a pair.
pub(crate) fn unescape_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(unescape_char(escaped));
                }
            }
            '\'' => {
                chars.next();
                out.push('\'');
            }
            _ => out.push(c),
        }
    }
    out
}

fn hex_nibble(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Decode a hex literal body into raw bytes, one byte per digit pair.
pub(crate) fn decode_hex(digits: &str) -> Result<Vec<u8>, InsertError> {
    if digits.len() % 2 != 0 {
        return Err(InsertError::OddLengthHex(digits.to_string()));
    }
    let mut bytes = Vec::with_capacity(digits.len() / 2);
    for pair in digits.as_bytes().chunks(2) {
        bytes.push((hex_nibble(pair[0]) << 4) | hex_nibble(pair[1]));
    }
    Ok(bytes)
}

/// Decode a numeric literal: integer when it parses as one, otherwise
/// float, or arbitrary-precision decimal in precise mode.
pub(crate) fn parse_number(text: &str, decimal: bool) -> Result<Value, InsertError> {
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::Int(n));
    }
    if decimal {
        // tolerate the trailing-dot form the scanner accepts
        let trimmed = text.strip_suffix('.').unwrap_or(text);
        trimmed
            .parse::<BigDecimal>()
            .map(Value::Decimal)
            .map_err(|_| InsertError::BadNumber(text.to_string()))
    } else {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| InsertError::BadNumber(text.to_string()))
    }
}
