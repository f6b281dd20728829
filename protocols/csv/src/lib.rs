//! CSV codec: comma-separated, quote-delimited fields.
//!
//! Primarily useful for reading raw input files; every field decodes as
//! text with surrounding whitespace trimmed, and the key is always
//! null. Not recommended as an internal protocol.

use codec_api::text::{decode_text, encode_text};
use codec_api::{Codec, CodecError, Value};

pub struct CsvCodec {
    quote: char,
}

impl CsvCodec {
    /// Double-quoted fields (the common form).
    pub fn new() -> Self {
        Self { quote: '"' }
    }

    /// Single-quoted fields.
    pub fn single_quoted() -> Self {
        Self { quote: '\'' }
    }

    fn push_field(&self, out: &mut String, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Str(s) => {
                out.push(self.quote);
                for c in s.chars() {
                    out.push(c);
                    if c == self.quote {
                        // escaped by doubling
                        out.push(c);
                    }
                }
                out.push(self.quote);
            }
            Value::Null => {}
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(f) => out.push_str(&f.to_string()),
            Value::Decimal(d) => out.push_str(&d.to_string()),
            other => {
                return Err(CodecError::type_error(format!(
                    "can't encode values of type {}",
                    other.type_name()
                )));
            }
        }
        Ok(())
    }
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for CsvCodec {
    fn read(&self, line: &[u8]) -> Result<(Value, Value), CodecError> {
        let text = decode_text(line, None)?;
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return Err(CodecError::malformed("empty line"));
        }
        let fields = parse_fields(text, self.quote);
        let values = fields.into_iter().map(Value::Str).collect();
        Ok((Value::Null, Value::List(values)))
    }

    fn write(&self, _key: &Value, value: &Value) -> Result<Vec<u8>, CodecError> {
        let items = value.as_list().ok_or_else(|| {
            CodecError::type_error(format!(
                "expected a sequence of fields, got {}",
                value.type_name()
            ))
        })?;
        let mut out = String::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.push_field(&mut out, item)?;
        }
        encode_text(&out, None)
    }
}

/// Split one line into fields, honoring quoting. A quoted field may
/// contain separators and doubled quote characters; whitespace around
/// every field is trimmed.
fn parse_fields(line: &str, quote: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        // space between the separator and the field
        while matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        }

        let mut field = String::new();
        let mut saw_separator = false;

        if chars.peek() == Some(&quote) {
            chars.next(); // opening quote
            loop {
                match chars.next() {
                    Some(c) if c == quote => {
                        if chars.peek() == Some(&quote) {
                            chars.next();
                            field.push(quote);
                        } else {
                            break;
                        }
                    }
                    Some(c) => field.push(c),
                    None => break, // EOF inside quotes, best effort
                }
            }
            // anything after the closing quote up to the separator is junk
            loop {
                match chars.next() {
                    Some(',') => {
                        saw_separator = true;
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        } else {
            loop {
                match chars.next() {
                    Some(',') => {
                        saw_separator = true;
                        break;
                    }
                    Some(c) => field.push(c),
                    None => break,
                }
            }
        }

        fields.push(field.trim().to_string());

        if !saw_separator {
            break;
        }
        if chars.peek().is_none() {
            // trailing separator → one final empty field
            fields.push(String::new());
            break;
        }
    }

    fields
}
