use std::borrow::Cow;

pub use encoding_rs::Encoding;

use crate::error::CodecError;

/// Resolve an encoding label ("utf-8", "latin1", "cp1251", ...) to an
/// encoding, using WHATWG label semantics. Note that per WHATWG the
/// "latin1" label resolves to windows-1252.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, CodecError> {
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| CodecError::config(format!("unknown encoding label {label:?}")))
}

/// Decode raw line bytes into text.
///
/// With an explicit encoding, malformed input is an error. Without one,
/// try UTF-8 first and fall back to ISO-8859-1; the fallback maps each
/// byte to U+0000..=U+00FF and therefore cannot fail.
pub fn decode_text<'a>(
    bytes: &'a [u8],
    encoding: Option<&'static Encoding>,
) -> Result<Cow<'a, str>, CodecError> {
    match encoding {
        Some(enc) => {
            let (text, _, had_errors) = enc.decode(bytes);
            if had_errors {
                return Err(CodecError::encoding(format!(
                    "input is not valid {}",
                    enc.name()
                )));
            }
            Ok(text)
        }
        None => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Cow::Borrowed(text)),
            Err(_) => {
                tracing::debug!(len = bytes.len(), "input is not UTF-8, decoding as latin-1");
                Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
            }
        },
    }
}

/// Encode text into line bytes: UTF-8 when no encoding is configured,
/// otherwise the configured encoding, failing on unmappable characters.
pub fn encode_text(text: &str, encoding: Option<&'static Encoding>) -> Result<Vec<u8>, CodecError> {
    match encoding {
        Some(enc) => {
            let (bytes, _, had_errors) = enc.encode(text);
            if had_errors {
                return Err(CodecError::encoding(format!(
                    "text is not representable in {}",
                    enc.name()
                )));
            }
            Ok(bytes.into_owned())
        }
        None => Ok(text.as_bytes().to_vec()),
    }
}
