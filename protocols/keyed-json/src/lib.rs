//! Keyed JSON codec: `key<TAB>json` lines.
//!
//! The key is plain text, the value a JSON document restricted to
//! mappings and sequences. Useful as an internal protocol when a stage
//! needs key ordering plus a structured value.

use codec_api::text::{decode_text, encode_text};
use codec_api::{Codec, CodecError, Value};

pub struct KeyedJsonCodec;

fn check_value_type(value: &Value) -> Result<(), CodecError> {
    match value {
        Value::List(_) | Value::Map(_) => Ok(()),
        other => Err(CodecError::type_error(format!(
            "value is not an acceptable type ({})",
            other.type_name()
        ))),
    }
}

impl Codec for KeyedJsonCodec {
    fn read(&self, line: &[u8]) -> Result<(Value, Value), CodecError> {
        let text = decode_text(line, None)?;
        let (key, json_text) = text
            .split_once('\t')
            .ok_or_else(|| CodecError::malformed("missing tab between key and value"))?;
        let json: serde_json::Value = serde_json::from_str(json_text)?;
        let value = Value::from_json(json);
        check_value_type(&value)?;
        Ok((Value::Str(key.to_string()), value))
    }

    fn write(&self, key: &Value, value: &Value) -> Result<Vec<u8>, CodecError> {
        let key = key.as_str().ok_or_else(|| {
            CodecError::type_error(format!("key must be text, got {}", key.type_name()))
        })?;
        check_value_type(value)?;
        let json = serde_json::to_string(&value.to_json()?)?;
        encode_text(&format!("{key}\t{json}"), None)
    }
}

#[cfg(test)]
mod tests {
    use codec_api::{Codec, Value};

    use super::KeyedJsonCodec;

    #[test]
    fn reads_a_mapping_line() {
        let p = KeyedJsonCodec;
        let (key, value) = p
            .read(br#"54321	{"foo":123,"bar":456,"baz":"oh noes!"}"#)
            .unwrap();
        assert_eq!(key, Value::Str("54321".to_string()));
        assert_eq!(
            value,
            Value::Map(vec![
                ("foo".to_string(), Value::Int(123)),
                ("bar".to_string(), Value::Int(456)),
                ("baz".to_string(), Value::Str("oh noes!".to_string())),
            ])
        );
    }

    #[test]
    fn reads_a_sequence_line() {
        let p = KeyedJsonCodec;
        let (key, value) = p.read(br#"54321	["foo","bar",456, 789]"#).unwrap();
        assert_eq!(key, Value::Str("54321".to_string()));
        assert_eq!(
            value,
            Value::List(vec![
                Value::Str("foo".to_string()),
                Value::Str("bar".to_string()),
                Value::Int(456),
                Value::Int(789),
            ])
        );
    }

    #[test]
    fn rejects_scalar_values() {
        let p = KeyedJsonCodec;
        assert!(p.read(b"k\t42").is_err());
        assert!(p.read(b"k\t\"just a string\"").is_err());
        assert!(p.write(&Value::Str("k".to_string()), &Value::Int(42)).is_err());
    }

    #[test]
    fn rejects_lines_without_a_tab() {
        let p = KeyedJsonCodec;
        assert!(p.read(b"[1, 2, 3]").is_err());
    }

    #[test]
    fn rejects_json_unrepresentable_values() {
        let p = KeyedJsonCodec;
        let value = Value::List(vec![Value::Bytes(vec![1, 2])]);
        assert!(p.write(&Value::Str("k".to_string()), &value).is_err());
    }

    #[test]
    fn round_trips_key_and_value() {
        let p = KeyedJsonCodec;
        let cases = [
            (
                Value::Str("foo".to_string()),
                Value::Map(vec![
                    ("foo".to_string(), Value::Int(123)),
                    ("bar".to_string(), Value::Int(456)),
                ]),
            ),
            (
                Value::Str("123".to_string()),
                Value::List(vec![
                    Value::Int(1),
                    Value::Float(2.5),
                    Value::Null,
                    Value::Bool(true),
                    Value::Str("Qu\u{e9}bec".to_string()),
                ]),
            ),
        ];
        for (key, value) in cases {
            let line = p.write(&key, &value).unwrap();
            assert_eq!(p.read(&line).unwrap(), (key.clone(), value.clone()));

            // re-encoding what we decoded is stable
            let (key2, value2) = p.read(&line).unwrap();
            assert_eq!(p.write(&key2, &value2).unwrap(), line);
        }
    }
}
