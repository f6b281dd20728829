//! Single-line YAML codec.
//!
//! Reads full YAML restricted to safe types (a superset of JSON);
//! writes flow-style single-line documents in JSON syntax, which is the
//! flow subset of YAML. Keyed lines are `yaml(key)<TAB>yaml(value)`;
//! the value-only mode reads whole lines as values with a null key.

use std::sync::Mutex;

use codec_api::text::{decode_text, encode_text};
use codec_api::{Codec, CodecError, Value};

pub struct YamlCodec {
    keyed: bool,
    /// Keys repeat across long runs of lines; memoize the last parse.
    key_cache: Mutex<Option<(String, Value)>>,
}

impl YamlCodec {
    /// `yaml(key)<TAB>yaml(value)` lines.
    pub fn keyed() -> Self {
        Self {
            keyed: true,
            key_cache: Mutex::new(None),
        }
    }

    /// Whole-line values with a null key.
    pub fn value_only() -> Self {
        Self {
            keyed: false,
            key_cache: Mutex::new(None),
        }
    }

    fn load_key(&self, text: &str) -> Result<Value, CodecError> {
        let mut cache = self.key_cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((cached_text, cached)) = cache.as_ref() {
            if cached_text == text {
                return Ok(cached.clone());
            }
        }
        let key = load_yaml(text)?;
        *cache = Some((text.to_string(), key.clone()));
        Ok(key)
    }
}

impl Codec for YamlCodec {
    fn read(&self, line: &[u8]) -> Result<(Value, Value), CodecError> {
        let text = decode_text(line, None)?;
        if self.keyed {
            let (key_text, value_text) = text
                .split_once('\t')
                .ok_or_else(|| CodecError::malformed("missing tab between key and value"))?;
            Ok((self.load_key(key_text)?, load_yaml(value_text)?))
        } else {
            Ok((Value::Null, load_yaml(&text)?))
        }
    }

    fn write(&self, key: &Value, value: &Value) -> Result<Vec<u8>, CodecError> {
        let line = if self.keyed {
            format!("{}\t{}", dump_yaml(key)?, dump_yaml(value)?)
        } else {
            dump_yaml(value)?
        };
        encode_text(&line, None)
    }
}

/// Parse one YAML document. Tagged nodes are rejected; only types with
/// portable representations across YAML implementations are accepted.
fn load_yaml(text: &str) -> Result<Value, CodecError> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| CodecError::malformed(e.to_string()))?;
    yaml_to_value(doc)
}

fn yaml_to_value(doc: serde_yaml::Value) -> Result<Value, CodecError> {
    match doc {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::Str(s)),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(yaml_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        serde_yaml::Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (k, v) in mapping {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(CodecError::type_error(format!(
                            "unsupported mapping key: {other:?}"
                        )));
                    }
                };
                entries.push((key, yaml_to_value(v)?));
            }
            Ok(Value::Map(entries))
        }
        serde_yaml::Value::Tagged(tagged) => Err(CodecError::type_error(format!(
            "unsupported YAML tag {}",
            tagged.tag
        ))),
    }
}

/// Emit one single-line YAML document in JSON syntax.
fn dump_yaml(value: &Value) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&value.to_json()?)?)
}

#[cfg(test)]
mod tests {
    use codec_api::{Codec, Value};

    use super::YamlCodec;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn keyed_lines_split_on_tab() {
        let p = YamlCodec::keyed();
        let (key, value) = p.read(b"foo\t{a: 1, b: [2, 3]}").unwrap();
        assert_eq!(key, s("foo"));
        assert_eq!(
            value,
            Value::Map(vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::List(vec![Value::Int(2), Value::Int(3)])),
            ])
        );
    }

    #[test]
    fn value_only_reads_whole_lines() {
        let p = YamlCodec::value_only();
        let (key, value) = p.read(b"[1, 2.5, null, true]").unwrap();
        assert_eq!(key, Value::Null);
        assert_eq!(
            value,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Null,
                Value::Bool(true),
            ])
        );
    }

    #[test]
    fn repeated_keys_hit_the_cache() {
        let p = YamlCodec::keyed();
        let (key1, _) = p.read(b"[1, 2]\t1").unwrap();
        let (key2, _) = p.read(b"[1, 2]\t2").unwrap();
        let (key3, _) = p.read(b"[3, 4]\t3").unwrap();
        assert_eq!(key1, Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(key1, key2);
        assert_eq!(key3, Value::List(vec![Value::Int(3), Value::Int(4)]));
    }

    #[test]
    fn tagged_nodes_are_rejected() {
        let p = YamlCodec::value_only();
        assert!(p.read(b"!mytag {a: 1}").is_err());
    }

    #[test]
    fn round_trips_keys_and_values() {
        let p = YamlCodec::keyed();
        let cases = [
            (Value::Null, Value::List(vec![])),
            (s("foo"), s("bar")),
            (Value::Int(1), Value::Int(2)),
            (
                Value::List(vec![Value::Int(1), Value::Int(2)]),
                Value::Map(vec![("apples".to_string(), Value::Int(5))]),
            ),
            (s("Qu\u{e9}bec"), s("Ph\u{1ede}")),
            (s("\t"), s("\n")),
        ];
        for (key, value) in cases {
            let line = p.write(&key, &value).unwrap();
            assert_eq!(p.read(&line).unwrap(), (key.clone(), value.clone()));

            let (key2, value2) = p.read(&line).unwrap();
            assert_eq!(p.write(&key2, &value2).unwrap(), line);
        }
    }

    #[test]
    fn value_only_round_trip() {
        let p = YamlCodec::value_only();
        let value = Value::Map(vec![(
            "oranges".to_string(),
            Value::List(vec![Value::Int(20), Value::Bool(false), Value::Null]),
        )]);
        let line = p.write(&Value::Null, &value).unwrap();
        assert_eq!(p.read(&line).unwrap(), (Value::Null, value));
    }
}
