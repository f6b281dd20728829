use bigdecimal::BigDecimal;

use crate::error::CodecError;

/// Canonical value representation shared by all codecs.
///
/// Covers every type a codec can decode a line into:
/// - scalars, including raw byte sequences (MySQL hex literals) and
///   arbitrary-precision decimals (the precise-numeric mode),
/// - `List`/`Map` for sequence- and mapping-shaped results.
///
/// `Map` is an ordered association list, not a hash map: column
/// declaration order is part of a decode result, and duplicate keys are
/// preserved rather than collapsed. Equality on maps ignores entry
/// order (see `PartialEq` below), since codecs are free to re-order
/// entries deterministically when encoding.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Human-readable type name, used in encode-time type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Convert a parsed JSON document into a `Value`.
    ///
    /// Numbers become `Int` when they fit in `i64`, `Float` otherwise.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into a JSON document.
    ///
    /// `Bytes` and `Decimal` have no JSON representation and fail with a
    /// `Type` error rather than being coerced; so do non-finite floats.
    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        match self {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(i) => Ok(serde_json::json!(i)),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    CodecError::type_error(format!("can't encode non-finite float {f}"))
                }),
            Value::Str(s) => Ok(serde_json::Value::String(s.clone())),
            Value::List(items) => {
                let items: Result<Vec<_>, _> = items.iter().map(Value::to_json).collect();
                Ok(serde_json::Value::Array(items?))
            }
            Value::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json()?);
                }
                Ok(serde_json::Value::Object(map))
            }
            Value::Bytes(_) | Value::Decimal(_) => Err(CodecError::type_error(format!(
                "can't encode values of type {}",
                self.type_name()
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        fn by_key(entries: &[(String, Value)]) -> Vec<&(String, Value)> {
            let mut sorted: Vec<&(String, Value)> = entries.iter().collect();
            // stable: duplicate keys keep their relative order
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            sorted
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && by_key(a) == by_key(b)
            }
            _ => false,
        }
    }
}
