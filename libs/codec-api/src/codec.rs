use crate::error::CodecError;
use crate::value::Value;

/// Line codec: converts between one line of text and a `(key, value)` pair.
///
/// Codecs are the serialization boundary between pipeline stages: every
/// implementation reads a complete line into structured data and writes
/// structured data back into a complete line. Lines are raw bytes because
/// character encoding is the codec's own concern.
///
/// Both methods either fully succeed or fail with a descriptive
/// `CodecError`; there are no partial results and no retries. Callers own
/// the skip/abort policy for unusable lines.
pub trait Codec: Send + Sync {
    /// Decode one line into a `(key, value)` pair.
    fn read(&self, line: &[u8]) -> Result<(Value, Value), CodecError>;

    /// Encode one `(key, value)` pair back into a line.
    fn write(&self, key: &Value, value: &Value) -> Result<Vec<u8>, CodecError>;
}
