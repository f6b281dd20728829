use std::fmt;

/// Error kind for codec failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input text is not a well-formed line/statement for the codec.
    Malformed,
    /// Well-formed input whose counts/shapes don't line up.
    Shape,
    /// Text could not be decoded or encoded under the configured encoding.
    Encoding,
    /// A value's type cannot be represented by the codec.
    Type,
    /// Invalid codec configuration.
    Config,
}

/// Codec error, returned by both halves of the `Codec` contract.
#[derive(Debug)]
pub struct CodecError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CodecError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, msg)
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, msg)
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encoding, msg)
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg)
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CodecError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → CodecError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<std::str::Utf8Error> for CodecError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::encoding(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for CodecError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::encoding(e.to_string())
    }
}
