use codec_api::{CodecError, ErrorKind};

/// Decode-side failure for `INSERT` statements.
///
/// Message wording is part of the contract: callers grepping pipeline
/// logs rely on the `bad INSERT, ...` prefixes.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("not an INSERT statement")]
    NotInsert,

    #[error("bad INSERT, no identifiers")]
    NoIdentifiers,

    #[error("bad INSERT, missing close paren")]
    MissingCloseParen,

    #[error("bad INSERT, no values")]
    NoValues,

    #[error("bad INSERT, odd-length hex literal 0x{0}")]
    OddLengthHex(String),

    #[error("bad number literal {0:?}")]
    BadNumber(String),

    #[error("bad INSERT, row 0 has {first} values, but row {row} has {got} values")]
    RowArityMismatch { first: usize, row: usize, got: usize },

    #[error("bad INSERT, {cols} column names but rows have {values} values")]
    ColumnCountMismatch { cols: usize, values: usize },

    #[error("incomplete INSERT, no column names")]
    NoColumnNames,

    #[error("bad INSERT, expected 1 row but got {0}")]
    NotSingleRow(usize),
}

impl InsertError {
    /// Convert to CodecError, sorting by taxonomy: count/shape
    /// mismatches are `Shape`, everything else `Malformed`.
    pub fn into_codec_error(self) -> CodecError {
        let kind = match self {
            InsertError::ColumnCountMismatch { .. }
            | InsertError::NoColumnNames
            | InsertError::NotSingleRow(_) => ErrorKind::Shape,
            _ => ErrorKind::Malformed,
        };
        CodecError::new(kind, self.to_string())
    }
}

impl From<InsertError> for CodecError {
    fn from(e: InsertError) -> Self {
        e.into_codec_error()
    }
}
