//! Codec for MySQL `INSERT` statements as emitted by mysqldump.
//!
//! One statement per line; the table name is the key. This is not a SQL
//! parser: it handles exactly the dump-file statement shapes, single-
//! and multi-row, with and without column names.

mod encode;
mod error;
mod parse;
mod scan;

use codec_api::text::{self, Encoding, decode_text, encode_text};
use codec_api::{Codec, CodecError, Value};

pub use error::InsertError;

use parse::HeaderCache;

/// Statement shape handled by a codec instance. The four mysqldump
/// protocol variants are configuration, not behavior: `complete` rows
/// decode as column-name mappings instead of positional sequences, and
/// `single_row` statements must carry exactly one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Variant {
    pub complete: bool,
    pub single_row: bool,
}

impl Variant {
    /// One positional row per statement.
    pub const INSERT: Variant = Variant { complete: false, single_row: true };
    /// Many positional rows per statement.
    pub const EXTENDED_INSERT: Variant = Variant { complete: false, single_row: false };
    /// One column-named row per statement.
    pub const COMPLETE_INSERT: Variant = Variant { complete: true, single_row: true };
    /// Many column-named rows per statement.
    pub const EXTENDED_COMPLETE_INSERT: Variant = Variant { complete: true, single_row: false };
}

impl Default for Variant {
    fn default() -> Self {
        Variant::INSERT
    }
}

/// Options shared by all variants.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MysqldumpOptions {
    /// Decode non-integer numerics as arbitrary-precision decimals
    /// instead of floats.
    pub decimal: bool,

    /// Text encoding label. `None` (the default) reads UTF-8 with a
    /// Latin-1 fallback and writes UTF-8; an explicit label is used
    /// exactly, and its failures propagate.
    pub encoding: Option<String>,

    /// Emit a tab right after the table identifier so the table name
    /// can be split out as a key without re-parsing the statement.
    pub output_tab: bool,
}

/// MySQL `INSERT` codec.
///
/// All state is per-call except the bounded header cache, which memoizes
/// the `table + columns` parse across the long same-table runs a dump
/// file contains.
pub struct MysqldumpCodec {
    variant: Variant,
    decimal: bool,
    encoding: Option<&'static Encoding>,
    output_tab: bool,
    header_cache: HeaderCache,
}

impl MysqldumpCodec {
    pub fn new(variant: Variant, options: MysqldumpOptions) -> Result<Self, CodecError> {
        let encoding = options
            .encoding
            .as_deref()
            .map(text::encoding_for_label)
            .transpose()?;
        Ok(Self {
            variant,
            decimal: options.decimal,
            encoding,
            output_tab: options.output_tab,
            header_cache: HeaderCache::new(),
        })
    }

    /// One positional row per statement.
    pub fn insert(options: MysqldumpOptions) -> Result<Self, CodecError> {
        Self::new(Variant::INSERT, options)
    }

    /// Many positional rows per statement.
    pub fn extended_insert(options: MysqldumpOptions) -> Result<Self, CodecError> {
        Self::new(Variant::EXTENDED_INSERT, options)
    }

    /// One column-named row per statement.
    pub fn complete_insert(options: MysqldumpOptions) -> Result<Self, CodecError> {
        Self::new(Variant::COMPLETE_INSERT, options)
    }

    /// Many column-named rows per statement.
    pub fn extended_complete_insert(options: MysqldumpOptions) -> Result<Self, CodecError> {
        Self::new(Variant::EXTENDED_COMPLETE_INSERT, options)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl Codec for MysqldumpCodec {
    fn read(&self, line: &[u8]) -> Result<(Value, Value), CodecError> {
        let sql = decode_text(line, self.encoding)?;
        let stmt = parse::parse_insert(&sql, self.decimal, &self.header_cache)?;
        let (table, value) = parse::materialize(stmt, self.variant)?;
        Ok((Value::Str(table), value))
    }

    fn write(&self, key: &Value, value: &Value) -> Result<Vec<u8>, CodecError> {
        let sql = encode::dump_as_insert(key, value, self.variant, self.output_tab)?;
        encode_text(&sql, self.encoding)
    }
}
