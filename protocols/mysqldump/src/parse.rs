//! Statement assembly: recover the table name, declared columns, and
//! rows of values from one `INSERT` statement.

use std::collections::HashMap;
use std::sync::Mutex;

use codec_api::Value;

use crate::Variant;
use crate::error::InsertError;
use crate::scan::{self, Scanner, Token};

/// Decode result before materialization. Invariant: every row has the
/// same arity, and `columns` is either empty or matches that arity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub table: String,
    /// Declared column names; empty when the statement names none.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Everything between the `INSERT` prefix and the first occurrence of
/// this separator is header; everything after it is row data.
const VALUES_SEPARATOR: &str = " VALUES ";

pub(crate) fn parse_insert(
    sql: &str,
    decimal: bool,
    cache: &HeaderCache,
) -> Result<Statement, InsertError> {
    if !sql.starts_with("INSERT") {
        return Err(InsertError::NotInsert);
    }

    // Single split: identifiers can then only occur in the header and
    // row data only after it, so neither scan can confuse the two.
    let (header, values) = sql
        .split_once(VALUES_SEPARATOR)
        .ok_or(InsertError::NoValues)?;

    let (table, columns) = cache.get_or_parse(header)?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut current_row: Vec<Value> = Vec::new();
    for token in Scanner::new(values) {
        match token {
            Token::Null => current_row.push(Value::Null),
            Token::Str(body) => current_row.push(Value::Str(scan::unescape_string(body))),
            Token::Hex(digits) => current_row.push(Value::Bytes(scan::decode_hex(digits)?)),
            Token::Number(text) => current_row.push(scan::parse_number(text, decimal)?),
            Token::CloseParen => {
                if !current_row.is_empty() {
                    rows.push(std::mem::take(&mut current_row));
                }
            }
            // the values scanner has no identifier matcher
            Token::Identifier(_) => unreachable!("identifier in values segment"),
        }
    }

    if !current_row.is_empty() {
        return Err(InsertError::MissingCloseParen);
    }
    if rows.is_empty() {
        return Err(InsertError::NoValues);
    }

    // Cross-row arity is checked for every row, even though declared
    // columns would constrain it again below.
    let row_len = rows[0].len();
    for (i, row) in rows.iter().enumerate().skip(1) {
        if row.len() != row_len {
            return Err(InsertError::RowArityMismatch {
                first: row_len,
                row: i,
                got: row.len(),
            });
        }
    }

    if !columns.is_empty() && columns.len() != row_len {
        return Err(InsertError::ColumnCountMismatch {
            cols: columns.len(),
            values: row_len,
        });
    }

    Ok(Statement { table, columns, rows })
}

/// Shape assembler output per the configured variant: positional rows or
/// column-named mappings, one row or a sequence of them.
pub(crate) fn materialize(
    stmt: Statement,
    variant: Variant,
) -> Result<(String, Value), InsertError> {
    let Statement { table, columns, rows } = stmt;

    let mut results: Vec<Value> = if variant.complete {
        if columns.is_empty() {
            return Err(InsertError::NoColumnNames);
        }
        rows.into_iter()
            .map(|row| Value::Map(columns.iter().cloned().zip(row).collect()))
            .collect()
    } else {
        rows.into_iter().map(Value::List).collect()
    };

    let value = if variant.single_row {
        match results.len() {
            1 => results.remove(0),
            n => return Err(InsertError::NotSingleRow(n)),
        }
    } else {
        Value::List(results)
    };

    Ok((table, value))
}

fn parse_header(header: &str) -> Result<(String, Vec<String>), InsertError> {
    let mut identifiers = scan::header_identifiers(header).into_iter();
    let table = identifiers
        .next()
        .ok_or(InsertError::NoIdentifiers)?
        .to_string();
    let columns = identifiers.map(str::to_string).collect();
    Ok((table, columns))
}

/// Bounded memo of parsed header segments.
///
/// mysqldump emits long runs of statements sharing one header, so the
/// table/column parse is paid once per run. Cleared wholesale when full.
/// Purely an optimization; results must be indistinguishable from
/// re-parsing.
pub(crate) struct HeaderCache {
    entries: Mutex<HashMap<String, (String, Vec<String>)>>,
}

const HEADER_CACHE_CAP: usize = 100;

impl HeaderCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_parse(&self, header: &str) -> Result<(String, Vec<String>), InsertError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parsed) = entries.get(header) {
            return Ok(parsed.clone());
        }
        let parsed = parse_header(header)?;
        if entries.len() >= HEADER_CACHE_CAP {
            tracing::debug!(entries = entries.len(), "header cache full, clearing");
            entries.clear();
        }
        entries.insert(header.to_string(), parsed.clone());
        Ok(parsed)
    }
}
