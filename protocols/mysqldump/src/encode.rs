//! Render structured rows back into a syntactically valid `INSERT`
//! statement, the exact inverse of the decode pipeline.

use codec_api::{CodecError, Value};

use crate::Variant;

pub(crate) fn dump_as_insert(
    key: &Value,
    data: &Value,
    variant: Variant,
    output_tab: bool,
) -> Result<String, CodecError> {
    let table = match key {
        Value::Str(name) if !name.is_empty() => name,
        _ => return Err(CodecError::type_error("Bad table name")),
    };

    // Normalize to a sequence of rows; a single-row codec's data *is*
    // the one row.
    let rows: Vec<&Value> = if variant.single_row {
        vec![data]
    } else {
        match data {
            Value::List(rows) => rows.iter().collect(),
            other => {
                return Err(CodecError::type_error(format!(
                    "expected a sequence of rows, got {}",
                    other.type_name()
                )));
            }
        }
    };
    if rows.is_empty() {
        return Err(CodecError::type_error("No data to insert"));
    }

    let (columns, value_rows) = if variant.complete {
        named_rows(&rows)?
    } else {
        (Vec::new(), positional_rows(&rows)?)
    };

    let mut sql = String::new();
    sql.push_str("INSERT INTO ");
    push_identifier(&mut sql, table);
    if output_tab {
        // makes the table name splittable as a key by downstream
        // line-oriented tools
        sql.push('\t');
    }
    if !columns.is_empty() {
        sql.push_str(" (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            push_identifier(&mut sql, col);
        }
        sql.push(')');
    }
    sql.push_str(" VALUES ");
    for (i, row) in value_rows.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                sql.push(',');
            }
            push_value(&mut sql, value)?;
        }
        sql.push(')');
    }
    sql.push(';');

    Ok(sql)
}

/// Mapping-shaped rows: every row must declare the identical column set,
/// compared and rendered in sorted order for determinism.
fn named_rows<'a>(rows: &[&'a Value]) -> Result<(Vec<&'a str>, Vec<Vec<&'a Value>>), CodecError> {
    let mut columns: Vec<&str> = Vec::new();
    let mut out = Vec::with_capacity(rows.len());
    for (row_num, row) in rows.iter().enumerate() {
        let entries = row.as_map().ok_or_else(|| {
            CodecError::type_error(format!(
                "row {row_num} is not a mapping ({})",
                row.type_name()
            ))
        })?;
        let mut pairs: Vec<(&str, &Value)> =
            entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        pairs.sort_by_key(|(k, _)| *k);

        let row_cols: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        if row_num == 0 {
            columns = row_cols;
        } else if columns != row_cols {
            return Err(CodecError::shape(format!(
                "row 0 has columns {columns:?}, but row {row_num} has columns {row_cols:?}"
            )));
        }
        out.push(pairs.into_iter().map(|(_, v)| v).collect());
    }
    if columns.is_empty() {
        return Err(CodecError::type_error("No data to insert"));
    }
    Ok((columns, out))
}

/// Sequence-shaped rows: every row must have the first row's arity.
fn positional_rows<'a>(rows: &[&'a Value]) -> Result<Vec<Vec<&'a Value>>, CodecError> {
    let mut out: Vec<Vec<&Value>> = Vec::with_capacity(rows.len());
    for (row_num, row) in rows.iter().enumerate() {
        let items = row.as_list().ok_or_else(|| {
            CodecError::type_error(format!(
                "row {row_num} is not a sequence ({})",
                row.type_name()
            ))
        })?;
        if row_num > 0 && items.len() != out[0].len() {
            return Err(CodecError::shape(format!(
                "row 0 has {} items, but row {row_num} has {} items",
                out[0].len(),
                items.len()
            )));
        }
        out.push(items.iter().collect());
    }
    if out[0].is_empty() {
        return Err(CodecError::type_error("No data to insert"));
    }
    Ok(out)
}

fn push_identifier(out: &mut String, name: &str) {
    out.push('`');
    out.push_str(name);
    out.push('`');
}

fn push_value(out: &mut String, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(CodecError::type_error(format!(
                    "can't encode non-finite float {f}"
                )));
            }
            // keep integral floats float-typed on re-decode
            if f.fract() == 0.0 {
                out.push_str(&format!("{f:.1}"));
            } else {
                out.push_str(&f.to_string());
            }
        }
        Value::Decimal(d) => out.push_str(&d.to_string()),
        Value::Str(s) => {
            out.push('\'');
            push_escaped(out, s);
            out.push('\'');
        }
        Value::Bytes(bytes) => {
            if bytes.is_empty() {
                // `0x` with no digits is not a scannable lexeme
                return Err(CodecError::type_error("can't encode an empty byte string"));
            }
            out.push_str("0x");
            for b in bytes {
                out.push_str(&format!("{b:02X}"));
            }
        }
        other => {
            return Err(CodecError::type_error(format!(
                "can't encode values of type {}",
                other.type_name()
            )));
        }
    }
    Ok(())
}

/// Inverse of the decoder's escape table, plus backslash and the quote
/// character itself so that every decodable string survives a round
/// trip.
fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '\'' => out.push_str(r"\'"),
            '\r' => out.push_str(r"\r"),
            '\n' => out.push_str(r"\n"),
            '\u{8}' => out.push_str(r"\b"),
            '\t' => out.push_str(r"\t"),
            '\0' => out.push_str(r"\0"),
            '\u{1a}' => out.push_str(r"\Z"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use codec_api::Value;

    use super::dump_as_insert;
    use crate::Variant;

    fn table() -> Value {
        Value::Str("user".to_string())
    }

    #[test]
    fn renders_a_positional_single_row() {
        let data = Value::List(vec![
            Value::Int(1),
            Value::Str("David Marin".to_string()),
            Value::Float(25.25),
            Value::Bytes(vec![0xC0, 0xDE]),
            Value::Null,
        ]);
        let sql = dump_as_insert(&table(), &data, Variant::INSERT, false).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO `user` VALUES (1,'David Marin',25.25,0xC0DE,NULL);"
        );
    }

    #[test]
    fn renders_multiple_rows_with_separator() {
        let data = Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Null]),
            Value::List(vec![Value::Int(2), Value::Str("B".to_string())]),
        ]);
        let sql = dump_as_insert(&table(), &data, Variant::EXTENDED_INSERT, false).unwrap();
        assert_eq!(sql, "INSERT INTO `user` VALUES (1,NULL), (2,'B');");
    }

    #[test]
    fn named_rows_render_sorted_columns() {
        let data = Value::Map(vec![
            ("name".to_string(), Value::Str("A".to_string())),
            ("id".to_string(), Value::Int(1)),
        ]);
        let sql = dump_as_insert(&table(), &data, Variant::COMPLETE_INSERT, false).unwrap();
        assert_eq!(sql, "INSERT INTO `user` (`id`,`name`) VALUES (1,'A');");
    }

    #[test]
    fn output_tab_follows_the_table_name() {
        let data = Value::List(vec![Value::Int(1)]);
        let sql = dump_as_insert(&table(), &data, Variant::INSERT, true).unwrap();
        assert_eq!(sql, "INSERT INTO `user`\t VALUES (1);");
    }

    #[test]
    fn integral_floats_stay_floats() {
        let data = Value::List(vec![Value::Float(1.0)]);
        let sql = dump_as_insert(&table(), &data, Variant::INSERT, false).unwrap();
        assert_eq!(sql, "INSERT INTO `user` VALUES (1.0);");
    }

    #[test]
    fn strings_escape_quotes_backslashes_and_controls() {
        let data = Value::List(vec![Value::Str("it's a\\b\r\n\t\0\u{8}\u{1a}".to_string())]);
        let sql = dump_as_insert(&table(), &data, Variant::INSERT, false).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO `user` VALUES ('it\\'s a\\\\b\\r\\n\\t\\0\\b\\Z');"
        );
    }

    #[test]
    fn rejects_bad_table_names() {
        let data = Value::List(vec![Value::Int(1)]);
        for key in [Value::Str(String::new()), Value::Int(7), Value::Null] {
            let err = dump_as_insert(&key, &data, Variant::INSERT, false).unwrap_err();
            assert_eq!(err.message, "Bad table name");
        }
    }

    #[test]
    fn rejects_empty_data() {
        let err =
            dump_as_insert(&table(), &Value::List(vec![]), Variant::INSERT, false).unwrap_err();
        assert_eq!(err.message, "No data to insert");

        let err = dump_as_insert(
            &table(),
            &Value::List(vec![]),
            Variant::EXTENDED_INSERT,
            false,
        )
        .unwrap_err();
        assert_eq!(err.message, "No data to insert");
    }

    #[test]
    fn rejects_inconsistent_columns_naming_the_row() {
        let data = Value::List(vec![
            Value::Map(vec![("a".to_string(), Value::Int(1))]),
            Value::Map(vec![("b".to_string(), Value::Int(2))]),
        ]);
        let err = dump_as_insert(&table(), &data, Variant::EXTENDED_COMPLETE_INSERT, false)
            .unwrap_err();
        assert!(err.message.contains("row 1 has columns"), "{}", err.message);
    }

    #[test]
    fn rejects_inconsistent_arity_naming_the_row() {
        let data = Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(3)]),
        ]);
        let err =
            dump_as_insert(&table(), &data, Variant::EXTENDED_INSERT, false).unwrap_err();
        assert_eq!(err.message, "row 0 has 2 items, but row 1 has 1 items");
    }

    #[test]
    fn rejects_unencodable_types() {
        for bad in [
            Value::Bool(true),
            Value::List(vec![]),
            Value::Map(vec![]),
            Value::Float(f64::NAN),
            Value::Bytes(vec![]),
        ] {
            let data = Value::List(vec![bad]);
            assert!(dump_as_insert(&table(), &data, Variant::INSERT, false).is_err());
        }
    }
}
