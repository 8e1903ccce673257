use serde_json::Value;

use crate::error::{HiveError, HiveResult};
use crate::models::{Record, FIELD_DELIMITER};

/// How rows whose cell count differs from the field count are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaterializeMode {
    /// Pair names and cells up to the shorter of the two
    #[default]
    Lenient,
    /// Reject any row whose cell count differs from the field count
    Strict,
}

/// Turns tab-delimited result rows into records keyed by field name
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMaterializer {
    mode: MaterializeMode,
}

impl ResultMaterializer {
    pub fn new(mode: MaterializeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MaterializeMode {
        self.mode
    }

    pub fn materialize<S: AsRef<str>>(&self, fields: &[String], rows: &[S]) -> HiveResult<Vec<Record>> {
        match self.mode {
            MaterializeMode::Lenient => Ok(materialize(fields, rows)),
            MaterializeMode::Strict => rows
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    let cells: Vec<&str> = row.as_ref().split(FIELD_DELIMITER).collect();
                    if cells.len() != fields.len() {
                        return Err(HiveError::Materialization {
                            row: index,
                            expected: fields.len(),
                            found: cells.len(),
                        });
                    }
                    Ok(to_record(fields, cells))
                })
                .collect(),
        }
    }
}

/// Lenient materialization: cell `i` maps to `fields[i]`, extra cells or
/// extra fields are dropped.
///
/// Mismatched rows are not reported, so malformed engine output can go
/// unnoticed; use `MaterializeMode::Strict` where that matters.
pub fn materialize<S: AsRef<str>>(fields: &[String], rows: &[S]) -> Vec<Record> {
    rows.iter()
        .map(|row| to_record(fields, row.as_ref().split(FIELD_DELIMITER)))
        .collect()
}

fn to_record<'a, I>(fields: &[String], cells: I) -> Record
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .iter()
        .zip(cells)
        .map(|(field, cell)| (field.clone(), Value::String(cell.to_string())))
        .collect()
}
