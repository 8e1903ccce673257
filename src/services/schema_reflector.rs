use crate::error::{HiveError, HiveResult};
use crate::models::{ColumnComment, ColumnDefinition};

/// Marks the end of the column section in DESCRIBE FORMATTED output
pub const DETAILED_INFO_HEADER: &str = "# Detailed Table Information";
/// Marks the start of the partition columns block
pub const PARTITION_HEADER: &str = "# Partition Information";
/// Column header line repeated at the top of each block
pub const COLUMN_HEADER: &str = "# col_name";

/// Reads typed column definitions out of `DESCRIBE FORMATTED` output
pub struct SchemaReflector;

impl SchemaReflector {
    /// Parse the lines of `DESCRIBE FORMATTED <table>`.
    ///
    /// Only lines before the detailed table information header are column
    /// lines. Columns after the partition header are partition columns; that
    /// header is the only thing telling the two kinds apart.
    pub fn reflect<S: AsRef<str>>(table: &str, lines: &[S]) -> HiveResult<Vec<ColumnDefinition>> {
        let detail_index = lines
            .iter()
            .position(|line| line.as_ref().trim_start().starts_with(DETAILED_INFO_HEADER))
            .ok_or_else(|| HiveError::SchemaParse {
                table: table.to_string(),
                message: format!("'{}' section not found in DESCRIBE output", DETAILED_INFO_HEADER),
            })?;

        let mut in_partitions = false;
        let mut columns = Vec::new();

        for line in &lines[..detail_index] {
            let line = line.as_ref().trim();
            if line.starts_with(PARTITION_HEADER) {
                in_partitions = true;
                continue;
            }
            if line.is_empty() || line.starts_with(COLUMN_HEADER) {
                continue;
            }
            columns.push(Self::parse_column_line(table, line, in_partitions)?);
        }

        Ok(columns)
    }

    /// Split a column line into name, declared type and comment
    fn parse_column_line(table: &str, line: &str, partition: bool) -> HiveResult<ColumnDefinition> {
        let (name, rest) = split_field(line);
        let (sql_type, rest) = split_field(rest);
        if name.is_empty() || sql_type.is_empty() {
            return Err(HiveError::SchemaParse {
                table: table.to_string(),
                message: format!("malformed column line: {:?}", line),
            });
        }
        // The comment is the rest of the line
        let comment = rest.trim();

        Ok(ColumnDefinition::reflected(
            name,
            sql_type,
            ColumnComment::parse(comment),
            partition,
        ))
    }
}

/// Next whitespace-delimited field and the remaining text
fn split_field(text: &str) -> (&str, &str) {
    let trimmed = text.trim_start();
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    trimmed.split_at(end)
}
