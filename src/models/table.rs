use serde::{Deserialize, Serialize};

use super::metadata::{ColumnDefinition, LogicalType};

/// Field delimiter for every table this adapter creates and every result row it reads
pub const FIELD_DELIMITER: char = '\t';

/// Row format clause matching `FIELD_DELIMITER`
pub const ROW_FORMAT: &str = "ROW FORMAT DELIMITED FIELDS TERMINATED BY '\\t'";

/// Table layout used to build a CREATE TABLE statement.
///
/// Regular columns and partition columns are kept in separate ordered lists,
/// so partition columns always follow regular ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    name: String,
    columns: Vec<ColumnDefinition>,
    partitions: Vec<ColumnDefinition>,
    external: bool,
}

impl TableDefinition {
    pub fn builder(name: impl Into<String>) -> TableDefinitionBuilder {
        TableDefinitionBuilder {
            definition: TableDefinition {
                name: name.into(),
                columns: Vec::new(),
                partitions: Vec::new(),
                external: true,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn partitions(&self) -> &[ColumnDefinition] {
        &self.partitions
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Regular columns followed by partition columns
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().chain(self.partitions.iter())
    }
}

/// Builder for `TableDefinition`
#[derive(Debug, Clone)]
pub struct TableDefinitionBuilder {
    definition: TableDefinition,
}

impl TableDefinitionBuilder {
    /// Tables are external unless told otherwise
    pub fn external(mut self, external: bool) -> Self {
        self.definition.external = external;
        self
    }

    pub fn column(self, name: impl Into<String>, logical_type: LogicalType) -> Self {
        self.column_def(ColumnDefinition::new(name, logical_type))
    }

    pub fn column_def(mut self, mut column: ColumnDefinition) -> Self {
        column.partition = false;
        self.definition.columns.push(column);
        self
    }

    pub fn partition(self, name: impl Into<String>, logical_type: LogicalType) -> Self {
        self.partition_def(ColumnDefinition::new(name, logical_type))
    }

    pub fn partition_def(mut self, mut column: ColumnDefinition) -> Self {
        column.partition = true;
        self.definition.partitions.push(column);
        self
    }

    pub fn build(self) -> TableDefinition {
        self.definition
    }
}

/// Options for CREATE TABLE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateTableOptions {
    /// Drop an existing table of the same name first
    pub force: bool,
}

/// Options for ALTER TABLE ... ADD COLUMNS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddColumnOptions {
    pub default: Option<String>,
}
