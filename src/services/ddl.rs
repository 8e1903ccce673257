use serde::Serialize;

use crate::error::{HiveError, HiveResult};
use crate::models::{ColumnDefinition, TableDefinition, ROW_FORMAT};
use crate::validation::{quote_identifier, quote_table_name};

/// Ordered statements to run one after another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    statements: Vec<String>,
}

impl ExecutionPlan {
    fn push(&mut self, statement: String) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl IntoIterator for ExecutionPlan {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// Builds HiveQL DDL from typed definitions.
///
/// Every column, partition columns included, gets a `COMMENT` holding its
/// logical type and default, in the format `SchemaReflector` decodes.
pub struct DdlGenerator;

impl DdlGenerator {
    /// CREATE TABLE, preceded by DROP TABLE when `force_recreate` and the table `exists`
    pub fn build_create_table(
        definition: &TableDefinition,
        force_recreate: bool,
        exists: bool,
    ) -> HiveResult<ExecutionPlan> {
        if definition.columns().is_empty() {
            return Err(HiveError::Unsupported(format!(
                "CREATE TABLE {} needs at least one regular column",
                definition.name()
            )));
        }

        let mut plan = ExecutionPlan::default();
        if force_recreate && exists {
            plan.push(Self::drop_table_sql(definition.name()));
        }

        let mut sql = format!(
            "CREATE {}TABLE {} ({})",
            if definition.is_external() { "EXTERNAL " } else { "" },
            quote_table_name(definition.name()),
            Self::column_list(definition.columns())
        );

        // Hive rejects an empty PARTITIONED BY (), so the clause is left out entirely
        if !definition.partitions().is_empty() {
            sql.push_str(&format!(
                " PARTITIONED BY ({})",
                Self::column_list(definition.partitions())
            ));
        }

        sql.push(' ');
        sql.push_str(ROW_FORMAT);
        plan.push(sql);

        Ok(plan)
    }

    /// ALTER TABLE ... ADD COLUMNS for one regular column
    pub fn build_add_column(table: &str, column: &ColumnDefinition) -> HiveResult<ExecutionPlan> {
        if column.is_partition() {
            return Err(HiveError::Unsupported(format!(
                "cannot add partition column {} to {}: partitions are fixed when the table is created",
                column.name, table
            )));
        }

        let mut plan = ExecutionPlan::default();
        plan.push(format!(
            "ALTER TABLE {} ADD COLUMNS ({})",
            quote_table_name(table),
            Self::column_spec(column)
        ));
        Ok(plan)
    }

    pub fn build_drop_table(table: &str) -> ExecutionPlan {
        let mut plan = ExecutionPlan::default();
        plan.push(Self::drop_table_sql(table));
        plan
    }

    /// Hive has no indexes; this always fails
    pub fn build_add_index(table: &str, columns: &[&str]) -> HiveResult<ExecutionPlan> {
        Err(HiveError::Unsupported(format!(
            "indexes are not supported by Hive (requested on {}({}))",
            table,
            columns.join(", ")
        )))
    }

    fn drop_table_sql(table: &str) -> String {
        format!("DROP TABLE {}", quote_table_name(table))
    }

    fn column_list(columns: &[ColumnDefinition]) -> String {
        columns
            .iter()
            .map(Self::column_spec)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `name type COMMENT 'ar_type=...'`
    fn column_spec(column: &ColumnDefinition) -> String {
        format!(
            "{} {} COMMENT '{}'",
            quote_identifier(&column.name),
            column.sql_type,
            column.comment().encode()
        )
    }
}
