// Database adapter trait: the caller-facing query and schema interface
use crate::error::HiveResult;
use crate::models::{
    AddColumnOptions, ColumnDefinition, CreateTableOptions, LogicalType, Record, TableDefinition,
};

/// Query and schema operations offered to callers.
///
/// Calls are blocking and take `&mut self`: one adapter is one connection and
/// serves one caller at a time. Run several adapters for parallel work.
pub trait DatabaseAdapter {
    /// Name of the backing engine
    fn adapter_name(&self) -> &str;

    fn supports_migrations(&self) -> bool;

    fn supports_primary_key(&self) -> bool;

    /// Execute a statement, discarding any result
    fn execute(&mut self, sql: &str) -> HiveResult<()>;

    /// Execute a query and return its raw tab-delimited rows
    fn query(&mut self, sql: &str) -> HiveResult<Vec<String>>;

    /// Execute a query and return its rows as records keyed by field name
    fn select(&mut self, sql: &str) -> HiveResult<Vec<Record>>;

    fn select_rows(&mut self, sql: &str) -> HiveResult<Vec<String>> {
        self.query(sql)
    }

    /// Tables of the selected database
    fn tables(&mut self) -> HiveResult<Vec<String>>;

    fn table_exists(&mut self, table: &str) -> HiveResult<bool>;

    /// Columns of `table`, regular columns first, then partition columns
    fn columns(&mut self, table: &str) -> HiveResult<Vec<ColumnDefinition>>;

    fn create_table(
        &mut self,
        definition: &TableDefinition,
        options: CreateTableOptions,
    ) -> HiveResult<()>;

    fn add_column(
        &mut self,
        table: &str,
        column: &str,
        logical_type: LogicalType,
        options: AddColumnOptions,
    ) -> HiveResult<()>;

    /// Always fails: the engine has no indexes
    fn add_index(&mut self, table: &str, columns: &[&str]) -> HiveResult<()>;

    fn drop_table(&mut self, table: &str) -> HiveResult<()>;

    fn primary_key(&mut self, table: &str) -> HiveResult<Option<String>>;

    /// Currently selected database
    fn database_name(&self) -> &str;

    fn select_database(&mut self, database: &str) -> HiveResult<()>;

    /// Check the connection with a no-op statement; never fails
    fn active(&mut self) -> bool;

    fn reconnect(&mut self) -> HiveResult<()>;

    fn disconnect(&mut self);
}
