// Apache Hive adapter over the HiveServer Thrift protocol
// Hive has no defaults, no indexes and only string/int storage for most logical
// types, so typed column metadata is carried in column comments
use tracing::{debug, info};

use crate::config::HiveConfig;
use crate::error::HiveResult;
use crate::models::{
    AddColumnOptions, ColumnDefinition, CreateTableOptions, LogicalType, Record, TableDefinition,
    NATIVE_DATABASE_TYPES,
};
use crate::services::database::adapter::DatabaseAdapter;
use crate::services::ddl::{DdlGenerator, ExecutionPlan};
use crate::services::executor::ResilientExecutor;
use crate::services::materializer::{MaterializeMode, ResultMaterializer};
use crate::services::schema_reflector::SchemaReflector;
use crate::services::session::{Connector, Session};
use crate::services::thrift_client::ThriftConnector;
use crate::validation::{quote_identifier, quote_table_name};

/// Cheap statement used to probe the connection
const PING_STATEMENT: &str = "SET check=1";

pub struct HiveAdapter<C: Connector = ThriftConnector> {
    executor: ResilientExecutor<C>,
    materializer: ResultMaterializer,
}

impl HiveAdapter<ThriftConnector> {
    /// Connect to HiveServer over Thrift
    pub fn connect(config: HiveConfig) -> HiveResult<Self> {
        Self::with_connector(ThriftConnector, config)
    }
}

impl<C: Connector> HiveAdapter<C> {
    /// Open a session through `connector` on the configured database
    pub fn with_connector(connector: C, config: HiveConfig) -> HiveResult<Self> {
        config.validate()?;
        let session = Session::connect(connector, config)?;
        Ok(Self {
            executor: ResilientExecutor::new(session),
            materializer: ResultMaterializer::default(),
        })
    }

    pub fn with_materialize_mode(mut self, mode: MaterializeMode) -> Self {
        self.materializer = ResultMaterializer::new(mode);
        self
    }

    /// Logical types with the native Hive type each is stored as
    pub fn native_database_types(&self) -> &'static [(LogicalType, &'static str)] {
        NATIVE_DATABASE_TYPES
    }

    /// Number of automatic reconnects so far
    pub fn reconnect_count(&self) -> u64 {
        self.executor.reconnect_count()
    }

    fn run_plan(&mut self, plan: ExecutionPlan) -> HiveResult<()> {
        for statement in plan {
            self.executor.execute(&statement)?;
        }
        Ok(())
    }
}

impl<C: Connector> DatabaseAdapter for HiveAdapter<C> {
    fn adapter_name(&self) -> &str {
        "Hive"
    }

    fn supports_migrations(&self) -> bool {
        true
    }

    fn supports_primary_key(&self) -> bool {
        false
    }

    fn execute(&mut self, sql: &str) -> HiveResult<()> {
        self.executor.execute(sql)
    }

    fn query(&mut self, sql: &str) -> HiveResult<Vec<String>> {
        self.executor.query(sql)
    }

    fn select(&mut self, sql: &str) -> HiveResult<Vec<Record>> {
        let result = self.executor.query_with_schema(sql)?;
        debug!("Materializing {} rows with {} fields", result.row_count(), result.fields.len());
        self.materializer.materialize(&result.fields, &result.rows)
    }

    fn tables(&mut self) -> HiveResult<Vec<String>> {
        let rows = self.executor.query("SHOW TABLES")?;
        Ok(rows.into_iter().map(|row| row.trim().to_string()).collect())
    }

    fn table_exists(&mut self, table: &str) -> HiveResult<bool> {
        // A qualified name is looked up in its own database, not the selected one
        let (sql, name) = match table.split_once('.') {
            Some((database, name)) if !database.is_empty() && !name.is_empty() => {
                (format!("SHOW TABLES IN {}", quote_identifier(database)), name)
            }
            _ => ("SHOW TABLES".to_string(), table),
        };

        // Hive stores names in lower case
        Ok(self
            .executor
            .query(&sql)?
            .iter()
            .any(|existing| existing.trim().eq_ignore_ascii_case(name)))
    }

    fn columns(&mut self, table: &str) -> HiveResult<Vec<ColumnDefinition>> {
        let sql = format!("DESCRIBE FORMATTED {}", quote_table_name(table));
        let lines = self.executor.query(&sql)?;
        SchemaReflector::reflect(table, &lines)
    }

    fn create_table(
        &mut self,
        definition: &TableDefinition,
        options: CreateTableOptions,
    ) -> HiveResult<()> {
        let exists = options.force && self.table_exists(definition.name())?;
        let plan = DdlGenerator::build_create_table(definition, options.force, exists)?;

        info!(
            "Creating table {} ({} columns, {} partitions)",
            definition.name(),
            definition.columns().len(),
            definition.partitions().len()
        );
        self.run_plan(plan)
    }

    fn add_column(
        &mut self,
        table: &str,
        column: &str,
        logical_type: LogicalType,
        options: AddColumnOptions,
    ) -> HiveResult<()> {
        let mut definition = ColumnDefinition::new(column, logical_type);
        definition.default = options.default;

        let plan = DdlGenerator::build_add_column(table, &definition)?;
        self.run_plan(plan)
    }

    fn add_index(&mut self, table: &str, columns: &[&str]) -> HiveResult<()> {
        DdlGenerator::build_add_index(table, columns).map(|_| ())
    }

    fn drop_table(&mut self, table: &str) -> HiveResult<()> {
        self.run_plan(DdlGenerator::build_drop_table(table))
    }

    fn primary_key(&mut self, _table: &str) -> HiveResult<Option<String>> {
        Ok(None)
    }

    fn database_name(&self) -> &str {
        self.executor.session().database()
    }

    fn select_database(&mut self, database: &str) -> HiveResult<()> {
        self.executor.select_database(database)
    }

    fn active(&mut self) -> bool {
        match self.executor.execute(PING_STATEMENT) {
            Ok(()) => true,
            Err(e) => {
                debug!("Hive connection is not active: {}", e);
                false
            }
        }
    }

    fn reconnect(&mut self) -> HiveResult<()> {
        self.executor.reconnect()
    }

    fn disconnect(&mut self) {
        self.executor.disconnect()
    }
}
