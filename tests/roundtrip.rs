// End-to-end tests against an in-memory engine that understands the
// statements the adapter generates and answers DESCRIBE FORMATTED like Hive
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use hive_adapter::{
    AddColumnOptions, ColumnDefinition, Connector, CreateTableOptions, DatabaseAdapter,
    HiveAdapter, HiveConfig, HiveError, HiveResult, HiveService, LogicalType, TableDefinition,
    TransportSignal, CURRENT_DATE, CURRENT_TIME,
};

type Column = (String, String, String);

#[derive(Default)]
struct FakeTable {
    columns: Vec<Column>,
    partitions: Vec<Column>,
}

#[derive(Default)]
struct Engine {
    /// Keyed by `database.table`
    tables: BTreeMap<String, FakeTable>,
    database: String,
    fields: Vec<String>,
    rows: Vec<String>,
    connects: usize,
    /// Number of upcoming non-USE statements that find the socket closed
    stale_calls: usize,
    statements: Vec<String>,
}

fn parse_columns(list: &str) -> Vec<Column> {
    // Encoded comments never contain ", " so it only separates columns
    list.split(", ")
        .filter_map(|spec| {
            let (name, rest) = spec.split_once(' ')?;
            let (ty, comment) = rest.split_once(" COMMENT '")?;
            let comment = comment.strip_suffix('\'')?;
            Some((name.to_string(), ty.to_string(), comment.to_string()))
        })
        .collect()
}

fn parse_create(statement: &str) -> Option<(String, FakeTable)> {
    let rest = statement.strip_prefix("CREATE ")?;
    let rest = rest.strip_prefix("EXTERNAL ").unwrap_or(rest);
    let rest = rest.strip_prefix("TABLE ")?;
    let rest = rest.strip_suffix(" ROW FORMAT DELIMITED FIELDS TERMINATED BY '\\t'")?;
    let (name, rest) = rest.split_once(" (")?;
    let rest = rest.strip_suffix(')')?;
    let (columns, partitions) = match rest.split_once(") PARTITIONED BY (") {
        Some((columns, partitions)) => (columns, partitions),
        None => (rest, ""),
    };
    let table = FakeTable {
        columns: parse_columns(columns),
        partitions: parse_columns(partitions),
    };
    Some((name.to_lowercase(), table))
}

fn parse_alter(statement: &str) -> Option<(String, Vec<Column>)> {
    let rest = statement.strip_prefix("ALTER TABLE ")?;
    let (name, columns) = rest.split_once(" ADD COLUMNS (")?;
    Some((name.to_lowercase(), parse_columns(columns.strip_suffix(')')?)))
}

fn pad(text: &str) -> String {
    format!("{:<22}", text)
}

impl Engine {
    fn qualify(&self, name: &str) -> String {
        let name = name.to_lowercase();
        if name.contains('.') {
            name
        } else {
            format!("{}.{}", self.database, name)
        }
    }

    fn run(&mut self, statement: &str) -> HiveResult<()> {
        self.statements.push(statement.to_string());
        self.fields.clear();
        self.rows.clear();

        if let Some(database) = statement.strip_prefix("USE ") {
            self.database = database.to_lowercase();
            return Ok(());
        }
        if statement.starts_with("SET ") {
            return Ok(());
        }
        if self.stale_calls > 0 {
            self.stale_calls -= 1;
            return Err(HiveError::transport(
                TransportSignal::ConnectionClosed,
                "end of file reached",
            ));
        }

        if statement == "SHOW TABLES" || statement.starts_with("SHOW TABLES IN ") {
            let database = statement
                .strip_prefix("SHOW TABLES IN ")
                .map(str::to_lowercase)
                .unwrap_or_else(|| self.database.clone());
            let prefix = format!("{}.", database);
            self.fields = vec!["tab_name".to_string()];
            self.rows = self
                .tables
                .keys()
                .filter_map(|key| key.strip_prefix(&prefix))
                .map(str::to_string)
                .collect();
        } else if let Some((name, table)) = parse_create(statement) {
            let name = self.qualify(&name);
            if self.tables.contains_key(&name) {
                return Err(query_error(&format!("Table {} already exists", name)));
            }
            self.tables.insert(name, table);
        } else if let Some((name, columns)) = parse_alter(statement) {
            let key = self.qualify(&name);
            let table = self
                .tables
                .get_mut(&key)
                .ok_or_else(|| query_error("Table not found"))?;
            table.columns.extend(columns);
        } else if let Some(name) = statement.strip_prefix("DROP TABLE ") {
            let key = self.qualify(name);
            self.tables
                .remove(&key)
                .ok_or_else(|| query_error("Table not found"))?;
        } else if let Some(name) = statement.strip_prefix("DESCRIBE FORMATTED ") {
            let table = self
                .tables
                .get(&self.qualify(name))
                .ok_or_else(|| query_error("Table not found"))?;
            self.fields = vec!["col_name".into(), "data_type".into(), "comment".into()];
            self.rows = describe_formatted(table);
        } else if statement.starts_with("SELECT ") {
            self.fields = vec!["id".to_string(), "name".to_string()];
            self.rows = vec!["1\talice".to_string(), "2\tbob".to_string()];
        } else {
            return Err(query_error("cannot recognize input"));
        }
        Ok(())
    }
}

fn query_error(message: &str) -> HiveError {
    HiveError::Query {
        statement: String::new(),
        message: message.to_string(),
        error_code: 10001,
        sql_state: Some("42000".to_string()),
    }
}

fn describe_formatted(table: &FakeTable) -> Vec<String> {
    let header = format!("{}\t{}\t{}", pad("# col_name"), pad("data_type"), pad("comment"));
    let blank = format!("{}\t{}\t{}", pad(""), pad(""), pad(""));
    let line = |(name, ty, comment): &Column| format!("{}\t{}\t{}", pad(name), pad(ty), pad(comment));

    let mut lines = vec![header.clone(), blank.clone()];
    lines.extend(table.columns.iter().map(line));
    if !table.partitions.is_empty() {
        lines.push(blank.clone());
        lines.push("# Partition Information\t \t ".to_string());
        lines.push(header);
        lines.push(blank.clone());
        lines.extend(table.partitions.iter().map(line));
    }
    lines.push(blank);
    lines.push("# Detailed Table Information\t \t ".to_string());
    lines.push(format!("{}\t{}\tNULL", pad("Database:"), pad("default")));
    lines.push(format!("{}\t{}\tNULL", pad("Table Type:"), pad("EXTERNAL_TABLE")));
    lines.push("# Storage Information\t \t ".to_string());
    lines.push(format!("{}\t{}\tNULL", pad("field.delim"), pad("\\t")));
    lines
}

#[derive(Clone, Default)]
struct FakeConnector {
    engine: Rc<RefCell<Engine>>,
}

struct FakeService {
    engine: Rc<RefCell<Engine>>,
    open: bool,
}

impl Connector for FakeConnector {
    type Service = FakeService;

    fn connect(&self, _host: &str, _port: u16, _timeout: Duration) -> HiveResult<FakeService> {
        self.engine.borrow_mut().connects += 1;
        Ok(FakeService {
            engine: Rc::clone(&self.engine),
            open: true,
        })
    }
}

impl HiveService for FakeService {
    fn execute(&mut self, statement: &str) -> HiveResult<()> {
        self.engine.borrow_mut().run(statement)
    }

    fn fetch_all(&mut self) -> HiveResult<Vec<String>> {
        Ok(std::mem::take(&mut self.engine.borrow_mut().rows))
    }

    fn get_schema(&mut self) -> HiveResult<Vec<String>> {
        Ok(self.engine.borrow().fields.clone())
    }

    fn close(&mut self) -> HiveResult<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

fn adapter(connector: &FakeConnector) -> HiveAdapter<FakeConnector> {
    HiveAdapter::with_connector(connector.clone(), HiveConfig::default()).unwrap()
}

/// The fields that survive a create/reflect round trip
fn fingerprint(column: &ColumnDefinition) -> (String, LogicalType, Option<String>, bool) {
    (
        column.name.clone(),
        column.logical_type(),
        column.default.clone(),
        column.is_partition(),
    )
}

#[test]
fn test_create_then_reflect_round_trip() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let table = TableDefinition::builder("everything")
        .column("s", LogicalType::String)
        .column("body", LogicalType::Text)
        .column_def(ColumnDefinition::new("n", LogicalType::Integer).with_default("42"))
        .column("ratio", LogicalType::Float)
        .column("amount", LogicalType::Double)
        .column_def(ColumnDefinition::new("seen_at", LogicalType::Datetime).with_default(CURRENT_TIME))
        .column("logged", LogicalType::Timestamp)
        .column("at", LogicalType::Time)
        .column_def(ColumnDefinition::new("born_on", LogicalType::Date).with_default(CURRENT_DATE))
        .column("blob", LogicalType::Binary)
        .column_def(ColumnDefinition::new("active", LogicalType::Boolean).with_default("1"))
        .column_def(ColumnDefinition::new("note", LogicalType::String).with_default("it's a, b=c"))
        .column("big", LogicalType::Other("bigint".to_string()))
        .partition("dt", LogicalType::String)
        .partition_def(ColumnDefinition::new("region", LogicalType::String).with_default("eu"))
        .build();

    adapter
        .create_table(&table, CreateTableOptions::default())
        .unwrap();
    let reflected = adapter.columns("everything").unwrap();

    let expected: Vec<_> = table.all_columns().map(fingerprint).collect();
    let actual: Vec<_> = reflected.iter().map(fingerprint).collect();
    assert_eq!(actual, expected);

    // Server-side defaults come back unevaluated
    let born_on = reflected.iter().find(|c| c.name == "born_on").unwrap();
    assert_eq!(born_on.default_literal(), Some("current_date"));
    assert_eq!(born_on.sql_type, "string");
}

#[test]
fn test_partition_clause_on_the_wire() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let table = TableDefinition::builder("logs")
        .column("line", LogicalType::String)
        .partition("dt", LogicalType::String)
        .build();
    adapter
        .create_table(&table, CreateTableOptions::default())
        .unwrap();

    let statements = connector.engine.borrow().statements.clone();
    let create = statements.last().unwrap();
    assert!(create.contains("PARTITIONED BY (dt string COMMENT 'ar_type=string')"));
}

#[test]
fn test_added_column_is_reflected() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let table = TableDefinition::builder("people")
        .column("name", LogicalType::String)
        .partition("dt", LogicalType::String)
        .build();
    adapter
        .create_table(&table, CreateTableOptions::default())
        .unwrap();
    adapter
        .add_column(
            "people",
            "joined_on",
            LogicalType::Date,
            AddColumnOptions {
                default: Some(CURRENT_DATE.to_string()),
            },
        )
        .unwrap();

    let columns = adapter.columns("people").unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    // New columns land before partition columns
    assert_eq!(names, vec!["name", "joined_on", "dt"]);
    assert_eq!(columns[1].logical_type(), LogicalType::Date);
    assert_eq!(columns[1].default_literal(), Some("current_date"));
}

#[test]
fn test_force_recreate_replaces_table() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let first = TableDefinition::builder("events")
        .column("id", LogicalType::Integer)
        .build();
    adapter
        .create_table(&first, CreateTableOptions::default())
        .unwrap();

    // Without force the engine rejects the duplicate
    assert!(matches!(
        adapter.create_table(&first, CreateTableOptions::default()),
        Err(HiveError::Query { .. })
    ));

    let second = TableDefinition::builder("events")
        .column("id", LogicalType::Integer)
        .column("kind", LogicalType::String)
        .build();
    adapter
        .create_table(&second, CreateTableOptions { force: true })
        .unwrap();

    assert_eq!(adapter.columns("events").unwrap().len(), 2);
    assert!(adapter.table_exists("EVENTS").unwrap());
    assert_eq!(adapter.tables().unwrap(), vec!["events"]);
}

#[test]
fn test_idle_disconnect_is_transparent() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let table = TableDefinition::builder("t")
        .column("id", LogicalType::Integer)
        .build();
    adapter
        .create_table(&table, CreateTableOptions::default())
        .unwrap();

    connector.engine.borrow_mut().stale_calls = 1;
    let columns = adapter.columns("t").unwrap();

    assert_eq!(columns.len(), 1);
    assert_eq!(adapter.reconnect_count(), 1);
    assert_eq!(connector.engine.borrow().connects, 2);
}

#[test]
fn test_repeated_disconnect_surfaces() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    connector.engine.borrow_mut().stale_calls = 2;
    let err = adapter.tables().unwrap_err();

    assert!(err.is_connection_closed());
    assert_eq!(adapter.reconnect_count(), 1);
}

#[test]
fn test_select_records() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let records = adapter.select("SELECT id, name FROM people").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "1");
    assert_eq!(records[1]["name"], "bob");

    let rows = adapter.select_rows("SELECT id, name FROM people").unwrap();
    assert_eq!(rows, vec!["1\talice", "2\tbob"]);
}

#[test]
fn test_describe_unknown_table_is_query_error() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    match adapter.columns("missing") {
        Err(HiveError::Query { statement, .. }) => {
            assert_eq!(statement, "DESCRIBE FORMATTED missing")
        }
        other => panic!("expected query error, got {other:?}"),
    }
}

#[test]
fn test_add_index_never_reaches_engine() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    assert!(matches!(
        adapter.add_index("events", &["id", "kind"]),
        Err(HiveError::Unsupported(_))
    ));
    assert_eq!(connector.engine.borrow().statements, vec!["USE default"]);
}

#[test]
fn test_force_recreate_in_another_database() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let table = TableDefinition::builder("other.events")
        .column("id", LogicalType::Integer)
        .build();
    adapter
        .create_table(&table, CreateTableOptions::default())
        .unwrap();
    assert!(adapter.tables().unwrap().is_empty());
    assert!(adapter.table_exists("other.events").unwrap());

    // Only other.events exists, so the forced create must drop it first
    adapter
        .create_table(&table, CreateTableOptions { force: true })
        .unwrap();

    let statements = connector.engine.borrow().statements.clone();
    assert!(statements.contains(&"SHOW TABLES IN other".to_string()));
    assert!(statements.contains(&"DROP TABLE other.events".to_string()));
    assert_eq!(adapter.columns("other.events").unwrap().len(), 1);
}

#[test]
fn test_force_recreate_ignores_same_name_in_selected_database() {
    let connector = FakeConnector::default();
    let mut adapter = adapter(&connector);

    let local = TableDefinition::builder("events")
        .column("id", LogicalType::Integer)
        .build();
    adapter
        .create_table(&local, CreateTableOptions::default())
        .unwrap();

    let remote = TableDefinition::builder("other.events")
        .column("id", LogicalType::Integer)
        .build();
    adapter
        .create_table(&remote, CreateTableOptions { force: true })
        .unwrap();

    let statements = connector.engine.borrow().statements.clone();
    assert!(!statements.iter().any(|s| s.starts_with("DROP TABLE")));
    assert!(adapter.table_exists("events").unwrap());
    assert!(adapter.table_exists("other.events").unwrap());
}
