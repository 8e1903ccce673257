use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Hive adapter operations
pub type HiveResult<T> = Result<T, HiveError>;

/// What the transport reported when a remote call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportSignal {
    /// The remote end closed the connection (end of file reached)
    ConnectionClosed,
    /// The transport was never opened or has already been closed
    NotOpen,
    TimedOut,
    Other,
}

impl std::fmt::Display for TransportSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportSignal::ConnectionClosed => "connection closed by remote end",
            TransportSignal::NotOpen => "transport not open",
            TransportSignal::TimedOut => "timed out",
            TransportSignal::Other => "transport failure",
        };
        f.write_str(name)
    }
}

/// Hive adapter error types
#[derive(Debug, Error)]
pub enum HiveError {
    /// Transport could not be opened or reopened, or the session is closed
    #[error("Connection error ({address}): {message}")]
    Connection { address: String, message: String },

    /// Transport failed during a remote call
    #[error("Transport error ({signal}): {message}")]
    Transport {
        signal: TransportSignal,
        message: String,
        statement: Option<String>,
    },

    /// The engine rejected a statement
    #[error("Query failed: {message} [statement: {statement}]")]
    Query {
        statement: String,
        message: String,
        error_code: i32,
        sql_state: Option<String>,
    },

    /// DESCRIBE output did not have the expected structure
    #[error("Schema parse error for table {table}: {message}")]
    SchemaParse { table: String, message: String },

    /// The operation has no translation to the engine
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A row did not match the field list in strict materialization
    #[error("Materialization error at row {row}: expected {expected} cells, found {found}")]
    Materialization {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Malformed Thrift reply
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl HiveError {
    /// Build a transient transport error
    pub fn transport(signal: TransportSignal, message: impl Into<String>) -> Self {
        HiveError::Transport {
            signal,
            message: message.into(),
            statement: None,
        }
    }

    /// True only for the stale-socket failure that the executor may retry
    pub fn is_connection_closed(&self) -> bool {
        matches!(
            self,
            HiveError::Transport {
                signal: TransportSignal::ConnectionClosed,
                ..
            }
        )
    }

    /// Attach the statement being executed, if the error carries one
    pub fn with_statement(self, sql: &str) -> Self {
        match self {
            HiveError::Transport {
                signal,
                message,
                statement: None,
            } => HiveError::Transport {
                signal,
                message,
                statement: Some(sql.to_string()),
            },
            HiveError::Query {
                statement,
                message,
                error_code,
                sql_state,
            } if statement.is_empty() => HiveError::Query {
                statement: sql.to_string(),
                message,
                error_code,
                sql_state,
            },
            other => other,
        }
    }

    /// Stable machine-readable code, used for CLI error output
    pub fn code(&self) -> &'static str {
        match self {
            HiveError::Connection { .. } => "CONNECTION_ERROR",
            HiveError::Transport { .. } => "TRANSPORT_ERROR",
            HiveError::Query { .. } => "QUERY_ERROR",
            HiveError::SchemaParse { .. } => "SCHEMA_PARSE_ERROR",
            HiveError::Unsupported(_) => "UNSUPPORTED_OPERATION",
            HiveError::Materialization { .. } => "MATERIALIZATION_ERROR",
            HiveError::Protocol(_) => "PROTOCOL_ERROR",
            HiveError::InvalidConfig(_) | HiveError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Convert Thrift errors to Hive errors, classifying transport failures
impl From<thrift::Error> for HiveError {
    fn from(err: thrift::Error) -> Self {
        use thrift::TransportErrorKind;

        match err {
            thrift::Error::Transport(e) => {
                let signal = match e.kind {
                    TransportErrorKind::EndOfFile => TransportSignal::ConnectionClosed,
                    TransportErrorKind::NotOpen => TransportSignal::NotOpen,
                    TransportErrorKind::TimedOut => TransportSignal::TimedOut,
                    _ => TransportSignal::Other,
                };
                HiveError::transport(signal, e.message)
            }
            thrift::Error::Protocol(e) => HiveError::Protocol(e.message),
            thrift::Error::Application(e) => {
                HiveError::Protocol(format!("application error: {}", e.message))
            }
            thrift::Error::User(e) => HiveError::Protocol(e.to_string()),
        }
    }
}

/// Error output format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl From<&HiveError> for ErrorResponse {
    fn from(err: &HiveError) -> Self {
        let statement = match err {
            HiveError::Transport { statement, .. } => statement.clone(),
            HiveError::Query { statement, .. } => Some(statement.clone()),
            _ => None,
        };

        ErrorResponse {
            error: ErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
                statement,
            },
        }
    }
}
