// Transport session: the single logical connection an adapter holds to Hive
use std::time::Duration;
use tracing::{debug, info};

use crate::config::HiveConfig;
use crate::error::{HiveError, HiveResult, TransportSignal};

/// Remote RPC surface of the Hive engine.
///
/// One value is one open transport. Rows come back as tab-delimited strings.
pub trait HiveService {
    /// Execute a statement; results, if any, are fetched afterwards
    fn execute(&mut self, statement: &str) -> HiveResult<()>;

    /// Fetch every remaining row of the last statement
    fn fetch_all(&mut self) -> HiveResult<Vec<String>>;

    /// Field names of the last statement's result
    fn get_schema(&mut self) -> HiveResult<Vec<String>>;

    /// Release the transport
    fn close(&mut self) -> HiveResult<()>;

    /// Best-effort liveness check
    fn is_open(&self) -> bool;
}

/// Opens transports to a Hive engine
pub trait Connector {
    type Service: HiveService;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> HiveResult<Self::Service>;
}

/// Owns the live transport and the currently selected database.
///
/// Statements are never run on a closed session: `service_mut` fails with a
/// connection error instead.
pub struct Session<C: Connector> {
    connector: C,
    config: HiveConfig,
    database: String,
    service: Option<C::Service>,
}

impl<C: Connector> Session<C> {
    /// Create a session without opening it
    pub fn new(connector: C, config: HiveConfig) -> Self {
        let database = config.database.clone();
        Self {
            connector,
            config,
            database,
            service: None,
        }
    }

    /// Create a session and open it on the configured database
    pub fn connect(connector: C, config: HiveConfig) -> HiveResult<Self> {
        let mut session = Self::new(connector, config);
        let database = session.database.clone();
        session.open(&database)?;
        Ok(session)
    }

    /// Establish the transport and select `database`
    pub fn open(&mut self, database: &str) -> HiveResult<()> {
        if self.service.is_some() {
            self.close();
        }

        let address = self.config.address();
        info!("Opening Hive session to {} (database: {})", address, database);

        let mut service = self
            .connector
            .connect(&self.config.host, self.config.port, self.config.timeout())
            .map_err(|e| match e {
                HiveError::Connection { .. } => e,
                other => HiveError::Connection {
                    address: address.clone(),
                    message: other.to_string(),
                },
            })?;

        let use_statement = use_statement(database);
        if let Err(e) = service.execute(&use_statement) {
            let _ = service.close();
            return Err(match e {
                HiveError::Transport { message, .. } => HiveError::Connection {
                    address,
                    message: format!("transport failed while selecting database: {}", message),
                },
                other => other.with_statement(&use_statement),
            });
        }

        self.service = Some(service);
        self.database = database.to_string();
        Ok(())
    }

    /// Release the transport. Never fails; closing a closed session is a no-op.
    pub fn close(&mut self) {
        if let Some(mut service) = self.service.take() {
            if let Err(e) = service.close() {
                debug!("Ignoring error while closing Hive transport: {}", e);
            }
            info!("Closed Hive session to {}", self.config.address());
        }
    }

    /// Close, then open again on the last selected database
    pub fn reopen(&mut self) -> HiveResult<()> {
        self.close();
        let database = self.database.clone();
        self.open(&database)
    }

    /// Best-effort: the remote end may have dropped an idle connection already
    pub fn is_open(&self) -> bool {
        self.service.as_ref().is_some_and(|s| s.is_open())
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn config(&self) -> &HiveConfig {
        &self.config
    }

    /// Record a database selected on the live transport, so reopen restores it
    pub(crate) fn set_database(&mut self, database: &str) {
        self.database = database.to_string();
    }

    pub(crate) fn service_mut(&mut self) -> HiveResult<&mut C::Service> {
        let address = self.config.address();
        self.service.as_mut().ok_or(HiveError::Connection {
            address,
            message: "session is closed".to_string(),
        })
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        self.close();
    }
}

pub(crate) fn use_statement(database: &str) -> String {
    format!("USE {}", database)
}

/// A transport error raised when a call is made on a service that is not open
pub(crate) fn not_open(message: &str) -> HiveError {
    HiveError::transport(TransportSignal::NotOpen, message)
}
