// Resilient executor: the only path from callers to the transport session
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::HiveResult;
use crate::models::QueryResult;
use crate::services::session::{use_statement, Connector, HiveService, Session};

/// Runs remote calls on a session, reconnecting once when Hive has dropped
/// the connection underneath us.
///
/// HiveServer reaps idle connections server-side, and the next call on the
/// stale socket fails with "end of file". That one failure is retried after a
/// forced reopen; every other error, and any failure of the retry itself,
/// reaches the caller unchanged.
pub struct ResilientExecutor<C: Connector> {
    session: Session<C>,
    reconnects: u64,
}

impl<C: Connector> ResilientExecutor<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            session,
            reconnects: 0,
        }
    }

    /// Run `operation` against the live transport, with at most one reconnect
    pub fn run<T, F>(&mut self, statement: &str, mut operation: F) -> HiveResult<T>
    where
        F: FnMut(&mut C::Service) -> HiveResult<T>,
    {
        let start_time = Instant::now();

        let result = match self.attempt(statement, &mut operation) {
            Err(e) if e.is_connection_closed() => {
                warn!(
                    "Hive closed the connection while running `{}`; reconnecting and retrying once",
                    statement
                );
                self.session.reopen()?;
                self.reconnects += 1;
                self.attempt(statement, &mut operation)
            }
            other => other,
        };

        debug!(
            "{} ({} ms{})",
            statement,
            start_time.elapsed().as_millis(),
            if result.is_err() { ", failed" } else { "" }
        );

        result
    }

    fn attempt<T, F>(&mut self, statement: &str, operation: &mut F) -> HiveResult<T>
    where
        F: FnMut(&mut C::Service) -> HiveResult<T>,
    {
        let service = self.session.service_mut()?;
        operation(service).map_err(|e| e.with_statement(statement))
    }

    /// Execute a statement, discarding any result
    pub fn execute(&mut self, sql: &str) -> HiveResult<()> {
        self.run(sql, |service| service.execute(sql))
    }

    /// Execute a statement and fetch all raw rows
    pub fn query(&mut self, sql: &str) -> HiveResult<Vec<String>> {
        self.run(sql, |service| {
            service.execute(sql)?;
            service.fetch_all()
        })
    }

    /// Execute a statement and fetch its field names and raw rows
    pub fn query_with_schema(&mut self, sql: &str) -> HiveResult<QueryResult> {
        self.run(sql, |service| {
            service.execute(sql)?;
            let fields = service.get_schema()?;
            let rows = service.fetch_all()?;
            Ok(QueryResult { fields, rows })
        })
    }

    /// Switch the session to another database
    pub fn select_database(&mut self, database: &str) -> HiveResult<()> {
        let sql = use_statement(database);
        self.execute(&sql)?;
        self.session.set_database(database);
        Ok(())
    }

    /// Force a reconnect outside of the retry path
    pub fn reconnect(&mut self) -> HiveResult<()> {
        self.session.reopen()
    }

    pub fn disconnect(&mut self) {
        self.session.close();
    }

    /// Number of reconnects performed by the retry path
    pub fn reconnect_count(&self) -> u64 {
        self.reconnects
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }
}
