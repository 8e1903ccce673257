// Scripted in-memory Hive transport for unit tests
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{HiveError, HiveResult, TransportSignal};
use crate::services::session::{Connector, HiveService};

#[derive(Default)]
struct Script {
    connects: usize,
    closes: usize,
    refuse_connections: bool,
    /// Failures returned, in order, by execute calls other than USE
    failures: VecDeque<HiveError>,
    executed: Vec<String>,
    fields: Vec<String>,
    rows: Vec<String>,
}

/// Connector whose services share one script, so tests can inspect every call
#[derive(Clone, Default)]
pub(crate) struct ScriptedConnector {
    script: Rc<RefCell<Script>>,
}

impl ScriptedConnector {
    pub fn refuse_connections(&self, refuse: bool) {
        self.script.borrow_mut().refuse_connections = refuse;
    }

    pub fn fail_next(&self, error: HiveError) {
        self.script.borrow_mut().failures.push_back(error);
    }

    pub fn fail_next_with_closed_connection(&self) {
        self.fail_next(HiveError::transport(
            TransportSignal::ConnectionClosed,
            "end of file reached",
        ));
    }

    pub fn respond_with(&self, fields: &[&str], rows: &[&str]) {
        let mut script = self.script.borrow_mut();
        script.fields = fields.iter().map(|f| f.to_string()).collect();
        script.rows = rows.iter().map(|r| r.to_string()).collect();
    }

    pub fn connects(&self) -> usize {
        self.script.borrow().connects
    }

    pub fn closes(&self) -> usize {
        self.script.borrow().closes
    }

    pub fn executed(&self) -> Vec<String> {
        self.script.borrow().executed.clone()
    }
}

pub(crate) struct ScriptedService {
    script: Rc<RefCell<Script>>,
    open: bool,
}

impl Connector for ScriptedConnector {
    type Service = ScriptedService;

    fn connect(&self, host: &str, port: u16, _timeout: Duration) -> HiveResult<ScriptedService> {
        let mut script = self.script.borrow_mut();
        if script.refuse_connections {
            return Err(HiveError::Connection {
                address: format!("{}:{}", host, port),
                message: "connection refused".to_string(),
            });
        }
        script.connects += 1;
        Ok(ScriptedService {
            script: Rc::clone(&self.script),
            open: true,
        })
    }
}

impl HiveService for ScriptedService {
    fn execute(&mut self, statement: &str) -> HiveResult<()> {
        let mut script = self.script.borrow_mut();
        script.executed.push(statement.to_string());
        if statement.starts_with("USE ") {
            return Ok(());
        }
        match script.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fetch_all(&mut self) -> HiveResult<Vec<String>> {
        Ok(self.script.borrow().rows.clone())
    }

    fn get_schema(&mut self) -> HiveResult<Vec<String>> {
        Ok(self.script.borrow().fields.clone())
    }

    fn close(&mut self) -> HiveResult<()> {
        if self.open {
            self.open = false;
            self.script.borrow_mut().closes += 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
