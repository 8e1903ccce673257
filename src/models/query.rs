use serde::{Deserialize, Serialize};

/// One materialized result row: field name to cell text
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Raw query output: field names from the result schema plus tab-delimited rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub fields: Vec<String>,
    pub rows: Vec<String>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
