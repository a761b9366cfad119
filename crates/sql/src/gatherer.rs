//! SQL evidence gathering: template selection, safety gate, execution.

use crate::guard::{is_safe, BLOCKED_MESSAGE};
use crate::query::{QueryKind, QueryPlan, DEFAULT_LIMIT};
use crate::store::SubscriberStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Returned when a query runs but matches no rows.
pub const NO_RESULTS_MESSAGE: &str = "Query executed successfully but returned no results.";

/// Evidence produced for a structured-data question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlEvidence {
    pub kind: QueryKind,
    /// Row limit, for templates that take one
    pub limit: Option<u32>,
    /// The exact query text sent to the store
    pub query: String,
    /// Rendered table or status message
    pub result: String,
}

/// Gathers tabular evidence from the subscriber store.
///
/// Never fails: blocked queries, empty results and execution errors all come
/// back as text for the prompt.
#[derive(Clone)]
pub struct SqlGatherer {
    store: Arc<dyn SubscriberStore>,
    default_limit: u32,
}

impl SqlGatherer {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Choose the template for `question` and run it.
    pub fn gather(&self, question: &str) -> SqlEvidence {
        let QueryPlan { kind, limit, sql } = QueryPlan::for_question(question, self.default_limit);
        tracing::info!("SQL template {:?} selected", kind);
        tracing::debug!("SQL: {}", sql);

        let result = self.run_query(&sql);
        SqlEvidence {
            kind,
            limit,
            query: sql,
            result,
        }
    }

    /// Run `sql` through the safety gate and the store, rendering the outcome.
    pub fn run_query(&self, sql: &str) -> String {
        if !is_safe(sql) {
            tracing::warn!("Blocked non-read-only query");
            return BLOCKED_MESSAGE.to_string();
        }

        match self.store.query(sql) {
            Ok(table) if table.is_empty() => NO_RESULTS_MESSAGE.to_string(),
            Ok(table) => table.render(),
            Err(e) => {
                tracing::error!("SQL execution failed: {}", e);
                format!("SQL execution error: {}", e)
            }
        }
    }
}
