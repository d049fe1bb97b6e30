//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::types::JsonObject;
use serde_json::Value;
use std::collections::HashMap;

/// Position of one page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Index of the first record to return
    pub start_index: u64,
    /// Number of records requested
    pub count: u32,
    /// Continuation token from the previous page, if the API issued one
    pub next_token: Option<String>,
}

impl PageRequest {
    /// The first page
    pub fn first(count: u32) -> Self {
        Self {
            start_index: 0,
            count,
            next_token: None,
        }
    }

    /// Write the paging fields into a JSON request body
    pub fn apply_to_body(&self, body: &mut JsonObject) {
        body.insert("startIndex".to_string(), Value::from(self.start_index));
        body.insert("count".to_string(), Value::from(self.count));
        match &self.next_token {
            Some(token) => {
                body.insert("nextToken".to_string(), Value::String(token.clone()));
            }
            None => {
                body.remove("nextToken");
            }
        }
    }

    /// Paging fields as query parameters, for GET endpoints
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("startIndex".to_string(), self.start_index.to_string());
        params.insert("count".to_string(), self.count.to_string());
        if let Some(token) = &self.next_token {
            params.insert("nextToken".to_string(), token.clone());
        }
        params
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available
    Continue(PageRequest),
    /// No more pages
    Done,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub pages: u64,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched page
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.total_fetched += records as u64;
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Request for the first page
    fn first_page(&self) -> PageRequest;

    /// Decide the next page from a response body
    fn next_page(&self, body: &Value, current: &PageRequest) -> NextPage;
}
