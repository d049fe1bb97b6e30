//! Pagination strategy implementations

use super::types::{NextPage, PageRequest, Paginator};
use serde_json::Value;

// ============================================================================
// Start Index Pagination
// ============================================================================

/// Start-index pagination used by the Amazon Ads list endpoints.
///
/// Requests carry `startIndex` and `count`; responses report
/// `pagination.totalResults`. Paging continues while
/// `startIndex + count < totalResults` and stops as soon as a response
/// has no `pagination` object. A non-empty `nextToken` in the response
/// takes precedence over index arithmetic.
#[derive(Debug, Clone)]
pub struct StartIndexPaginator {
    /// Records per page
    pub page_size: u32,
}

impl StartIndexPaginator {
    /// Create a new start-index paginator
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }
}

impl Paginator for StartIndexPaginator {
    fn first_page(&self) -> PageRequest {
        PageRequest::first(self.page_size)
    }

    fn next_page(&self, body: &Value, current: &PageRequest) -> NextPage {
        let advanced = current.start_index + u64::from(current.count);

        if let Some(token) = body
            .get("nextToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        {
            // A repeated token would loop forever
            if current.next_token.as_deref() == Some(token) {
                return NextPage::Done;
            }
            return NextPage::Continue(PageRequest {
                start_index: advanced,
                count: current.count,
                next_token: Some(token.to_string()),
            });
        }

        let Some(pagination) = body.get("pagination").filter(|p| !p.is_null()) else {
            return NextPage::Done;
        };

        let total = pagination
            .get("totalResults")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        if advanced >= total {
            return NextPage::Done;
        }

        NextPage::Continue(PageRequest {
            start_index: advanced,
            count: current.count,
            next_token: None,
        })
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// Single-request endpoints (report creation)
#[derive(Debug, Clone)]
pub struct NoPaginator {
    /// Records requested
    pub page_size: u32,
}

impl Paginator for NoPaginator {
    fn first_page(&self) -> PageRequest {
        PageRequest::first(self.page_size)
    }

    fn next_page(&self, _body: &Value, _current: &PageRequest) -> NextPage {
        NextPage::Done
    }
}
