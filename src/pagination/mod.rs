//! Pagination module
//!
//! Supports: start-index paging with `nextToken` continuation, and
//! single-request endpoints.
//!
//! # Overview
//!
//! Amazon Ads list endpoints page through `startIndex`/`count` and report
//! the total number of results in a `pagination` object. Each strategy
//! decides the next page from the previous response body.

mod strategies;
mod types;

pub use strategies::{NoPaginator, StartIndexPaginator};
pub use types::{NextPage, PageRequest, PaginationState, Paginator};
