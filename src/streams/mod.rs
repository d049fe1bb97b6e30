//! Stream catalog
//!
//! Static definitions of the syncable Amazon Ads streams, request
//! construction per ad product, `_select` handling, and Singer catalog
//! discovery.
//!
//! Entity streams (campaigns, ad groups, targets, ads) page through the
//! list endpoints of the configured ad product. Report streams create a
//! report over the configured date range and read its rows.

mod catalog;
mod discover;
mod request;
mod selection;

pub use catalog::{
    find_stream, EntityEndpoints, ReportConfig, StreamDefinition, StreamKind, REPORT_MEDIA_TYPE,
    REPORT_PATH, STREAMS,
};
pub use discover::{Catalog, CatalogEntry};
pub use request::{RequestContext, StreamRequest, ENTITY_STATES};
pub use selection::{Selection, StreamSelection};
