//! Response decoder module
//!
//! Amazon Ads list endpoints return JSON; report downloads may arrive
//! gzip-compressed. The decoder inflates the body when needed, parses it,
//! and extracts the stream's records by JSONPath.

mod decoders;
mod types;

pub use decoders::{decompress, JsonDecoder};
pub use types::Compression;

#[cfg(test)]
mod tests;
