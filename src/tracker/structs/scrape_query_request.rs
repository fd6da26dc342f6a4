//! Scrape request query parameters.

use crate::tracker::structs::info_hash::InfoHash;

/// Validated scrape request parameters.
///
/// Multiple `info_hash` parameters in one request accumulate here and
/// are answered in a single response dictionary.
#[derive(Clone, Debug)]
pub struct ScrapeQueryRequest {
    pub info_hash: Vec<InfoHash>,
}
