//! Coarse IP geolocation from a local range dataset.
//!
//! Loads a CSV of IP ranges with a country code and coordinates, and
//! answers lookups with a binary search over the sorted ranges. Used
//! only to order peer lists with nearer peers first; a miss degrades
//! to "unknown" and never fails a request. No network calls.
//!
//! The dataset reloads on the same signal as the configuration.

/// Implementation blocks for the geo database.
pub mod impls;

/// Geo data structures.
pub mod structs;
