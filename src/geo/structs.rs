//! Geo data structures.

/// The range dataset and lookup results.
pub mod geo_db;
