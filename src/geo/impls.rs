//! Implementation blocks for the geo database.

pub mod geo_db;
