//! HTTP/HTTPS tracker protocol implementation.
//!
//! Implements the BitTorrent tracker protocol over HTTP/HTTPS as
//! specified in BEP 3 and BEP 23 (compact peer lists).
//!
//! # Supported Endpoints
//!
//! - `/announce` - anonymous peer announcements, refused unless
//!   `allow_anonymous_announces` is enabled in the configuration
//! - `/announce/{passkey}` - announce tied to a user account
//! - `/scrape` - torrent statistics
//! - `/scrape/{passkey}` - torrent statistics, authenticated
//!
//! # Response Format
//!
//! Responses are bencoded dictionaries. Failures carry a bencoded
//! `failure reason` for BitTorrent clients and a matching HTTP status
//! code for everything else in the request path.

/// Core HTTP service implementation.
#[allow(clippy::module_inception)]
pub mod http;
