/// One IP range with its location.
///
/// Addresses are normalized to `u128`: IPv4 maps through its
/// IPv4-mapped IPv6 form so both families sort into one keyspace.
#[derive(Clone, Debug)]
pub(crate) struct GeoRange {
    pub(crate) start: u128,
    pub(crate) end: u128,
    pub(crate) country: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

/// A successful lookup result.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoLocation {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An immutable, sorted IP range dataset.
///
/// Read-only after loading, so it is shared across request handlers
/// without locking. A reload builds a fresh `GeoDb` and swaps the
/// shared handle.
#[derive(Clone, Debug, Default)]
pub struct GeoDb {
    pub(crate) ranges: Vec<GeoRange>,
}
