//! BitTorrent peer identifier.

/// A 20-byte peer identifier chosen by the client.
///
/// Opaque to the tracker apart from its role as the member value in
/// swarm sets and the key component of peer records.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct PeerId(pub [u8; 20]);
