//! User account identifier.

/// A 20-byte user identifier, the SHA-1 digest of the account passkey.
///
/// Hashing the passkey means store keys never contain the raw secret
/// and arbitrary-length passkeys map to a fixed-size identifier.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, serde::Serialize)]
pub struct UserId(pub [u8; 20]);
