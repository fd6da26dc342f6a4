use std::fmt;
use std::fmt::Formatter;
use sha1::{Digest, Sha1};
use crate::common::common::bin2hex;
use crate::common::common::hex_to_nibble;
use crate::tracker::structs::user_id::UserId;

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        bin2hex(&self.0, f)
    }
}

impl std::str::FromStr for UserId {
    type Err = binascii::ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err(binascii::ConvertError::InvalidInputLength);
        }
        let mut result = UserId([0u8; 20]);
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let high = hex_to_nibble(chunk[0]);
            let low = hex_to_nibble(chunk[1]);
            if high == 0xFF || low == 0xFF {
                return Err(binascii::ConvertError::InvalidInput);
            }
            result.0[i] = (high << 4) | low;
        }
        Ok(result)
    }
}

impl UserId {
    /// Derives the identifier from an account passkey.
    pub fn from_passkey(passkey: &str) -> UserId {
        let mut hasher = Sha1::new();
        hasher.update(passkey.as_bytes());
        UserId(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_passkey_is_deterministic() {
        let a = UserId::from_passkey("s3cr3t-passkey");
        let b = UserId::from_passkey("s3cr3t-passkey");
        let c = UserId::from_passkey("other");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_passkey_known_digest() {
        // sha1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        let id = UserId::from_passkey("abc");
        assert_eq!(id.to_string(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
