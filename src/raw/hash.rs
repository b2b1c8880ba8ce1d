use std::hash::Hasher;

use siphasher::sip::SipHasher24;

/// A key could not be serialized into its canonical byte encoding.
///
/// Every table operation hashes the key it is handed, so any of them can
/// surface this. A key that fails to encode never produces a digest; the
/// operation fails instead of hashing garbage.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode key: {0}")]
pub struct EncodingError(#[from] bincode::error::EncodeError);

// Canonical byte encoding of a key. Equal keys encode identically, which is
// what lets the digest stand in for the key during probing.
pub fn encode<K: serde::Serialize>(key: &K) -> Result<Vec<u8>, EncodingError> {
    Ok(bincode::serde::encode_to_vec(key, bincode::config::standard())?)
}

// Keyed 64-bit digest of an encoded key.
//
// SipHash-2-4 with a per-table key pair: two tables map the same keys to
// different home slots, so an adversarial key set cannot be pre-clustered
// against a table whose seeds it has not seen.
pub fn digest(k0: u64, k1: u64, bytes: &[u8]) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(k0, k1);
    hasher.write(bytes);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_equal_digests() {
        let a = encode(&(42u64, "key")).unwrap();
        let b = encode(&(42u64, "key")).unwrap();
        assert_eq!(a, b);
        assert_eq!(digest(1, 2, &a), digest(1, 2, &b));
    }

    #[test]
    fn seeds_change_digests() {
        let bytes = encode(&0xfeedu64).unwrap();
        assert_ne!(digest(0, 0, &bytes), digest(0, 1, &bytes));
        assert_ne!(digest(0, 0, &bytes), digest(1, 0, &bytes));
    }

    #[test]
    fn distinct_keys_distinct_encodings() {
        assert_ne!(encode(&"ab").unwrap(), encode(&"ba").unwrap());
        assert_ne!(encode(&1u64).unwrap(), encode(&2u64).unwrap());
    }
}
