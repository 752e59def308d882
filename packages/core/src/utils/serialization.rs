// Сериализация публичного ключа для передачи отправителю

use crate::crypto::paillier::PublicKey;
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub fn to_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(data)?)
}

pub fn from_bytes<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn public_key_to_bytes(key: &PublicKey) -> Result<Vec<u8>> {
    to_bytes(key)
}

/// Десериализовать публичный ключ; некорректные компоненты отклоняются
pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey> {
    from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::paillier::force_generate;
    use crate::error::CryptoError;
    use num_bigint::BigUint;
    use num_traits::Zero;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_public_key_bytes() {
        let mut rng = StdRng::seed_from_u64(30);
        let pair = force_generate(64, true, &mut rng).unwrap();

        let bytes = public_key_to_bytes(pair.public_key()).unwrap();
        let restored = public_key_from_bytes(&bytes).unwrap();
        assert_eq!(restored.n(), pair.public_key().n());
        assert_eq!(restored.g(), pair.public_key().g());
        assert_eq!(restored.bitspace(), 64);
    }

    #[test]
    fn test_invalid_key_rejected_by_generic_decoder() {
        // bitspace, n, g with g = 0
        let bytes = to_bytes(&(8usize, BigUint::from(15u32), BigUint::zero())).unwrap();

        let generic = from_bytes::<PublicKey>(&bytes);
        assert!(matches!(generic, Err(CryptoError::Serialization(_))));
        assert!(public_key_from_bytes(&bytes).is_err());

        let bytes = to_bytes(&(8usize, BigUint::from(15u32), BigUint::from(2u32))).unwrap();
        assert!(from_bytes::<PublicKey>(&bytes).is_ok());
    }

    #[test]
    fn test_garbage_rejected() {
        let result = public_key_from_bytes(&[1, 2, 3]);
        assert!(matches!(result, Err(CryptoError::Serialization(_))));
    }
}
