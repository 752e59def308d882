//! Разделение секрета на доли
//!
//! Все схемы требуют всех долей (это не пороговые схемы):
//!
//! | Схема | split | combine |
//! |---|---|---|
//! | [`AdditiveSplitter`] | случайные слагаемые | сумма mod n |
//! | [`MultiplicativeSplitter`] | случайные множители | произведение mod n |
//! | [`PaillierSplitter`] | аддитивно, затем каждую долю шифруют Paillier | произведение шифртекстов mod n² |

use crate::crypto::paillier::cipher::combine_ciphertexts;
use crate::crypto::paillier::math::{mod_inverse, mod_sub};
use crate::error::{CryptoError, Result};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

/// Схема разделения секрета: `combine(split(value)) ≡ value (mod n)`
pub trait SecretSplitter {
    /// Split `value` into `share_count >= 2` shares modulo `n`; random
    /// shares are drawn from `[0, 2^bitspace)`.
    fn split<R: CryptoRng + RngCore>(
        value: &BigUint,
        bitspace: usize,
        share_count: usize,
        n: &BigUint,
        rng: &mut R,
    ) -> Result<Vec<BigUint>>;

    /// Exact left inverse of [`SecretSplitter::split`] under the scheme's algebra.
    fn combine(shares: &[BigUint], n: &BigUint) -> BigUint;
}

fn check_arguments(share_count: usize, n: &BigUint) -> Result<()> {
    if share_count < 2 {
        return Err(CryptoError::InvalidInput(format!(
            "At least 2 shares are required, got {}",
            share_count
        )));
    }
    if n <= &BigUint::one() {
        return Err(CryptoError::InvalidInput(
            "Splitting modulus must be greater than one".to_string(),
        ));
    }
    Ok(())
}

/// Аддитивная схема: сумма долей mod n равна секрету
pub struct AdditiveSplitter;

impl SecretSplitter for AdditiveSplitter {
    fn split<R: CryptoRng + RngCore>(
        value: &BigUint,
        bitspace: usize,
        share_count: usize,
        n: &BigUint,
        rng: &mut R,
    ) -> Result<Vec<BigUint>> {
        check_arguments(share_count, n)?;

        let mut shares: Vec<BigUint> = (1..share_count)
            .map(|_| rng.gen_biguint(bitspace as u64))
            .collect();
        let total = shares
            .iter()
            .fold(BigUint::zero(), |acc, share| (acc + share) % n);

        shares.push(mod_sub(value, &total, n));
        Ok(shares)
    }

    fn combine(shares: &[BigUint], n: &BigUint) -> BigUint {
        shares
            .iter()
            .fold(BigUint::zero(), |acc, share| (acc + share) % n)
    }
}

/// Мультипликативная схема: произведение долей mod n равно секрету
pub struct MultiplicativeSplitter;

impl SecretSplitter for MultiplicativeSplitter {
    fn split<R: CryptoRng + RngCore>(
        value: &BigUint,
        bitspace: usize,
        share_count: usize,
        n: &BigUint,
        rng: &mut R,
    ) -> Result<Vec<BigUint>> {
        check_arguments(share_count, n)?;
        if bitspace == 0 {
            return Err(CryptoError::InvalidInput(
                "Multiplicative shares need a non-empty bit space".to_string(),
            ));
        }

        let mut shares = Vec::with_capacity(share_count);
        let mut product = BigUint::one();
        while shares.len() < share_count - 1 {
            let candidate = rng.gen_biguint(bitspace as u64) % n;
            // only units mod n can be inverted for the final share
            if candidate.is_zero() || !candidate.gcd(n).is_one() {
                continue;
            }
            product = (product * &candidate) % n;
            shares.push(candidate);
        }

        let last = (value * mod_inverse(&product, n)?) % n;
        shares.push(last);
        Ok(shares)
    }

    fn combine(shares: &[BigUint], n: &BigUint) -> BigUint {
        shares
            .iter()
            .fold(BigUint::one() % n, |acc, share| (acc * share) % n)
    }
}

/// Аддитивная схема для последующего шифрования Paillier.
///
/// Доли шифруются по отдельности; `combine` работает на стороне
/// шифртекстов (произведение mod n²), и только одна финальная
/// расшифровка даёт сумму долей mod n.
pub struct PaillierSplitter;

impl PaillierSplitter {
    pub fn split<R: CryptoRng + RngCore>(
        value: &BigUint,
        bitspace: usize,
        share_count: usize,
        n: &BigUint,
        rng: &mut R,
    ) -> Result<Vec<BigUint>> {
        AdditiveSplitter::split(value, bitspace, share_count, n, rng)
    }

    /// Multiply Paillier ciphertexts of the shares modulo `n²`.
    pub fn combine(ciphertexts: &[BigUint], n: &BigUint) -> BigUint {
        combine_ciphertexts(ciphertexts, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::paillier::{force_generate, Codec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn modulus(rng: &mut StdRng, bits: u64) -> BigUint {
        // odd modulus with the top bit set
        rng.gen_biguint(bits) | (BigUint::one() << (bits - 1)) | BigUint::one()
    }

    #[test]
    fn test_additive_roundtrip() {
        let mut rng = StdRng::seed_from_u64(100);
        for bits in [128u64, 512] {
            let n = modulus(&mut rng, bits);
            for share_count in 2..=16 {
                let value = rng.gen_biguint_below(&n);
                let shares =
                    AdditiveSplitter::split(&value, bits as usize, share_count, &n, &mut rng)
                        .unwrap();
                assert_eq!(shares.len(), share_count);
                assert_eq!(AdditiveSplitter::combine(&shares, &n), value);
            }
        }
    }

    #[test]
    fn test_multiplicative_roundtrip() {
        let mut rng = StdRng::seed_from_u64(200);
        for bits in [128u64, 512] {
            let n = modulus(&mut rng, bits);
            for share_count in 2..=16 {
                let value = rng.gen_biguint_below(&n);
                let shares =
                    MultiplicativeSplitter::split(&value, bits as usize, share_count, &n, &mut rng)
                        .unwrap();
                assert_eq!(shares.len(), share_count);
                assert_eq!(MultiplicativeSplitter::combine(&shares, &n), value);
            }
        }
    }

    #[test]
    fn test_multiplicative_zero_value() {
        let mut rng = StdRng::seed_from_u64(300);
        let n = BigUint::from(1_000_003u32);
        let shares = MultiplicativeSplitter::split(&BigUint::zero(), 20, 4, &n, &mut rng).unwrap();
        assert_eq!(MultiplicativeSplitter::combine(&shares, &n), BigUint::zero());
    }

    #[test]
    fn test_rejects_single_share() {
        let mut rng = StdRng::seed_from_u64(400);
        let n = BigUint::from(97u32);
        let value = BigUint::from(5u32);

        assert!(matches!(
            AdditiveSplitter::split(&value, 7, 1, &n, &mut rng),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            MultiplicativeSplitter::split(&value, 7, 0, &n, &mut rng),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            PaillierSplitter::split(&value, 7, 1, &n, &mut rng),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_paillier_split_combines_homomorphically() {
        let mut rng = StdRng::seed_from_u64(500);
        let pair = force_generate(64, true, &mut rng).unwrap();
        let codec = Codec::new(&pair, &mut rng).unwrap();
        let n = pair.public_key().n();

        for share_count in [2usize, 5, 8, 16] {
            let value = rng.gen_biguint_below(n);
            let shares = PaillierSplitter::split(&value, 64, share_count, n, &mut rng).unwrap();
            let ciphertexts: Vec<BigUint> = shares
                .iter()
                .map(|share| codec.encode_fresh(share, &mut rng))
                .collect();

            let combined = PaillierSplitter::combine(&ciphertexts, n);
            assert_eq!(codec.decode(&combined), value);
            assert_eq!(codec.decode(&combined), AdditiveSplitter::combine(&shares, n));
        }
    }
}
