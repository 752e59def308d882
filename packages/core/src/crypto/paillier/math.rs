// Теоретико-числовые помощники для Paillier

use crate::error::{CryptoError, Result};
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

/// Small primes tried first as a generator.
const FAST_GENERATORS: [u32; 5] = [2, 3, 5, 7, 11];

/// lcm(a, b) = (a / gcd(a, b)) * b
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    a.lcm(b)
}

/// L(u) = (u - 1) / n
pub fn l_function(u: &BigUint, n: &BigUint) -> BigUint {
    if u.is_zero() {
        return BigUint::zero();
    }
    (u - 1u32) / n
}

/// Modular inverse of `a` mod `m`, or `CryptoError::Arithmetic` when
/// `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(CryptoError::Arithmetic("modulus is zero".to_string()));
    }
    a.modinv(m).ok_or_else(|| {
        CryptoError::Arithmetic("value is not invertible modulo m".to_string())
    })
}

/// (a - b) mod m for unsigned operands.
pub fn mod_sub(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    let diff = BigInt::from(a % m) - BigInt::from(b % m);
    diff.mod_floor(&BigInt::from(m.clone())).magnitude().clone()
}

/// Random probable prime with exactly `bits` bits.
pub fn random_prime<R: CryptoRng + RngCore>(bits: usize, rng: &mut R) -> BigUint {
    let top = BigUint::one() << (bits - 1);
    loop {
        let mut candidate = rng.gen_biguint(bits as u64);
        candidate |= &top;
        candidate |= BigUint::one();
        if is_prime(&candidate, Some(PrimalityTestConfig::default())).probably() {
            return candidate;
        }
    }
}

/// g in Z*_{n²}, general method:
/// random a in the bit space of n, g = a^lcm(a, n²) mod n² + 1
pub fn generate_g<R: CryptoRng + RngCore>(n: &BigUint, rng: &mut R) -> BigUint {
    let n2 = n * n;
    let mut a = rng.gen_biguint(n.bits());
    while a.is_zero() {
        a = rng.gen_biguint(n.bits());
    }
    a.modpow(&lcm(&a, &n2), &n2) + 1u32
}

/// g in Z*_{n²}, as small as possible. Falls back to [`generate_g`] when
/// none of the small primes is a unit mod n².
pub fn generate_g_fast<R: CryptoRng + RngCore>(n: &BigUint, rng: &mut R) -> BigUint {
    let n2 = n * n;
    FAST_GENERATORS
        .iter()
        .map(|&candidate| BigUint::from(candidate))
        .find(|candidate| candidate.gcd(&n2).is_one())
        .unwrap_or_else(|| generate_g(n, rng))
}

/// Blinding factor r in Z*_n, r >= 2.
pub fn generate_r<R: CryptoRng + RngCore>(n: &BigUint, rng: &mut R) -> BigUint {
    let two = BigUint::from(2u32);
    if n <= &two {
        return two;
    }
    loop {
        let r = rng.gen_biguint_range(&two, n);
        if r.gcd(n).is_one() {
            return r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lcm_and_l() {
        assert_eq!(lcm(&BigUint::from(4u32), &BigUint::from(6u32)), BigUint::from(12u32));
        assert_eq!(
            l_function(&BigUint::from(36u32), &BigUint::from(7u32)),
            BigUint::from(5u32)
        );
    }

    #[test]
    fn test_mod_inverse() {
        let inv = mod_inverse(&BigUint::from(3u32), &BigUint::from(11u32)).unwrap();
        assert_eq!(inv, BigUint::from(4u32));

        let result = mod_inverse(&BigUint::from(6u32), &BigUint::from(9u32));
        assert!(matches!(result, Err(CryptoError::Arithmetic(_))));
    }

    #[test]
    fn test_mod_sub_wraps() {
        let m = BigUint::from(10u32);
        assert_eq!(mod_sub(&BigUint::from(3u32), &BigUint::from(7u32), &m), BigUint::from(6u32));
        assert_eq!(mod_sub(&BigUint::from(7u32), &BigUint::from(3u32), &m), BigUint::from(4u32));
    }

    #[test]
    fn test_random_prime_has_exact_bits() {
        let mut rng = StdRng::seed_from_u64(11);
        let p = random_prime(64, &mut rng);
        assert_eq!(p.bits(), 64);
        assert!(is_prime(&p, None).probably());
    }

    #[test]
    fn test_fast_generator_prefers_two() {
        let mut rng = StdRng::seed_from_u64(3);
        // 15 = 3 * 5; 2 is a unit mod 225
        let g = generate_g_fast(&BigUint::from(15u32), &mut rng);
        assert_eq!(g, BigUint::from(2u32));

        // every small prime divides n²: fall back to the general method
        let n = BigUint::from(2u32 * 3 * 5 * 7 * 11);
        let g = generate_g_fast(&n, &mut rng);
        assert!(g >= BigUint::one());
    }

    #[test]
    fn test_blinding_factor_is_unit() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = BigUint::from(3u32 * 5 * 7 * 11 * 13);
        for _ in 0..50 {
            let r = generate_r(&n, &mut rng);
            assert!(r >= BigUint::from(2u32) && r < n);
            assert!(r.gcd(&n).is_one());
        }
    }
}
