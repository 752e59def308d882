// Ключи Paillier и их генерация

use crate::config::Config;
use crate::crypto::paillier::cipher::CrtHelpers;
use crate::crypto::paillier::math::{
    generate_g, generate_g_fast, l_function, lcm, mod_inverse, random_prime,
};
use crate::error::{CryptoError, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Smallest prime size accepted by [`generate`].
pub const MIN_BITS: usize = 16;

/// Публичный ключ Paillier
///
/// Десериализация проходит через [`PublicKey::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyParts")]
pub struct PublicKey {
    bitspace: usize,
    n: BigUint,
    g: BigUint,
}

/// Непроверенные компоненты ключа в том виде, в каком они пришли по сети
#[derive(Deserialize)]
struct PublicKeyParts {
    bitspace: usize,
    n: BigUint,
    g: BigUint,
}

impl TryFrom<PublicKeyParts> for PublicKey {
    type Error = CryptoError;

    fn try_from(parts: PublicKeyParts) -> Result<Self> {
        PublicKey::new(parts.bitspace, parts.n, parts.g)
    }
}

impl PublicKey {
    /// Собрать ключ из компонентов (например, полученных от получателя)
    pub fn new(bitspace: usize, n: BigUint, g: BigUint) -> Result<Self> {
        let key = Self { bitspace, n, g };
        key.validate()?;
        Ok(key)
    }

    /// Проверить согласованность компонентов: n > 1 и 0 < g < n²
    pub fn validate(&self) -> Result<()> {
        if self.n <= BigUint::one() {
            return Err(CryptoError::InvalidInput(
                "Paillier modulus must be greater than one".to_string(),
            ));
        }
        if self.g.is_zero() || self.g >= self.n_squared() {
            return Err(CryptoError::InvalidInput(
                "Paillier generator must lie in (0, n²)".to_string(),
            ));
        }
        Ok(())
    }

    /// Размер каждого простого множителя (в битах)
    pub fn bitspace(&self) -> usize {
        self.bitspace
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn n_squared(&self) -> BigUint {
        &self.n * &self.n
    }
}

/// Приватный ключ Paillier.
///
/// `WithCrt` additionally carries the factorization of `n` and the
/// generator, which enables decoding modulo `p²` and `q²` separately.
#[derive(Clone, PartialEq, Eq)]
pub enum PrivateKey {
    Standard {
        bitspace: usize,
        lambda: BigUint,
        mu: BigUint,
        n: BigUint,
    },
    WithCrt {
        bitspace: usize,
        lambda: BigUint,
        mu: BigUint,
        n: BigUint,
        p: BigUint,
        q: BigUint,
        g: BigUint,
    },
}

impl PrivateKey {
    pub fn bitspace(&self) -> usize {
        match self {
            PrivateKey::Standard { bitspace, .. } | PrivateKey::WithCrt { bitspace, .. } => {
                *bitspace
            }
        }
    }

    pub fn n(&self) -> &BigUint {
        match self {
            PrivateKey::Standard { n, .. } | PrivateKey::WithCrt { n, .. } => n,
        }
    }

    pub fn lambda(&self) -> &BigUint {
        match self {
            PrivateKey::Standard { lambda, .. } | PrivateKey::WithCrt { lambda, .. } => lambda,
        }
    }

    pub fn mu(&self) -> &BigUint {
        match self {
            PrivateKey::Standard { mu, .. } | PrivateKey::WithCrt { mu, .. } => mu,
        }
    }

    pub fn n_squared(&self) -> BigUint {
        self.n() * self.n()
    }

    pub fn supports_crt(&self) -> bool {
        matches!(self, PrivateKey::WithCrt { .. })
    }

    /// Отбросить p, q, g и оставить только (lambda, mu, n)
    pub fn to_standard(&self) -> PrivateKey {
        PrivateKey::Standard {
            bitspace: self.bitspace(),
            lambda: self.lambda().clone(),
            mu: self.mu().clone(),
            n: self.n().clone(),
        }
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bitspace", &self.bitspace())
            .field("crt", &self.supports_crt())
            .finish_non_exhaustive()
    }
}

/// Пара ключей: публичный ключ и расширенный (CRT) приватный ключ с общим `n`
#[derive(Debug, Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// Сгенерировать пару с параметрами из глобальной конфигурации
    pub fn from_config<R: CryptoRng + RngCore>(rng: &mut R) -> Result<Self> {
        let cfg = Config::global();
        force_generate(cfg.paillier_bits, cfg.fast_generator, rng)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Приватный ключ с CRT-ускорением
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Приватный ключ без факторизации n
    pub fn standard_private_key(&self) -> PrivateKey {
        self.private_key.to_standard()
    }
}

/// Generate a new key pair whose primes `p` and `q` have `bits` bits each.
///
/// `fast` selects the smallest unit in {2, 3, 5, 7, 11} as generator instead
/// of sampling one. Fails with [`CryptoError::Arithmetic`] when a required
/// modular inverse does not exist; nothing usable is returned in that case.
/// `p != q` is not checked separately.
pub fn generate<R: CryptoRng + RngCore>(bits: usize, fast: bool, rng: &mut R) -> Result<KeyPair> {
    if bits < MIN_BITS {
        return Err(CryptoError::InvalidInput(format!(
            "Paillier primes must have at least {} bits, got {}",
            MIN_BITS, bits
        )));
    }

    let p = random_prime(bits, rng);
    let q = random_prime(bits, rng);

    let n = &p * &q;
    let n2 = &n * &n;

    let lambda = lcm(&(&p - 1u32), &(&q - 1u32));
    let g = if fast {
        generate_g_fast(&n, rng)
    } else {
        generate_g(&n, rng)
    };
    let mu = mod_inverse(&l_function(&g.modpow(&lambda, &n2), &n), &n)?;

    // CRT helpers must exist as well, otherwise the extended key is unusable
    CrtHelpers::derive(&p, &q, &g)?;

    debug!(
        target: "crypto::paillier",
        bits,
        fast,
        modulus_bits = n.bits(),
        "Generated Paillier key pair"
    );

    Ok(KeyPair {
        public_key: PublicKey {
            bitspace: bits,
            n: n.clone(),
            g: g.clone(),
        },
        private_key: PrivateKey::WithCrt {
            bitspace: bits,
            lambda,
            mu,
            n,
            p,
            q,
            g,
        },
    })
}

/// Regenerate on arithmetic failure, up to `Config::max_keygen_attempts` times.
pub fn force_generate<R: CryptoRng + RngCore>(
    bits: usize,
    fast: bool,
    rng: &mut R,
) -> Result<KeyPair> {
    force_generate_with_attempts(bits, fast, Config::global().max_keygen_attempts, rng)
}

/// Как [`force_generate`], но с явным лимитом попыток
pub fn force_generate_with_attempts<R: CryptoRng + RngCore>(
    bits: usize,
    fast: bool,
    max_attempts: u32,
    rng: &mut R,
) -> Result<KeyPair> {
    retry_on_arithmetic(max_attempts, || generate(bits, fast, rng))
}

/// Повторять `attempt`, пока он падает с `Arithmetic`; прочие ошибки сразу наверх
fn retry_on_arithmetic<F>(max_attempts: u32, mut attempt: F) -> Result<KeyPair>
where
    F: FnMut() -> Result<KeyPair>,
{
    for attempt_number in 1..=max_attempts {
        match attempt() {
            Ok(pair) => return Ok(pair),
            Err(CryptoError::Arithmetic(reason)) => {
                warn!(
                    target: "crypto::paillier",
                    attempt = attempt_number,
                    max_attempts,
                    %reason,
                    "Key generation hit an arithmetic failure, retrying"
                );
            }
            Err(other) => return Err(other),
        }
    }
    Err(CryptoError::KeyGenerationExhausted {
        attempts: max_attempts,
    })
}
