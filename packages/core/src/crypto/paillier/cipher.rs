//! Шифрование и расшифровка Paillier.
//!
//! Три контекста вместо одного объекта с nullable-полями:
//!
//! - [`Encoder`]: только публичный ключ, предвычисляет `n²` и `r^n mod n²`
//! - [`Decoder`]: только приватный ключ, для `WithCrt` предвычисляет `hp`, `hq`
//! - [`Codec`]: полная пара, умеет и то и другое
//!
//! Контекст привязан к одному ключу и не предназначен для одновременной
//! мутации из нескольких потоков. Статические [`encode`] / [`decode`]
//! медленнее, но не требуют контекста.

use crate::crypto::paillier::keys::{KeyPair, PrivateKey, PublicKey};
use crate::crypto::paillier::math::{generate_r, l_function, mod_inverse, mod_sub};
use crate::error::Result;
use num_bigint::BigUint;
use num_traits::One;
use rand_core::{CryptoRng, RngCore};

/// Encode with a freshly sampled blinding factor: `c = g^m * r^n mod n²`.
pub fn encode<R: CryptoRng + RngCore>(key: &PublicKey, m: &BigUint, rng: &mut R) -> BigUint {
    let n2 = key.n_squared();
    let r = generate_r(key.n(), rng);
    (key.g().modpow(m, &n2) * r.modpow(key.n(), &n2)) % &n2
}

/// Decode via the standard path: `m = L(c^lambda mod n², n) * mu mod n`.
pub fn decode(key: &PrivateKey, c: &BigUint) -> BigUint {
    let n2 = key.n_squared();
    standard_decode(key, c, &n2)
}

/// Homomorphic combination: the product of ciphertexts mod `n²` decodes to
/// the sum of their plaintexts mod `n`.
pub fn combine_ciphertexts<'a, I>(ciphertexts: I, n: &BigUint) -> BigUint
where
    I: IntoIterator<Item = &'a BigUint>,
{
    let n2 = n * n;
    ciphertexts
        .into_iter()
        .fold(BigUint::one(), |acc, c| (acc * c) % &n2)
}

fn standard_decode(key: &PrivateKey, c: &BigUint, n2: &BigUint) -> BigUint {
    let n = key.n();
    (l_function(&c.modpow(key.lambda(), n2), n) * key.mu()) % n
}

/// Предвычисленные значения для CRT
#[derive(Clone)]
pub(crate) struct CrtHelpers {
    p: BigUint,
    q: BigUint,
    p_squared: BigUint,
    q_squared: BigUint,
    p_minus_one: BigUint,
    q_minus_one: BigUint,
    hp: BigUint,
    hq: BigUint,
    q_inv_p: BigUint,
}

impl CrtHelpers {
    /// hp = L(g^(p-1) mod p², p)^-1 mod p, hq analogously, q^-1 mod p
    pub(crate) fn derive(p: &BigUint, q: &BigUint, g: &BigUint) -> Result<Self> {
        let p_squared = p * p;
        let q_squared = q * q;
        let p_minus_one = p - 1u32;
        let q_minus_one = q - 1u32;

        let hp = mod_inverse(&l_function(&g.modpow(&p_minus_one, &p_squared), p), p)?;
        let hq = mod_inverse(&l_function(&g.modpow(&q_minus_one, &q_squared), q), q)?;
        let q_inv_p = mod_inverse(q, p)?;

        Ok(Self {
            p: p.clone(),
            q: q.clone(),
            p_squared,
            q_squared,
            p_minus_one,
            q_minus_one,
            hp,
            hq,
            q_inv_p,
        })
    }

    /// m_p = L(c^(p-1) mod p², p) * hp mod p, m_q analogously,
    /// recombined as m = m_q + q * ((m_p - m_q) * q^-1 mod p)
    fn decode(&self, c: &BigUint) -> BigUint {
        let m_p = (l_function(&c.modpow(&self.p_minus_one, &self.p_squared), &self.p) * &self.hp)
            % &self.p;
        let m_q = (l_function(&c.modpow(&self.q_minus_one, &self.q_squared), &self.q) * &self.hq)
            % &self.q;

        let h = (mod_sub(&m_p, &m_q, &self.p) * &self.q_inv_p) % &self.p;
        m_q + h * &self.q
    }
}

/// Контекст шифрования, привязанный к одному публичному ключу
#[derive(Clone)]
pub struct Encoder {
    key: PublicKey,
    n_squared: BigUint,
    blinding: BigUint,
}

impl Encoder {
    /// Precompute `n²` and the blinding term `r^n mod n²`.
    pub fn new<R: CryptoRng + RngCore>(key: &PublicKey, rng: &mut R) -> Self {
        let n_squared = key.n_squared();
        let r = generate_r(key.n(), rng);
        let blinding = r.modpow(key.n(), &n_squared);
        Self {
            key: key.clone(),
            n_squared,
            blinding,
        }
    }

    /// Encode reusing the precomputed blinding term.
    pub fn encode(&self, m: &BigUint) -> BigUint {
        (self.key.g().modpow(m, &self.n_squared) * &self.blinding) % &self.n_squared
    }

    /// Encode with a fresh blinding factor.
    pub fn encode_fresh<R: CryptoRng + RngCore>(&self, m: &BigUint, rng: &mut R) -> BigUint {
        let r = generate_r(self.key.n(), rng);
        (self.key.g().modpow(m, &self.n_squared) * r.modpow(self.key.n(), &self.n_squared))
            % &self.n_squared
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }
}

/// Контекст расшифровки, привязанный к одному приватному ключу
#[derive(Clone)]
pub struct Decoder {
    key: PrivateKey,
    n_squared: BigUint,
    crt: Option<CrtHelpers>,
}

impl Decoder {
    /// Precompute `n²` and, for `WithCrt` keys, the CRT helpers.
    pub fn new(key: &PrivateKey) -> Result<Self> {
        let crt = match key {
            PrivateKey::Standard { .. } => None,
            PrivateKey::WithCrt { p, q, g, .. } => Some(CrtHelpers::derive(p, q, g)?),
        };
        Ok(Self {
            key: key.clone(),
            n_squared: key.n_squared(),
            crt,
        })
    }

    /// Decode, using CRT when the key carries the factorization of `n`.
    pub fn decode(&self, c: &BigUint) -> BigUint {
        match &self.crt {
            Some(crt) => crt.decode(c),
            None => standard_decode(&self.key, c, &self.n_squared),
        }
    }

    /// Decode via the standard path regardless of the key shape.
    pub fn decode_standard(&self, c: &BigUint) -> BigUint {
        standard_decode(&self.key, c, &self.n_squared)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }
}

/// Контекст для полной пары ключей
#[derive(Clone)]
pub struct Codec {
    encoder: Encoder,
    decoder: Decoder,
}

impl Codec {
    pub fn new<R: CryptoRng + RngCore>(pair: &KeyPair, rng: &mut R) -> Result<Self> {
        Ok(Self {
            encoder: Encoder::new(pair.public_key(), rng),
            decoder: Decoder::new(pair.private_key())?,
        })
    }

    pub fn encode(&self, m: &BigUint) -> BigUint {
        self.encoder.encode(m)
    }

    pub fn encode_fresh<R: CryptoRng + RngCore>(&self, m: &BigUint, rng: &mut R) -> BigUint {
        self.encoder.encode_fresh(m, rng)
    }

    pub fn decode(&self, c: &BigUint) -> BigUint {
        self.decoder.decode(c)
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}
