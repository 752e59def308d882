//! Defines the TransportSuite trait for crypto-agility.

use crate::error::CryptoError;
use core::fmt::Debug;
use rand_core::{CryptoRng, RngCore};

/// Width of every digest produced by a suite.
pub const DIGEST_LENGTH: usize = 32;

/// Trait that formalizes the symmetric and hashing primitives the packet
/// protocol consumes. The Paillier layer is suite-independent.
pub trait TransportSuite: Send + Sync + 'static {
    /// Symmetric key representation
    type SymmetricKey: AsRef<[u8]> + Debug + 'static;

    /// Length of a symmetric key in bytes.
    const KEY_LENGTH: usize;

    /// Block width of the symmetric cipher. A plaintext shorter than one
    /// block encrypts to exactly one block.
    const BLOCK_SIZE: usize;

    /// Generates a fresh ephemeral symmetric key.
    fn generate_symmetric_key<R: CryptoRng + RngCore>(rng: &mut R) -> Self::SymmetricKey;

    /// Rebuilds a key from exactly `KEY_LENGTH` bytes.
    fn symmetric_key_from_bytes(bytes: &[u8]) -> Result<Self::SymmetricKey, CryptoError>;

    /// Encrypts `plaintext` under `key`.
    fn cipher_encrypt(key: &Self::SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts `ciphertext` under `key`. Fails on corrupt input.
    fn cipher_decrypt(key: &Self::SymmetricKey, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Computes the fixed-width digest of `data`.
    fn digest(data: &[u8]) -> [u8; DIGEST_LENGTH];

    /// Returns the SuiteID associated with this suite.
    fn suite_id() -> u16;
}
