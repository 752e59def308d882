use crate::crypto::provider::{TransportSuite, DIGEST_LENGTH};
use crate::error::CryptoError;
use aes::Aes256;
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

const KEY_BYTES: usize = 32;

/// Эфемерный ключ AES-256, обнуляется при drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AesKey([u8; KEY_BYTES]);

impl AesKey {
    pub fn new(bytes: [u8; KEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for AesKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for AesKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AesKey(..)")
    }
}

/// Concrete implementation of `TransportSuite`: AES-256 in ECB mode with
/// PKCS#7 padding, SHA-256 digests.
pub struct ClassicSuite;

impl TransportSuite for ClassicSuite {
    type SymmetricKey = AesKey;

    const KEY_LENGTH: usize = KEY_BYTES;
    const BLOCK_SIZE: usize = 16;

    fn generate_symmetric_key<R: CryptoRng + RngCore>(rng: &mut R) -> Self::SymmetricKey {
        let mut bytes = [0u8; KEY_BYTES];
        rng.fill_bytes(&mut bytes);
        let key = AesKey::new(bytes);
        bytes.zeroize();
        key
    }

    fn symmetric_key_from_bytes(bytes: &[u8]) -> Result<Self::SymmetricKey, CryptoError> {
        let array: [u8; KEY_BYTES] = bytes.try_into().map_err(|_| {
            CryptoError::Cipher(format!(
                "Invalid AES key length: expected {}, got {}",
                KEY_BYTES,
                bytes.len()
            ))
        })?;
        Ok(AesKey::new(array))
    }

    fn cipher_encrypt(key: &Self::SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256EcbEnc::new_from_slice(key.as_ref())
            .map_err(|e| CryptoError::Cipher(format!("Invalid AES key: {}", e)))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn cipher_decrypt(key: &Self::SymmetricKey, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.is_empty() || ciphertext.len() % Self::BLOCK_SIZE != 0 {
            return Err(CryptoError::Cipher(format!(
                "Ciphertext length {} is not a multiple of the block size",
                ciphertext.len()
            )));
        }
        let cipher = Aes256EcbDec::new_from_slice(key.as_ref())
            .map_err(|e| CryptoError::Cipher(format!("Invalid AES key: {}", e)))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| CryptoError::Cipher(format!("Decryption failed: {}", e)))
    }

    fn digest(data: &[u8]) -> [u8; DIGEST_LENGTH] {
        Sha256::digest(data).into()
    }

    fn suite_id() -> u16 {
        crate::crypto::CLASSIC_SUITE_ID
    }
}
