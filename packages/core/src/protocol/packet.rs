//! Формат пакета на проводе
//!
//! ```text
//! ┌────────────┬────────────┬──────────────────────┬────────────┬──────────────┬───────────────┐
//! │ totalLength│ sequence   │ encryptedKeyShare    │ keyDigest  │ encChannelId │ ciphertext    │
//! │ 4 bytes BE │ 4 bytes BE │ byte_len(n²) + 1     │ 32 bytes   │ 1 block (16) │ остаток       │
//! └────────────┴────────────┴──────────────────────┴────────────┴──────────────┴───────────────┘
//! ```
//!
//! Ширина доли ключа выводится из `bitspace`, чтобы отправитель и
//! получатель совпадали, не зная конкретного `n`.

use crate::crypto::provider::{TransportSuite, DIGEST_LENGTH};
use num_bigint::BigUint;
use std::fmt;

/// Ширина полей totalLength и sequenceNumber
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Ширина открытого номера канала до шифрования
pub const CHANNEL_INDEX_SIZE: usize = 4;

/// Поле пакета, используется в ошибках разбора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketField {
    TotalLength,
    SequenceNumber,
    EncryptedKeyShare,
    KeyDigest,
    EncryptedChannelIndex,
    CiphertextChunk,
}

impl fmt::Display for PacketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketField::TotalLength => "packet size",
            PacketField::SequenceNumber => "packet sequence number",
            PacketField::EncryptedKeyShare => "homomorphically encrypted key share",
            PacketField::KeyDigest => "key digest",
            PacketField::EncryptedChannelIndex => "encrypted channel index",
            PacketField::CiphertextChunk => "encrypted data block",
        };
        f.write_str(name)
    }
}

/// Принятый пакет, неизменяемый после разбора
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub sequence_number: u32,
    pub part_key: BigUint,
    pub key_digest: [u8; DIGEST_LENGTH],
    pub enc_channel_id: Vec<u8>,
    pub block: Vec<u8>,
}

/// Field widths for one Paillier key size and one transport suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketLayout {
    pub length_field: usize,
    pub key_share: usize,
    pub digest: usize,
    pub channel_index: usize,
}

impl PacketLayout {
    pub fn new<S: TransportSuite>(bitspace: usize) -> Self {
        Self {
            length_field: LENGTH_FIELD_SIZE,
            key_share: key_share_width(bitspace),
            digest: DIGEST_LENGTH,
            channel_index: S::BLOCK_SIZE,
        }
    }

    /// Sum of all fields preceding the ciphertext chunk.
    pub fn header_len(&self) -> usize {
        2 * self.length_field + self.key_share + self.digest + self.channel_index
    }
}

/// `n < 2^(2·bitspace)`, so the ciphertext modulus `n²` needs
/// `ceil(4·bitspace / 8)` bytes; one more byte keeps the sign bit clear.
pub fn key_share_width(bitspace: usize) -> usize {
    (4 * bitspace + 7) / 8 + 1
}
