// Wire format: упаковка сообщения в N пакетов и разбор одного пакета
//
// pack:  K ← эфемерный ключ; K делится на N долей, каждая шифруется Paillier;
//        данные шифруются под K и режутся на N кусков; номер канала шифруется под K;
//        пакеты перемешиваются криптографически стойким RNG.
// read:  поля читаются по очереди, нехватка байт сообщается для каждого поля отдельно.

use crate::config::Config;
use crate::crypto::paillier::{encode, PrivateKey, PublicKey};
use crate::crypto::provider::{TransportSuite, DIGEST_LENGTH};
use crate::crypto::splitters::PaillierSplitter;
use crate::error::{CryptoError, Result};
use crate::protocol::fixed_width::{decode_unsigned, encode_unsigned};
use crate::protocol::packet::{
    PacketField, PacketLayout, RawPacket, CHANNEL_INDEX_SIZE, LENGTH_FIELD_SIZE,
};
use crate::protocol::partition::split_uniform;
use num_bigint::BigUint;
use rand::seq::SliceRandom;
use rand_core::{CryptoRng, RngCore};
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Упаковать блок данных в `partitions` пакетов для владельца `key`
///
/// # Arguments
/// * `key` - Публичный ключ получателя
/// * `partitions` - Количество каналов (N >= 2)
/// * `sequence_number` - Номер блока сообщения
/// * `data` - Блок данных
///
/// # Returns
/// N пакетов в случайном порядке. Порядок вывода ничего не говорит о
/// номере канала.
pub fn pack<S, R>(
    key: &PublicKey,
    partitions: usize,
    sequence_number: u32,
    data: &[u8],
    rng: &mut R,
) -> Result<Vec<Vec<u8>>>
where
    S: TransportSuite,
    R: CryptoRng + RngCore,
{
    let min_partitions = Config::global().min_partitions.max(2);
    if partitions < min_partitions {
        return Err(CryptoError::InvalidInput(format!(
            "At least {} partitions are required, got {}",
            min_partitions, partitions
        )));
    }
    if u32::try_from(partitions).is_err() {
        return Err(CryptoError::InvalidInput(format!(
            "Too many partitions: {}",
            partitions
        )));
    }
    if key.n().bits() <= (S::KEY_LENGTH * 8) as u64 {
        return Err(CryptoError::InvalidInput(format!(
            "Paillier modulus of {} bits cannot carry a {}-bit symmetric key",
            key.n().bits(),
            S::KEY_LENGTH * 8
        )));
    }
    if key.n().bits() > (2 * key.bitspace()) as u64 {
        return Err(CryptoError::InvalidInput(
            "Paillier modulus exceeds the declared bit space".to_string(),
        ));
    }

    if S::BLOCK_SIZE < CHANNEL_INDEX_SIZE {
        return Err(CryptoError::UnsupportedCapability(format!(
            "Block cipher with blocks of at least {} bytes",
            CHANNEL_INDEX_SIZE
        )));
    }

    let layout = PacketLayout::new::<S>(key.bitspace());

    // Ключ блока: деление, шифрование долей, дайджест
    let block_key = S::generate_symmetric_key(rng);
    let key_value = BigUint::from_bytes_be(block_key.as_ref());
    let shares = PaillierSplitter::split(&key_value, key.bitspace(), partitions, key.n(), rng)?;
    let encoded_shares: Vec<BigUint> = shares.iter().map(|share| encode(key, share, rng)).collect();
    let key_digest = S::digest(block_key.as_ref());

    // Шифрование и разбиение данных
    let ciphertext = S::cipher_encrypt(&block_key, data).map_err(|e| {
        CryptoError::Encoding(format!("Data block cannot be encrypted: {}", e))
    })?;
    let chunks = split_uniform(&ciphertext, partitions, rng)?;

    let mut packets = Vec::with_capacity(partitions);
    for (index, (share, chunk)) in encoded_shares.iter().zip(chunks).enumerate() {
        let enc_index = S::cipher_encrypt(&block_key, &(index as u32).to_be_bytes())?;
        if enc_index.len() != layout.channel_index {
            return Err(CryptoError::UnsupportedCapability(format!(
                "Block cipher with fixed {}-byte blocks (channel index encrypted to {} bytes)",
                layout.channel_index,
                enc_index.len()
            )));
        }
        let share_bytes = encode_unsigned(share, layout.key_share)?;

        let size = layout.header_len() + chunk.len();
        let size_field = u32::try_from(size).map_err(|_| {
            CryptoError::Encoding(format!("Packet of {} bytes exceeds the size field", size))
        })?;

        let mut packet = Vec::with_capacity(size);
        packet.extend_from_slice(&size_field.to_be_bytes());
        packet.extend_from_slice(&sequence_number.to_be_bytes());
        packet.extend_from_slice(&share_bytes);
        packet.extend_from_slice(&key_digest);
        packet.extend_from_slice(&enc_index);
        packet.extend_from_slice(chunk);
        packets.push(packet);
    }

    // Перемешать, чтобы порядок каналов не зависел от порядка отправки
    packets.shuffle(rng);

    debug!(
        target: "protocol::wire",
        sequence_number,
        partitions,
        payload_len = data.len(),
        ciphertext_len = ciphertext.len(),
        "Packed data block"
    );

    Ok(packets)
}

/// Прочитать один пакет из потока
///
/// Ширина доли ключа берётся из `key.bitspace()`. Если поток кончился
/// посреди поля, возвращается [`CryptoError::StreamTruncated`] с этим полем.
pub fn read_packet<S, T>(key: &PrivateKey, stream: &mut T) -> Result<RawPacket>
where
    S: TransportSuite,
    T: Read,
{
    let layout = PacketLayout::new::<S>(key.bitspace());

    let size = read_u32(stream, PacketField::TotalLength)? as usize;
    if size < layout.header_len() {
        return Err(CryptoError::MalformedPacket(format!(
            "Declared size {} is smaller than the {}-byte header",
            size,
            layout.header_len()
        )));
    }

    let sequence_number = read_u32(stream, PacketField::SequenceNumber)?;

    let share_bytes = read_field(stream, layout.key_share, PacketField::EncryptedKeyShare)?;
    let part_key = decode_unsigned(&share_bytes)
        .map_err(|e| CryptoError::MalformedPacket(e.to_string()))?;

    let digest_bytes = read_field(stream, layout.digest, PacketField::KeyDigest)?;
    let mut key_digest = [0u8; DIGEST_LENGTH];
    key_digest.copy_from_slice(&digest_bytes);

    let enc_channel_id =
        read_field(stream, layout.channel_index, PacketField::EncryptedChannelIndex)?;

    let remainder = size - layout.header_len();
    let block = read_tail(stream, remainder, PacketField::CiphertextChunk)?;

    Ok(RawPacket {
        sequence_number,
        part_key,
        key_digest,
        enc_channel_id,
        block,
    })
}

/// Прочитать один пакет из среза байт
pub fn read_packet_from_bytes<S: TransportSuite>(key: &PrivateKey, bytes: &[u8]) -> Result<RawPacket> {
    let mut cursor = bytes;
    read_packet::<S, _>(key, &mut cursor)
}

fn read_u32<T: Read>(stream: &mut T, field: PacketField) -> Result<u32> {
    let mut buf = [0u8; LENGTH_FIELD_SIZE];
    stream.read_exact(&mut buf).map_err(|e| map_io(e, field))?;
    Ok(u32::from_be_bytes(buf))
}

fn read_field<T: Read>(stream: &mut T, len: usize, field: PacketField) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).map_err(|e| map_io(e, field))?;
    Ok(buf)
}

/// Читает до `len` байт без предварительного выделения всего буфера:
/// объявленный размер приходит из сети.
fn read_tail<T: Read>(stream: &mut T, len: usize, field: PacketField) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| map_io(e, field))?;
    if buf.len() != len {
        return Err(CryptoError::StreamTruncated { field });
    }
    Ok(buf)
}

fn map_io(err: std::io::Error, field: PacketField) -> CryptoError {
    match err.kind() {
        ErrorKind::UnexpectedEof => CryptoError::StreamTruncated { field },
        _ => CryptoError::Io { field, source: err },
    }
}
