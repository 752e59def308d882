// Сборка одного блока данных из пакетов
//
// Доли ключа складываются на стороне шифртекстов (произведение mod n²).
// После каждого пакета текущая сумма расшифровывается и сравнивается с
// дайджестом: совпадение означает, что собраны все доли.

use crate::crypto::paillier::{Decoder, PrivateKey};
use crate::crypto::provider::{TransportSuite, DIGEST_LENGTH};
use crate::crypto::suites::classic::ClassicSuite;
use crate::error::{CryptoError, Result};
use crate::protocol::packet::{RawPacket, CHANNEL_INDEX_SIZE};
use num_bigint::BigUint;
use num_traits::One;
use std::marker::PhantomData;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Состояние сборки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    /// Ни одного пакета не принято
    Empty,
    /// Пакеты приняты, ключ ещё не восстановлен
    Accumulating,
    /// Ключ восстановлен, можно вызвать `finish`
    Complete,
    Finished,
}

/// Сборщик пакетов с одним номером последовательности
pub struct Reassembler<S: TransportSuite = ClassicSuite> {
    sequence_number: u32,
    decoder: Decoder,
    combined_share: BigUint,
    key_digest: Option<[u8; DIGEST_LENGTH]>,
    packets: Vec<RawPacket>,
    state: ReassemblyState,
    _suite: PhantomData<S>,
}

impl<S: TransportSuite> Reassembler<S> {
    pub fn new(key: &PrivateKey, sequence_number: u32) -> Result<Self> {
        Ok(Self::from_decoder(Decoder::new(key)?, sequence_number))
    }

    /// Переиспользовать готовый контекст расшифровки
    pub fn from_decoder(decoder: Decoder, sequence_number: u32) -> Self {
        Self {
            sequence_number,
            decoder,
            combined_share: BigUint::one(),
            key_digest: None,
            packets: Vec::new(),
            state: ReassemblyState::Empty,
            _suite: PhantomData,
        }
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn state(&self) -> ReassemblyState {
        self.state
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// Принять пакет
    ///
    /// # Returns
    /// `true`, когда принятых долей достаточно для восстановления ключа.
    /// Отклонённый пакет не меняет состояние.
    pub fn read(&mut self, packet: RawPacket) -> Result<bool> {
        if self.state == ReassemblyState::Finished {
            return Err(CryptoError::AlreadyFinished);
        }
        if packet.sequence_number != self.sequence_number {
            return Err(CryptoError::MalformedPacket(format!(
                "Packet belongs to sequence {}, expected {}",
                packet.sequence_number, self.sequence_number
            )));
        }
        if let Some(digest) = &self.key_digest {
            if digest != &packet.key_digest {
                warn!(
                    target: "protocol::reassembly",
                    sequence_number = self.sequence_number,
                    "Key digest differs from the first packet"
                );
                return Err(CryptoError::MalformedPacket(
                    "Key digest differs from earlier packets".to_string(),
                ));
            }
        }

        // Повторная передача: доля уже учтена в произведении
        let duplicate = self.packets.iter().any(|stored| {
            stored.enc_channel_id == packet.enc_channel_id || stored.part_key == packet.part_key
        });
        if duplicate {
            debug!(
                target: "protocol::reassembly",
                sequence_number = self.sequence_number,
                "Duplicate packet rejected"
            );
            return Err(CryptoError::MalformedPacket(
                "Packet was already received".to_string(),
            ));
        }

        self.key_digest = Some(packet.key_digest);
        self.combined_share = (&self.combined_share * &packet.part_key) % self.decoder.n_squared();
        self.packets.push(packet);

        let complete = self.recover_key().is_some();
        self.state = if complete {
            ReassemblyState::Complete
        } else {
            ReassemblyState::Accumulating
        };

        debug!(
            target: "protocol::reassembly",
            sequence_number = self.sequence_number,
            packets = self.packets.len(),
            complete,
            "Accepted packet"
        );

        Ok(complete)
    }

    /// Расшифровать и склеить блок данных
    ///
    /// Допустимо только в состоянии `Complete`.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        match self.state {
            ReassemblyState::Finished => return Err(CryptoError::AlreadyFinished),
            ReassemblyState::Empty | ReassemblyState::Accumulating => {
                return Err(CryptoError::Incomplete)
            }
            ReassemblyState::Complete => {}
        }
        let key = self.recover_key().ok_or(CryptoError::Incomplete)?;

        // Упорядочить куски по расшифрованному номеру канала
        let mut ordered: Vec<Option<&RawPacket>> = vec![None; self.packets.len()];
        for packet in &self.packets {
            let index = Self::channel_index(&key, packet)?;
            let slot = ordered.get_mut(index).ok_or_else(|| {
                CryptoError::MalformedPacket(format!(
                    "Channel index {} is outside of {} received packets",
                    index,
                    self.packets.len()
                ))
            })?;
            if slot.is_some() {
                return Err(CryptoError::MalformedPacket(format!(
                    "Channel index {} appears twice",
                    index
                )));
            }
            *slot = Some(packet);
        }

        let ciphertext: Vec<u8> = ordered
            .into_iter()
            .flatten()
            .flat_map(|packet| packet.block.iter().copied())
            .collect();
        let message = S::cipher_decrypt(&key, &ciphertext)?;

        debug!(
            target: "protocol::reassembly",
            sequence_number = self.sequence_number,
            packets = self.packets.len(),
            message_len = message.len(),
            "Data block reassembled"
        );

        self.packets.clear();
        self.state = ReassemblyState::Finished;
        Ok(message)
    }

    fn channel_index(key: &S::SymmetricKey, packet: &RawPacket) -> Result<usize> {
        let plain = S::cipher_decrypt(key, &packet.enc_channel_id)?;
        let bytes: [u8; CHANNEL_INDEX_SIZE] = plain.as_slice().try_into().map_err(|_| {
            CryptoError::MalformedPacket(format!(
                "Channel index decrypts to {} bytes, expected {}",
                plain.len(),
                CHANNEL_INDEX_SIZE
            ))
        })?;
        Ok(u32::from_be_bytes(bytes) as usize)
    }

    /// Кандидат в ключ: расшифрованная сумма долей, если она помещается
    /// в ширину ключа и её дайджест совпадает с присланным.
    fn recover_key(&self) -> Option<S::SymmetricKey> {
        let digest = self.key_digest?;
        let value = self.decoder.decode(&self.combined_share);
        let raw = Zeroizing::new(value.to_bytes_be());
        if raw.len() > S::KEY_LENGTH {
            return None;
        }

        let mut candidate = Zeroizing::new(vec![0u8; S::KEY_LENGTH]);
        candidate[S::KEY_LENGTH - raw.len()..].copy_from_slice(&raw);
        if S::digest(&candidate) != digest {
            return None;
        }
        S::symmetric_key_from_bytes(&candidate).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::paillier::{force_generate, KeyPair};
    use crate::protocol::wire::{pack, read_packet_from_bytes};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn packets(pair: &KeyPair, count: usize, seq: u32, data: &[u8], rng: &mut StdRng) -> Vec<RawPacket> {
        pack::<ClassicSuite, _>(pair.public_key(), count, seq, data, rng)
            .unwrap()
            .iter()
            .map(|bytes| read_packet_from_bytes::<ClassicSuite>(pair.private_key(), bytes).unwrap())
            .collect()
    }

    #[test]
    fn test_completes_on_last_packet() {
        let mut rng = StdRng::seed_from_u64(10);
        let pair = force_generate(160, true, &mut rng).unwrap();
        let data = b"a block of data crossing several channels".to_vec();
        let received = packets(&pair, 4, 3, &data, &mut rng);

        let mut reassembler = Reassembler::<ClassicSuite>::new(pair.private_key(), 3).unwrap();
        assert_eq!(reassembler.state(), ReassemblyState::Empty);

        let last = received.len() - 1;
        for (i, packet) in received.into_iter().enumerate() {
            let complete = reassembler.read(packet).unwrap();
            assert_eq!(complete, i == last);
        }
        assert_eq!(reassembler.state(), ReassemblyState::Complete);
        assert_eq!(reassembler.finish().unwrap(), data);
        assert_eq!(reassembler.state(), ReassemblyState::Finished);
    }

    #[test]
    fn test_wrong_sequence_leaves_state_unchanged() {
        let mut rng = StdRng::seed_from_u64(11);
        let pair = force_generate(160, true, &mut rng).unwrap();
        let received = packets(&pair, 2, 8, b"payload", &mut rng);

        let mut reassembler = Reassembler::<ClassicSuite>::new(pair.private_key(), 9).unwrap();
        let result = reassembler.read(received[0].clone());
        assert!(matches!(result, Err(CryptoError::MalformedPacket(_))));
        assert_eq!(reassembler.state(), ReassemblyState::Empty);
        assert_eq!(reassembler.packet_count(), 0);
    }

    #[test]
    fn test_mixed_digest_rejected() {
        let mut rng = StdRng::seed_from_u64(12);
        let pair = force_generate(160, true, &mut rng).unwrap();
        let first = packets(&pair, 3, 1, b"first message", &mut rng);
        let second = packets(&pair, 3, 1, b"second message", &mut rng);

        let mut reassembler = Reassembler::<ClassicSuite>::new(pair.private_key(), 1).unwrap();
        assert!(!reassembler.read(first[0].clone()).unwrap());
        assert!(matches!(
            reassembler.read(second[0].clone()),
            Err(CryptoError::MalformedPacket(_))
        ));
        assert_eq!(reassembler.packet_count(), 1);
        assert_eq!(reassembler.state(), ReassemblyState::Accumulating);

        // the rejected packet did not disturb the running sum
        assert!(!reassembler.read(first[1].clone()).unwrap());
        assert!(reassembler.read(first[2].clone()).unwrap());
        assert_eq!(reassembler.finish().unwrap(), b"first message");
    }

    #[test]
    fn test_duplicate_packet_rejected() {
        let mut rng = StdRng::seed_from_u64(15);
        let pair = force_generate(160, true, &mut rng).unwrap();
        let received = packets(&pair, 3, 4, b"sent twice", &mut rng);

        let mut reassembler = Reassembler::<ClassicSuite>::new(pair.private_key(), 4).unwrap();
        assert!(!reassembler.read(received[0].clone()).unwrap());

        // before completion
        assert!(matches!(
            reassembler.read(received[0].clone()),
            Err(CryptoError::MalformedPacket(_))
        ));
        assert_eq!(reassembler.state(), ReassemblyState::Accumulating);
        assert_eq!(reassembler.packet_count(), 1);

        assert!(!reassembler.read(received[1].clone()).unwrap());
        assert!(reassembler.read(received[2].clone()).unwrap());

        // after completion
        assert!(matches!(
            reassembler.read(received[0].clone()),
            Err(CryptoError::MalformedPacket(_))
        ));
        assert_eq!(reassembler.state(), ReassemblyState::Complete);
        assert_eq!(reassembler.packet_count(), 3);
        assert_eq!(reassembler.finish().unwrap(), b"sent twice");
    }

    #[test]
    fn test_finish_contract() {
        let mut rng = StdRng::seed_from_u64(13);
        let pair = force_generate(160, true, &mut rng).unwrap();
        let received = packets(&pair, 2, 0, b"x", &mut rng);

        let mut reassembler = Reassembler::<ClassicSuite>::new(pair.private_key(), 0).unwrap();
        assert!(matches!(reassembler.finish(), Err(CryptoError::Incomplete)));

        reassembler.read(received[0].clone()).unwrap();
        assert!(matches!(reassembler.finish(), Err(CryptoError::Incomplete)));

        assert!(reassembler.read(received[1].clone()).unwrap());
        assert_eq!(reassembler.finish().unwrap(), b"x");

        assert!(matches!(reassembler.finish(), Err(CryptoError::AlreadyFinished)));
        assert!(matches!(
            reassembler.read(received[0].clone()),
            Err(CryptoError::AlreadyFinished)
        ));
    }

    #[test]
    fn test_standard_key_reassembles() {
        let mut rng = StdRng::seed_from_u64(14);
        let pair = force_generate(160, false, &mut rng).unwrap();
        let received = packets(&pair, 3, 2, &[0x42u8; 100], &mut rng);

        let standard = pair.standard_private_key();
        let mut reassembler = Reassembler::<ClassicSuite>::new(&standard, 2).unwrap();
        let mut complete = false;
        for packet in received {
            complete = reassembler.read(packet).unwrap();
        }
        assert!(complete);
        assert_eq!(reassembler.finish().unwrap(), vec![0x42u8; 100]);
    }
}
