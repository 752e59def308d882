// Состояние незавершённых последовательностей

use crate::crypto::paillier::{Decoder, PrivateKey};
use crate::crypto::provider::TransportSuite;
use crate::crypto::suites::classic::ClassicSuite;
use crate::error::Result;
use crate::protocol::packet::RawPacket;
use crate::protocol::reassembly::Reassembler;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Менеджер сборки по номерам последовательностей
///
/// Пакеты разных блоков могут приходить вперемешку. Каждый номер получает
/// свой [`Reassembler`], который удаляется, как только блок собран.
pub struct SequenceTable<S: TransportSuite = ClassicSuite> {
    decoder: Decoder,
    pending: HashMap<u32, Reassembler<S>>,
}

impl<S: TransportSuite> SequenceTable<S> {
    pub fn new(key: &PrivateKey) -> Result<Self> {
        Ok(Self {
            decoder: Decoder::new(key)?,
            pending: HashMap::new(),
        })
    }

    /// Принять пакет
    ///
    /// # Returns
    /// Собранный блок данных, если этот пакет был последним для своей
    /// последовательности. Запись удаляется и при ошибке сборки.
    pub fn accept(&mut self, packet: RawPacket) -> Result<Option<Vec<u8>>> {
        let sequence_number = packet.sequence_number;
        let reassembler = match self.pending.entry(sequence_number) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(Reassembler::from_decoder(self.decoder.clone(), sequence_number))
            }
        };

        if !reassembler.read(packet)? {
            return Ok(None);
        }

        match self.pending.remove(&sequence_number) {
            Some(mut done) => {
                let data = done.finish()?;
                debug!(
                    target: "state::sequences",
                    sequence_number,
                    pending = self.pending.len(),
                    "Sequence completed"
                );
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Отбросить незавершённую последовательность
    pub fn discard(&mut self, sequence_number: u32) -> bool {
        self.pending.remove(&sequence_number).is_some()
    }

    /// Номера последовательностей, ожидающих пакеты
    pub fn pending(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.pending.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Очистить все последовательности
    pub fn clear_all(&mut self) {
        self.pending.clear();
    }
}
