// Типы ошибок

use crate::protocol::packet::PacketField;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    /// Модульная инверсия или другое теоретико-числовое условие не выполнено.
    /// Лечится повторной генерацией со свежей случайностью.
    #[error("Arithmetic failure: {0}")]
    Arithmetic(String),

    #[error("Key generation failed after {attempts} attempts")]
    KeyGenerationExhausted { attempts: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Reached end of stream while parsing {field}")]
    StreamTruncated { field: PacketField },

    #[error("I/O error while parsing {field}: {source}")]
    Io {
        field: PacketField,
        #[source]
        source: std::io::Error,
    },

    /// The suite cannot provide the requested primitive in this environment.
    #[error("{0} is not supported by this environment")]
    UnsupportedCapability(String),

    #[error("Cipher failure: {0}")]
    Cipher(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Reassembly is not complete yet")]
    Incomplete,

    #[error("Reassembly already finished")]
    AlreadyFinished,
}

pub type Result<T> = std::result::Result<T, CryptoError>;

impl From<bincode::Error> for CryptoError {
    fn from(err: bincode::Error) -> Self {
        CryptoError::Serialization(err.to_string())
    }
}
