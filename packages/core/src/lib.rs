// Homoshare Core
// Paillier secret-shared key transport over partitioned packets

#![warn(clippy::all)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod state;
pub mod utils;

// Re-exports для удобства
pub use config::Config;
pub use crypto::paillier::{KeyPair, PrivateKey, PublicKey};
pub use crypto::suites::classic::ClassicSuite;
pub use error::{CryptoError, Result};
pub use protocol::{pack, read_packet, read_packet_from_bytes, Reassembler, ReassemblyState};
pub use state::SequenceTable;
