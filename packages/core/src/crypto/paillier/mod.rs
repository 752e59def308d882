//! Криптосистема Paillier
//!
//! Аддитивно гомоморфная схема: произведение шифртекстов по модулю `n²`
//! расшифровывается в сумму открытых текстов по модулю `n`.
//!
//! ## Модули
//! - [`math`]: lcm, функция L, выбор генератора и ослепляющего множителя
//! - [`keys`]: PublicKey, PrivateKey, KeyPair и генерация
//! - [`cipher`]: контексты Encoder / Decoder / Codec, CRT-расшифровка

pub mod cipher;
pub mod keys;
pub mod math;

pub use cipher::{combine_ciphertexts, decode, encode, Codec, Decoder, Encoder};
pub use keys::{force_generate, force_generate_with_attempts, generate, KeyPair, PrivateKey, PublicKey};
