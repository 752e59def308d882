//! Криптографические наборы (Transport Suites)
//!
//! Этот модуль содержит реализации TransportSuite trait.
//!
//! ## Доступные наборы
//!
//! ### Classic Suite
//! - **Cipher**: AES-256, ECB, PKCS#7 (блок 16 байт)
//! - **Digest**: SHA-256
//! - **Suite ID**: 1
//!
//! ## Выбор suite
//!
//! ```rust
//! use homoshare_core::crypto::suites::classic::ClassicSuite;
//! use homoshare_core::crypto::provider::TransportSuite;
//!
//! type MySuite = ClassicSuite;
//!
//! let digest = MySuite::digest(b"key material");
//! assert_eq!(digest.len(), 32);
//! ```

pub mod classic;
