//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  protocol::wire / reassembly                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │   Splitters               │  │  TransportSuite          │
//! │  - Additive mod n         │  │  - AES-256 (ECB, PKCS#7) │
//! │  - Multiplicative mod n   │  │  - SHA-256 digest        │
//! │  - Paillier (ciphertexts) │  │  - Symmetric keys        │
//! └───────────────────────────┘  └──────────────────────────┘
//!                │
//!                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Paillier                            │
//! │  - Key generation (standard / CRT)                          │
//! │  - Encoder / Decoder / Codec                                │
//! │  - Homomorphic addition                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! - [`provider`]: TransportSuite trait для симметричного слоя
//! - [`suites`]: Реализации TransportSuite (Classic)
//! - [`paillier`]: ключи и шифрование Paillier
//! - [`splitters`]: деление секрета на доли

// ============================================================================
// Core Traits
// ============================================================================

/// TransportSuite trait для симметричного слоя
pub mod provider;

// ============================================================================
// Implementations
// ============================================================================

/// Криптографические наборы
pub mod suites;

/// Paillier cryptosystem
pub mod paillier;

/// Secret splitting
pub mod splitters;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use provider::TransportSuite;

pub type SuiteID = u16;

/// Suite ID for the classic suite
pub const CLASSIC_SUITE_ID: SuiteID = 1;
