// Кодирование знакового большого числа в фиксированное число байт
//
// Минимальное two's-complement представление выравнивается по правому краю.
// Отрицательные значения расширяются байтами 0xFF, поэтому старший бит
// первого байта всегда равен знаку, и `BigInt::from_signed_bytes_be`
// восстанавливает исходное значение без неоднозначности.

use crate::error::{CryptoError, Result};
use num_bigint::{BigInt, BigUint, Sign};

/// Pack `value` into exactly `width` big-endian bytes.
pub fn encode_signed(value: &BigInt, width: usize) -> Result<Vec<u8>> {
    let repr = value.to_signed_bytes_be();
    if repr.len() > width {
        return Err(CryptoError::Encoding(format!(
            "Value needs {} bytes but the field is {} bytes wide",
            repr.len(),
            width
        )));
    }

    let fill = if value.sign() == Sign::Minus { 0xFF } else { 0x00 };
    let mut out = vec![fill; width];
    out[width - repr.len()..].copy_from_slice(&repr);
    Ok(out)
}

/// Inverse of [`encode_signed`].
pub fn decode_signed(bytes: &[u8]) -> BigInt {
    BigInt::from_signed_bytes_be(bytes)
}

/// Pack a non-negative value, keeping the sign bit clear.
pub fn encode_unsigned(value: &BigUint, width: usize) -> Result<Vec<u8>> {
    encode_signed(&BigInt::from(value.clone()), width)
}

/// Parse a field written by [`encode_unsigned`]; a set sign bit is malformed.
pub fn decode_unsigned(bytes: &[u8]) -> Result<BigUint> {
    match decode_signed(bytes).into_parts() {
        (Sign::Minus, _) => Err(CryptoError::Encoding(
            "Unsigned field carries a negative value".to_string(),
        )),
        (_, magnitude) => Ok(magnitude),
    }
}
