//! Scalar encoding to and from single words.
//!
//! # Layout
//! - Integers and addresses are left-padded (right-aligned) in the word
//! - Fixed bytes and function references are right-padded (left-aligned)
//! - Signed integers are two's complement, sign-extended to 256 bits in
//!   standard mode and truncated to their natural width in packed mode

use alloy::primitives::{hex, Address, I256, U256};

use crate::abi::error::{AbiError, AbiResult};
use crate::abi::types::{TypeDescriptor, WORD};
use crate::abi::value::{AbiValue, ScalarInput};

/// All-ones mask of the low `bits` bits.
fn mask(bits: usize) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << bits) - U256::from(1u8)
    }
}

/// Interpret the low `bits` bits of `raw` as a two's complement number and
/// extend it to 256 bits.
fn sign_extend(raw: U256, bits: usize) -> U256 {
    let m = mask(bits);
    let low = raw & m;
    if bits < 256 && low.bit(bits - 1) {
        low | !m
    } else {
        low
    }
}

/// 256-bit two's complement form of an integer-typed value.
fn integer_word(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<U256> {
    match value {
        AbiValue::Uint(v) => Ok(*v),
        AbiValue::Int(v) => Ok(v.into_raw()),
        AbiValue::Number(input) => input.to_word(),
        AbiValue::String(text) => ScalarInput::Decimal(text.clone()).to_word(),
        other => Err(mismatch(other, ty)),
    }
}

fn address_of(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<Address> {
    match value {
        AbiValue::Address(a) => Ok(*a),
        AbiValue::String(text) => text
            .parse::<Address>()
            .map_err(|e| AbiError::bad_value(format!("invalid address '{}': {}", text, e))),
        AbiValue::Bytes(b) | AbiValue::FixedBytes(b) if b.len() == 20 => Ok(Address::from_slice(b)),
        other => Err(mismatch(other, ty)),
    }
}

/// Raw bytes of a byte-like value; text is read as hex.
pub(crate) fn bytes_of(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<Vec<u8>> {
    match value {
        AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Ok(b.clone()),
        AbiValue::Function(f) => Ok(f.to_vec()),
        AbiValue::String(text) => hex::decode(text)
            .map_err(|e| AbiError::bad_value(format!("could not decode hex '{}': {}", text, e))),
        other => Err(mismatch(other, ty)),
    }
}

fn fixed_bytes_of(value: &AbiValue, ty: &TypeDescriptor, size: usize) -> AbiResult<Vec<u8>> {
    let bytes = bytes_of(value, ty)?;
    if bytes.len() > size {
        return Err(AbiError::bad_value(format!(
            "{} bytes do not fit in {}",
            bytes.len(),
            ty
        )));
    }
    Ok(bytes)
}

fn mismatch(value: &AbiValue, ty: &TypeDescriptor) -> AbiError {
    AbiError::bad_value(format!("failed to encode {:?} as {}", value, ty))
}

/// Encode a scalar as one 32-byte word.
pub fn encode_scalar(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<[u8; WORD]> {
    let mut word = [0u8; WORD];
    match ty {
        TypeDescriptor::Bool => match value {
            AbiValue::Bool(b) => word[WORD - 1] = u8::from(*b),
            other => return Err(mismatch(other, ty)),
        },
        TypeDescriptor::Uint(bits) => {
            word = (integer_word(value, ty)? & mask(*bits)).to_be_bytes::<WORD>();
        }
        TypeDescriptor::Int(bits) => {
            word = sign_extend(integer_word(value, ty)?, *bits).to_be_bytes::<WORD>();
        }
        TypeDescriptor::Address => {
            word[WORD - 20..].copy_from_slice(address_of(value, ty)?.as_slice());
        }
        TypeDescriptor::FixedBytes(size) => {
            let bytes = fixed_bytes_of(value, ty, *size)?;
            word[..bytes.len()].copy_from_slice(&bytes);
        }
        TypeDescriptor::Function => {
            let bytes = fixed_bytes_of(value, ty, 24)?;
            word[..bytes.len()].copy_from_slice(&bytes);
        }
        other => {
            return Err(AbiError::UnsupportedType {
                mode: "word",
                ty: other.to_string(),
            })
        }
    }
    Ok(word)
}

/// Decode a scalar from the first 32 bytes of `input`.
pub fn decode_scalar(input: &[u8], ty: &TypeDescriptor) -> AbiResult<AbiValue> {
    if input.len() < WORD {
        return Err(AbiError::length(ty.kind_name(), WORD, input.len()));
    }
    let word = &input[..WORD];
    let value = match ty {
        TypeDescriptor::Bool => {
            if word[..WORD - 1].iter().any(|b| *b != 0) {
                return Err(AbiError::bad_value("bad boolean"));
            }
            decode_bool(word[WORD - 1])?
        }
        TypeDescriptor::Uint(bits) => AbiValue::Uint(U256::from_be_slice(word) & mask(*bits)),
        TypeDescriptor::Int(bits) => {
            AbiValue::Int(I256::from_raw(sign_extend(U256::from_be_slice(word), *bits)))
        }
        TypeDescriptor::Address => AbiValue::Address(Address::from_slice(&word[WORD - 20..])),
        TypeDescriptor::FixedBytes(size) => AbiValue::FixedBytes(word[..*size].to_vec()),
        TypeDescriptor::Function => AbiValue::Function(function_of(&word[..24])),
        other => {
            return Err(AbiError::UnsupportedType {
                mode: "word",
                ty: other.to_string(),
            })
        }
    };
    Ok(value)
}

/// Encode a scalar at its natural width, without padding.
pub fn encode_packed_scalar(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<Vec<u8>> {
    let out = match ty {
        TypeDescriptor::Bool => match value {
            AbiValue::Bool(b) => vec![u8::from(*b)],
            other => return Err(mismatch(other, ty)),
        },
        TypeDescriptor::Uint(bits) | TypeDescriptor::Int(bits) => {
            let word = (integer_word(value, ty)? & mask(*bits)).to_be_bytes::<WORD>();
            word[WORD - bits / 8..].to_vec()
        }
        TypeDescriptor::Address => address_of(value, ty)?.to_vec(),
        TypeDescriptor::FixedBytes(size) => {
            let mut bytes = fixed_bytes_of(value, ty, *size)?;
            bytes.resize(*size, 0);
            bytes
        }
        TypeDescriptor::Function => {
            let mut bytes = fixed_bytes_of(value, ty, 24)?;
            bytes.resize(24, 0);
            bytes
        }
        other => {
            return Err(AbiError::UnsupportedType {
                mode: "packed word",
                ty: other.to_string(),
            })
        }
    };
    Ok(out)
}

/// Decode a scalar packed at its natural width from the start of `input`.
pub fn decode_packed_scalar(input: &[u8], ty: &TypeDescriptor) -> AbiResult<AbiValue> {
    let size = ty.packed_size().ok_or_else(|| AbiError::UnsupportedType {
        mode: "packed word",
        ty: ty.to_string(),
    })?;
    if input.len() < size {
        return Err(AbiError::length(ty.kind_name(), size, input.len()));
    }
    let raw = &input[..size];
    let value = match ty {
        TypeDescriptor::Bool => decode_bool(raw[0])?,
        TypeDescriptor::Uint(_) => AbiValue::Uint(U256::from_be_slice(raw)),
        TypeDescriptor::Int(bits) => {
            AbiValue::Int(I256::from_raw(sign_extend(U256::from_be_slice(raw), *bits)))
        }
        TypeDescriptor::Address => AbiValue::Address(Address::from_slice(raw)),
        TypeDescriptor::FixedBytes(_) => AbiValue::FixedBytes(raw.to_vec()),
        TypeDescriptor::Function => AbiValue::Function(function_of(raw)),
        other => {
            return Err(AbiError::UnsupportedType {
                mode: "packed word",
                ty: other.to_string(),
            })
        }
    };
    Ok(value)
}

fn decode_bool(byte: u8) -> AbiResult<AbiValue> {
    match byte {
        0 => Ok(AbiValue::Bool(false)),
        1 => Ok(AbiValue::Bool(true)),
        _ => Err(AbiError::bad_value("bad boolean")),
    }
}

fn function_of(raw: &[u8]) -> [u8; 24] {
    let mut out = [0u8; 24];
    out.copy_from_slice(&raw[..24]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: AbiValue, ty: &TypeDescriptor) -> AbiValue {
        let word = encode_scalar(&value, ty).unwrap();
        decode_scalar(&word, ty).unwrap()
    }

    fn pow2(bits: usize) -> U256 {
        U256::from(1u8) << bits
    }

    #[test]
    fn test_uint_boundaries_round_trip() {
        for bits in [8usize, 16, 32, 64, 128, 256] {
            let ty = TypeDescriptor::Uint(bits);
            let max = mask(bits);
            assert_eq!(round_trip(AbiValue::Uint(U256::ZERO), &ty), AbiValue::Uint(U256::ZERO));
            assert_eq!(round_trip(AbiValue::Uint(max), &ty), AbiValue::Uint(max));
        }
    }

    #[test]
    fn test_int_boundaries_round_trip() {
        for bits in [8usize, 16, 32, 64, 128, 256] {
            let ty = TypeDescriptor::Int(bits);
            let min = I256::from_raw(U256::ZERO.wrapping_sub(pow2(bits - 1)));
            let max = I256::from_raw(pow2(bits - 1) - U256::from(1u8));
            for v in [I256::ZERO, I256::MINUS_ONE, min, max] {
                assert_eq!(round_trip(AbiValue::Int(v), &ty), AbiValue::Int(v), "int{}", bits);
            }
        }
    }

    #[test]
    fn test_twos_complement_int256() {
        let word = encode_scalar(&AbiValue::from(-1i64), &TypeDescriptor::Int(256)).unwrap();
        assert_eq!(word, [0xff; 32]);

        assert_eq!(
            decode_scalar(&[0xff; 32], &TypeDescriptor::Int(256)).unwrap(),
            AbiValue::Int(I256::MINUS_ONE)
        );
        assert_eq!(
            decode_scalar(&[0xff; 32], &TypeDescriptor::Uint(256)).unwrap(),
            AbiValue::Uint(U256::MAX)
        );
    }

    #[test]
    fn test_uint_input_is_masked_to_width() {
        let word = encode_scalar(&AbiValue::from(0x1ffu64), &TypeDescriptor::Uint(8)).unwrap();
        assert_eq!(word[31], 0xff);
        assert!(word[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_fixed_bytes_right_padded_uint_left_padded() {
        let raw = vec![0xaa, 0xbb, 0xcc, 0xdd];
        let fixed = encode_scalar(&AbiValue::FixedBytes(raw.clone()), &TypeDescriptor::FixedBytes(4)).unwrap();
        assert_eq!(&fixed[..4], &raw[..]);
        assert!(fixed[4..].iter().all(|b| *b == 0));

        let number = encode_scalar(&AbiValue::from(0xaabbccddu64), &TypeDescriptor::Uint(32)).unwrap();
        assert!(number[..28].iter().all(|b| *b == 0));
        assert_eq!(&number[28..], &raw[..]);

        assert_ne!(fixed, number);
    }

    #[test]
    fn test_address_and_bool() {
        let addr: Address = "0x00000000000000000000000000000000deadbeef".parse().unwrap();
        let word = encode_scalar(&AbiValue::Address(addr), &TypeDescriptor::Address).unwrap();
        assert!(word[..12].iter().all(|b| *b == 0));
        assert_eq!(round_trip(AbiValue::Address(addr), &TypeDescriptor::Address), AbiValue::Address(addr));

        let text = AbiValue::from("0x00000000000000000000000000000000deadbeef");
        assert_eq!(encode_scalar(&text, &TypeDescriptor::Address).unwrap(), word);

        assert_eq!(round_trip(AbiValue::Bool(true), &TypeDescriptor::Bool), AbiValue::Bool(true));
        let mut bad = [0u8; 32];
        bad[31] = 2;
        assert!(matches!(decode_scalar(&bad, &TypeDescriptor::Bool), Err(AbiError::BadValue(_))));
    }

    #[test]
    fn test_short_input_is_length_error() {
        assert!(matches!(
            decode_scalar(&[0u8; 31], &TypeDescriptor::Uint(256)),
            Err(AbiError::Length { needed: 32, available: 31, .. })
        ));
        assert!(matches!(
            decode_packed_scalar(&[0u8; 19], &TypeDescriptor::Address),
            Err(AbiError::Length { .. })
        ));
    }

    #[test]
    fn test_string_inputs() {
        let dec = encode_scalar(&AbiValue::from("1000"), &TypeDescriptor::Uint(256)).unwrap();
        let hex = encode_scalar(&AbiValue::Number(ScalarInput::Hex("0x3e8".into())), &TypeDescriptor::Uint(256)).unwrap();
        assert_eq!(dec, hex);
        assert!(encode_scalar(&AbiValue::from("nope"), &TypeDescriptor::Uint(256)).is_err());
    }

    #[test]
    fn test_packed_scalars() {
        let ty = TypeDescriptor::Int(16);
        let packed = encode_packed_scalar(&AbiValue::from(-2i64), &ty).unwrap();
        assert_eq!(packed, vec![0xff, 0xfe]);
        assert_eq!(
            decode_packed_scalar(&packed, &ty).unwrap(),
            AbiValue::Int(I256::from_raw(U256::ZERO.wrapping_sub(U256::from(2u8))))
        );

        let fixed = encode_packed_scalar(&AbiValue::FixedBytes(vec![1]), &TypeDescriptor::FixedBytes(3)).unwrap();
        assert_eq!(fixed, vec![1, 0, 0]);

        assert!(matches!(
            encode_packed_scalar(&AbiValue::Bytes(vec![]), &TypeDescriptor::Bytes),
            Err(AbiError::UnsupportedType { .. })
        ));
    }
}
