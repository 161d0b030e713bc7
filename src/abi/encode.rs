//! Structural encoding of composite values.
//!
//! # Standard layout
//! ```text
//! tuple / array body:
//!     head: one slot per member
//!           static member  → its inline encoding
//!           dynamic member → 32-byte offset from the start of the body
//!     tail: dynamic member payloads, in declaration order
//! dynamic array: count word ++ body
//! bytes / string: length word ++ data right-padded to a word boundary
//! ```
//!
//! # Packed layout
//! Members are concatenated at their natural width; no offsets, no padding.

use alloy::primitives::U256;

use crate::abi::error::{AbiError, AbiResult};
use crate::abi::types::{TupleField, TypeDescriptor, WORD};
use crate::abi::value::AbiValue;
use crate::abi::word::{bytes_of, encode_packed_scalar, encode_scalar};

/// Encode `value` as `ty` using the standard head/tail layout.
pub fn encode(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<Vec<u8>> {
    match ty {
        TypeDescriptor::Bytes => Ok(encode_dynamic_bytes(&bytes_of(value, ty)?)),
        TypeDescriptor::String => match value {
            AbiValue::String(s) => Ok(encode_dynamic_bytes(s.as_bytes())),
            other => Err(AbiError::bad_value(format!("failed to encode {:?} as string", other))),
        },
        TypeDescriptor::FixedArray(elem, len) => {
            let items = array_items(value, Some(*len))?;
            encode_sequence(items.iter().map(|item| (item, elem.as_ref())))
        }
        TypeDescriptor::DynamicArray(elem) => {
            let items = array_items(value, None)?;
            let mut out = length_word(items.len()).to_vec();
            out.extend(encode_sequence(items.iter().map(|item| (item, elem.as_ref())))?);
            Ok(out)
        }
        TypeDescriptor::Tuple(fields) => {
            let values = tuple_members(value, fields)?;
            encode_sequence(values.into_iter().zip(fields.iter().map(|f| &f.ty)))
        }
        scalar => Ok(encode_scalar(value, scalar)?.to_vec()),
    }
}

/// Encode `value` as `ty` by plain concatenation at natural widths.
pub fn encode_packed(value: &AbiValue, ty: &TypeDescriptor) -> AbiResult<Vec<u8>> {
    match ty {
        TypeDescriptor::Bytes => bytes_of(value, ty),
        TypeDescriptor::String => match value {
            AbiValue::String(s) => Ok(s.as_bytes().to_vec()),
            other => Err(AbiError::bad_value(format!("failed to encode {:?} as string", other))),
        },
        TypeDescriptor::FixedArray(elem, len) => {
            let mut out = Vec::new();
            for item in array_items(value, Some(*len))? {
                out.extend(encode_packed(item, elem)?);
            }
            Ok(out)
        }
        TypeDescriptor::DynamicArray(elem) => {
            let mut out = Vec::new();
            for item in array_items(value, None)? {
                out.extend(encode_packed(item, elem)?);
            }
            Ok(out)
        }
        TypeDescriptor::Tuple(fields) => {
            let mut out = Vec::new();
            for (item, field) in tuple_members(value, fields)?.into_iter().zip(fields) {
                out.extend(encode_packed(item, &field.ty)?);
            }
            Ok(out)
        }
        scalar => encode_packed_scalar(value, scalar),
    }
}

/// Lay out a sequence of members as head ++ tail.
fn encode_sequence<'a>(
    members: impl Iterator<Item = (&'a AbiValue, &'a TypeDescriptor)>,
) -> AbiResult<Vec<u8>> {
    let members: Vec<_> = members.collect();
    let head_len: usize = members.iter().map(|(_, ty)| ty.word_size()).sum();

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (value, ty) in members {
        if ty.is_dynamic() {
            head.extend_from_slice(&length_word(head_len + tail.len()));
            tail.extend(encode(value, ty)?);
        } else {
            head.extend(encode(value, ty)?);
        }
    }
    head.extend(tail);
    Ok(head)
}

fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&length_word(data.len()));
    out.extend_from_slice(data);
    out.resize(WORD + padded, 0);
    out
}

fn length_word(n: usize) -> [u8; WORD] {
    U256::from(n).to_be_bytes::<WORD>()
}

fn array_items(value: &AbiValue, expected: Option<usize>) -> AbiResult<&[AbiValue]> {
    let items = match value {
        AbiValue::Array(items) => items.as_slice(),
        other => {
            return Err(AbiError::bad_value(format!("failed to encode {:?} as array", other)))
        }
    };
    if let Some(len) = expected {
        if items.len() != len {
            return Err(AbiError::bad_value(format!(
                "array len incompatible: expected {}, got {}",
                len,
                items.len()
            )));
        }
    }
    Ok(items)
}

/// Resolve tuple members either positionally (array input) or by effective
/// name (tuple input).
fn tuple_members<'a>(value: &'a AbiValue, fields: &[TupleField]) -> AbiResult<Vec<&'a AbiValue>> {
    match value {
        AbiValue::Array(items) => {
            if items.len() != fields.len() {
                return Err(AbiError::bad_value(format!(
                    "wrong values length: expected {}, got {}",
                    fields.len(),
                    items.len()
                )));
            }
            Ok(items.iter().collect())
        }
        AbiValue::Tuple(named) => fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let name = field.effective_name(i);
                named
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| v)
                    .ok_or_else(|| AbiError::bad_value(format!("cannot get key {}", name)))
            })
            .collect(),
        other => Err(AbiError::bad_value(format!("failed to encode {:?} as tuple", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::hex;

    fn word_at(out: &[u8], index: usize) -> U256 {
        U256::from_be_slice(&out[index * WORD..(index + 1) * WORD])
    }

    #[test]
    fn test_dynamic_member_offset() {
        let ty = TypeDescriptor::parse("(uint256,string,uint256)").unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::from(1u64),
            AbiValue::from("hello"),
            AbiValue::from(2u64),
        ]);
        let out = encode(&value, &ty).unwrap();

        // 3 head words + length word + one data word
        assert_eq!(out.len(), 5 * WORD);
        assert_eq!(word_at(&out, 0), U256::from(1));
        assert_eq!(word_at(&out, 1), U256::from(3 * WORD));
        assert_eq!(word_at(&out, 2), U256::from(2));
        assert_eq!(word_at(&out, 3), U256::from(5));
        assert_eq!(&out[4 * WORD..4 * WORD + 5], b"hello");
    }

    #[test]
    fn test_dynamic_array_of_strings() {
        let ty = TypeDescriptor::parse("string[]").unwrap();
        let value = AbiValue::Array(vec![AbiValue::from("a"), AbiValue::from("b")]);
        let out = encode(&value, &ty).unwrap();

        assert_eq!(word_at(&out, 0), U256::from(2));
        // offsets are relative to the first element slot, after the count
        assert_eq!(word_at(&out, 1), U256::from(2 * WORD));
        assert_eq!(word_at(&out, 2), U256::from(4 * WORD));
        assert_eq!(out.len(), 7 * WORD);
    }

    #[test]
    fn test_dynamic_array_of_static_has_no_offsets() {
        let ty = TypeDescriptor::parse("uint8[]").unwrap();
        let value = AbiValue::Array(vec![AbiValue::from(7u64), AbiValue::from(9u64)]);
        let out = encode(&value, &ty).unwrap();
        assert_eq!(out.len(), 3 * WORD);
        assert_eq!(word_at(&out, 1), U256::from(7));
        assert_eq!(word_at(&out, 2), U256::from(9));
    }

    #[test]
    fn test_static_tuple_is_inline() {
        let ty = TypeDescriptor::parse("(uint256,(address,bool),uint8)").unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::from(1u64),
            AbiValue::Array(vec![
                AbiValue::from("0x0000000000000000000000000000000000000001"),
                AbiValue::Bool(true),
            ]),
            AbiValue::from(3u64),
        ]);
        let out = encode(&value, &ty).unwrap();
        assert_eq!(out.len(), 4 * WORD);
        assert_eq!(word_at(&out, 1), U256::from(1));
        assert_eq!(word_at(&out, 2), U256::from(1));
    }

    #[test]
    fn test_named_members() {
        let ty = TypeDescriptor::parse("tuple(string key,string value)").unwrap();
        let named = AbiValue::Tuple(vec![
            ("value".into(), AbiValue::from("v")),
            ("key".into(), AbiValue::from("k")),
        ]);
        let positional = AbiValue::Array(vec![AbiValue::from("k"), AbiValue::from("v")]);
        assert_eq!(encode(&named, &ty).unwrap(), encode(&positional, &ty).unwrap());

        let missing = AbiValue::Tuple(vec![("key".into(), AbiValue::from("k"))]);
        assert!(matches!(encode(&missing, &ty), Err(AbiError::BadValue(_))));
    }

    #[test]
    fn test_fixed_array_length_mismatch() {
        let ty = TypeDescriptor::parse("uint256[3]").unwrap();
        let value = AbiValue::Array(vec![AbiValue::from(1u64)]);
        assert!(matches!(encode(&value, &ty), Err(AbiError::BadValue(_))));
    }

    #[test]
    fn test_packed_concatenation() {
        let ty = TypeDescriptor::tuple_of(&["address", "uint16", "bytes"]).unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::from("0x00000000000000000000000000000000000000ff"),
            AbiValue::from(258u64),
            AbiValue::Bytes(vec![0xca, 0xfe]),
        ]);
        let out = encode_packed(&value, &ty).unwrap();
        assert_eq!(
            hex::encode(out),
            "00000000000000000000000000000000000000ff0102cafe"
        );
    }
}
