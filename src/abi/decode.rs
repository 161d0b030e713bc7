//! Structural decoding of composite values.
//!
//! Standard mode reads the head of a tuple or array sequentially, but a
//! dynamic member is read at the absolute position its offset word points
//! to (relative to the start of the enclosing body). The head cursor only
//! ever advances by one slot per member, never by the size of a tail.
//!
//! Packed mode reads members positionally at their natural width; a
//! variable-width member consumes the rest of the input.

use std::collections::HashSet;

use crate::abi::error::{AbiError, AbiResult};
use crate::abi::types::{TupleField, TypeDescriptor, WORD};
use crate::abi::value::AbiValue;
use crate::abi::word::{decode_packed_scalar, decode_scalar};

/// Decode a standard-layout value of type `ty` starting at `input[0]`.
pub fn decode(input: &[u8], ty: &TypeDescriptor) -> AbiResult<AbiValue> {
    match ty {
        TypeDescriptor::Bytes => Ok(AbiValue::Bytes(dynamic_bytes(input, ty)?.to_vec())),
        TypeDescriptor::String => {
            let raw = dynamic_bytes(input, ty)?;
            String::from_utf8(raw.to_vec())
                .map(AbiValue::String)
                .map_err(|e| AbiError::bad_value(format!("invalid utf-8 string: {}", e)))
        }
        TypeDescriptor::FixedArray(elem, len) => {
            let needed = elem.word_size().saturating_mul(*len);
            if needed > input.len() {
                return Err(AbiError::length(ty.kind_name(), needed, input.len()));
            }
            let tys = vec![elem.as_ref(); *len];
            Ok(AbiValue::Array(decode_sequence(input, &tys)?))
        }
        TypeDescriptor::DynamicArray(elem) => {
            let count = read_usize(input, 0, ty)?;
            let body = &input[WORD..];
            // every element needs at least one head slot
            let needed = count.saturating_mul(elem.word_size().max(WORD));
            if needed > body.len() {
                return Err(AbiError::length(ty.kind_name(), needed, body.len()));
            }
            let tys = vec![elem.as_ref(); count];
            Ok(AbiValue::Array(decode_sequence(body, &tys)?))
        }
        TypeDescriptor::Tuple(fields) => {
            let tys: Vec<_> = fields.iter().map(|f| &f.ty).collect();
            let values = decode_sequence(input, &tys)?;
            Ok(AbiValue::Tuple(name_members(fields, values)?))
        }
        scalar => decode_scalar(input, scalar),
    }
}

/// Decode a packed value of type `ty` starting at `input[0]`.
pub fn decode_packed(input: &[u8], ty: &TypeDescriptor) -> AbiResult<AbiValue> {
    packed_at(input, ty).map(|(value, _)| value)
}

fn decode_sequence(body: &[u8], tys: &[&TypeDescriptor]) -> AbiResult<Vec<AbiValue>> {
    let mut values = Vec::with_capacity(tys.len());
    let mut cursor = 0;
    for ty in tys {
        if ty.is_dynamic() {
            let offset = read_usize(body, cursor, ty)?;
            if offset > body.len() {
                return Err(AbiError::length(ty.kind_name(), offset, body.len()));
            }
            values.push(decode(&body[offset..], ty)?);
            cursor += WORD;
        } else {
            let size = ty.word_size();
            let end = cursor.saturating_add(size);
            if end > body.len() {
                return Err(AbiError::length(ty.kind_name(), end, body.len()));
            }
            values.push(decode(&body[cursor..], ty)?);
            cursor += size;
        }
    }
    Ok(values)
}

/// Payload of a `bytes`/`string` value: length word followed by data.
fn dynamic_bytes<'a>(input: &'a [u8], ty: &TypeDescriptor) -> AbiResult<&'a [u8]> {
    let len = read_usize(input, 0, ty)?;
    let end = WORD.saturating_add(len);
    if end > input.len() {
        return Err(AbiError::length(ty.kind_name(), end, input.len()));
    }
    Ok(&input[WORD..end])
}

/// Read a length or offset word at `at`.
fn read_usize(input: &[u8], at: usize, ty: &TypeDescriptor) -> AbiResult<usize> {
    let end = at.saturating_add(WORD);
    if end > input.len() {
        return Err(AbiError::length(ty.kind_name(), end, input.len()));
    }
    let word = &input[at..at + WORD];
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::bad_value(format!("offset or length too large for {}", ty)));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(raw))
        .map_err(|_| AbiError::bad_value(format!("offset or length too large for {}", ty)))
}

fn name_members(fields: &[TupleField], values: Vec<AbiValue>) -> AbiResult<Vec<(String, AbiValue)>> {
    let mut seen = HashSet::new();
    let mut named = Vec::with_capacity(values.len());
    for (i, (field, value)) in fields.iter().zip(values).enumerate() {
        let name = field.effective_name(i);
        if !seen.insert(name.clone()) {
            return Err(AbiError::DuplicateField(name));
        }
        named.push((name, value));
    }
    Ok(named)
}

fn packed_at(input: &[u8], ty: &TypeDescriptor) -> AbiResult<(AbiValue, usize)> {
    match ty {
        TypeDescriptor::Bytes => Ok((AbiValue::Bytes(input.to_vec()), input.len())),
        TypeDescriptor::String => {
            let s = String::from_utf8(input.to_vec())
                .map_err(|e| AbiError::bad_value(format!("invalid utf-8 string: {}", e)))?;
            Ok((AbiValue::String(s), input.len()))
        }
        TypeDescriptor::DynamicArray(elem) => {
            let size = elem.packed_size().filter(|s| *s > 0).ok_or_else(|| {
                AbiError::UnsupportedType {
                    mode: "packed",
                    ty: ty.to_string(),
                }
            })?;
            if input.len() % size != 0 {
                return Err(AbiError::bad_value(format!(
                    "{} bytes is not a whole number of {} elements",
                    input.len(),
                    elem
                )));
            }
            let mut items = Vec::with_capacity(input.len() / size);
            let mut cursor = 0;
            while cursor < input.len() {
                let (item, used) = packed_at(&input[cursor..], elem)?;
                items.push(item);
                cursor += used;
            }
            Ok((AbiValue::Array(items), input.len()))
        }
        TypeDescriptor::FixedArray(elem, len) => {
            match elem.packed_size() {
                Some(size) => {
                    let needed = size.saturating_mul(*len);
                    if needed > input.len() {
                        return Err(AbiError::length(ty.kind_name(), needed, input.len()));
                    }
                }
                // a variable-width element swallows the rest of the input
                None if *len > 1 => {
                    return Err(AbiError::UnsupportedType {
                        mode: "packed",
                        ty: ty.to_string(),
                    })
                }
                None => {}
            }
            let mut items = Vec::with_capacity((*len).min(input.len()));
            let mut cursor = 0;
            for _ in 0..*len {
                let (item, used) = packed_at(&input[cursor..], elem)?;
                items.push(item);
                cursor += used;
            }
            Ok((AbiValue::Array(items), cursor))
        }
        TypeDescriptor::Tuple(fields) => {
            let mut values = Vec::with_capacity(fields.len());
            let mut cursor = 0;
            for field in fields {
                let (value, used) = packed_at(&input[cursor..], &field.ty)?;
                values.push(value);
                cursor += used;
            }
            Ok((AbiValue::Tuple(name_members(fields, values)?), cursor))
        }
        scalar => {
            let value = decode_packed_scalar(input, scalar)?;
            Ok((value, scalar.packed_size().unwrap_or(0)))
        }
    }
}
