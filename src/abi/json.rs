//! Conversion between JSON and [`AbiValue`].
//!
//! Numbers may be given as JSON numbers or as decimal/hex strings; byte-like
//! types take hex strings; tuples take either an array (positional) or an
//! object (by member name). Decoded integers are rendered as decimal
//! strings so 256-bit values survive JSON.

use alloy::primitives::hex;
use serde_json::{Map, Value};

use crate::abi::error::{AbiError, AbiResult};
use crate::abi::types::TypeDescriptor;
use crate::abi::value::{AbiValue, ScalarInput};

/// Interpret `json` as a value of type `ty`.
pub fn value_from_json(json: &Value, ty: &TypeDescriptor) -> AbiResult<AbiValue> {
    match (ty, json) {
        (TypeDescriptor::Bool, Value::Bool(b)) => Ok(AbiValue::Bool(*b)),
        (TypeDescriptor::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(AbiValue::Bool(true)),
            "false" => Ok(AbiValue::Bool(false)),
            _ => Err(mismatch(json, ty)),
        },
        (TypeDescriptor::Int(_) | TypeDescriptor::Uint(_), Value::Number(n)) => match n.as_f64() {
            Some(v) if n.is_f64() => Ok(AbiValue::Number(ScalarInput::Float(v))),
            _ => Ok(AbiValue::Number(ScalarInput::Decimal(n.to_string()))),
        },
        (TypeDescriptor::Int(_) | TypeDescriptor::Uint(_), Value::String(s)) => {
            Ok(AbiValue::Number(ScalarInput::Decimal(s.clone())))
        }
        (TypeDescriptor::Address, Value::String(s)) => Ok(AbiValue::String(s.clone())),
        (TypeDescriptor::String, Value::String(s)) => Ok(AbiValue::String(s.clone())),
        (TypeDescriptor::Bytes, Value::String(s)) => Ok(AbiValue::Bytes(hex_bytes(s)?)),
        (TypeDescriptor::FixedBytes(_), Value::String(s)) => Ok(AbiValue::FixedBytes(hex_bytes(s)?)),
        (TypeDescriptor::Function, Value::String(s)) => {
            let raw = hex_bytes(s)?;
            let function: [u8; 24] = raw
                .as_slice()
                .try_into()
                .map_err(|_| AbiError::bad_value(format!("function needs 24 bytes, got {}", raw.len())))?;
            Ok(AbiValue::Function(function))
        }
        (TypeDescriptor::FixedArray(elem, _) | TypeDescriptor::DynamicArray(elem), Value::Array(items)) => items
            .iter()
            .map(|item| value_from_json(item, elem))
            .collect::<AbiResult<Vec<_>>>()
            .map(AbiValue::Array),
        (TypeDescriptor::Tuple(fields), Value::Array(items)) => {
            if items.len() != fields.len() {
                return Err(AbiError::bad_value(format!(
                    "tuple needs {} members, got {}",
                    fields.len(),
                    items.len()
                )));
            }
            items
                .iter()
                .zip(fields)
                .map(|(item, field)| value_from_json(item, &field.ty))
                .collect::<AbiResult<Vec<_>>>()
                .map(AbiValue::Array)
        }
        (TypeDescriptor::Tuple(fields), Value::Object(object)) => fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let name = field.effective_name(i);
                let member = object
                    .get(&name)
                    .ok_or_else(|| AbiError::bad_value(format!("cannot get key {}", name)))?;
                Ok((name, value_from_json(member, &field.ty)?))
            })
            .collect::<AbiResult<Vec<_>>>()
            .map(AbiValue::Tuple),
        _ => Err(mismatch(json, ty)),
    }
}

/// Render a value as JSON.
pub fn value_to_json(value: &AbiValue) -> Value {
    match value {
        AbiValue::Bool(b) => Value::Bool(*b),
        AbiValue::Int(v) => Value::String(v.to_string()),
        AbiValue::Uint(v) => Value::String(v.to_string()),
        AbiValue::Number(input) => match input.to_word() {
            Ok(word) => Value::String(word.to_string()),
            Err(_) => Value::Null,
        },
        AbiValue::Address(a) => Value::String(a.to_checksum(None)),
        AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Value::String(hex::encode_prefixed(b)),
        AbiValue::Function(f) => Value::String(hex::encode_prefixed(f)),
        AbiValue::String(s) => Value::String(s.clone()),
        AbiValue::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
        AbiValue::Tuple(fields) => {
            let mut object = Map::new();
            for (name, member) in fields {
                object.insert(name.clone(), value_to_json(member));
            }
            Value::Object(object)
        }
    }
}

fn hex_bytes(text: &str) -> AbiResult<Vec<u8>> {
    hex::decode(text).map_err(|e| AbiError::bad_value(format!("could not decode hex '{}': {}", text, e)))
}

fn mismatch(json: &Value, ty: &TypeDescriptor) -> AbiError {
    AbiError::bad_value(format!("cannot use {} as {}", json, ty))
}
