//! Values carried through the codec.
//!
//! Decoding always produces concrete variants (`Int`, `Uint`, ...). Encoding
//! additionally accepts loosely typed numeric input through [`ScalarInput`],
//! and hex text for byte-like types.

use std::fmt;

use alloy::primitives::{hex, Address, I256, U256};

use crate::abi::error::{AbiError, AbiResult};

/// Numeric input accepted by the encoder, converted explicitly per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarInput {
    /// Base-10 text, falling back to base-16 when it is not valid decimal.
    Decimal(String),
    /// Base-16 text with or without `0x`.
    Hex(String),
    /// Fixed-width unsigned machine integer.
    Unsigned(u64),
    /// Fixed-width signed machine integer.
    Signed(i64),
    /// Arbitrary-precision unsigned integer.
    BigUint(U256),
    /// Arbitrary-precision signed integer.
    BigInt(I256),
    /// Floating point, truncated toward zero.
    Float(f64),
}

impl ScalarInput {
    /// 256-bit two's complement representation of the input.
    pub fn to_word(&self) -> AbiResult<U256> {
        match self {
            ScalarInput::Decimal(text) => parse_decimal(text.trim())
                .or_else(|| parse_hex(text.trim()))
                .ok_or_else(|| AbiError::bad_value(format!("'{}' is not a number", text))),
            ScalarInput::Hex(text) => parse_hex(text.trim())
                .ok_or_else(|| AbiError::bad_value(format!("'{}' is not a hex number", text))),
            ScalarInput::Unsigned(v) => Ok(U256::from(*v)),
            ScalarInput::Signed(v) => Ok(i256_from_i64(*v).into_raw()),
            ScalarInput::BigUint(v) => Ok(*v),
            ScalarInput::BigInt(v) => Ok(v.into_raw()),
            ScalarInput::Float(v) => {
                let t = v.trunc();
                if !t.is_finite() || t < i64::MIN as f64 || t >= i64::MAX as f64 {
                    return Err(AbiError::bad_value(format!("float {} out of range", v)));
                }
                Ok(i256_from_i64(t as i64).into_raw())
            }
        }
    }
}

fn parse_decimal(text: &str) -> Option<U256> {
    if text.is_empty() {
        return None;
    }
    if let Some(abs) = text.strip_prefix('-') {
        let magnitude = U256::from_str_radix(abs, 10).ok()?;
        return Some(U256::ZERO.wrapping_sub(magnitude));
    }
    U256::from_str_radix(text, 10).ok()
}

fn parse_hex(text: &str) -> Option<U256> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

pub(crate) fn i256_from_i64(v: i64) -> I256 {
    let magnitude = U256::from(v.unsigned_abs());
    if v < 0 {
        I256::from_raw(U256::ZERO.wrapping_sub(magnitude))
    } else {
        I256::from_raw(magnitude)
    }
}

/// A value of some ABI type.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiValue {
    Bool(bool),
    Int(I256),
    Uint(U256),
    /// Encoder-only numeric input for `int*`/`uint*` types.
    Number(ScalarInput),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Function([u8; 24]),
    /// Elements of a fixed or dynamic array.
    Array(Vec<AbiValue>),
    /// Named members of a tuple, in declaration order.
    Tuple(Vec<(String, AbiValue)>),
}

impl AbiValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of `bytes`, `bytesN` and `function` values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b),
            AbiValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Member of a tuple value by effective name.
    pub fn field(&self, name: &str) -> Option<&AbiValue> {
        match self {
            AbiValue::Tuple(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(b) => write!(f, "{}", b),
            AbiValue::Int(v) => write!(f, "{}", v),
            AbiValue::Uint(v) => write!(f, "{}", v),
            AbiValue::Number(n) => write!(f, "{:?}", n),
            AbiValue::Address(a) => write!(f, "{}", hex::encode_prefixed(a)),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "{}", hex::encode_prefixed(b)),
            AbiValue::Function(b) => write!(f, "{}", hex::encode_prefixed(b)),
            AbiValue::String(s) => write!(f, "{:?}", s),
            AbiValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            AbiValue::Tuple(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Number(ScalarInput::Unsigned(v))
    }
}

impl From<i64> for AbiValue {
    fn from(v: i64) -> Self {
        AbiValue::Number(ScalarInput::Signed(v))
    }
}

impl From<f64> for AbiValue {
    fn from(v: f64) -> Self {
        AbiValue::Number(ScalarInput::Float(v))
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<ScalarInput> for AbiValue {
    fn from(v: ScalarInput) -> Self {
        AbiValue::Number(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(v: Vec<u8>) -> Self {
        AbiValue::Bytes(v)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(v: Vec<AbiValue>) -> Self {
        AbiValue::Array(v)
    }
}

/// Result of decoding a codec payload: the members of the top-level tuple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedTuple {
    fields: Vec<(String, AbiValue)>,
}

impl DecodedTuple {
    pub fn new(fields: Vec<(String, AbiValue)>) -> Self {
        Self { fields }
    }

    /// Member by effective name (declared name or positional index).
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Member by position.
    pub fn get_index(&self, index: usize) -> Option<&AbiValue> {
        self.fields.get(index).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbiValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn into_fields(self) -> Vec<(String, AbiValue)> {
        self.fields
    }
}

impl fmt::Display for DecodedTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AbiValue::Tuple(self.fields.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_falls_back_to_hex() {
        assert_eq!(ScalarInput::Decimal("255".into()).to_word().unwrap(), U256::from(255));
        assert_eq!(ScalarInput::Decimal("0xff".into()).to_word().unwrap(), U256::from(255));
        assert_eq!(ScalarInput::Decimal("ff".into()).to_word().unwrap(), U256::from(255));
        assert!(matches!(
            ScalarInput::Decimal("zz".into()).to_word(),
            Err(AbiError::BadValue(_))
        ));
    }

    #[test]
    fn test_negative_inputs_are_twos_complement() {
        assert_eq!(ScalarInput::Signed(-1).to_word().unwrap(), U256::MAX);
        assert_eq!(ScalarInput::Decimal("-1".into()).to_word().unwrap(), U256::MAX);
        assert_eq!(ScalarInput::BigInt(I256::MINUS_ONE).to_word().unwrap(), U256::MAX);
    }

    #[test]
    fn test_float_truncates_toward_zero() {
        assert_eq!(ScalarInput::Float(3.9).to_word().unwrap(), U256::from(3));
        assert_eq!(
            ScalarInput::Float(-3.9).to_word().unwrap(),
            ScalarInput::Signed(-3).to_word().unwrap()
        );
        assert!(ScalarInput::Float(f64::NAN).to_word().is_err());
    }

    #[test]
    fn test_decoded_tuple_lookup() {
        let decoded = DecodedTuple::new(vec![
            ("0".into(), AbiValue::Bool(true)),
            ("amount".into(), AbiValue::Uint(U256::from(7))),
        ]);
        assert_eq!(decoded.get("amount").and_then(AbiValue::as_uint), Some(U256::from(7)));
        assert_eq!(decoded.get_index(0).and_then(AbiValue::as_bool), Some(true));
        assert!(decoded.get("missing").is_none());
        assert_eq!(decoded.to_string(), "{0:true,amount:7}");
    }
}
