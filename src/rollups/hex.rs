//! Hex helpers for payloads exchanged with the rollup node.
//!
//! All payloads on the wire are `0x`-prefixed lowercase hex.

use alloy::primitives::hex;

use crate::abi::{AbiError, AbiResult};

/// Decode a `0x`-prefixed hex string.
pub fn hex_to_bytes(hx: &str) -> AbiResult<Vec<u8>> {
    let digits = hx
        .strip_prefix("0x")
        .or_else(|| hx.strip_prefix("0X"))
        .ok_or_else(|| AbiError::bad_value(format!("hex payload without 0x prefix: '{}'", hx)))?;
    hex::decode(digits).map_err(|e| AbiError::bad_value(format!("could not decode hex: {}", e)))
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn bytes_to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_prefixed(bytes)
}

/// Decode a hex payload into UTF-8 text.
pub fn hex_to_str(hx: &str) -> AbiResult<String> {
    String::from_utf8(hex_to_bytes(hx)?)
        .map_err(|e| AbiError::bad_value(format!("payload is not utf-8: {}", e)))
}

/// Encode UTF-8 text as a hex payload.
pub fn str_to_hex(text: &str) -> String {
    bytes_to_hex(text.as_bytes())
}
