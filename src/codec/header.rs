//! Route headers and voucher selectors.
//!
//! Both are derived from canonical type strings, so `uint` and `uint256`
//! yield the same identifier.
//!
//! ```text
//! route header     = keccak(keccak(ns) ++ keccak(method) ++ keccak("(" fields ")"))
//! voucher selector = keccak(method "(" fields ")")[0..4]
//! ```

use alloy::primitives::{hex, keccak256};

use crate::abi::{AbiResult, TypeDescriptor};

/// Length of a `0x`-prefixed route header.
pub const HEADER_HEX_LEN: usize = 66;

/// Compute the 32-byte route identifier for `namespace`, `method` and field types.
///
/// Returns `0x` followed by 64 lowercase hex characters.
pub fn route_header<S: AsRef<str>>(namespace: &str, method: &str, fields: &[S]) -> AbiResult<String> {
    let clean = TypeDescriptor::tuple_of(fields)?.clean_fields();
    Ok(header_from_clean(namespace, method, &clean))
}

pub(crate) fn header_from_clean(namespace: &str, method: &str, clean_fields: &[String]) -> String {
    let args = format!("({})", clean_fields.join(","));
    let mut preimage = Vec::with_capacity(96);
    preimage.extend_from_slice(keccak256(namespace.as_bytes()).as_slice());
    preimage.extend_from_slice(keccak256(method.as_bytes()).as_slice());
    preimage.extend_from_slice(keccak256(args.as_bytes()).as_slice());
    hex::encode_prefixed(keccak256(&preimage))
}

/// Compute the 4-byte function selector of `method(fields)`.
///
/// Returns `0x` followed by 8 lowercase hex characters.
pub fn voucher_selector<S: AsRef<str>>(method: &str, fields: &[S]) -> AbiResult<String> {
    let ty = TypeDescriptor::tuple_of(fields)?;
    Ok(selector_from_signature(method, &ty))
}

pub(crate) fn selector_from_signature(method: &str, ty: &TypeDescriptor) -> String {
    let signature = format!("{}{}", method, ty.signature());
    hex::encode_prefixed(&keccak256(signature.as_bytes())[..4])
}

/// True when `header` is `0x` followed by 64 hex characters.
pub fn is_valid_header(header: &str) -> bool {
    header.len() == HEADER_HEX_LEN
        && (header.starts_with("0x") || header.starts_with("0X"))
        && header[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
