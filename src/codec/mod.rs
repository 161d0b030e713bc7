//! Payload codecs and the header engine.
//!
//! # Data Flow
//! ```text
//! namespace + method + field types
//!     → header.rs (canonicalize, keccak)
//!     → 32-byte route header / 4-byte voucher selector
//!
//! payload hex
//!     → payload.rs (check + strip header)
//!     → abi (standard or packed decode)
//!     → DecodedTuple
//! ```
//!
//! # Design Decisions
//! - A codec's layout is a single enum, so a codec cannot declare both
//!   standard and packed fields
//! - Header comparison is on bytes, so hex case never matters

pub mod header;
pub mod payload;

pub use header::{is_valid_header, route_header, voucher_selector, HEADER_HEX_LEN};
pub use payload::{Codec, Layout};
