//! Solidity ABI codec.
//!
//! # Data Flow
//! ```text
//! "tuple(address,uint256)"
//!     → types.rs (parse into TypeDescriptor)
//!
//! AbiValue + TypeDescriptor
//!     → encode.rs (head/tail layout or packed concatenation)
//!     → word.rs (one scalar per word / natural width)
//!     → bytes
//!
//! bytes + TypeDescriptor
//!     → decode.rs (head cursor + offset jumps, or positional packed read)
//!     → word.rs
//!     → AbiValue
//! ```
//!
//! # Design Decisions
//! - Encoding and decoding are pure functions; no state is kept between calls
//! - Standard and packed modes never mix within one call
//! - Length errors are reported separately from semantically bad values

pub mod decode;
pub mod encode;
pub mod error;
pub mod json;
pub mod types;
pub mod value;
pub mod word;

pub use decode::{decode, decode_packed};
pub use encode::{encode, encode_packed};
pub use error::{AbiError, AbiResult};
pub use json::{value_from_json, value_to_json};
pub use types::{TupleField, TypeDescriptor, WORD};
pub use value::{AbiValue, DecodedTuple, ScalarInput};
