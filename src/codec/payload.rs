//! Payload codec: an optional route header plus a tuple of fields.

use std::fmt;

use crate::abi::{self, AbiError, AbiResult, AbiValue, DecodedTuple, TypeDescriptor};
use crate::codec::header::{header_from_clean, selector_from_signature, HEADER_HEX_LEN};
use crate::rollups::hex::{bytes_to_hex, hex_to_bytes};

/// How the field tuple is laid out after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Standard head/tail layout.
    Standard,
    /// Natural-width concatenation.
    Packed,
}

/// Describes how one payload shape is encoded and decoded.
///
/// A codec either carries a header (a 32-byte route identifier or a 4-byte
/// selector) that prefixes every payload, or none at all. Headers are held
/// as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone)]
pub struct Codec {
    namespace: String,
    method: String,
    header: Option<String>,
    layout: Layout,
    fields: Vec<String>,
    ty: TypeDescriptor,
}

impl Codec {
    fn build<S: AsRef<str>>(fields: &[S], layout: Layout) -> AbiResult<Self> {
        Ok(Self {
            namespace: String::new(),
            method: String::new(),
            header: None,
            layout,
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            ty: TypeDescriptor::tuple_of(fields)?,
        })
    }

    /// Headerless codec using the standard layout.
    pub fn new<S: AsRef<str>>(fields: &[S]) -> AbiResult<Self> {
        Self::build(fields, Layout::Standard)
    }

    /// Headerless codec using the packed layout.
    pub fn packed<S: AsRef<str>>(fields: &[S]) -> AbiResult<Self> {
        Self::build(fields, Layout::Packed)
    }

    /// Standard codec whose payloads start with the route header of
    /// `namespace`, `method` and the field types.
    pub fn with_route<S: AsRef<str>>(namespace: &str, method: &str, fields: &[S]) -> AbiResult<Self> {
        Self::build(fields, Layout::Standard)?.routed(namespace, method)
    }

    /// Packed counterpart of [`Codec::with_route`].
    pub fn packed_with_route<S: AsRef<str>>(
        namespace: &str,
        method: &str,
        fields: &[S],
    ) -> AbiResult<Self> {
        Self::build(fields, Layout::Packed)?.routed(namespace, method)
    }

    /// Standard codec whose header is the 4-byte selector of `method(fields)`.
    /// Used to build voucher payloads.
    pub fn voucher<S: AsRef<str>>(method: &str, fields: &[S]) -> AbiResult<Self> {
        let mut codec = Self::build(fields, Layout::Standard)?;
        codec.header = Some(selector_from_signature(method, &codec.ty));
        codec.method = method.to_string();
        Ok(codec)
    }

    /// Replace the header with an explicit one. An empty string removes it.
    pub fn with_raw_header(mut self, header: impl Into<String>) -> Self {
        let header = header.into();
        self.header = if header.is_empty() {
            None
        } else {
            Some(header.to_ascii_lowercase())
        };
        self
    }

    fn routed(mut self, namespace: &str, method: &str) -> AbiResult<Self> {
        self.header = Some(header_from_clean(namespace, method, &self.ty.clean_fields()));
        self.namespace = namespace.to_string();
        self.method = method.to_string();
        Ok(self)
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The field tuple as a single descriptor.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// True when the header has the shape of a route header.
    pub fn has_route_header(&self) -> bool {
        self.header.as_ref().is_some_and(|h| h.len() == HEADER_HEX_LEN)
    }

    /// Decode a hex payload, checking and stripping the header first.
    pub fn decode(&self, payload_hex: &str) -> AbiResult<DecodedTuple> {
        self.decode_bytes(&hex_to_bytes(payload_hex)?)
    }

    /// Decode raw payload bytes, checking and stripping the header first.
    pub fn decode_bytes(&self, payload: &[u8]) -> AbiResult<DecodedTuple> {
        let body = self.strip_header(payload)?;
        if self.ty.fields().is_empty() {
            return Ok(DecodedTuple::default());
        }

        let value = match self.layout {
            Layout::Standard => abi::decode(body, &self.ty)?,
            Layout::Packed => {
                if body.is_empty() {
                    return Err(AbiError::length("packed payload", 1, 0));
                }
                abi::decode_packed(body, &self.ty)?
            }
        };
        match value {
            AbiValue::Tuple(fields) => Ok(DecodedTuple::new(fields)),
            other => Err(AbiError::bad_value(format!("expected tuple, decoded {}", other))),
        }
    }

    fn strip_header<'a>(&self, payload: &'a [u8]) -> AbiResult<&'a [u8]> {
        let Some(header) = &self.header else {
            return Ok(payload);
        };
        let expected = hex_to_bytes(header)?;
        if payload.len() < expected.len() {
            return Err(AbiError::length("header", expected.len(), payload.len()));
        }
        let (found, body) = payload.split_at(expected.len());
        if found != expected.as_slice() {
            return Err(AbiError::HeaderMismatch {
                expected: header.clone(),
                found: bytes_to_hex(found),
            });
        }
        Ok(body)
    }

    /// Encode positional values and prefix the header. Returns hex.
    pub fn encode(&self, values: Vec<AbiValue>) -> AbiResult<String> {
        Ok(bytes_to_hex(self.encode_value(&AbiValue::Array(values))?))
    }

    /// Encode values keyed by field name (or positional index for unnamed
    /// fields) and prefix the header. Returns hex.
    pub fn encode_named(&self, values: Vec<(String, AbiValue)>) -> AbiResult<String> {
        Ok(bytes_to_hex(self.encode_value(&AbiValue::Tuple(values))?))
    }

    /// Encode a prepared array or tuple value into raw payload bytes.
    pub fn encode_value(&self, value: &AbiValue) -> AbiResult<Vec<u8>> {
        let mut out = match &self.header {
            Some(header) => hex_to_bytes(header)?,
            None => Vec::new(),
        };
        let body = match self.layout {
            Layout::Standard => abi::encode(value, &self.ty)?,
            Layout::Packed => abi::encode_packed(value, &self.ty)?,
        };
        out.extend(body);
        Ok(out)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(header) = &self.header {
            parts.push(format!("Header({})", header));
        }
        if !self.namespace.is_empty() {
            parts.push(format!("Framework({})", self.namespace));
        }
        if !self.method.is_empty() {
            parts.push(format!("Method({})", self.method));
        }
        let label = match self.layout {
            Layout::Standard => "Fields",
            Layout::Packed => "PackedFields",
        };
        parts.push(format!("{}([{}])", label, self.fields.join(" ")));
        write!(f, "Codec{{{}}}", parts.join(","))
    }
}
