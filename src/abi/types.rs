//! Type descriptors parsed from Solidity-style type signatures.
//!
//! # Grammar
//! ```text
//! type    := base suffix*
//! base    := scalar | "tuple(" fields ")" | "(" fields ")"
//! fields  := field ("," field)*
//! field   := type (whitespace identifier)?
//! suffix  := "[" nonzero-digits "]" | "[]"
//! ```
//!
//! # Design Decisions
//! - A signature parses to exactly one descriptor or fails; no recovery
//! - `uint`/`int` are aliases of `uint256`/`int256`, `byte` of `bytes1`
//! - `Display` yields the canonical form used when hashing route headers
//! - Zero-size types (`()`, `T[0]`) and footprints overflowing `usize` are
//!   rejected, so every static type occupies at least one word

use std::fmt;
use std::str::FromStr;

use crate::abi::error::{AbiError, AbiResult};

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// A named member of a tuple type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    /// Declared name, empty when the field was declared without one.
    pub name: String,
    /// Field type.
    pub ty: TypeDescriptor,
}

impl TupleField {
    /// Name used when the field is surfaced in a decoded tuple.
    /// Unnamed fields take their positional index.
    pub fn effective_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            index.to_string()
        } else {
            self.name.clone()
        }
    }
}

/// Recursive description of an ABI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Bool,
    /// Signed integer with bit width (multiple of 8, 8..=256).
    Int(usize),
    /// Unsigned integer with bit width (multiple of 8, 8..=256).
    Uint(usize),
    Address,
    /// Fixed-size byte array, 1..=32 bytes.
    FixedBytes(usize),
    Bytes,
    String,
    /// 24-byte function reference (address ++ selector).
    Function,
    FixedArray(Box<TypeDescriptor>, usize),
    DynamicArray(Box<TypeDescriptor>),
    Tuple(Vec<TupleField>),
}

impl TypeDescriptor {
    /// Parse a type signature such as `uint256`, `bytes32[3]` or
    /// `tuple(address owner,uint256)[]`.
    pub fn parse(signature: &str) -> AbiResult<Self> {
        let mut parser = Parser::new(signature);
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if !parser.is_done() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(ty)
    }

    /// Parse a list of field declarations as the members of one tuple.
    ///
    /// An empty list yields the empty member tuple of a codec without
    /// fields; `()` itself is not a valid type.
    pub fn tuple_of<S: AsRef<str>>(fields: &[S]) -> AbiResult<Self> {
        if fields.is_empty() {
            return Ok(TypeDescriptor::Tuple(Vec::new()));
        }
        let joined = fields
            .iter()
            .map(|f| f.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        Self::parse(&format!("tuple({})", joined))
    }

    /// True when the encoding of this type needs a tail region.
    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeDescriptor::Bytes | TypeDescriptor::String | TypeDescriptor::DynamicArray(_) => true,
            TypeDescriptor::FixedArray(elem, _) => elem.is_dynamic(),
            TypeDescriptor::Tuple(fields) => fields.iter().any(|f| f.ty.is_dynamic()),
            _ => false,
        }
    }

    /// Footprint in the head region of the enclosing tuple or array.
    ///
    /// Dynamic types occupy a single offset word; static arrays and tuples
    /// are laid out inline.
    /// Saturates for descriptors built by hand whose footprint does not
    /// fit in `usize`; parsed descriptors always fit.
    pub fn word_size(&self) -> usize {
        self.head_size().unwrap_or(usize::MAX)
    }

    fn head_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(WORD);
        }
        self.body_size()
    }

    /// Bytes of the inline body: one head slot per member or element.
    fn body_size(&self) -> Option<usize> {
        match self {
            TypeDescriptor::FixedArray(elem, len) => elem.head_size()?.checked_mul(*len),
            TypeDescriptor::Tuple(fields) => fields
                .iter()
                .try_fold(0usize, |acc, f| acc.checked_add(f.ty.head_size()?)),
            _ => Some(WORD),
        }
    }

    /// Natural byte width in packed mode, `None` for variable-width types.
    pub fn packed_size(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Bool => Some(1),
            TypeDescriptor::Int(bits) | TypeDescriptor::Uint(bits) => Some(bits / 8),
            TypeDescriptor::Address => Some(20),
            TypeDescriptor::FixedBytes(n) => Some(*n),
            TypeDescriptor::Function => Some(24),
            TypeDescriptor::Bytes | TypeDescriptor::String | TypeDescriptor::DynamicArray(_) => None,
            TypeDescriptor::FixedArray(elem, len) => elem.packed_size()?.checked_mul(*len),
            TypeDescriptor::Tuple(fields) => fields
                .iter()
                .try_fold(0usize, |acc, f| acc.checked_add(f.ty.packed_size()?)),
        }
    }

    /// Tuple members, empty for non-tuple types.
    pub fn fields(&self) -> &[TupleField] {
        match self {
            TypeDescriptor::Tuple(fields) => fields,
            _ => &[],
        }
    }

    /// Canonical strings of each tuple member, names dropped.
    pub fn clean_fields(&self) -> Vec<String> {
        self.fields().iter().map(|f| f.ty.to_string()).collect()
    }

    /// Signature form used in function selectors: tuples are written as
    /// bare parentheses.
    pub fn signature(&self) -> String {
        match self {
            TypeDescriptor::FixedArray(elem, len) => format!("{}[{}]", elem.signature(), len),
            TypeDescriptor::DynamicArray(elem) => format!("{}[]", elem.signature()),
            TypeDescriptor::Tuple(fields) => format!(
                "({})",
                fields
                    .iter()
                    .map(|f| f.ty.signature())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            other => other.to_string(),
        }
    }

    /// Short kind label for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Bool => "bool",
            TypeDescriptor::Int(_) => "int",
            TypeDescriptor::Uint(_) => "uint",
            TypeDescriptor::Address => "address",
            TypeDescriptor::FixedBytes(_) => "fixed bytes",
            TypeDescriptor::Bytes => "bytes",
            TypeDescriptor::String => "string",
            TypeDescriptor::Function => "function",
            TypeDescriptor::FixedArray(..) => "array",
            TypeDescriptor::DynamicArray(_) => "slice",
            TypeDescriptor::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::Int(bits) => write!(f, "int{}", bits),
            TypeDescriptor::Uint(bits) => write!(f, "uint{}", bits),
            TypeDescriptor::Address => write!(f, "address"),
            TypeDescriptor::FixedBytes(n) => write!(f, "bytes{}", n),
            TypeDescriptor::Bytes => write!(f, "bytes"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::Function => write!(f, "function"),
            TypeDescriptor::FixedArray(elem, len) => write!(f, "{}[{}]", elem, len),
            TypeDescriptor::DynamicArray(elem) => write!(f, "{}[]", elem),
            TypeDescriptor::Tuple(fields) => {
                write!(f, "tuple(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: impl Into<String>) -> AbiError {
        AbiError::Syntax {
            signature: self.input.to_string(),
            reason: format!("{} at offset {}", reason.into(), self.pos),
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn parse_type(&mut self) -> AbiResult<TypeDescriptor> {
        self.skip_ws();
        let mut ty = if self.peek() == Some('(') {
            self.parse_tuple()?
        } else {
            let word = self.ident();
            if word == "tuple" {
                if self.peek() != Some('(') {
                    return Err(self.error("expected '(' after tuple"));
                }
                self.parse_tuple()?
            } else {
                self.scalar(word)?
            }
        };

        while self.eat('[') {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits = &self.input[start..self.pos];
            if !self.eat(']') {
                return Err(self.error("unterminated array suffix"));
            }
            ty = if digits.is_empty() {
                TypeDescriptor::DynamicArray(Box::new(ty))
            } else {
                let len = digits
                    .parse::<usize>()
                    .map_err(|_| self.error("array length out of range"))?;
                if len == 0 {
                    return Err(self.error("zero-length array"));
                }
                let array = TypeDescriptor::FixedArray(Box::new(ty), len);
                if array.body_size().is_none() {
                    return Err(self.error("array length out of range"));
                }
                array
            };
        }
        Ok(ty)
    }

    fn parse_tuple(&mut self) -> AbiResult<TypeDescriptor> {
        if !self.eat('(') {
            return Err(self.error("expected '('"));
        }
        let mut fields = Vec::new();
        self.skip_ws();
        if self.peek() == Some(')') {
            return Err(self.error("empty tuple"));
        }
        loop {
            let ty = self.parse_type()?;
            self.skip_ws();
            let name = match self.peek() {
                Some(',') | Some(')') => String::new(),
                Some(_) => {
                    let name = self.ident();
                    if name.is_empty() {
                        return Err(self.error("invalid field name"));
                    }
                    name.to_string()
                }
                None => return Err(self.error("unterminated tuple")),
            };
            fields.push(TupleField { name, ty });
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                break;
            }
            return Err(self.error("expected ',' or ')'"));
        }
        let tuple = TypeDescriptor::Tuple(fields);
        if tuple.body_size().is_none() {
            return Err(self.error("tuple too large"));
        }
        Ok(tuple)
    }

    fn scalar(&self, word: &str) -> AbiResult<TypeDescriptor> {
        let ty = match word {
            "" => return Err(self.error("missing type")),
            "bool" => TypeDescriptor::Bool,
            "address" => TypeDescriptor::Address,
            "bytes" => TypeDescriptor::Bytes,
            "string" => TypeDescriptor::String,
            "function" => TypeDescriptor::Function,
            "byte" => TypeDescriptor::FixedBytes(1),
            "uint" => TypeDescriptor::Uint(256),
            "int" => TypeDescriptor::Int(256),
            _ => {
                if let Some(bits) = word.strip_prefix("uint") {
                    TypeDescriptor::Uint(self.int_width(word, bits)?)
                } else if let Some(bits) = word.strip_prefix("int") {
                    TypeDescriptor::Int(self.int_width(word, bits)?)
                } else if let Some(size) = word.strip_prefix("bytes") {
                    let n = self.number(word, size)?;
                    if !(1..=32).contains(&n) {
                        return Err(self.error(format!("invalid size for {}", word)));
                    }
                    TypeDescriptor::FixedBytes(n)
                } else {
                    return Err(self.error(format!("unknown type '{}'", word)));
                }
            }
        };
        Ok(ty)
    }

    fn number(&self, word: &str, digits: &str) -> AbiResult<usize> {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(self.error(format!("unknown type '{}'", word)));
        }
        digits
            .parse::<usize>()
            .map_err(|_| self.error(format!("invalid size for {}", word)))
    }

    fn int_width(&self, word: &str, digits: &str) -> AbiResult<usize> {
        let bits = self.number(word, digits)?;
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(self.error(format!("invalid bit width for {}", word)));
        }
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(TypeDescriptor::parse("uint256").unwrap(), TypeDescriptor::Uint(256));
        assert_eq!(TypeDescriptor::parse("uint").unwrap(), TypeDescriptor::Uint(256));
        assert_eq!(TypeDescriptor::parse("int8").unwrap(), TypeDescriptor::Int(8));
        assert_eq!(TypeDescriptor::parse("bytes4").unwrap(), TypeDescriptor::FixedBytes(4));
        assert_eq!(TypeDescriptor::parse(" address ").unwrap(), TypeDescriptor::Address);
    }

    #[test]
    fn test_parse_rejects_bad_widths() {
        for sig in ["uint7", "uint264", "int0", "bytes0", "bytes33", "uintx", "foo", ""] {
            assert!(
                matches!(TypeDescriptor::parse(sig), Err(AbiError::Syntax { .. })),
                "{} should fail",
                sig
            );
        }
    }

    #[test]
    fn test_parse_arrays_and_tuples() {
        let ty = TypeDescriptor::parse("tuple(address owner, uint256)[2][]").unwrap();
        assert_eq!(ty.to_string(), "tuple(address,uint256)[2][]");
        match ty {
            TypeDescriptor::DynamicArray(inner) => match *inner {
                TypeDescriptor::FixedArray(tuple, 2) => {
                    assert_eq!(tuple.fields()[0].name, "owner");
                    assert_eq!(tuple.fields()[1].effective_name(1), "1");
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_tuples() {
        assert!(TypeDescriptor::parse("tuple(uint256").is_err());
        assert!(TypeDescriptor::parse("tuple(uint256,)").is_err());
        assert!(TypeDescriptor::parse("uint256[").is_err());
        assert!(TypeDescriptor::parse("uint256 x y").is_err());
    }

    #[test]
    fn test_parse_rejects_zero_size_types() {
        for sig in ["()", "tuple()", "tuple()[]", "(uint256,())", "uint256[0]", "uint256[0][]", "string[0]"] {
            assert!(
                matches!(TypeDescriptor::parse(sig), Err(AbiError::Syntax { .. })),
                "{} should fail",
                sig
            );
        }
        assert_eq!(
            TypeDescriptor::tuple_of::<&str>(&[]).unwrap(),
            TypeDescriptor::Tuple(Vec::new())
        );
    }

    #[test]
    fn test_parse_rejects_oversized_arrays() {
        for sig in [
            "uint256[576460752303423488]",
            "string[576460752303423488]",
            "uint256[4294967296][4294967296]",
            "(uint256[288230376151711744],uint256[288230376151711744])",
        ] {
            assert!(
                matches!(TypeDescriptor::parse(sig), Err(AbiError::Syntax { .. })),
                "{} should fail",
                sig
            );
        }
        let big = TypeDescriptor::parse("uint8[1000000]").unwrap();
        assert_eq!(big.word_size(), 32_000_000);
        assert_eq!(big.packed_size(), Some(1_000_000));
    }

    #[test]
    fn test_dynamic_and_word_size() {
        let static_tuple = TypeDescriptor::parse("(uint256,bytes32[2])").unwrap();
        assert!(!static_tuple.is_dynamic());
        assert_eq!(static_tuple.word_size(), 96);

        let dynamic = TypeDescriptor::parse("tuple(uint256,string)[2]").unwrap();
        assert!(dynamic.is_dynamic());
        assert_eq!(dynamic.word_size(), 32);
    }

    #[test]
    fn test_clean_fields_and_signature() {
        let ty = TypeDescriptor::tuple_of(&["uint", "string key", "(address,int)"]).unwrap();
        assert_eq!(
            ty.clean_fields(),
            vec!["uint256", "string", "tuple(address,int256)"]
        );
        assert_eq!(ty.signature(), "(uint256,string,(address,int256))");
    }

    #[test]
    fn test_packed_size() {
        let ty = TypeDescriptor::tuple_of(&["address", "uint256", "bool"]).unwrap();
        assert_eq!(ty.packed_size(), Some(53));
        assert_eq!(TypeDescriptor::Bytes.packed_size(), None);
    }
}
