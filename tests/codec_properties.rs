//! Wire-level properties of the ABI codec, route headers and URI matching.

use alloy::primitives::{hex, I256, U256};

use rollups_handler::abi::{decode, decode_packed, encode, AbiValue, TypeDescriptor};
use rollups_handler::codec::{route_header, voucher_selector, Codec};
use rollups_handler::routing::match_uri;

fn ty(signature: &str) -> TypeDescriptor {
    TypeDescriptor::parse(signature).unwrap()
}

fn word_hex(hex_payload: &str, index: usize) -> &str {
    let body = hex_payload.trim_start_matches("0x");
    &body[index * 64..(index + 1) * 64]
}

#[test]
fn test_integer_boundaries_round_trip() {
    for width in [8usize, 16, 32, 64, 128, 256] {
        let uint_max = if width == 256 {
            U256::MAX
        } else {
            (U256::from(1u8) << width) - U256::from(1u8)
        };
        let int_min = I256::from_raw(U256::MAX << (width - 1));
        let int_max = I256::from_raw((U256::from(1u8) << (width - 1)) - U256::from(1u8));

        let unsigned = ty(&format!("uint{}", width));
        for value in [U256::ZERO, uint_max] {
            let encoded = encode(&AbiValue::Uint(value), &unsigned).unwrap();
            assert_eq!(decode(&encoded, &unsigned).unwrap(), AbiValue::Uint(value), "uint{}", width);
        }

        let signed = ty(&format!("int{}", width));
        for value in [int_min, I256::ZERO, int_max, I256::MINUS_ONE] {
            let encoded = encode(&AbiValue::Int(value), &signed).unwrap();
            assert_eq!(decode(&encoded, &signed).unwrap(), AbiValue::Int(value), "int{}", width);
        }
    }
}

#[test]
fn test_twos_complement() {
    let int256 = ty("int256");
    let encoded = encode(&AbiValue::Int(I256::MINUS_ONE), &int256).unwrap();
    assert_eq!(encoded, vec![0xff; 32]);

    // textual input takes the same path
    let from_text = encode(&AbiValue::String("-1".into()), &int256).unwrap();
    assert_eq!(from_text, encoded);

    let all_ones = [0xffu8; 32];
    assert_eq!(decode(&all_ones, &int256).unwrap(), AbiValue::Int(I256::MINUS_ONE));
    assert_eq!(decode(&all_ones, &ty("uint256")).unwrap(), AbiValue::Uint(U256::MAX));
}

#[test]
fn test_dynamic_offsets_point_into_tail() {
    let codec = Codec::new(&["uint256 a", "string s", "uint256 b"]).unwrap();
    let payload = codec
        .encode(vec![1u64.into(), "hello rollups".into(), 2u64.into()])
        .unwrap();

    // head: a, offset(s), b; tail: length(s), data(s)
    let offset = usize::from_str_radix(word_hex(&payload, 1), 16).unwrap();
    assert_eq!(offset, 3 * 32);
    assert_eq!(usize::from_str_radix(word_hex(&payload, 3), 16).unwrap(), 13);
    assert!(word_hex(&payload, 4).starts_with(&hex::encode("hello rollups")));
    assert_eq!(payload.len(), 2 + 5 * 64);

    let decoded = codec.decode(&payload).unwrap();
    assert_eq!(decoded.get("a").and_then(AbiValue::as_uint), Some(U256::from(1u8)));
    assert_eq!(decoded.get("s").and_then(AbiValue::as_str), Some("hello rollups"));
    assert_eq!(decoded.get("b").and_then(AbiValue::as_uint), Some(U256::from(2u8)));
}

#[test]
fn test_nested_dynamic_members() {
    let codec = Codec::new(&["string[] names", "(uint8 id,bytes blob) item"]).unwrap();
    let value = AbiValue::Tuple(vec![
        (
            "names".into(),
            AbiValue::Array(vec!["a".into(), "bc".into()]),
        ),
        (
            "item".into(),
            AbiValue::Tuple(vec![
                ("id".into(), 9u64.into()),
                ("blob".into(), AbiValue::Bytes(vec![1, 2, 3])),
            ]),
        ),
    ]);
    let encoded = codec.encode_value(&value).unwrap();
    let decoded = codec.decode_bytes(&encoded).unwrap();

    let names = decoded.get("names").and_then(AbiValue::as_array).unwrap();
    assert_eq!(names[1].as_str(), Some("bc"));
    let item = decoded.get("item").unwrap();
    assert_eq!(item.field("id").and_then(AbiValue::as_uint), Some(U256::from(9u8)));
    assert_eq!(item.field("blob").and_then(AbiValue::as_bytes), Some(&[1u8, 2, 3][..]));
}

#[test]
fn test_fixed_bytes_and_integers_pad_on_opposite_sides() {
    let raw = vec![0xaa, 0xbb, 0xcc, 0xdd];
    let fixed = Codec::new(&["bytes4"]).unwrap().encode(vec![AbiValue::FixedBytes(raw)]).unwrap();
    let number = Codec::new(&["uint32"]).unwrap().encode(vec![0xaabbccddu64.into()]).unwrap();

    assert_eq!(fixed, format!("0xaabbccdd{}", "00".repeat(28)));
    assert_eq!(number, format!("0x{}aabbccdd", "00".repeat(28)));
    assert_ne!(fixed, number);
}

#[test]
fn test_packed_layout_uses_natural_widths() {
    let packed = ty("(address,uint16,bool,bytes)");
    let value = AbiValue::Array(vec![
        "0x00000000000000000000000000000000000000aa".into(),
        0x0102u64.into(),
        true.into(),
        AbiValue::Bytes(vec![0xde, 0xad]),
    ]);
    let encoded = rollups_handler::abi::encode_packed(&value, &packed).unwrap();
    assert_eq!(encoded.len(), 20 + 2 + 1 + 2);
    assert_eq!(&encoded[20..], &[0x01, 0x02, 0x01, 0xde, 0xad]);

    let decoded = decode_packed(&encoded, &packed).unwrap();
    assert_eq!(decoded.field("3").and_then(AbiValue::as_bytes), Some(&[0xde, 0xad][..]));
}

#[test]
fn test_route_header_determinism() {
    let header = route_header("wallet", "Balance", &["address"]).unwrap();
    assert_eq!(header, route_header("wallet", "Balance", &["address"]).unwrap());
    assert_eq!(header.len(), 66);

    // member names do not take part in the header
    assert_eq!(header, route_header("wallet", "Balance", &["address owner"]).unwrap());

    for other in [
        route_header("bank", "Balance", &["address"]).unwrap(),
        route_header("wallet", "balance", &["address"]).unwrap(),
        route_header("wallet", "Balance", &["address", "uint256"]).unwrap(),
    ] {
        assert_ne!(header, other);
    }

    let selector = voucher_selector("Balance", &["address"]).unwrap();
    assert_eq!(selector.len(), 10);
    assert!(!header.starts_with(&selector));
}

#[test]
fn test_known_voucher_selectors() {
    assert_eq!(voucher_selector("transfer", &["address", "uint256"]).unwrap(), "0xa9059cbb");
    assert_eq!(
        voucher_selector("safeTransferFrom", &["address", "address", "uint256"]).unwrap(),
        "0x42842e0e"
    );
}

#[test]
fn test_uri_patterns() {
    let params = match_uri("/balance/:address", "/balance/0xDEAD").unwrap();
    assert_eq!(params.get("address").map(String::as_str), Some("0xDEAD"));

    assert!(match_uri("/set/:key/:value", "/set/a/b/c").is_none());
    assert!(match_uri("/set/:key/:value", "/set/a/b").is_some());
    assert!(match_uri("/static/", "/static/app.js").is_some());
}
