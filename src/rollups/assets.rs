//! Portal deposits and asset withdrawal vouchers.
//!
//! Portal inputs are packed; vouchers are standard-layout calls prefixed by
//! the function selector.

use alloy::primitives::{Address, U256};

use crate::abi::{AbiError, AbiResult, AbiValue, DecodedTuple};
use crate::codec::Codec;
use crate::rollups::hex::bytes_to_hex;
use crate::rollups::types::Voucher;

/// Ether sent through the ether portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtherDeposit {
    pub depositor: Address,
    pub amount: U256,
    pub data: Vec<u8>,
}

/// ERC-20 tokens sent through the ERC-20 portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20Deposit {
    pub success: bool,
    pub token: Address,
    pub depositor: Address,
    pub amount: U256,
    pub data: Vec<u8>,
}

/// An ERC-721 token sent through the ERC-721 portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc721Deposit {
    pub token: Address,
    pub depositor: Address,
    pub token_id: U256,
    pub data: Vec<u8>,
}

pub fn ether_deposit_codec() -> AbiResult<Codec> {
    Codec::packed(&["address depositor", "uint256 amount", "bytes data"])
}

pub fn erc20_deposit_codec() -> AbiResult<Codec> {
    Codec::packed(&[
        "bool success",
        "address token",
        "address depositor",
        "uint256 amount",
        "bytes data",
    ])
}

pub fn erc721_deposit_codec() -> AbiResult<Codec> {
    Codec::packed(&["address token", "address depositor", "uint256 token_id", "bytes data"])
}

fn member<'a>(decoded: &'a DecodedTuple, name: &str) -> AbiResult<&'a AbiValue> {
    decoded
        .get(name)
        .ok_or_else(|| AbiError::bad_value(format!("missing member '{}'", name)))
}

fn address(decoded: &DecodedTuple, name: &str) -> AbiResult<Address> {
    member(decoded, name)?
        .as_address()
        .ok_or_else(|| AbiError::bad_value(format!("member '{}' is not an address", name)))
}

fn uint(decoded: &DecodedTuple, name: &str) -> AbiResult<U256> {
    member(decoded, name)?
        .as_uint()
        .ok_or_else(|| AbiError::bad_value(format!("member '{}' is not an unsigned integer", name)))
}

fn bytes(decoded: &DecodedTuple, name: &str) -> AbiResult<Vec<u8>> {
    member(decoded, name)?
        .as_bytes()
        .map(<[u8]>::to_vec)
        .ok_or_else(|| AbiError::bad_value(format!("member '{}' is not bytes", name)))
}

/// Decode an ether portal input.
pub fn decode_ether_deposit(payload_hex: &str) -> AbiResult<EtherDeposit> {
    let decoded = ether_deposit_codec()?.decode(payload_hex)?;
    Ok(EtherDeposit {
        depositor: address(&decoded, "depositor")?,
        amount: uint(&decoded, "amount")?,
        data: bytes(&decoded, "data")?,
    })
}

/// Decode an ERC-20 portal input.
pub fn decode_erc20_deposit(payload_hex: &str) -> AbiResult<Erc20Deposit> {
    let decoded = erc20_deposit_codec()?.decode(payload_hex)?;
    Ok(Erc20Deposit {
        success: member(&decoded, "success")?
            .as_bool()
            .ok_or_else(|| AbiError::bad_value("member 'success' is not a bool"))?,
        token: address(&decoded, "token")?,
        depositor: address(&decoded, "depositor")?,
        amount: uint(&decoded, "amount")?,
        data: bytes(&decoded, "data")?,
    })
}

/// Decode an ERC-721 portal input.
pub fn decode_erc721_deposit(payload_hex: &str) -> AbiResult<Erc721Deposit> {
    let decoded = erc721_deposit_codec()?.decode(payload_hex)?;
    Ok(Erc721Deposit {
        token: address(&decoded, "token")?,
        depositor: address(&decoded, "depositor")?,
        token_id: uint(&decoded, "token_id")?,
        data: bytes(&decoded, "data")?,
    })
}

/// `withdrawEther(receiver, amount)` executed by the application contract.
pub fn ether_withdrawal_voucher(application: Address, receiver: Address, amount: U256) -> AbiResult<Voucher> {
    let payload = Codec::voucher("withdrawEther", &["address", "uint256"])?
        .encode(vec![receiver.into(), amount.into()])?;
    Ok(Voucher {
        destination: bytes_to_hex(application.as_slice()),
        payload,
        value: U256::ZERO,
    })
}

/// `transfer(receiver, amount)` on the token contract.
pub fn erc20_transfer_voucher(token: Address, receiver: Address, amount: U256) -> AbiResult<Voucher> {
    let payload = Codec::voucher("transfer", &["address", "uint256"])?
        .encode(vec![receiver.into(), amount.into()])?;
    Ok(Voucher {
        destination: bytes_to_hex(token.as_slice()),
        payload,
        value: U256::ZERO,
    })
}

/// `safeTransferFrom(owner, receiver, token_id)` on the token contract.
pub fn erc721_safe_transfer_voucher(
    token: Address,
    owner: Address,
    receiver: Address,
    token_id: U256,
) -> AbiResult<Voucher> {
    let payload = Codec::voucher("safeTransferFrom", &["address", "address", "uint256"])?
        .encode(vec![owner.into(), receiver.into(), token_id.into()])?;
    Ok(Voucher {
        destination: bytes_to_hex(token.as_slice()),
        payload,
        value: U256::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, hex};

    const DEPOSITOR: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    const TOKEN: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

    fn word(n: u64) -> Vec<u8> {
        U256::from(n).to_be_bytes::<32>().to_vec()
    }

    #[test]
    fn test_ether_deposit() {
        let mut raw = DEPOSITOR.to_vec();
        raw.extend(word(1_000));
        raw.extend(b"memo");
        let deposit = decode_ether_deposit(&hex::encode_prefixed(&raw)).unwrap();
        assert_eq!(deposit.depositor, DEPOSITOR);
        assert_eq!(deposit.amount, U256::from(1_000));
        assert_eq!(deposit.data, b"memo");
    }

    #[test]
    fn test_erc20_deposit() {
        let mut raw = vec![1u8];
        raw.extend(TOKEN.to_vec());
        raw.extend(DEPOSITOR.to_vec());
        raw.extend(word(42));
        let deposit = decode_erc20_deposit(&hex::encode_prefixed(&raw)).unwrap();
        assert!(deposit.success);
        assert_eq!(deposit.token, TOKEN);
        assert_eq!(deposit.depositor, DEPOSITOR);
        assert_eq!(deposit.amount, U256::from(42));
        assert!(deposit.data.is_empty());
    }

    #[test]
    fn test_erc721_deposit() {
        let mut raw = TOKEN.to_vec();
        raw.extend(DEPOSITOR.to_vec());
        raw.extend(word(7));
        raw.extend([0xab]);
        let deposit = decode_erc721_deposit(&hex::encode_prefixed(&raw)).unwrap();
        assert_eq!(deposit.token, TOKEN);
        assert_eq!(deposit.token_id, U256::from(7));
        assert_eq!(deposit.data, vec![0xab]);
    }

    #[test]
    fn test_truncated_deposit() {
        let raw = DEPOSITOR.to_vec();
        assert!(matches!(
            decode_ether_deposit(&hex::encode_prefixed(&raw)),
            Err(AbiError::Length { .. })
        ));
    }

    #[test]
    fn test_vouchers() {
        let voucher = erc20_transfer_voucher(TOKEN, DEPOSITOR, U256::from(5)).unwrap();
        assert!(voucher.payload.starts_with("0xa9059cbb"));
        assert_eq!(voucher.destination, "0x5fbdb2315678afecb367f032d93f642f64180aa3");
        assert_eq!(
            &voucher.payload[10..74],
            "000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let voucher = ether_withdrawal_voucher(TOKEN, DEPOSITOR, U256::from(5)).unwrap();
        assert!(voucher.payload.starts_with("0x522f6815"));
        assert_eq!(voucher.destination, "0x5fbdb2315678afecb367f032d93f642f64180aa3");

        let voucher = erc721_safe_transfer_voucher(TOKEN, DEPOSITOR, TOKEN, U256::from(1)).unwrap();
        assert!(voucher.payload.starts_with("0x42842e0e"));
        assert_eq!(voucher.payload.len(), 2 + 8 + 3 * 64);
        assert_eq!(voucher.destination, voucher.destination.to_lowercase());
    }
}
