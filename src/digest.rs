//! Typed structured-data digest of an order.
//!
//! digest = keccak256(abi.encode(domainSeparator, structHash, isNewOrder))
//!
//! The domain binds the digest to one perpetual manager on one chain. The
//! trailing flag separates signatures that open an order from signatures that
//! cancel it. Output depends only on the arguments.

use crate::order::Order;
use ethers::abi::{encode, Token};
use ethers::types::{Address, H256, I256, U256};
use ethers::utils::keccak256;

pub const DOMAIN_NAME: &str = "Perpetual Trade Manager";

pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";

pub const ORDER_TYPE: &str = "Order(bytes32 iPerpetualId,address traderAddr,int128 fAmount,int128 fLimitPrice,int128 fTriggerPrice,uint256 iDeadline,address referrerAddr,uint32 flags,int128 fLeverage,uint256 createdTimestamp)";

pub fn domain_separator(manager: Address, chain_id: u64) -> H256 {
    let encoded = encode(&[
        Token::FixedBytes(keccak256(DOMAIN_TYPE.as_bytes()).to_vec()),
        Token::FixedBytes(keccak256(DOMAIN_NAME.as_bytes()).to_vec()),
        Token::Uint(U256::from(chain_id)),
        Token::Address(manager),
    ]);
    H256(keccak256(encoded))
}

// int128 is sign-extended to a full word
fn int128(raw: i128) -> Token {
    Token::Int(I256::from(raw).into_raw())
}

pub fn order_struct_hash(order: &Order) -> H256 {
    let encoded = encode(&[
        Token::FixedBytes(keccak256(ORDER_TYPE.as_bytes()).to_vec()),
        Token::FixedBytes(order.perpetual_id().as_bytes().to_vec()),
        Token::Address(order.trader()),
        int128(order.amount().raw()),
        int128(order.limit_price().raw()),
        int128(order.trigger_price().raw()),
        Token::Uint(U256::from(order.deadline().as_secs())),
        Token::Address(order.referrer()),
        Token::Uint(U256::from(order.flags().bits())),
        int128(order.leverage().raw()),
        Token::Uint(U256::from(order.created_at().as_secs())),
    ]);
    H256(keccak256(encoded))
}

pub fn order_digest(order: &Order, is_new_order: bool, manager: Address, chain_id: u64) -> H256 {
    let encoded = encode(&[
        Token::FixedBytes(domain_separator(manager, chain_id).as_bytes().to_vec()),
        Token::FixedBytes(order_struct_hash(order).as_bytes().to_vec()),
        Token::Bool(is_new_order),
    ]);
    let digest = H256(keccak256(encoded));
    tracing::debug!(?digest, is_new_order, chain_id, "order digest");
    digest
}

/// Digest the trader signs to place `order`.
pub fn sign_order_digest(order: &Order, manager: Address, chain_id: u64) -> H256 {
    order_digest(order, true, manager, chain_id)
}

/// Digest the trader signs to cancel a previously placed `order`.
pub fn cancel_order_digest(order: &Order, manager: Address, chain_id: u64) -> H256 {
    order_digest(order, false, manager, chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::OrderFlags;
    use crate::order::{build_order, OrderParams};
    use crate::types::{Leverage, PerpetualId, Price, SignedSize, Timestamp};
    use rust_decimal_macros::dec;

    fn params() -> OrderParams {
        OrderParams {
            perpetual_id: PerpetualId(H256::repeat_byte(0xad)),
            trader: Address::repeat_byte(0x42),
            amount: SignedSize::new(dec!(1)),
            limit_price: Price::new_unchecked(dec!(20100)),
            trigger_price: None,
            deadline: Timestamp::from_secs(1_700_086_400),
            referrer: None,
            flags: OrderFlags::MARKET_ORDER,
            target_leverage: Some(Leverage::new(dec!(3)).unwrap()),
            created_at: Timestamp::from_secs(1_700_000_000),
        }
    }

    fn manager() -> Address {
        Address::repeat_byte(0x11)
    }

    #[test]
    fn digest_is_deterministic() {
        let order = build_order(&params()).unwrap();
        let a = sign_order_digest(&order, manager(), 31);
        let b = sign_order_digest(&order.clone(), manager(), 31);
        assert_eq!(a, b);
        assert_ne!(a, H256::zero());
    }

    #[test]
    fn every_field_changes_digest() {
        let base = params();
        let baseline = sign_order_digest(&build_order(&base).unwrap(), manager(), 31);

        let mut variants = Vec::new();
        let mut p = base.clone();
        p.deadline = p.deadline.plus_secs(1);
        variants.push(p);
        let mut p = base.clone();
        p.amount = SignedSize::new(dec!(-1));
        variants.push(p);
        let mut p = base.clone();
        p.limit_price = Price::new_unchecked(dec!(20101));
        variants.push(p);
        let mut p = base.clone();
        p.trigger_price = Some(Price::new_unchecked(dec!(19000)));
        variants.push(p);
        let mut p = base.clone();
        p.referrer = Some(Address::repeat_byte(0x01));
        variants.push(p);
        let mut p = base.clone();
        p.flags = OrderFlags::CLOSE_ONLY;
        variants.push(p);
        let mut p = base.clone();
        p.target_leverage = None;
        variants.push(p);
        let mut p = base.clone();
        p.created_at = Timestamp::from_secs(1_700_000_001);
        variants.push(p);
        let mut p = base.clone();
        p.trader = Address::repeat_byte(0x43);
        variants.push(p);
        let mut p = base;
        p.perpetual_id = PerpetualId(H256::repeat_byte(0xae));
        variants.push(p);

        for variant in variants {
            let digest = sign_order_digest(&build_order(&variant).unwrap(), manager(), 31);
            assert_ne!(digest, baseline, "unchanged digest for {:?}", variant);
        }
    }

    #[test]
    fn domain_binds_chain_and_manager() {
        let order = build_order(&params()).unwrap();
        let baseline = sign_order_digest(&order, manager(), 31);
        assert_ne!(sign_order_digest(&order, manager(), 30), baseline);
        assert_ne!(sign_order_digest(&order, Address::repeat_byte(0x12), 31), baseline);
        assert_ne!(domain_separator(manager(), 30), domain_separator(manager(), 31));
    }

    #[test]
    fn cancel_digest_differs_from_placement() {
        let order = build_order(&params()).unwrap();
        assert_ne!(
            sign_order_digest(&order, manager(), 31),
            cancel_order_digest(&order, manager(), 31)
        );
        assert_eq!(
            cancel_order_digest(&order, manager(), 31),
            order_digest(&order, false, manager(), 31)
        );
    }

    #[test]
    fn negative_amounts_sign_extend() {
        match int128(-1) {
            Token::Int(word) => assert_eq!(word, U256::MAX),
            other => panic!("unexpected token {:?}", other),
        }
        match int128(1) {
            Token::Int(word) => assert_eq!(word, U256::one()),
            other => panic!("unexpected token {:?}", other),
        }
    }
}
