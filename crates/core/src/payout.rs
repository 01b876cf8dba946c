//! Payout records and leaf encoding.

use crate::address::Address;
use crate::hash::{hash, Hash};
use crate::merkle::{MerkleTree, TreeError};
use serde::{Deserialize, Serialize};

/// One entry in a canonical payout list.
///
/// Fixed-point quantities (`rate`, `amount`) are scaled by 1e18. The record
/// is strictly typed so every field has exactly one byte representation in
/// the leaf layout; malformed input is rejected before records are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    /// Position in the payout list the tree is built from.
    pub index: u64,
    /// Payout category tag.
    pub kind: u8,
    /// Recipient account.
    pub recipient: Address,
    /// Vesting duration in seconds.
    pub duration: u64,
    /// Fixed-point rate, scaled by 1e18.
    pub rate: u128,
    /// Fixed-point payout amount, scaled by 1e18.
    pub amount: u128,
}

impl PayoutRecord {
    /// Create a new payout record.
    pub fn new(
        index: u64,
        kind: u8,
        recipient: Address,
        duration: u64,
        rate: u128,
        amount: u128,
    ) -> Self {
        Self {
            index,
            kind,
            recipient,
            duration,
            rate,
            amount,
        }
    }

    /// Compute the record's leaf hash.
    ///
    /// Layout, fixed and versioned:
    /// `index(32) | kind(1) | context(20, when bound) | recipient(20) |
    /// duration(32) | rate(32) | amount(32)`, all integers big-endian and
    /// zero-padded to their declared width. `context` is the verifying
    /// instance's address; binding it into the leaf prevents a proof issued
    /// for one verifier from being replayed against another.
    pub fn leaf_hash(&self, context: Option<&Address>) -> Hash {
        let mut buf = Vec::with_capacity(169);
        buf.extend_from_slice(&pad32_u64(self.index));
        buf.push(self.kind);
        if let Some(ctx) = context {
            buf.extend_from_slice(ctx.as_bytes());
        }
        buf.extend_from_slice(self.recipient.as_bytes());
        buf.extend_from_slice(&pad32_u64(self.duration));
        buf.extend_from_slice(&pad32_u128(self.rate));
        buf.extend_from_slice(&pad32_u128(self.amount));
        hash(&buf)
    }
}

/// Build the merkle tree over an ordered payout list.
///
/// Record order is semantically significant: each record's `index` should
/// match its position in the slice, and the same order must be used when
/// proofs are later generated or verified.
pub fn payout_tree(
    records: &[PayoutRecord],
    context: Option<&Address>,
) -> Result<MerkleTree, TreeError> {
    let leaves: Vec<Hash> = records.iter().map(|r| r.leaf_hash(context)).collect();
    MerkleTree::new(&leaves)
}

fn pad32_u64(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

fn pad32_u128(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PayoutRecord {
        PayoutRecord::new(
            3,
            1,
            Address::from_bytes([0xAA; 20]),
            7_776_000,
            55_000_000_000_000_000,
            100_000_000_000_000_000_000,
        )
    }

    #[test]
    fn test_leaf_hash_deterministic() {
        let record = sample_record();
        assert_eq!(record.leaf_hash(None), record.leaf_hash(None));

        let ctx = Address::from_bytes([0x01; 20]);
        assert_eq!(record.leaf_hash(Some(&ctx)), record.leaf_hash(Some(&ctx)));
    }

    #[test]
    fn test_leaf_hash_field_sensitivity() {
        let base = sample_record();
        let base_hash = base.leaf_hash(None);

        let variants = [
            PayoutRecord { index: base.index + 1, ..base },
            PayoutRecord { kind: base.kind + 1, ..base },
            PayoutRecord { recipient: Address::from_bytes([0xBB; 20]), ..base },
            PayoutRecord { duration: base.duration + 1, ..base },
            PayoutRecord { rate: base.rate + 1, ..base },
            PayoutRecord { amount: base.amount + 1, ..base },
        ];

        for variant in variants {
            assert_ne!(variant.leaf_hash(None), base_hash, "{:?}", variant);
        }
    }

    #[test]
    fn test_leaf_hash_context_binding() {
        let record = sample_record();
        let ctx_a = Address::from_bytes([0x01; 20]);
        let ctx_b = Address::from_bytes([0x02; 20]);

        let unbound = record.leaf_hash(None);
        let bound_a = record.leaf_hash(Some(&ctx_a));
        let bound_b = record.leaf_hash(Some(&ctx_b));

        assert_ne!(unbound, bound_a);
        assert_ne!(bound_a, bound_b);
    }

    #[test]
    fn test_payout_tree_single_record() {
        let record = sample_record();
        let tree = payout_tree(&[record], None).unwrap();

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), record.leaf_hash(None));
    }

    #[test]
    fn test_payout_tree_empty() {
        assert!(matches!(payout_tree(&[], None), Err(TreeError::EmptyInput)));
    }

    #[test]
    fn test_payout_tree_order_matters() {
        let a = sample_record();
        let b = PayoutRecord {
            recipient: Address::from_bytes([0xBB; 20]),
            ..a
        };

        let r1 = payout_tree(&[a, b], None).unwrap().root();
        let r2 = payout_tree(&[b, a], None).unwrap().root();
        assert_ne!(r1, r2);
    }
}
