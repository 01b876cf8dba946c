//! Offline counterpart of the on-chain claim verifier.

use merkledrop_core::{hash_concat, Address, Hash, PayoutRecord};

/// Check a single claim against a published root.
///
/// Recomputes the leaf from the claim fields and folds it with each proof
/// element. The concatenation order at each level follows the leaf's index:
/// bit `L` of `index` is set exactly when the running node is the right
/// child at level `L`, so no separate direction flags need to travel with
/// the proof. The signature mirrors the verifying contract's entry point;
/// the two must stay bit-for-bit compatible.
///
/// A failed check is an expected outcome, not an error.
#[allow(clippy::too_many_arguments)]
pub fn verify_claim(
    root: &Hash,
    depth: usize,
    context: Option<&Address>,
    recipient: &Address,
    index: u64,
    kind: u8,
    duration: u64,
    rate: u128,
    amount: u128,
    proof: &[Hash],
) -> bool {
    if proof.len() != depth {
        return false;
    }

    let record = PayoutRecord::new(index, kind, *recipient, duration, rate, amount);
    let mut acc = record.leaf_hash(context);
    let mut path = index;

    for sibling in proof {
        acc = if path & 1 == 1 {
            hash_concat(&[sibling.as_ref(), acc.as_ref()])
        } else {
            hash_concat(&[acc.as_ref(), sibling.as_ref()])
        };
        path >>= 1;
    }

    acc == *root
}
