//! Core primitives for merkle payout trees.
//!
//! This crate provides the pure computation layer used to commit to a payout
//! list and prove individual membership in it:
//! - Keccak-256 hashing
//! - Account addresses
//! - Payout records and their fixed-layout leaf encoding
//! - Pairwise-reduction merkle trees with membership proofs
//!
//! Everything here is synchronous and free of I/O; each tree is built from
//! scratch over its input list, so concurrent computations over different
//! lists need no coordination.

pub mod address;
pub mod hash;
pub mod merkle;
pub mod payout;

// Re-export commonly used types at the crate root
pub use address::{Address, AddressBytes, AddressError};
pub use hash::{hash, hash_concat, Hash, H256};
pub use merkle::{merkle_root, reduce_level, verify_proof, MerkleProof, MerkleTree, TreeError};
pub use payout::{payout_tree, PayoutRecord};
