//! Merkle tree construction and membership proofs for payout lists.

use crate::hash::{hash_concat, Hash};
use thiserror::Error;

/// Errors that can occur during tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot build a tree from an empty leaf list")]
    EmptyInput,
    #[error("leaf index {index} out of bounds for {leaves} leaves")]
    IndexOutOfBounds { index: usize, leaves: usize },
}

/// Reduce one level of the tree: hash adjacent pairs in order.
///
/// An unpaired final node is hashed with itself. This self-pairing rule is a
/// protocol constant; proof generation relies on the same rule when it looks
/// up siblings. A level of one node is already a root and is returned
/// unchanged.
pub fn reduce_level(nodes: &[Hash]) -> Vec<Hash> {
    if nodes.len() < 2 {
        return nodes.to_vec();
    }

    let mut next = Vec::with_capacity(nodes.len().div_ceil(2));
    for chunk in nodes.chunks(2) {
        let combined = if chunk.len() == 2 {
            hash_concat(&[chunk[0].as_ref(), chunk[1].as_ref()])
        } else {
            // Odd number of elements: hash the last one with itself
            hash_concat(&[chunk[0].as_ref(), chunk[0].as_ref()])
        };
        next.push(combined);
    }
    next
}

/// Compute the merkle root of a list of leaf hashes.
///
/// Fails on an empty list. A single leaf is its own root.
pub fn merkle_root(leaves: &[Hash]) -> Result<Hash, TreeError> {
    if leaves.is_empty() {
        return Err(TreeError::EmptyInput);
    }

    let mut current_level: Vec<Hash> = leaves.to_vec();
    while current_level.len() > 1 {
        current_level = reduce_level(&current_level);
    }
    Ok(current_level[0])
}

/// A merkle tree for efficient proofs.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes in the tree, level by level (leaves first).
    levels: Vec<Vec<Hash>>,
}

/// A merkle proof for a single leaf.
///
/// Each proof element carries the sibling hash and which side of the running
/// node the sibling sits on. Recording the side explicitly keeps generation
/// and verification in agreement about concatenation order at every level;
/// for a leaf at position `i` the sibling at level `L` sits on the right
/// exactly when bit `L` of `i` is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// The leaf being proven.
    pub leaf: Hash,
    /// Sibling hashes from leaf to root.
    pub siblings: Vec<Hash>,
    /// Direction for each sibling (true = right, false = left).
    pub directions: Vec<bool>,
}

impl MerkleTree {
    /// Build a merkle tree from a list of leaf hashes.
    ///
    /// Fails on an empty list: an empty payout list has no meaningful root.
    pub fn new(leaves: &[Hash]) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::EmptyInput);
        }

        let mut levels = vec![leaves.to_vec()];
        while levels.last().unwrap().len() > 1 {
            let next = reduce_level(levels.last().unwrap());
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// Get the root of the merkle tree.
    pub fn root(&self) -> Hash {
        *self.levels.last().unwrap().first().unwrap()
    }

    /// Number of reduction passes from the leaves to the root.
    ///
    /// Every proof generated from this tree has exactly this many elements.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Get the number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Generate a proof for the leaf at the given index.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, TreeError> {
        if index >= self.leaf_count() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                leaves: self.leaf_count(),
            });
        }

        let leaf = self.levels[0][index];
        let mut siblings = Vec::with_capacity(self.depth());
        let mut directions = Vec::with_capacity(self.depth());
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            let is_right = idx % 2 == 0;

            let sibling = if sibling_idx < level.len() {
                level[sibling_idx]
            } else {
                level[idx] // Odd leaf hashes with itself
            };

            siblings.push(sibling);
            directions.push(is_right);
            idx /= 2;
        }

        Ok(MerkleProof {
            leaf,
            siblings,
            directions,
        })
    }

    /// Verify a merkle proof against this tree's root.
    pub fn verify_proof(&self, proof: &MerkleProof) -> bool {
        verify_proof(&self.root(), proof)
    }
}

/// Verify a merkle proof against a given root.
///
/// Folds the leaf with each sibling in positional order; a mismatch is a
/// `false` return, never an error.
pub fn verify_proof(root: &Hash, proof: &MerkleProof) -> bool {
    if proof.siblings.len() != proof.directions.len() {
        return false;
    }

    let mut current = proof.leaf;
    for (sibling, is_right) in proof.siblings.iter().zip(proof.directions.iter()) {
        current = if *is_right {
            hash_concat(&[current.as_ref(), sibling.as_ref()])
        } else {
            hash_concat(&[sibling.as_ref(), current.as_ref()])
        };
    }

    current == *root
}
