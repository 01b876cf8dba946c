//! Claim set generation and the exported proof file format.

use crate::loader::PayoutList;
use crate::verify::verify_claim;
use merkledrop_core::{payout_tree, Address, Hash, TreeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while generating or persisting a claim set.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("failed to read or write claim file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed claim file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One recipient's claim: the fields the verifier needs to recompute the
/// leaf, plus the sibling hashes up to the root.
///
/// Fixed-point quantities serialize as decimal strings; consumers of the
/// proof file are typically not able to hold 1e18-scaled values in a native
/// number type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProof {
    /// Position in the payout list the tree was built from.
    pub index: u64,
    /// Payout category tag.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Vesting duration in seconds.
    pub duration: u64,
    /// Fixed-point rate, scaled by 1e18.
    #[serde(with = "u128_string")]
    pub rate: u128,
    /// Fixed-point payout amount, scaled by 1e18.
    #[serde(with = "u128_string")]
    pub amount: u128,
    /// Sibling hashes from leaf to root.
    pub proof: Vec<Hash>,
}

mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A complete generated claim set: the root commitment plus one claim per
/// recipient. This is the unit that gets published alongside the on-chain
/// root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// The tree root the claims verify against.
    pub root: Hash,
    /// Tree depth; every proof has exactly this many elements.
    pub depth: usize,
    /// Claims keyed by recipient address.
    pub claims: BTreeMap<Address, ClaimProof>,
}

impl ClaimSet {
    /// Build the payout tree and generate a claim for every record.
    ///
    /// `context`, when given, is the verifying instance's address and is
    /// bound into every leaf; the same context must be supplied at
    /// verification time.
    pub fn generate(list: &PayoutList, context: Option<&Address>) -> Result<Self, ClaimError> {
        let tree = payout_tree(&list.records, context)?;
        let root = tree.root();
        let depth = tree.depth();

        let mut claims = BTreeMap::new();
        for (i, record) in list.records.iter().enumerate() {
            let proof = tree.proof(i)?;
            debug!("claim for {}: {} siblings", record.recipient, proof.siblings.len());
            claims.insert(
                record.recipient,
                ClaimProof {
                    index: record.index,
                    kind: record.kind,
                    duration: record.duration,
                    rate: record.rate,
                    amount: record.amount,
                    proof: proof.siblings,
                },
            );
        }

        info!(
            "generated {} claims, root {}, depth {}, total {}",
            claims.len(),
            root,
            depth,
            list.total_amount()
        );

        Ok(Self { root, depth, claims })
    }

    /// Serialize to the published JSON form.
    pub fn to_json_string(&self) -> Result<String, ClaimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a claim set from its published JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, ClaimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the claim set to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ClaimError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Load a claim set from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClaimError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Re-verify every claim against the given root, depth and context.
    ///
    /// Returns the recipients whose proofs fail; an empty vector means the
    /// whole set checks out. This is the offline audit pass run before a
    /// root is published.
    pub fn audit(&self, root: &Hash, depth: usize, context: Option<&Address>) -> Vec<Address> {
        self.claims
            .iter()
            .filter(|(recipient, claim)| {
                !verify_claim(
                    root,
                    depth,
                    context,
                    recipient,
                    claim.index,
                    claim.kind,
                    claim.duration,
                    claim.rate,
                    claim.amount,
                    &claim.proof,
                )
            })
            .map(|(recipient, _)| *recipient)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_list() -> PayoutList {
        PayoutList::from_json_str(
            r#"{
                "type": 1,
                "duration": 7776000,
                "rate": 5.5,
                "payouts": [
                    ["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "100000000000000000000"],
                    ["0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "200000000000000000000"],
                    ["0xcccccccccccccccccccccccccccccccccccccccc", "300000000000000000000"]
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_one_claim_per_record() {
        let list = sample_list();
        let set = ClaimSet::generate(&list, None).unwrap();

        assert_eq!(set.claims.len(), 3);
        assert_eq!(set.depth, 2);
        for claim in set.claims.values() {
            assert_eq!(claim.proof.len(), set.depth);
        }
    }

    #[test]
    fn test_generate_deterministic() {
        let list = sample_list();
        let s1 = ClaimSet::generate(&list, None).unwrap();
        let s2 = ClaimSet::generate(&list, None).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_audit_accepts_generated_set() {
        let list = sample_list();
        let set = ClaimSet::generate(&list, None).unwrap();
        assert!(set.audit(&set.root, set.depth, None).is_empty());
    }

    #[test]
    fn test_audit_rejects_wrong_root() {
        let list = sample_list();
        let set = ClaimSet::generate(&list, None).unwrap();

        let failures = set.audit(&merkledrop_core::hash(b"wrong"), set.depth, None);
        assert_eq!(failures.len(), set.claims.len());
    }

    #[test]
    fn test_audit_rejects_wrong_context() {
        let list = sample_list();
        let context = Address::from_bytes([0x01; 20]);
        let set = ClaimSet::generate(&list, Some(&context)).unwrap();

        assert!(set.audit(&set.root, set.depth, Some(&context)).is_empty());
        assert_eq!(
            set.audit(&set.root, set.depth, None).len(),
            set.claims.len()
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let list = sample_list();
        let set = ClaimSet::generate(&list, None).unwrap();

        let json = set.to_json_string().unwrap();
        let back = ClaimSet::from_json_str(&json).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn test_amounts_serialize_as_strings() {
        let list = sample_list();
        let set = ClaimSet::generate(&list, None).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&set.to_json_string().unwrap()).unwrap();
        let claim = &value["claims"]["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"];
        assert_eq!(claim["amount"], "100000000000000000000");
        assert_eq!(claim["rate"], "55000000000000000");
        assert_eq!(claim["type"], 1);
    }
}
