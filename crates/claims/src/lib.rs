//! Payout list loading and claim proof generation.
//!
//! This crate is the boundary layer around the pure tree computation in
//! `merkledrop-core`:
//! - Parsing and validating payout list files (JSON)
//! - Generating per-recipient claim sets (root, depth, proofs)
//! - Exporting and re-loading the published proof file
//! - The offline audit verifier that mirrors the on-chain entry point

pub mod claims;
pub mod loader;
pub mod verify;

// Re-export commonly used types at the crate root
pub use claims::{ClaimError, ClaimProof, ClaimSet};
pub use loader::{PayoutError, PayoutList};
pub use verify::verify_claim;
