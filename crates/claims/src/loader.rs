//! Payout list loading and validation.
//!
//! The input format is a JSON document of the shape
//! `{ "type": 1, "duration": 7776000, "rate": 5.5,
//!    "payouts": [["0x…", "100000000000000000000"], …] }`.
//! The `rate` is a human percentage and is scaled to 1e18 fixed point here;
//! amounts are base-unit (1e18-scaled) integers, carried as decimal strings
//! or plain JSON integers. All validation happens at this boundary, before
//! any record reaches the leaf encoder.

use merkledrop_core::{Address, PayoutRecord};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One percent, in 1e18 fixed point.
const ONE_PERCENT: u128 = 10u128.pow(16);

/// Errors that can occur while loading a payout list.
#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("failed to read payout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payout file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payout list is empty")]
    EmptyPayouts,

    #[error("invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("duplicate recipient: {0}")]
    DuplicateRecipient(Address),

    #[error("invalid amount for {recipient}: {value}")]
    InvalidAmount { recipient: String, value: String },

    #[error("invalid rate: {0}")]
    InvalidRate(String),

    #[error("payout type {0} does not fit in one byte")]
    InvalidKind(u64),
}

/// Raw file shape, prior to validation.
#[derive(Debug, Deserialize)]
struct RawPayoutFile {
    #[serde(rename = "type")]
    kind: u64,
    duration: u64,
    rate: serde_json::Number,
    payouts: Vec<(String, RawAmount)>,
}

/// Amounts appear either as decimal strings or as plain JSON integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Int(u64),
}

impl RawAmount {
    fn parse(&self) -> Option<u128> {
        match self {
            RawAmount::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().ok()
            }
            RawAmount::Text(_) => None,
            RawAmount::Int(n) => Some(u128::from(*n)),
        }
    }

    fn raw(&self) -> String {
        match self {
            RawAmount::Text(s) => s.clone(),
            RawAmount::Int(n) => n.to_string(),
        }
    }
}

/// A validated payout list, ready for tree construction.
///
/// All records share the list-level `kind`, `duration` and `rate`; each
/// record's `index` is its position in `records`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutList {
    /// Payout category tag.
    pub kind: u8,
    /// Vesting duration in seconds.
    pub duration: u64,
    /// Fixed-point rate, scaled by 1e18 (the file carries a percentage).
    pub rate: u128,
    /// Payout records in canonical order.
    pub records: Vec<PayoutRecord>,
}

impl PayoutList {
    /// Parse and validate a payout list from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, PayoutError> {
        let raw: RawPayoutFile = serde_json::from_str(json)?;

        if raw.payouts.is_empty() {
            return Err(PayoutError::EmptyPayouts);
        }

        let kind =
            u8::try_from(raw.kind).map_err(|_| PayoutError::InvalidKind(raw.kind))?;
        let rate = scale_rate(&raw.rate)?;

        let mut records = Vec::with_capacity(raw.payouts.len());
        let mut seen = HashSet::with_capacity(raw.payouts.len());

        for (index, (recipient, amount)) in raw.payouts.iter().enumerate() {
            let address = Address::from_hex(recipient)
                .map_err(|_| PayoutError::InvalidAddress(recipient.clone()))?;
            if !seen.insert(address) {
                return Err(PayoutError::DuplicateRecipient(address));
            }
            let amount = amount.parse().ok_or_else(|| PayoutError::InvalidAmount {
                recipient: recipient.clone(),
                value: amount.raw(),
            })?;

            records.push(PayoutRecord::new(
                index as u64,
                kind,
                address,
                raw.duration,
                rate,
                amount,
            ));
        }

        Ok(Self {
            kind,
            duration: raw.duration,
            rate,
            records,
        })
    }

    /// Load a payout list from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PayoutError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of payout records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list has no records. Loading rejects empty lists, so this
    /// is false for any loaded list.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all payout amounts, in 1e18 fixed point.
    pub fn total_amount(&self) -> u128 {
        self.records
            .iter()
            .fold(0u128, |acc, r| acc.saturating_add(r.amount))
    }
}

/// Scale a percentage (e.g. `5.5` meaning 5.5%) to 1e18 fixed point.
///
/// 1% maps to 1e16, so 100% maps to exactly 1e18. Rates above 100% or with
/// more precision than the fixed-point scale can hold are rejected.
fn scale_rate(rate: &serde_json::Number) -> Result<u128, PayoutError> {
    let text = rate.to_string();
    let scaled = parse_scaled(&text, 16)
        .ok_or_else(|| PayoutError::InvalidRate(text.clone()))?;
    if scaled > 100 * ONE_PERCENT {
        return Err(PayoutError::InvalidRate(text));
    }
    Ok(scaled)
}

/// Parse a non-negative decimal string into an integer scaled by
/// 10^`decimals`. Returns None for anything but plain decimal notation.
fn parse_scaled(text: &str, decimals: u32) -> Option<u128> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac_part.len() as u32 > decimals {
        return None;
    }

    let mut value: u128 = int_part.parse::<u128>().ok()?.checked_mul(10u128.pow(decimals))?;
    if !frac_part.is_empty() {
        let frac: u128 = frac_part.parse().ok()?;
        value = value.checked_add(frac * 10u128.pow(decimals - frac_part.len() as u32))?;
    }
    Some(value)
}
