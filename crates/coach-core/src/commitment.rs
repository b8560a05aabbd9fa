//! Commitment digest for a finished round.
//!
//! Packed layout, in order:
//!
//! ```text
//! actor address      20 bytes
//! analysis direction "UP" | "DOWN"
//! analysis conf.     1 byte
//! user direction     "UP" | "DOWN"
//! user conf.         1 byte
//! outcome            "UP" | "DOWN"
//! timestamp          32 bytes, big-endian unix seconds
//! ```
//!
//! The digest is SHA-256 over those bytes. Building never fails: bad inputs
//! produce the all-zero digest.

use crate::error::{CoachError, Result};
use crate::types::Direction;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Actor used while in demo mode, in place of a wallet address.
pub const DEMO_ACTOR: &str = "0x000000000000000000000000000000000000dEaD";

pub const DIGEST_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitmentInputs {
    pub actor: String,
    pub analysis_direction: Direction,
    pub analysis_confidence: u8,
    pub user_direction: Direction,
    pub user_confidence: u8,
    pub outcome: Direction,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commitment {
    /// `0x` followed by 64 lowercase hex characters.
    pub digest: String,
    pub inputs: CommitmentInputs,
    /// True when the inputs could not be encoded and `digest` is all zeros.
    pub fallback: bool,
    #[serde(skip)]
    bytes: [u8; DIGEST_LEN],
}

impl Commitment {
    pub fn bytes(&self) -> [u8; DIGEST_LEN] {
        self.bytes
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Parse a `0x`-prefixed 20-byte hex address.
pub fn parse_address(s: &str) -> Result<[u8; 20]> {
    let hex_part = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| CoachError::Encoding(format!("address '{s}' lacks 0x prefix")))?;
    let raw = hex::decode(hex_part)
        .map_err(|e| CoachError::Encoding(format!("address '{s}': {e}")))?;
    raw.try_into()
        .map_err(|_| CoachError::Encoding(format!("address '{s}' is not 20 bytes")))
}

fn confidence_byte(v: u8) -> Result<u8> {
    if v > 100 {
        return Err(CoachError::Encoding(format!("confidence {v} exceeds 100")));
    }
    Ok(v)
}

pub fn encode(inputs: &CommitmentInputs) -> Result<Vec<u8>> {
    let actor = parse_address(&inputs.actor)?;
    let timestamp = u64::try_from(inputs.timestamp).map_err(|_| {
        CoachError::Encoding(format!("negative timestamp {}", inputs.timestamp))
    })?;

    let mut out = Vec::with_capacity(20 + 3 * 4 + 2 + 32);
    out.extend_from_slice(&actor);
    out.extend_from_slice(inputs.analysis_direction.label().as_bytes());
    out.push(confidence_byte(inputs.analysis_confidence)?);
    out.extend_from_slice(inputs.user_direction.label().as_bytes());
    out.push(confidence_byte(inputs.user_confidence)?);
    out.extend_from_slice(inputs.outcome.label().as_bytes());
    let mut ts = [0u8; 32];
    ts[24..].copy_from_slice(&timestamp.to_be_bytes());
    out.extend_from_slice(&ts);
    Ok(out)
}

pub fn digest(inputs: &CommitmentInputs) -> Result<[u8; DIGEST_LEN]> {
    let packed = encode(inputs)?;
    Ok(Sha256::digest(&packed).into())
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn zero_digest() -> String {
    to_hex(&[0u8; DIGEST_LEN])
}

/// Build the commitment, substituting the zero digest on encoding failure.
pub fn build(inputs: CommitmentInputs) -> Commitment {
    match digest(&inputs) {
        Ok(bytes) => Commitment {
            digest: to_hex(&bytes),
            inputs,
            fallback: false,
            bytes,
        },
        Err(e) => {
            tracing::warn!(error = %e, "commitment encoding failed, using zero digest");
            Commitment {
                digest: zero_digest(),
                inputs,
                fallback: true,
                bytes: [0u8; DIGEST_LEN],
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
