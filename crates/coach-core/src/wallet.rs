//! Wallet connection and contract-write seam.
//!
//! Only a simulated writer ships here: it waits the configured confirmation
//! delay and hands back a random transaction hash.

use crate::error::{CoachError, Result};
use futures::future::BoxFuture;
use rand::RngCore;
use std::time::Duration;

/// Writes a round commitment to the configured contract.
///
/// Implementations resolve to the transaction hash on success. Any error is
/// treated by the session as "not submitted".
pub trait ContractWriter: Send + Sync {
    fn write_commitment(&self, commitment: [u8; 32], correct: bool) -> BoxFuture<'_, Result<String>>;
}

/// `0x` + 64 random hex characters.
pub fn random_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    crate::commitment::to_hex(&bytes)
}

/// `0x` + 40 random hex characters.
pub fn random_address() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    crate::commitment::to_hex(&bytes)
}

// ---------------------------------------------------------------------------
// SimulatedWriter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimulatedWriter {
    delay: Duration,
}

impl SimulatedWriter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl ContractWriter for SimulatedWriter {
    fn write_commitment(&self, commitment: [u8; 32], correct: bool) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            tracing::debug!(
                commitment = %crate::commitment::to_hex(&commitment),
                correct,
                "simulated contract write"
            );
            tokio::time::sleep(self.delay).await;
            Ok::<_, CoachError>(random_tx_hash())
        })
    }
}
