//! Escrow eligibility scanner.
//!
//! Walks position ids in ascending order, skipping empty slots, and stops
//! at the first position whose `canUnlock` is true. One invocation proposes
//! at most one `kick`; the scheduler re-invokes for the next one.
//!
//! Any read failure aborts the whole scan. Nothing is remembered between
//! invocations, so the next call starts again from id 0.

use alloy_primitives::U256;
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::chain::escrow::EscrowContracts;
use crate::chain::ChainReader;
use crate::config::{EscrowConfig, UserArgs};
use crate::types::{KeeperError, Outcome, ProposedCall};

/// Message returned when the whole range was scanned without a hit.
pub const NO_ELIGIBLE_POSITION: &str = "no eligible position found";

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Finds the lowest-id kickable escrow position.
pub struct EscrowScanner<C> {
    chain: C,
}

impl<C: ChainReader> EscrowScanner<C> {
    pub fn new(chain: C) -> Self {
        Self { chain }
    }

    /// Run one evaluation. Never fails: every error becomes `NoAction`.
    pub async fn evaluate(&self, args: &UserArgs) -> Outcome {
        let config = match EscrowConfig::from_args(args) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Skipping scan: bad configuration");
                return Outcome::no_action(e.to_string());
            }
        };

        match self.scan(&config).await {
            Ok(Some(call)) => Outcome::Action(call),
            Ok(None) => {
                info!("Scan complete, nothing to kick");
                Outcome::no_action(NO_ELIGIBLE_POSITION)
            }
            Err(e) => {
                let err = KeeperError::ChainRead(format!("{e:#}"));
                warn!(error = %err, "Scan aborted");
                Outcome::no_action(err.to_string())
            }
        }
    }

    /// Sequential scan over `[0, nextTokenId)`.
    async fn scan(&self, config: &EscrowConfig) -> Result<Option<ProposedCall>> {
        let contracts = EscrowContracts::new(&self.chain, config);

        let next_token_id = contracts.next_token_id().await?;
        info!(
            escrow_token = %config.escrow_token,
            escrow_nft = %config.escrow_nft,
            next_token_id = %next_token_id,
            "Scanning escrow positions"
        );

        let mut position_id = U256::ZERO;
        while position_id < next_token_id {
            debug!(position_id = %position_id, "Checking position");
            let position = contracts.position(position_id).await?;

            if position.is_live() && contracts.can_unlock(position_id).await? {
                info!(
                    position_id = %position_id,
                    %position,
                    "Position is unlocked and can be kicked"
                );
                return Ok(Some(contracts.kick_call(position_id)));
            }

            position_id += U256::from(1);
        }

        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
