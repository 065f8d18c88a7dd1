//! Typed bindings for the escrow contracts.
//!
//! ```solidity
//! // escrow NFT
//! function nextTokenId() external view returns (uint256);
//! // escrow token
//! function positions(uint256) external view
//!     returns (uint256 lockedAmount, uint256 boostedAmount, uint256 unlockTime);
//! function canUnlock(uint256) external view returns (bool);
//! function kick(uint256) external;
//! ```

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use tracing::trace;

use super::abi;
use super::ChainReader;
use crate::config::EscrowConfig;
use crate::types::{Position, ProposedCall};

pub const NEXT_TOKEN_ID_SIG: &str = "nextTokenId()";
pub const POSITIONS_SIG: &str = "positions(uint256)";
pub const CAN_UNLOCK_SIG: &str = "canUnlock(uint256)";
pub const KICK_SIG: &str = "kick(uint256)";

/// Escrow token + escrow NFT pair, read through a borrowed chain connection.
pub struct EscrowContracts<'a, C: ChainReader + ?Sized> {
    chain: &'a C,
    token: Address,
    nft: Address,
}

impl<'a, C: ChainReader + ?Sized> EscrowContracts<'a, C> {
    pub fn new(chain: &'a C, config: &EscrowConfig) -> Self {
        Self {
            chain,
            token: config.escrow_token,
            nft: config.escrow_nft,
        }
    }

    /// Exclusive upper bound of issued position ids.
    pub async fn next_token_id(&self) -> Result<U256> {
        let data = abi::encode_call(NEXT_TOKEN_ID_SIG, &[]);
        let ret = self
            .chain
            .call(self.nft, data)
            .await
            .context("nextTokenId() call failed")?;
        let next = abi::decode_uint(&ret).context("nextTokenId() returned malformed data")?;
        trace!(nft = %self.nft, next_token_id = %next, "Read nextTokenId");
        Ok(next)
    }

    pub async fn position(&self, position_id: U256) -> Result<Position> {
        let data = abi::encode_call(POSITIONS_SIG, &[position_id]);
        let ret = self
            .chain
            .call(self.token, data)
            .await
            .with_context(|| format!("positions({position_id}) call failed"))?;
        let words = abi::decode_words(&ret, 3)
            .with_context(|| format!("positions({position_id}) returned malformed data"))?;
        Ok(Position {
            locked_amount: words[0],
            boosted_amount: words[1],
            unlock_time: words[2],
        })
    }

    pub async fn can_unlock(&self, position_id: U256) -> Result<bool> {
        let data = abi::encode_call(CAN_UNLOCK_SIG, &[position_id]);
        let ret = self
            .chain
            .call(self.token, data)
            .await
            .with_context(|| format!("canUnlock({position_id}) call failed"))?;
        abi::decode_bool(&ret)
            .with_context(|| format!("canUnlock({position_id}) returned malformed data"))
    }

    /// Build (not send) the `kick(positionId)` transaction.
    pub fn kick_call(&self, position_id: U256) -> ProposedCall {
        ProposedCall {
            to: self.token,
            data: abi::encode_call(KICK_SIG, &[position_id]),
        }
    }
}
