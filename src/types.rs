//! Shared types for the escrow keeper.
//!
//! Positions are read from chain, outcomes are handed back to whoever
//! invoked the scan. Nothing here is persisted between invocations.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An escrow position as returned by `positions(uint256)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub locked_amount: U256,
    pub boosted_amount: U256,
    /// Unix timestamp. Zero marks an empty slot.
    pub unlock_time: U256,
}

impl Position {
    /// Whether a position has ever been written at this id.
    pub fn is_live(&self) -> bool {
        self.unlock_time > U256::ZERO
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "locked={} boosted={} unlock_time={}",
            self.locked_amount, self.boosted_amount, self.unlock_time,
        )
    }
}

// ---------------------------------------------------------------------------
// Proposed call / outcome
// ---------------------------------------------------------------------------

/// A single transaction the external executor may submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedCall {
    pub to: Address,
    pub data: Bytes,
}

/// Terminal state of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Submit this call.
    Action(ProposedCall),
    /// Nothing to do this round.
    NoAction { message: String },
}

impl Outcome {
    pub fn no_action(message: impl Into<String>) -> Self {
        Self::NoAction {
            message: message.into(),
        }
    }

    pub fn can_exec(&self) -> bool {
        matches!(self, Self::Action(_))
    }
}

/// Wire shape handed back to the scheduler:
/// `{ canExec: false, message }` or `{ canExec: true, callData: [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub can_exec: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_data: Option<Vec<ProposedCall>>,
}

impl From<Outcome> for ExecResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Action(call) => Self {
                can_exec: true,
                message: None,
                call_data: Some(vec![call]),
            },
            Outcome::NoAction { message } => Self {
                can_exec: false,
                message: Some(message),
                call_data: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons an evaluation ends without an action.
#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    #[error("missing {0} configuration")]
    MissingConfig(&'static str),

    #[error("invalid {field} configuration: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("chain read failed: {0}")]
    ChainRead(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
