// Error taxonomy for claim authorization, accounting and fee collection

use alloy_primitives::{Address, B256, U256};

use crate::access::Role;

/// Broad class of a [`HeatError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request; the caller can fix it and retry
    InputShape,
    /// Claim or caller not authorized
    Authorization,
    /// Balance, allowance or supply limits
    Accounting,
    /// System halted or operation re-entered
    SystemState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeatError {
    #[error("Recipient must not be the zero address")]
    InvalidRecipient,

    #[error("Account must not be the zero address")]
    InvalidAccount,

    #[error("Expected {expected} public inputs, got {provided}")]
    InvalidPublicInputCount { expected: usize, provided: usize },

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Nullifier {nullifier} has already been used")]
    NullifierReused { nullifier: B256 },

    #[error("Recipient hash {provided} does not match recipient {recipient}")]
    RecipientMismatch { recipient: Address, provided: B256 },

    #[error("Wrong network: expected {expected}, got {provided}")]
    WrongNetwork { expected: B256, provided: B256 },

    #[error("Proof rejected by verifier")]
    InvalidProof,

    #[error("{caller} does not hold the {role} role")]
    Unauthorized { role: Role, caller: Address },

    #[error("Insufficient balance for {account}: have {balance}, need {required}")]
    InsufficientBalance { account: Address, balance: U256, required: U256 },

    #[error("Insufficient allowance from {owner} to {spender}: have {allowance}, need {required}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: U256,
        required: U256,
    },

    #[error("Supply ceiling exceeded: supply {supply} + {amount} > {ceiling}")]
    SupplyCeilingExceeded { supply: U256, amount: U256, ceiling: U256 },

    #[error("System is halted")]
    SystemHalted,

    #[error("Re-entrant call rejected")]
    Reentrant,
}

impl HeatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeatError::InvalidRecipient
            | HeatError::InvalidAccount
            | HeatError::InvalidPublicInputCount { .. }
            | HeatError::ZeroAmount => ErrorKind::InputShape,
            HeatError::NullifierReused { .. }
            | HeatError::RecipientMismatch { .. }
            | HeatError::WrongNetwork { .. }
            | HeatError::InvalidProof
            | HeatError::Unauthorized { .. } => ErrorKind::Authorization,
            HeatError::InsufficientBalance { .. }
            | HeatError::InsufficientAllowance { .. }
            | HeatError::SupplyCeilingExceeded { .. } => ErrorKind::Accounting,
            HeatError::SystemHalted | HeatError::Reentrant => ErrorKind::SystemState,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            HeatError::InvalidRecipient => "INVALID_RECIPIENT",
            HeatError::InvalidAccount => "INVALID_ACCOUNT",
            HeatError::InvalidPublicInputCount { .. } => "INVALID_PUBLIC_INPUT_COUNT",
            HeatError::ZeroAmount => "ZERO_AMOUNT",
            HeatError::NullifierReused { .. } => "NULLIFIER_REUSED",
            HeatError::RecipientMismatch { .. } => "RECIPIENT_MISMATCH",
            HeatError::WrongNetwork { .. } => "WRONG_NETWORK",
            HeatError::InvalidProof => "INVALID_PROOF",
            HeatError::Unauthorized { .. } => "UNAUTHORIZED",
            HeatError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            HeatError::InsufficientAllowance { .. } => "INSUFFICIENT_ALLOWANCE",
            HeatError::SupplyCeilingExceeded { .. } => "SUPPLY_CEILING_EXCEEDED",
            HeatError::SystemHalted => "SYSTEM_HALTED",
            HeatError::Reentrant => "REENTRANT",
        }
    }
}

pub type Result<T> = std::result::Result<T, HeatError>;
