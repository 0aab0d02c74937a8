//! Error types for the multisig layer

use crate::{ActionId, Amount, Identity, InstanceHandle};

/// Which authority an operation required
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Master,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Master => write!(f, "master"),
        }
    }
}

/// Errors that can occur in multisig operations
///
/// Every failure aborts the whole operation; none of these leave
/// partially applied state behind.
#[derive(Debug, thiserror::Error)]
pub enum MultisigError {
    #[error("Unauthorized: {caller} is not the current {required}")]
    Unauthorized { caller: Identity, required: Role },

    #[error("Action not found: {0}")]
    ActionNotFound(ActionId),

    #[error("Owner not found: {0}")]
    OwnerNotFound(Identity),

    #[error("Action already executed: {0}")]
    AlreadyExecuted(ActionId),

    #[error("Action {action} already confirmed by {owner}")]
    AlreadyConfirmed { action: ActionId, owner: Identity },

    #[error("Action {action} not confirmed by {owner}")]
    NotConfirmed { action: ActionId, owner: Identity },

    #[error("Quorum not reached for {action}: required {required}, have {current}")]
    QuorumNotReached {
        action: ActionId,
        required: u32,
        current: u32,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("External call failed: {0}")]
    ExternalCallFailure(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(InstanceHandle),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MultisigError {
    pub fn not_owner(caller: &Identity) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            required: Role::Owner,
        }
    }

    pub fn not_master(caller: &Identity) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            required: Role::Master,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Result type alias for multisig operations
pub type MultisigResult<T> = Result<T, MultisigError>;
