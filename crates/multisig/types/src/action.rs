//! Pending actions: quorum-gated requests awaiting confirmation
//!
//! A pending action is created by a submission, collects confirmations
//! from owners, and becomes permanently inert once executed.

use crate::{Amount, Identity, MultisigError, MultisigResult, OwnerRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequence number of a pending action, unique per wallet instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl ActionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of quorum-gated action kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Append `destination` to the owner set
    AddOwner,
    /// Remove `destination` from the owner set, clamping quorum if needed
    RemoveOwner,
    /// Set quorum to `value`
    ChangeQuorum,
    /// Pay `value` native units from the treasury to `destination`
    SendNative,
    /// Move `value` units of the external asset to `destination`
    SendFungibleAsset,
}

impl ActionKind {
    /// Stable wire code of the kind
    pub fn code(&self) -> u8 {
        match self {
            ActionKind::AddOwner => 0,
            ActionKind::RemoveOwner => 1,
            ActionKind::ChangeQuorum => 2,
            ActionKind::SendNative => 3,
            ActionKind::SendFungibleAsset => 4,
        }
    }

    /// Whether executing this kind mutates the owner set or quorum
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            ActionKind::AddOwner | ActionKind::RemoveOwner | ActionKind::ChangeQuorum
        )
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActionKind::AddOwner => "add_owner",
            ActionKind::RemoveOwner => "remove_owner",
            ActionKind::ChangeQuorum => "change_quorum",
            ActionKind::SendNative => "send_native",
            ActionKind::SendFungibleAsset => "send_fungible_asset",
        };
        write!(f, "{}", name)
    }
}

/// Content hash of an action (BLAKE3, 32 bytes)
///
/// Covers `(destination, value, kind)` only. Two submissions with the same
/// content share a hash but never an id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn of_action(destination: &Identity, value: Amount, kind: ActionKind) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"multisig-action-v1:");
        hasher.update(&(destination.0.len() as u64).to_le_bytes());
        hasher.update(destination.0.as_bytes());
        hasher.update(&value.0.to_le_bytes());
        hasher.update(&[kind.code()]);
        Self(*hasher.finalize().as_bytes())
    }

    /// Hex-encode for display.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse from a 64-char hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ContentHashError> {
        if hex.len() != 64 {
            return Err(ContentHashError::InvalidLength(hex.len()));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = hex.get(i * 2..i * 2 + 2).ok_or(ContentHashError::InvalidHex)?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| ContentHashError::InvalidHex)?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        ContentHash::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentHashError {
    #[error("invalid content hash length: {0} (expected 64)")]
    InvalidLength(usize),
    #[error("invalid hex character in content hash")]
    InvalidHex,
}

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A submitted action and its confirmation state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingAction {
    /// Sequence number, assigned at submission
    pub id: ActionId,
    /// Hash of `(destination, value, kind)`
    pub content_hash: ContentHash,
    /// What happens on execution
    pub kind: ActionKind,
    /// Target owner or transfer recipient, depending on `kind`
    pub destination: Identity,
    /// New quorum or transfer amount, depending on `kind`
    pub value: Amount,
    /// The owner who submitted the action
    pub submitter: Identity,
    /// Confirming identities, in confirmation order
    pub confirmations: Vec<Identity>,
    /// Set exactly once, never cleared
    pub executed: bool,
    /// When the action was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the action was executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

impl PendingAction {
    pub fn new(
        id: ActionId,
        kind: ActionKind,
        destination: Identity,
        value: Amount,
        submitter: Identity,
    ) -> Self {
        Self {
            id,
            content_hash: ContentHash::of_action(&destination, value, kind),
            kind,
            destination,
            value,
            submitter,
            confirmations: Vec::new(),
            executed: false,
            submitted_at: Utc::now(),
            executed_at: None,
        }
    }

    pub fn is_confirmed_by(&self, identity: &Identity) -> bool {
        self.confirmations.contains(identity)
    }

    /// Add a confirmation
    pub fn confirm(&mut self, identity: Identity) -> MultisigResult<()> {
        self.ensure_open()?;
        if self.is_confirmed_by(&identity) {
            return Err(MultisigError::AlreadyConfirmed {
                action: self.id,
                owner: identity,
            });
        }
        self.confirmations.push(identity);
        Ok(())
    }

    /// Withdraw a confirmation
    pub fn revoke(&mut self, identity: &Identity) -> MultisigResult<()> {
        self.ensure_open()?;
        let before = self.confirmations.len();
        self.confirmations.retain(|c| c != identity);
        if self.confirmations.len() == before {
            return Err(MultisigError::NotConfirmed {
                action: self.id,
                owner: identity.clone(),
            });
        }
        Ok(())
    }

    /// Confirmations that still count: those from current owners.
    ///
    /// Confirmations from removed owners stay stored but are ignored here.
    pub fn effective_confirmations(&self, registry: &OwnerRegistry) -> usize {
        self.confirmations
            .iter()
            .filter(|c| registry.is_owner(c))
            .count()
    }

    /// Whether the action may be executed under the given registry
    pub fn is_executable(&self, registry: &OwnerRegistry) -> bool {
        !self.executed && self.effective_confirmations(registry) >= registry.quorum() as usize
    }

    /// Mark executed; the only transition out of the open state
    pub fn mark_executed(&mut self) -> MultisigResult<()> {
        self.ensure_open()?;
        self.executed = true;
        self.executed_at = Some(Utc::now());
        Ok(())
    }

    pub fn ensure_open(&self) -> MultisigResult<()> {
        if self.executed {
            return Err(MultisigError::AlreadyExecuted(self.id));
        }
        Ok(())
    }
}
