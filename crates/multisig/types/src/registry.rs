//! Owner/quorum registry: who may approve, and how many must
//!
//! The registry is a pure data holder. It enforces
//! `1 <= quorum <= owner_count` on every mutation but makes no
//! authorization decisions; only action execution reaches the mutators.

use crate::{Identity, MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};

/// What a successful owner removal did to the quorum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// Quorum before the removal
    pub previous_quorum: u32,
    /// New quorum if the removal forced a clamp
    pub clamped_quorum: Option<u32>,
}

/// The ordered owner set and approval threshold
///
/// Deserialization goes through [`OwnerRegistry::new`], so a decoded
/// registry satisfies the same invariant as a constructed one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOwnerRegistry")]
pub struct OwnerRegistry {
    /// Owners in insertion order
    owners: Vec<Identity>,
    /// Confirmations required to execute
    quorum: u32,
}

#[derive(Deserialize)]
struct RawOwnerRegistry {
    owners: Vec<Identity>,
    quorum: u32,
}

impl TryFrom<RawOwnerRegistry> for OwnerRegistry {
    type Error = MultisigError;

    fn try_from(raw: RawOwnerRegistry) -> MultisigResult<Self> {
        Self::new(raw.owners, raw.quorum)
    }
}

impl OwnerRegistry {
    /// Build a registry, rejecting duplicates and out-of-range quorums
    pub fn new(owners: Vec<Identity>, quorum: u32) -> MultisigResult<Self> {
        validate_owners(&owners)?;
        validate_quorum(quorum, owners.len())?;
        Ok(Self { owners, quorum })
    }

    // --- Queries ---

    pub fn is_owner(&self, identity: &Identity) -> bool {
        self.owners.contains(identity)
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Owners in insertion order
    pub fn owners(&self) -> &[Identity] {
        &self.owners
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    // --- Mutations ---

    /// Append an owner
    pub fn add_owner(&mut self, identity: Identity) -> MultisigResult<()> {
        if self.is_owner(&identity) {
            return Err(MultisigError::InvariantViolation(format!(
                "{} is already an owner",
                identity
            )));
        }
        self.owners.push(identity);
        Ok(())
    }

    /// Remove an owner, clamping quorum down to the new owner count
    ///
    /// Removing the last owner is rejected: no quorum in `[1, 0]` exists.
    pub fn remove_owner(&mut self, identity: &Identity) -> MultisigResult<RemovalOutcome> {
        let position = self
            .owners
            .iter()
            .position(|o| o == identity)
            .ok_or_else(|| MultisigError::OwnerNotFound(identity.clone()))?;

        if self.owners.len() == 1 {
            return Err(MultisigError::InvariantViolation(format!(
                "cannot remove {}: it is the last owner",
                identity
            )));
        }

        let previous_quorum = self.quorum;
        self.owners.remove(position);

        let count = self.owners.len() as u32;
        let clamped_quorum = if self.quorum > count {
            self.quorum = count;
            Some(count)
        } else {
            None
        };

        Ok(RemovalOutcome {
            previous_quorum,
            clamped_quorum,
        })
    }

    /// Set a new quorum within `[1, owner_count]`
    pub fn set_quorum(&mut self, quorum: u32) -> MultisigResult<()> {
        validate_quorum(quorum, self.owners.len())?;
        self.quorum = quorum;
        Ok(())
    }

    /// Check the registry invariant
    pub fn check_invariant(&self) -> bool {
        self.quorum >= 1 && (self.quorum as usize) <= self.owners.len()
    }
}

/// Reject an owner list containing duplicates or nothing at all
pub fn validate_owners(owners: &[Identity]) -> MultisigResult<()> {
    if owners.is_empty() {
        return Err(MultisigError::InvariantViolation(
            "owner set must not be empty".into(),
        ));
    }
    for (i, owner) in owners.iter().enumerate() {
        if owners[..i].contains(owner) {
            return Err(MultisigError::InvariantViolation(format!(
                "duplicate owner {}",
                owner
            )));
        }
    }
    Ok(())
}

/// Reject a quorum outside `[1, owner_count]`
pub fn validate_quorum(quorum: u32, owner_count: usize) -> MultisigResult<()> {
    if quorum == 0 || quorum as usize > owner_count {
        return Err(MultisigError::InvariantViolation(format!(
            "quorum {} outside [1, {}]",
            quorum, owner_count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<Identity> {
        names.iter().map(|n| Identity::new(*n)).collect()
    }

    #[test]
    fn test_new_registry() {
        let registry = OwnerRegistry::new(ids(&["a", "b"]), 2).unwrap();
        assert_eq!(registry.owner_count(), 2);
        assert_eq!(registry.quorum(), 2);
        assert_eq!(registry.owners(), ids(&["a", "b"]).as_slice());
        assert!(registry.is_owner(&Identity::new("a")));
        assert!(!registry.is_owner(&Identity::new("z")));
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(OwnerRegistry::new(ids(&["a", "b"]), 0).is_err());
        assert!(OwnerRegistry::new(ids(&["a", "b"]), 3).is_err());
        assert!(OwnerRegistry::new(ids(&["a", "a"]), 1).is_err());
        assert!(OwnerRegistry::new(Vec::new(), 1).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = serde_json::from_str::<OwnerRegistry>(r#"{"owners":["a","a"],"quorum":7}"#);
        assert!(bad.unwrap_err().to_string().contains("duplicate owner a"));

        let quorum = serde_json::from_str::<OwnerRegistry>(r#"{"owners":["a"],"quorum":0}"#);
        assert!(quorum.is_err());

        let registry = OwnerRegistry::new(ids(&["a", "b"]), 2).unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        let back: OwnerRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }

    #[test]
    fn test_add_owner_keeps_order() {
        let mut registry = OwnerRegistry::new(ids(&["a"]), 1).unwrap();
        registry.add_owner(Identity::new("c")).unwrap();
        registry.add_owner(Identity::new("b")).unwrap();
        assert_eq!(registry.owners(), ids(&["a", "c", "b"]).as_slice());
        assert_eq!(registry.quorum(), 1);
    }

    #[test]
    fn test_add_duplicate_owner() {
        let mut registry = OwnerRegistry::new(ids(&["a"]), 1).unwrap();
        let result = registry.add_owner(Identity::new("a"));
        assert!(matches!(result, Err(MultisigError::InvariantViolation(_))));
        assert_eq!(registry.owner_count(), 1);
    }

    #[test]
    fn test_remove_owner_clamps_quorum() {
        let mut registry = OwnerRegistry::new(ids(&["a", "b"]), 2).unwrap();
        let outcome = registry.remove_owner(&Identity::new("b")).unwrap();

        assert_eq!(outcome.previous_quorum, 2);
        assert_eq!(outcome.clamped_quorum, Some(1));
        assert_eq!(registry.quorum(), 1);
        assert_eq!(registry.owners(), ids(&["a"]).as_slice());
        assert!(registry.check_invariant());
    }

    #[test]
    fn test_remove_owner_without_clamp() {
        let mut registry = OwnerRegistry::new(ids(&["a", "b", "c"]), 2).unwrap();
        let outcome = registry.remove_owner(&Identity::new("a")).unwrap();
        assert_eq!(outcome.clamped_quorum, None);
        assert_eq!(registry.quorum(), 2);
        assert_eq!(registry.owners(), ids(&["b", "c"]).as_slice());
    }

    #[test]
    fn test_remove_missing_or_last_owner() {
        let mut registry = OwnerRegistry::new(ids(&["a"]), 1).unwrap();
        assert!(matches!(
            registry.remove_owner(&Identity::new("z")),
            Err(MultisigError::OwnerNotFound(_))
        ));
        assert!(matches!(
            registry.remove_owner(&Identity::new("a")),
            Err(MultisigError::InvariantViolation(_))
        ));
        assert_eq!(registry.owner_count(), 1);
    }

    #[test]
    fn test_set_quorum_bounds() {
        let mut registry = OwnerRegistry::new(ids(&["a", "b"]), 1).unwrap();
        registry.set_quorum(2).unwrap();
        assert_eq!(registry.quorum(), 2);

        // Same value again is fine
        registry.set_quorum(2).unwrap();

        assert!(registry.set_quorum(0).is_err());
        assert!(registry.set_quorum(3).is_err());
        assert_eq!(registry.quorum(), 2);
    }
}
