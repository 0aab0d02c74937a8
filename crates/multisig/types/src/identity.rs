//! Identity and value primitives
//!
//! Principals are opaque, comparable handles. The engine never inspects
//! their contents; it only compares them.

use serde::{Deserialize, Serialize};

/// An opaque principal handle (owner, master, recipient or depositor)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Handle of a wallet instance created by a factory
///
/// Handles are derived deterministically from the factory's identity and
/// the creation sequence number, so two factories never collide and the
/// same factory never hands out the same handle twice.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceHandle(pub String);

impl InstanceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the handle for the `sequence`-th instance of `factory`
    pub fn derive(factory: &Identity, sequence: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"multisig-instance-v1:");
        hasher.update(factory.0.as_bytes());
        hasher.update(&sequence.to_le_bytes());
        let digest = hasher.finalize();
        Self(format!("ms-{}", &digest.to_hex()[..40]))
    }

    /// The handle doubles as the instance's own principal, e.g. as the
    /// spender on an external asset ledger.
    pub fn as_identity(&self) -> Identity {
        Identity(self.0.clone())
    }
}

impl std::fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative quantity of value (native or fungible asset)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let id = Identity::new("owner-1");
        assert_eq!(format!("{}", id), "owner-1");
        assert_eq!(id, Identity::from("owner-1"));
    }

    #[test]
    fn test_instance_handle_derivation() {
        let factory = Identity::new("factory-1");
        let first = InstanceHandle::derive(&factory, 0);
        let second = InstanceHandle::derive(&factory, 1);

        assert_ne!(first, second);
        assert_eq!(first, InstanceHandle::derive(&factory, 0));
        assert!(first.0.starts_with("ms-"));
        assert_eq!(first.0.len(), 43);

        let other = InstanceHandle::derive(&Identity::new("factory-2"), 0);
        assert_ne!(first, other);
    }

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::new(10);
        assert_eq!(a.checked_sub(Amount::new(4)), Some(Amount::new(6)));
        assert_eq!(a.checked_sub(Amount::new(11)), None);
        assert_eq!(Amount::new(u64::MAX).checked_add(Amount::new(1)), None);
        assert!(Amount::zero().is_zero());
    }

    #[test]
    fn test_amount_serializes_transparently() {
        let json = serde_json::to_string(&Amount::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
