//! Multisig Runtime
//!
//! This crate provides the runtime for quorum-governed wallets: a set of
//! owners jointly submits, confirms and executes sensitive actions, while a
//! single master keeps a narrow, quorum-independent fast path.
//!
//! # Architecture
//!
//! The [`MultisigWallet`] is the main entry point. It composes specialized
//! components, each handling one aspect of the wallet:
//!
//! - [`ActionEngine`] - Pending actions, confirmations and execution
//! - [`MasterAuthority`] - Master transfer and direct withdrawal
//! - [`TreasuryManager`] - Native balance with payment receipts
//! - [`FungibleAsset`] - The external transfer-with-allowance collaborator
//!
//! The [`InstanceFactory`] creates independent wallets and catalogs their
//! handles in creation order. [`DeploymentConfig`] and [`FactoryConfig`]
//! describe instances in TOML.
//!
//! # Key Invariants
//!
//! 1. `1 <= quorum <= owner_count` after every operation
//! 2. An action executes at most once
//! 3. Only confirmations from current owners count toward quorum
//! 4. A failed operation changes no state and emits no notice
//!
//! # Example
//!
//! ```rust
//! use multisig_runtime::{InstanceFactory, QuorumGovernance};
//! use multisig_types::{ActionKind, Amount, Identity};
//!
//! let mut factory = InstanceFactory::new(Identity::new("factory"));
//! let handle = factory
//!     .create_instance(
//!         &Identity::new("deployer"),
//!         vec![Identity::new("alice"), Identity::new("bob")],
//!         2,
//!     )
//!     .unwrap();
//!
//! let wallet = factory.instance_mut(&handle).unwrap();
//! wallet.deposit(&Identity::new("deployer"), Amount::new(10)).unwrap();
//!
//! let action = wallet
//!     .submit(&Identity::new("alice"), Identity::new("carol"), Amount::new(4), ActionKind::SendNative)
//!     .unwrap();
//! wallet.confirm(&Identity::new("alice"), action).unwrap();
//! wallet.confirm(&Identity::new("bob"), action).unwrap();
//! wallet.execute(&Identity::new("bob"), action).unwrap();
//!
//! assert_eq!(wallet.balance(), Amount::new(6));
//! ```

#![deny(unsafe_code)]

pub mod action_engine;
pub mod asset;
pub mod config;
pub mod factory;
pub mod master_authority;
pub mod treasury_manager;
pub mod wallet;

// Re-export main types for convenience
pub use action_engine::{ActionEngine, ExecutionContext};
pub use asset::{FungibleAsset, InMemoryAssetLedger};
pub use config::{DeploymentConfig, FactoryConfig};
pub use factory::InstanceFactory;
pub use master_authority::MasterAuthority;
pub use treasury_manager::TreasuryManager;
pub use wallet::{MasterControl, MultisigWallet, QuorumGovernance};
