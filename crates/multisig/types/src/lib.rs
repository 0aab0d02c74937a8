//! Multisig Domain Types
//!
//! This crate defines the domain types for quorum-governed wallets:
//! a set of owners jointly authorizes sensitive actions with an M-of-N
//! confirmation scheme, while a single master holds a narrow,
//! quorum-independent fast path.
//!
//! # Key Concepts
//!
//! - **Owner registry**: the ordered owner set and the quorum, with the
//!   invariant `1 <= quorum <= owner_count` enforced on every mutation.
//! - **Pending actions**: submitted requests (`AddOwner`, `RemoveOwner`,
//!   `ChangeQuorum`, `SendNative`, `SendFungibleAsset`) that collect
//!   confirmations and execute at most once.
//! - **Treasury**: the native balance of one instance.
//! - **Notices**: the observable record of every accepted operation.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. Behaviour
//! that needs authorization lives in `multisig-runtime`.

#![deny(unsafe_code)]

mod action;
mod errors;
mod identity;
mod notice;
mod registry;
mod treasury;

pub use action::*;
pub use errors::*;
pub use identity::*;
pub use notice::*;
pub use registry::*;
pub use treasury::*;
