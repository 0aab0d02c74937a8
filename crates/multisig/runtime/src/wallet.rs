//! Multisig Wallet - one independent engine instance
//!
//! A wallet composes the owner registry, the action engine, the master
//! authority and the treasury, and keeps the notice journal they share.
//!
//! The two authority paths are exposed as separate capability traits:
//! [`QuorumGovernance`] for collective owner decisions and [`MasterControl`]
//! for the single-principal fast path. Neither is layered on the other.

use crate::action_engine::{ActionEngine, ExecutionContext};
use crate::asset::FungibleAsset;
use crate::master_authority::MasterAuthority;
use crate::treasury_manager::TreasuryManager;
use multisig_types::{
    ActionId, ActionKind, Amount, Identity, InstanceHandle, MultisigResult, Notice, NoticeJournal,
    OwnerRegistry, PendingAction,
};
use std::sync::Arc;
use tracing::info;

/// Collective, quorum-gated operations
pub trait QuorumGovernance {
    /// Submit an action; returns its id
    fn submit(
        &mut self,
        caller: &Identity,
        destination: Identity,
        value: Amount,
        kind: ActionKind,
    ) -> MultisigResult<ActionId>;

    /// Confirm an action as the caller
    fn confirm(&mut self, caller: &Identity, id: ActionId) -> MultisigResult<()>;

    /// Withdraw the caller's confirmation
    fn revoke(&mut self, caller: &Identity, id: ActionId) -> MultisigResult<()>;

    /// Execute an action that reached quorum; returns the notices it emitted
    fn execute(&mut self, caller: &Identity, id: ActionId) -> MultisigResult<Vec<Notice>>;
}

/// Single-principal operations of the master
pub trait MasterControl {
    fn change_master(&mut self, caller: &Identity, new_master: Identity) -> MultisigResult<()>;

    fn withdraw(
        &mut self,
        caller: &Identity,
        destination: &Identity,
        amount: Amount,
    ) -> MultisigResult<()>;
}

/// A quorum-governed wallet instance
pub struct MultisigWallet {
    handle: InstanceHandle,
    /// The handle as a principal, for the asset's spender checks
    principal: Identity,
    registry: OwnerRegistry,
    engine: ActionEngine,
    master: MasterAuthority,
    treasury: TreasuryManager,
    asset: Option<Arc<dyn FungibleAsset>>,
    journal: NoticeJournal,
}

impl MultisigWallet {
    /// Create a wallet; fails on duplicate owners or a quorum outside `[1, |owners|]`
    pub fn new(
        handle: InstanceHandle,
        master: Identity,
        owners: Vec<Identity>,
        quorum: u32,
    ) -> MultisigResult<Self> {
        let registry = OwnerRegistry::new(owners, quorum)?;

        info!(
            instance = %handle,
            master = %master,
            owners = registry.owner_count(),
            quorum,
            "Multisig wallet created"
        );

        Ok(Self {
            principal: handle.as_identity(),
            registry,
            engine: ActionEngine::new(handle.clone()),
            master: MasterAuthority::new(handle.clone(), master),
            treasury: TreasuryManager::new(handle.clone()),
            asset: None,
            journal: NoticeJournal::for_instance(&handle),
            handle,
        })
    }

    /// Attach the external fungible asset used by `SendFungibleAsset`
    pub fn with_asset(mut self, asset: Arc<dyn FungibleAsset>) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn set_asset(&mut self, asset: Option<Arc<dyn FungibleAsset>>) {
        self.asset = asset;
    }

    /// Credit the treasury; open to any caller
    pub fn deposit(&mut self, depositor: &Identity, amount: Amount) -> MultisigResult<()> {
        self.treasury.deposit(depositor, amount, &mut self.journal)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn handle(&self) -> &InstanceHandle {
        &self.handle
    }

    /// The wallet's own principal (spender on the external asset)
    pub fn principal(&self) -> &Identity {
        &self.principal
    }

    pub fn master(&self) -> &Identity {
        self.master.master()
    }

    /// Owners in insertion order
    pub fn owners(&self) -> &[Identity] {
        self.registry.owners()
    }

    pub fn is_owner(&self, identity: &Identity) -> bool {
        self.registry.is_owner(identity)
    }

    pub fn owner_count(&self) -> usize {
        self.registry.owner_count()
    }

    pub fn quorum(&self) -> u32 {
        self.registry.quorum()
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// Native treasury balance
    pub fn balance(&self) -> Amount {
        self.treasury.balance()
    }

    /// Native value paid out of this wallet to `recipient` so far
    pub fn credited_to(&self, recipient: &Identity) -> Amount {
        self.treasury.credited_to(recipient)
    }

    pub fn treasury(&self) -> &TreasuryManager {
        &self.treasury
    }

    pub fn asset(&self) -> Option<&Arc<dyn FungibleAsset>> {
        self.asset.as_ref()
    }

    pub fn action(&self, id: ActionId) -> Option<&PendingAction> {
        self.engine.action(id)
    }

    pub fn action_count(&self) -> usize {
        self.engine.action_count()
    }

    pub fn pending_actions(&self) -> Vec<&PendingAction> {
        self.engine.pending_actions()
    }

    pub fn executed_actions(&self) -> Vec<&PendingAction> {
        self.engine.executed_actions()
    }

    /// Confirmations from current owners
    pub fn confirmation_count(&self, id: ActionId) -> MultisigResult<usize> {
        self.engine.confirmation_count(id, &self.registry)
    }

    /// Whether `id` has reached quorum and is still open
    pub fn is_confirmed(&self, id: ActionId) -> bool {
        self.engine.is_confirmed(id, &self.registry)
    }

    pub fn journal(&self) -> &NoticeJournal {
        &self.journal
    }

    /// Every notice this wallet emitted, in order
    pub fn notices(&self) -> Vec<&Notice> {
        self.journal.notices()
    }
}

impl QuorumGovernance for MultisigWallet {
    fn submit(
        &mut self,
        caller: &Identity,
        destination: Identity,
        value: Amount,
        kind: ActionKind,
    ) -> MultisigResult<ActionId> {
        self.engine.submit(
            caller,
            destination,
            value,
            kind,
            &self.registry,
            &mut self.journal,
        )
    }

    fn confirm(&mut self, caller: &Identity, id: ActionId) -> MultisigResult<()> {
        self.engine
            .confirm(caller, id, &self.registry, &mut self.journal)
    }

    fn revoke(&mut self, caller: &Identity, id: ActionId) -> MultisigResult<()> {
        self.engine.revoke(caller, id, &mut self.journal)
    }

    fn execute(&mut self, caller: &Identity, id: ActionId) -> MultisigResult<Vec<Notice>> {
        let ctx = ExecutionContext {
            registry: &mut self.registry,
            treasury: &mut self.treasury,
            asset: self.asset.as_deref(),
            spender: &self.principal,
        };
        self.engine.execute(caller, id, ctx, &mut self.journal)
    }
}

impl MasterControl for MultisigWallet {
    fn change_master(&mut self, caller: &Identity, new_master: Identity) -> MultisigResult<()> {
        self.master
            .change_master(caller, new_master, &mut self.journal)
    }

    fn withdraw(
        &mut self,
        caller: &Identity,
        destination: &Identity,
        amount: Amount,
    ) -> MultisigResult<()> {
        self.master.withdraw(
            caller,
            destination,
            amount,
            &mut self.treasury,
            &mut self.journal,
        )
    }
}
