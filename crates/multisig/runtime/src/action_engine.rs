//! Action Engine - quorum-gated submission, confirmation and execution
//!
//! The engine owns every pending action of one wallet instance and is the
//! only writer of the owner registry. An action executes once its
//! confirmations from *current* owners reach quorum, and at most once.
//!
//! Execution is all-or-nothing: every precondition of the kind's handler
//! is checked before anything mutates, the external asset call is the
//! last fallible step, and the action is marked executed only after its
//! effect has been applied. Notices are buffered and journaled together.

use crate::asset::FungibleAsset;
use crate::treasury_manager::TreasuryManager;
use multisig_types::{
    ActionId, ActionKind, Amount, Identity, InstanceHandle, MultisigError, MultisigResult, Notice,
    NoticeJournal, OwnerRegistry, PendingAction, TreasuryOperation,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Everything an execution may touch besides the action itself
pub struct ExecutionContext<'a> {
    pub registry: &'a mut OwnerRegistry,
    pub treasury: &'a mut TreasuryManager,
    pub asset: Option<&'a dyn FungibleAsset>,
    /// The wallet's own principal, used as spender on the asset
    pub spender: &'a Identity,
}

/// The Action Engine - coordinates quorum approval and execution
pub struct ActionEngine {
    /// Instance handle for logs
    instance: InstanceHandle,
    /// All actions ever submitted, by id
    actions: BTreeMap<ActionId, PendingAction>,
    /// Next id to hand out; never reused
    next_id: u64,
}

impl ActionEngine {
    pub fn new(instance: InstanceHandle) -> Self {
        Self {
            instance,
            actions: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Submit a new action; the submitter is not implicitly a confirmer
    pub fn submit(
        &mut self,
        caller: &Identity,
        destination: Identity,
        value: Amount,
        kind: ActionKind,
        registry: &OwnerRegistry,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<ActionId> {
        ensure_owner(registry, caller)?;

        let id = ActionId::new(self.next_id);
        self.next_id += 1;

        let action = PendingAction::new(id, kind, destination, value, caller.clone());
        let content_hash = action.content_hash;

        info!(
            instance = %self.instance,
            action_id = %id,
            kind = %kind,
            destination = %action.destination,
            value = value.0,
            submitter = %caller,
            "Action submitted"
        );

        self.actions.insert(id, action);
        journal.log(Notice::Submission { content_hash, id });

        Ok(id)
    }

    /// Add the caller's confirmation
    pub fn confirm(
        &mut self,
        caller: &Identity,
        id: ActionId,
        registry: &OwnerRegistry,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<()> {
        let action = self
            .actions
            .get_mut(&id)
            .ok_or(MultisigError::ActionNotFound(id))?;
        action.ensure_open()?;
        ensure_owner(registry, caller)?;

        action.confirm(caller.clone())?;

        debug!(
            instance = %self.instance,
            action_id = %id,
            confirmer = %caller,
            confirmations = action.effective_confirmations(registry),
            quorum = registry.quorum(),
            "Action confirmed"
        );

        journal.log(Notice::Confirmation {
            id,
            confirmer: caller.clone(),
        });

        Ok(())
    }

    /// Withdraw the caller's confirmation; allowed any time before execution
    pub fn revoke(
        &mut self,
        caller: &Identity,
        id: ActionId,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<()> {
        let action = self
            .actions
            .get_mut(&id)
            .ok_or(MultisigError::ActionNotFound(id))?;

        action.revoke(caller)?;

        info!(
            instance = %self.instance,
            action_id = %id,
            revoker = %caller,
            "Confirmation revoked"
        );

        journal.log(Notice::Revocation {
            id,
            revoker: caller.clone(),
        });

        Ok(())
    }

    /// Execute an action whose quorum is met, returning the notices it emitted
    pub fn execute(
        &mut self,
        caller: &Identity,
        id: ActionId,
        ctx: ExecutionContext<'_>,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<Vec<Notice>> {
        let action = self
            .actions
            .get(&id)
            .ok_or(MultisigError::ActionNotFound(id))?;
        action.ensure_open()?;
        ensure_owner(ctx.registry, caller)?;

        let current = action.effective_confirmations(ctx.registry) as u32;
        let required = ctx.registry.quorum();
        if current < required {
            warn!(
                instance = %self.instance,
                action_id = %id,
                current,
                required,
                "Execution refused: quorum not reached"
            );
            return Err(MultisigError::QuorumNotReached {
                action: id,
                required,
                current,
            });
        }

        let notices = match action.kind {
            ActionKind::AddOwner => execute_add_owner(ctx.registry, &action.destination)?,
            ActionKind::RemoveOwner => execute_remove_owner(ctx.registry, &action.destination)?,
            ActionKind::ChangeQuorum => execute_change_quorum(ctx.registry, action.value)?,
            ActionKind::SendNative => {
                execute_send_native(ctx.treasury, &action.destination, action.value)?
            }
            ActionKind::SendFungibleAsset => execute_send_fungible_asset(
                ctx.asset,
                ctx.spender,
                &action.submitter,
                &action.destination,
                action.value,
            )?,
        };

        // Effect applied; the action can no longer fail
        let action = self
            .actions
            .get_mut(&id)
            .ok_or(MultisigError::ActionNotFound(id))?;
        action.mark_executed()?;

        info!(
            instance = %self.instance,
            action_id = %id,
            kind = %action.kind,
            administrative = action.kind.is_administrative(),
            executor = %caller,
            "Action executed"
        );

        journal.log_all(notices.iter().cloned());
        Ok(notices)
    }

    // --- Query methods ---

    /// Get an action by id
    pub fn action(&self, id: ActionId) -> Option<&PendingAction> {
        self.actions.get(&id)
    }

    /// Number of actions ever submitted
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Actions not yet executed, in id order
    pub fn pending_actions(&self) -> Vec<&PendingAction> {
        self.actions.values().filter(|a| !a.executed).collect()
    }

    /// Executed actions, in id order
    pub fn executed_actions(&self) -> Vec<&PendingAction> {
        self.actions.values().filter(|a| a.executed).collect()
    }

    /// Confirmations that count toward quorum
    pub fn confirmation_count(&self, id: ActionId, registry: &OwnerRegistry) -> MultisigResult<usize> {
        self.actions
            .get(&id)
            .map(|a| a.effective_confirmations(registry))
            .ok_or(MultisigError::ActionNotFound(id))
    }

    /// Whether the action could be executed right now
    pub fn is_confirmed(&self, id: ActionId, registry: &OwnerRegistry) -> bool {
        self.actions
            .get(&id)
            .map(|a| a.is_executable(registry))
            .unwrap_or(false)
    }
}

fn ensure_owner(registry: &OwnerRegistry, caller: &Identity) -> MultisigResult<()> {
    if !registry.is_owner(caller) {
        warn!(caller = %caller, "Rejected: caller is not an owner");
        return Err(MultisigError::not_owner(caller));
    }
    Ok(())
}

// --- Handlers, one per action kind ---

fn execute_add_owner(registry: &mut OwnerRegistry, owner: &Identity) -> MultisigResult<Vec<Notice>> {
    registry.add_owner(owner.clone())?;
    info!(owner = %owner, owners = registry.owner_count(), "Owner added");
    Ok(vec![Notice::OwnerAddition {
        owner: owner.clone(),
    }])
}

fn execute_remove_owner(
    registry: &mut OwnerRegistry,
    owner: &Identity,
) -> MultisigResult<Vec<Notice>> {
    let outcome = registry.remove_owner(owner)?;
    info!(owner = %owner, owners = registry.owner_count(), "Owner removed");

    let mut notices = Vec::with_capacity(2);
    if let Some(new_quorum) = outcome.clamped_quorum {
        warn!(
            previous = outcome.previous_quorum,
            new_quorum, "Quorum clamped to owner count"
        );
        notices.push(Notice::QuorumChanged { new_quorum });
    }
    notices.push(Notice::OwnerRemoval {
        owner: owner.clone(),
    });
    Ok(notices)
}

fn execute_change_quorum(registry: &mut OwnerRegistry, value: Amount) -> MultisigResult<Vec<Notice>> {
    let new_quorum = u32::try_from(value.0).map_err(|_| {
        MultisigError::InvariantViolation(format!("quorum {} out of range", value))
    })?;
    registry.set_quorum(new_quorum)?;
    info!(new_quorum, "Quorum changed");
    Ok(vec![Notice::QuorumChanged { new_quorum }])
}

fn execute_send_native(
    treasury: &mut TreasuryManager,
    destination: &Identity,
    amount: Amount,
) -> MultisigResult<Vec<Notice>> {
    treasury.pay_out(destination, amount, TreasuryOperation::Payout)?;
    Ok(vec![Notice::ExecutionNative { amount }])
}

fn execute_send_fungible_asset(
    asset: Option<&dyn FungibleAsset>,
    spender: &Identity,
    holder: &Identity,
    destination: &Identity,
    amount: Amount,
) -> MultisigResult<Vec<Notice>> {
    let asset = asset.ok_or_else(|| {
        MultisigError::ExternalCallFailure("no fungible asset attached to this instance".into())
    })?;

    let allowance = asset.allowance(holder, spender).map_err(external_failure)?;
    if allowance < amount {
        warn!(asset = asset.symbol(), holder = %holder, allowance = allowance.0, amount = amount.0, "Asset allowance too low");
        return Err(MultisigError::InsufficientFunds {
            required: amount,
            available: allowance,
        });
    }
    let balance = asset.balance_of(holder).map_err(external_failure)?;
    if balance < amount {
        warn!(asset = asset.symbol(), holder = %holder, balance = balance.0, amount = amount.0, "Asset balance too low");
        return Err(MultisigError::InsufficientFunds {
            required: amount,
            available: balance,
        });
    }

    asset
        .transfer_from(spender, holder, destination, amount)
        .map_err(external_failure)?;

    Ok(vec![Notice::ExecutionFungibleAsset { amount }])
}

/// Any error raised by the asset surfaces as an external call failure
fn external_failure(err: MultisigError) -> MultisigError {
    match err {
        MultisigError::ExternalCallFailure(_) => err,
        other => MultisigError::ExternalCallFailure(other.to_string()),
    }
}
