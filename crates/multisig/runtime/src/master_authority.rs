//! Master Authority - the single-principal fast path
//!
//! The master is independent of the owner set: being an owner grants no
//! master rights and vice versa. Its operations bypass the action engine.

use crate::treasury_manager::TreasuryManager;
use multisig_types::{
    Amount, Identity, InstanceHandle, MultisigError, MultisigResult, Notice, NoticeJournal,
    TreasuryOperation,
};
use tracing::{info, warn};

/// Holds the current master and applies its direct operations
pub struct MasterAuthority {
    instance: InstanceHandle,
    master: Identity,
}

impl MasterAuthority {
    pub fn new(instance: InstanceHandle, master: Identity) -> Self {
        Self { instance, master }
    }

    pub fn master(&self) -> &Identity {
        &self.master
    }

    pub fn is_master(&self, identity: &Identity) -> bool {
        self.master == *identity
    }

    fn ensure_master(&self, caller: &Identity) -> MultisigResult<()> {
        if !self.is_master(caller) {
            warn!(
                instance = %self.instance,
                caller = %caller,
                "Rejected: caller is not the master"
            );
            return Err(MultisigError::not_master(caller));
        }
        Ok(())
    }

    /// Hand the master role to `new_master`
    pub fn change_master(
        &mut self,
        caller: &Identity,
        new_master: Identity,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<()> {
        self.ensure_master(caller)?;

        info!(
            instance = %self.instance,
            previous = %self.master,
            new_master = %new_master,
            "Master changed"
        );

        self.master = new_master.clone();
        journal.log(Notice::MasterChanged { new_master });
        Ok(())
    }

    /// Pay native value out of the treasury without quorum
    pub fn withdraw(
        &self,
        caller: &Identity,
        destination: &Identity,
        amount: Amount,
        treasury: &mut TreasuryManager,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<()> {
        self.ensure_master(caller)?;
        treasury.pay_out(destination, amount, TreasuryOperation::Withdrawal)?;

        info!(
            instance = %self.instance,
            destination = %destination,
            amount = amount.0,
            "Master withdrawal"
        );

        journal.log(Notice::Withdraw {
            destination: destination.clone(),
            amount,
        });
        Ok(())
    }
}
