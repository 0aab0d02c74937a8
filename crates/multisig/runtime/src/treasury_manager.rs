//! Treasury Manager - native value operations for a wallet instance
//!
//! Deposits are open to anyone. Debits are crate-internal: only quorum
//! execution and the master authority reach them.

use multisig_types::{
    Amount, Identity, InstanceHandle, MultisigResult, Notice, NoticeJournal, Treasury,
    TreasuryOperation,
};
use tracing::{info, warn};

/// Manages the native treasury with an audit trail
pub struct TreasuryManager {
    /// The underlying treasury
    treasury: Treasury,
}

impl TreasuryManager {
    /// Create a new treasury manager with an empty treasury
    pub fn new(instance: InstanceHandle) -> Self {
        Self {
            treasury: Treasury::new(instance),
        }
    }

    /// Credit the treasury; open to any caller
    pub fn deposit(
        &mut self,
        depositor: &Identity,
        amount: Amount,
        journal: &mut NoticeJournal,
    ) -> MultisigResult<()> {
        self.treasury.deposit(depositor, amount)?;

        info!(
            instance = %self.treasury.instance,
            depositor = %depositor,
            amount = amount.0,
            balance = self.treasury.balance().0,
            "Deposit completed"
        );

        journal.log(Notice::Deposit {
            depositor: depositor.clone(),
            amount,
        });

        Ok(())
    }

    // --- Internal debit primitives ---

    pub(crate) fn ensure_available(&self, amount: Amount) -> MultisigResult<()> {
        self.treasury.ensure_available(amount).map_err(|e| {
            warn!(
                instance = %self.treasury.instance,
                required = amount.0,
                available = self.treasury.balance().0,
                "Insufficient treasury balance"
            );
            e
        })
    }

    pub(crate) fn pay_out(
        &mut self,
        recipient: &Identity,
        amount: Amount,
        operation: TreasuryOperation,
    ) -> MultisigResult<()> {
        self.ensure_available(amount)?;
        self.treasury.pay(recipient, amount, operation)?;

        info!(
            instance = %self.treasury.instance,
            recipient = %recipient,
            amount = amount.0,
            operation = ?operation,
            "Native payment completed"
        );

        Ok(())
    }

    // --- Query methods ---

    pub fn balance(&self) -> Amount {
        self.treasury.balance()
    }

    /// Total native value paid to `recipient` so far
    pub fn credited_to(&self, recipient: &Identity) -> Amount {
        self.treasury.credited_to(recipient)
    }

    /// Get the underlying treasury
    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisig_types::MultisigError;

    fn setup() -> (TreasuryManager, NoticeJournal) {
        let handle = InstanceHandle::new("ms-test");
        (
            TreasuryManager::new(handle.clone()),
            NoticeJournal::for_instance(&handle),
        )
    }

    #[test]
    fn test_deposit_emits_notice() {
        let (mut manager, mut journal) = setup();
        manager
            .deposit(&Identity::new("anyone"), Amount::new(10), &mut journal)
            .unwrap();

        assert_eq!(manager.balance(), Amount::new(10));
        assert_eq!(
            journal.last(),
            Some(&Notice::Deposit {
                depositor: Identity::new("anyone"),
                amount: Amount::new(10),
            })
        );
    }

    #[test]
    fn test_pay_out() {
        let (mut manager, mut journal) = setup();
        manager
            .deposit(&Identity::new("d"), Amount::new(10), &mut journal)
            .unwrap();
        manager
            .pay_out(&Identity::new("r"), Amount::new(10), TreasuryOperation::Payout)
            .unwrap();

        assert_eq!(manager.balance(), Amount::zero());
        assert_eq!(manager.credited_to(&Identity::new("r")), Amount::new(10));
        assert_eq!(manager.treasury().receipts.len(), 2);
    }

    #[test]
    fn test_pay_out_insufficient() {
        let (mut manager, _journal) = setup();
        let result = manager.pay_out(&Identity::new("r"), Amount::new(1), TreasuryOperation::Withdrawal);
        assert!(matches!(
            result,
            Err(MultisigError::InsufficientFunds { .. })
        ));
        assert!(manager.treasury().receipts.is_empty());
    }
}
