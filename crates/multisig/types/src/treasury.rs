//! Treasury types: native value held by a wallet instance
//!
//! The Treasury is a data structure, not an execution engine. It holds
//! the instance's native balance and mirrors what has been paid out to
//! each recipient, which is how the host's native transfers show up
//! from inside the instance.

use crate::{Amount, Identity, InstanceHandle, MultisigError, MultisigResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Types of treasury operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryOperation {
    /// Open deposit by any caller
    Deposit,
    /// Quorum-approved native payment
    Payout,
    /// Direct master withdrawal
    Withdrawal,
}

/// A receipt for a treasury operation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreasuryReceipt {
    /// Unique receipt identifier
    pub receipt_id: String,
    /// What operation was performed
    pub operation: TreasuryOperation,
    /// The other side of the movement (depositor or recipient)
    pub counterparty: Identity,
    /// Amount involved
    pub amount: Amount,
    /// When the operation occurred
    pub timestamp: DateTime<Utc>,
}

/// Native balance of one wallet instance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Treasury {
    /// The instance this treasury belongs to
    pub instance: InstanceHandle,
    /// Current native balance
    balance: Amount,
    /// Total paid out per recipient
    credits: BTreeMap<Identity, Amount>,
    /// Receipts log
    pub receipts: Vec<TreasuryReceipt>,
}

impl Treasury {
    pub fn new(instance: InstanceHandle) -> Self {
        Self {
            instance,
            balance: Amount::zero(),
            credits: BTreeMap::new(),
            receipts: Vec::new(),
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Total native value this treasury has paid to `recipient`
    pub fn credited_to(&self, recipient: &Identity) -> Amount {
        self.credits.get(recipient).copied().unwrap_or_default()
    }

    /// Credit the balance unconditionally
    pub fn deposit(&mut self, depositor: &Identity, amount: Amount) -> MultisigResult<()> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            MultisigError::InvariantViolation("treasury balance overflow".into())
        })?;
        self.emit_receipt(TreasuryOperation::Deposit, depositor.clone(), amount);
        Ok(())
    }

    /// Fail unless the balance covers `amount`
    pub fn ensure_available(&self, amount: Amount) -> MultisigResult<()> {
        if self.balance < amount {
            return Err(MultisigError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        Ok(())
    }

    /// Debit the balance and credit `recipient`
    pub fn pay(
        &mut self,
        recipient: &Identity,
        amount: Amount,
        operation: TreasuryOperation,
    ) -> MultisigResult<()> {
        self.ensure_available(amount)?;
        let credited = self
            .credited_to(recipient)
            .checked_add(amount)
            .ok_or_else(|| {
                MultisigError::InvariantViolation(format!("credit overflow for {}", recipient))
            })?;
        self.balance = Amount(self.balance.0 - amount.0);
        self.credits.insert(recipient.clone(), credited);
        self.emit_receipt(operation, recipient.clone(), amount);
        Ok(())
    }

    fn emit_receipt(&mut self, operation: TreasuryOperation, counterparty: Identity, amount: Amount) {
        self.receipts.push(TreasuryReceipt {
            receipt_id: uuid::Uuid::new_v4().to_string(),
            operation,
            counterparty,
            amount,
            timestamp: Utc::now(),
        });
    }
}
