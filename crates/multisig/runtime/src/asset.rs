//! External fungible asset - the transfer-with-allowance collaborator
//!
//! The wallet never reimplements token semantics. It asks the asset for
//! balances and allowances and invokes `transfer_from`, propagating any
//! rejection as its own execution failure.

use multisig_types::{Amount, Identity, MultisigError, MultisigResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Capability surface of an external fungible asset
///
/// Implementations own their state; wallets only hold a shared handle,
/// so methods take `&self`.
pub trait FungibleAsset: Send + Sync {
    /// Ticker or short name, for logs
    fn symbol(&self) -> &str;

    /// Units held by `holder`
    fn balance_of(&self, holder: &Identity) -> MultisigResult<Amount>;

    /// Units `spender` may move out of `owner`'s holdings
    fn allowance(&self, owner: &Identity, spender: &Identity) -> MultisigResult<Amount>;

    /// Move `amount` from `owner` to `to`, spending `spender`'s allowance
    fn transfer_from(
        &self,
        spender: &Identity,
        owner: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> MultisigResult<()>;
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Identity, Amount>,
    allowances: HashMap<(Identity, Identity), Amount>,
    frozen: bool,
}

/// In-memory fungible asset with balances and allowances
///
/// Stands in for the external token in tests and the CLI. `freeze` makes
/// every transfer fail, which is how callers observe external rejections.
pub struct InMemoryAssetLedger {
    symbol: String,
    state: Mutex<LedgerState>,
}

impl InMemoryAssetLedger {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn lock(&self) -> MultisigResult<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| MultisigError::ExternalCallFailure(format!("{} ledger poisoned", self.symbol)))
    }

    /// Create `amount` new units for `holder`
    pub fn mint(&self, holder: &Identity, amount: Amount) -> MultisigResult<()> {
        let mut state = self.lock()?;
        let balance = state.balances.entry(holder.clone()).or_default();
        *balance = balance.checked_add(amount).ok_or_else(|| {
            MultisigError::ExternalCallFailure(format!("{} balance overflow", self.symbol))
        })?;
        info!(asset = %self.symbol, holder = %holder, amount = amount.0, "Asset minted");
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s units (replaces any prior allowance)
    pub fn approve(&self, owner: &Identity, spender: &Identity, amount: Amount) -> MultisigResult<()> {
        let mut state = self.lock()?;
        state
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
        debug!(asset = %self.symbol, owner = %owner, spender = %spender, amount = amount.0, "Allowance set");
        Ok(())
    }

    /// Reject (or accept again) all transfers
    pub fn set_frozen(&self, frozen: bool) -> MultisigResult<()> {
        self.lock()?.frozen = frozen;
        Ok(())
    }
}

impl FungibleAsset for InMemoryAssetLedger {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, holder: &Identity) -> MultisigResult<Amount> {
        let state = self.lock()?;
        Ok(state.balances.get(holder).copied().unwrap_or_default())
    }

    fn allowance(&self, owner: &Identity, spender: &Identity) -> MultisigResult<Amount> {
        let state = self.lock()?;
        Ok(state
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default())
    }

    fn transfer_from(
        &self,
        spender: &Identity,
        owner: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> MultisigResult<()> {
        let mut state = self.lock()?;

        if state.frozen {
            warn!(asset = %self.symbol, "Transfer rejected: ledger frozen");
            return Err(MultisigError::ExternalCallFailure(format!(
                "{} transfers are frozen",
                self.symbol
            )));
        }

        let key = (owner.clone(), spender.clone());
        let allowance = state.allowances.get(&key).copied().unwrap_or_default();
        let remaining_allowance = allowance.checked_sub(amount).ok_or_else(|| {
            MultisigError::ExternalCallFailure(format!(
                "{} allowance {} below {}",
                self.symbol, allowance, amount
            ))
        })?;

        let balance = state.balances.get(owner).copied().unwrap_or_default();
        let remaining_balance = balance.checked_sub(amount).ok_or_else(|| {
            MultisigError::ExternalCallFailure(format!(
                "{} balance {} below {}",
                self.symbol, balance, amount
            ))
        })?;

        // Self-transfers only spend allowance
        if to != owner {
            let credited = state
                .balances
                .get(to)
                .copied()
                .unwrap_or_default()
                .checked_add(amount)
                .ok_or_else(|| {
                    MultisigError::ExternalCallFailure(format!("{} balance overflow", self.symbol))
                })?;
            state.balances.insert(owner.clone(), remaining_balance);
            state.balances.insert(to.clone(), credited);
        }
        state.allowances.insert(key, remaining_allowance);

        info!(
            asset = %self.symbol,
            from = %owner,
            to = %to,
            amount = amount.0,
            "Asset transferred"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    #[test]
    fn test_mint_and_approve() {
        let ledger = InMemoryAssetLedger::new("MTK");
        ledger.mint(&id("alice"), Amount::new(100)).unwrap();
        ledger.approve(&id("alice"), &id("wallet"), Amount::new(40)).unwrap();

        assert_eq!(ledger.balance_of(&id("alice")).unwrap(), Amount::new(100));
        assert_eq!(ledger.allowance(&id("alice"), &id("wallet")).unwrap(), Amount::new(40));
        assert_eq!(ledger.allowance(&id("wallet"), &id("alice")).unwrap(), Amount::zero());
        assert_eq!(ledger.symbol(), "MTK");
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let ledger = InMemoryAssetLedger::new("MTK");
        ledger.mint(&id("alice"), Amount::new(100)).unwrap();
        ledger.approve(&id("alice"), &id("wallet"), Amount::new(40)).unwrap();

        ledger
            .transfer_from(&id("wallet"), &id("alice"), &id("bob"), Amount::new(30))
            .unwrap();

        assert_eq!(ledger.balance_of(&id("alice")).unwrap(), Amount::new(70));
        assert_eq!(ledger.balance_of(&id("bob")).unwrap(), Amount::new(30));
        assert_eq!(ledger.allowance(&id("alice"), &id("wallet")).unwrap(), Amount::new(10));
    }

    #[test]
    fn test_transfer_beyond_allowance_fails_cleanly() {
        let ledger = InMemoryAssetLedger::new("MTK");
        ledger.mint(&id("alice"), Amount::new(100)).unwrap();
        ledger.approve(&id("alice"), &id("wallet"), Amount::new(5)).unwrap();

        let result = ledger.transfer_from(&id("wallet"), &id("alice"), &id("bob"), Amount::new(6));
        assert!(matches!(result, Err(MultisigError::ExternalCallFailure(_))));
        assert_eq!(ledger.balance_of(&id("alice")).unwrap(), Amount::new(100));
        assert_eq!(ledger.balance_of(&id("bob")).unwrap(), Amount::zero());
    }

    #[test]
    fn test_transfer_beyond_balance_fails() {
        let ledger = InMemoryAssetLedger::new("MTK");
        ledger.mint(&id("alice"), Amount::new(3)).unwrap();
        ledger.approve(&id("alice"), &id("wallet"), Amount::new(50)).unwrap();

        let result = ledger.transfer_from(&id("wallet"), &id("alice"), &id("bob"), Amount::new(4));
        assert!(result.is_err());
        assert_eq!(ledger.allowance(&id("alice"), &id("wallet")).unwrap(), Amount::new(50));
    }

    #[test]
    fn test_frozen_ledger_rejects() {
        let ledger = InMemoryAssetLedger::new("MTK");
        ledger.mint(&id("alice"), Amount::new(10)).unwrap();
        ledger.approve(&id("alice"), &id("wallet"), Amount::new(10)).unwrap();
        ledger.set_frozen(true).unwrap();

        let result = ledger.transfer_from(&id("wallet"), &id("alice"), &id("bob"), Amount::new(1));
        assert!(matches!(result, Err(MultisigError::ExternalCallFailure(_))));

        ledger.set_frozen(false).unwrap();
        ledger
            .transfer_from(&id("wallet"), &id("alice"), &id("bob"), Amount::new(1))
            .unwrap();
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let ledger = InMemoryAssetLedger::new("MTK");
        ledger.mint(&id("alice"), Amount::new(10)).unwrap();
        ledger.approve(&id("alice"), &id("wallet"), Amount::new(10)).unwrap();
        ledger
            .transfer_from(&id("wallet"), &id("alice"), &id("alice"), Amount::new(4))
            .unwrap();
        assert_eq!(ledger.balance_of(&id("alice")).unwrap(), Amount::new(10));
        assert_eq!(ledger.allowance(&id("alice"), &id("wallet")).unwrap(), Amount::new(6));
    }

    #[test]
    fn test_poisoned_ledger_reports_external_failure() {
        let ledger = std::sync::Arc::new(InMemoryAssetLedger::new("MTK"));
        ledger.mint(&id("alice"), Amount::new(10)).unwrap();

        let poisoner = ledger.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the ledger");
        })
        .join();
        assert!(joined.is_err());

        assert!(matches!(
            ledger.balance_of(&id("alice")),
            Err(MultisigError::ExternalCallFailure(_))
        ));
        assert!(matches!(
            ledger.allowance(&id("alice"), &id("wallet")),
            Err(MultisigError::ExternalCallFailure(_))
        ));
    }
}
