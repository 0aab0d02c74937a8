//! Instance Factory - creates and catalogs independent wallets
//!
//! The registry of handles is append-only and ordered by creation. Each
//! wallet owns all of its state; the only thing instances may share is a
//! handle to the external fungible asset, which holds its own state.

use crate::asset::FungibleAsset;
use crate::config::DeploymentConfig;
use crate::wallet::MultisigWallet;
use multisig_types::{
    Identity, InstanceHandle, MultisigError, MultisigResult, Notice, NoticeJournal,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Creates wallet instances and keeps them addressable by handle
pub struct InstanceFactory {
    /// Factory identity, the seed for derived handles
    id: Identity,
    /// Handles in creation order
    handles: Vec<InstanceHandle>,
    instances: HashMap<InstanceHandle, MultisigWallet>,
    /// Asset attached to every new instance
    asset: Option<Arc<dyn FungibleAsset>>,
    journal: NoticeJournal,
}

impl InstanceFactory {
    pub fn new(id: Identity) -> Self {
        let journal = NoticeJournal::new(format!("factory:{}", id));
        Self {
            id,
            handles: Vec::new(),
            instances: HashMap::new(),
            asset: None,
            journal,
        }
    }

    /// Attach the fungible asset every subsequently created instance will use
    pub fn with_asset(mut self, asset: Arc<dyn FungibleAsset>) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn id(&self) -> &Identity {
        &self.id
    }

    /// Create an instance whose master is the creating caller
    pub fn create_instance(
        &mut self,
        creator: &Identity,
        owners: Vec<Identity>,
        quorum: u32,
    ) -> MultisigResult<InstanceHandle> {
        self.spawn(creator.clone(), owners, quorum)
    }

    /// Create an instance from a deployment, crediting its initial deposit
    pub fn create_instance_with_master(
        &mut self,
        config: &DeploymentConfig,
    ) -> MultisigResult<InstanceHandle> {
        config.validate()?;
        let handle = self.spawn(config.master.clone(), config.owners.clone(), config.quorum)?;

        if let Some(amount) = config.initial_deposit.filter(|a| !a.is_zero()) {
            let master = config.master.clone();
            self.instance_mut(&handle)?.deposit(&master, amount)?;
        }

        Ok(handle)
    }

    fn spawn(
        &mut self,
        master: Identity,
        owners: Vec<Identity>,
        quorum: u32,
    ) -> MultisigResult<InstanceHandle> {
        let handle = InstanceHandle::derive(&self.id, self.handles.len() as u64);
        let mut wallet = MultisigWallet::new(handle.clone(), master, owners, quorum)?;
        wallet.set_asset(self.asset.clone());

        self.handles.push(handle.clone());
        self.instances.insert(handle.clone(), wallet);

        info!(
            factory = %self.id,
            instance = %handle,
            index = self.handles.len() - 1,
            quorum,
            "Instance created"
        );

        self.journal.log_all([
            Notice::ContractInstantiation {
                handle: handle.clone(),
            },
            Notice::InstanceCreation {
                handle: handle.clone(),
            },
        ]);

        Ok(handle)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Number of instances created
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// All handles in creation order
    pub fn list_instances(&self) -> &[InstanceHandle] {
        &self.handles
    }

    pub fn instance(&self, handle: &InstanceHandle) -> MultisigResult<&MultisigWallet> {
        self.instances
            .get(handle)
            .ok_or_else(|| MultisigError::InstanceNotFound(handle.clone()))
    }

    pub fn instance_mut(&mut self, handle: &InstanceHandle) -> MultisigResult<&mut MultisigWallet> {
        self.instances
            .get_mut(handle)
            .ok_or_else(|| MultisigError::InstanceNotFound(handle.clone()))
    }

    /// The instance created `index`-th (zero based)
    pub fn instance_at(&self, index: usize) -> Option<&MultisigWallet> {
        self.handles
            .get(index)
            .and_then(|handle| self.instances.get(handle))
    }

    pub fn journal(&self) -> &NoticeJournal {
        &self.journal
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.journal.notices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{MasterControl, QuorumGovernance};
    use multisig_types::{ActionKind, Amount};

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    #[test]
    fn test_create_instance_emits_notices_in_order() {
        let mut factory = InstanceFactory::new(id("factory"));
        let handle = factory
            .create_instance(&id("deployer"), vec![id("a"), id("b")], 2)
            .unwrap();

        assert_eq!(factory.count(), 1);
        assert_eq!(factory.list_instances(), &[handle.clone()]);
        assert_eq!(
            factory.notices(),
            vec![
                &Notice::ContractInstantiation {
                    handle: handle.clone()
                },
                &Notice::InstanceCreation {
                    handle: handle.clone()
                },
            ]
        );

        let wallet = factory.instance(&handle).unwrap();
        assert_eq!(wallet.master(), &id("deployer"));
        assert_eq!(wallet.quorum(), 2);
        assert_eq!(wallet.handle(), &handle);
    }

    #[test]
    fn test_invalid_instance_not_registered() {
        let mut factory = InstanceFactory::new(id("factory"));
        assert!(factory.create_instance(&id("d"), vec![id("a")], 2).is_err());
        assert!(factory
            .create_instance(&id("d"), vec![id("a"), id("a")], 1)
            .is_err());
        assert!(factory.create_instance(&id("d"), vec![], 1).is_err());

        assert_eq!(factory.count(), 0);
        assert!(factory.notices().is_empty());
    }

    #[test]
    fn test_handles_are_distinct() {
        let mut factory = InstanceFactory::new(id("factory"));
        let first = factory.create_instance(&id("d"), vec![id("a")], 1).unwrap();
        let second = factory.create_instance(&id("d"), vec![id("a")], 1).unwrap();

        assert_ne!(first, second);
        assert_eq!(factory.count(), 2);
        assert_eq!(factory.list_instances(), &[first.clone(), second.clone()]);
        assert_eq!(factory.instance_at(1).unwrap().handle(), &second);
        assert!(factory.instance_at(2).is_none());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut factory = InstanceFactory::new(id("factory"));
        let first = factory
            .create_instance(&id("d"), vec![id("a"), id("b")], 1)
            .unwrap();
        let second = factory
            .create_instance(&id("d"), vec![id("a"), id("b")], 1)
            .unwrap();

        {
            let wallet = factory.instance_mut(&first).unwrap();
            wallet.deposit(&id("d"), Amount::new(50)).unwrap();
            let action = wallet
                .submit(&id("a"), id("c"), Amount::zero(), ActionKind::AddOwner)
                .unwrap();
            wallet.confirm(&id("a"), action).unwrap();
            wallet.execute(&id("a"), action).unwrap();
            wallet.change_master(&id("d"), id("a")).unwrap();
        }

        let untouched = factory.instance(&second).unwrap();
        assert_eq!(untouched.owner_count(), 2);
        assert_eq!(untouched.balance(), Amount::zero());
        assert_eq!(untouched.master(), &id("d"));
        assert_eq!(untouched.action_count(), 0);
        assert!(untouched.notices().is_empty());

        let changed = factory.instance(&first).unwrap();
        assert_eq!(changed.owner_count(), 3);
        assert_eq!(changed.balance(), Amount::new(50));
    }

    #[test]
    fn test_create_with_master_and_deposit() {
        let mut factory = InstanceFactory::new(id("factory"));
        let mut config = DeploymentConfig::new(id("treasurer"), vec![id("a"), id("b")], 2);
        config.initial_deposit = Some(Amount::new(25));

        let handle = factory.create_instance_with_master(&config).unwrap();
        let wallet = factory.instance(&handle).unwrap();
        assert_eq!(wallet.master(), &id("treasurer"));
        assert_eq!(wallet.balance(), Amount::new(25));
        assert_eq!(wallet.notices().len(), 1);
    }

    #[test]
    fn test_unknown_handle() {
        let mut factory = InstanceFactory::new(id("factory"));
        let missing = InstanceHandle::new("ms-missing");
        assert!(matches!(
            factory.instance(&missing),
            Err(MultisigError::InstanceNotFound(_))
        ));
        assert!(factory.instance_mut(&missing).is_err());
    }
}
