//! CLI commands

pub mod deploy;
pub mod run;

use colored::Colorize;
use multisig_runtime::MultisigWallet;
use multisig_types::{Amount, Identity, InstanceHandle};
use serde::Serialize;

/// Snapshot of one instance for display
#[derive(Debug, Serialize)]
pub struct InstanceSummary {
    pub handle: InstanceHandle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub master: Identity,
    pub owners: Vec<Identity>,
    pub quorum: u32,
    pub balance: Amount,
    pub actions: usize,
    pub pending: usize,
}

impl InstanceSummary {
    pub fn of(wallet: &MultisigWallet, label: Option<String>) -> Self {
        Self {
            handle: wallet.handle().clone(),
            label,
            master: wallet.master().clone(),
            owners: wallet.owners().to_vec(),
            quorum: wallet.quorum(),
            balance: wallet.balance(),
            actions: wallet.action_count(),
            pending: wallet.pending_actions().len(),
        }
    }

    pub fn print_table(&self) {
        let title = match &self.label {
            Some(label) => format!("{} ({})", self.handle, label),
            None => self.handle.to_string(),
        };
        println!("{}", title.bold().cyan());
        println!("  Master:  {}", self.master);
        println!(
            "  Owners:  {}",
            self.owners
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Quorum:  {} of {}", self.quorum, self.owners.len());
        println!("  Balance: {}", self.balance);
        println!("  Actions: {} ({} pending)", self.actions, self.pending);
    }
}
