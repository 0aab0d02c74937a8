//! Run command - replay an operation script against a fresh instance

use super::deploy::CLI_FACTORY;
use super::InstanceSummary;
use crate::error::{CliError, CliResult};
use crate::output::{print_structured, OutputFormat};
use colored::Colorize;
use multisig_runtime::{
    DeploymentConfig, InMemoryAssetLedger, InstanceFactory, MasterControl, MultisigWallet,
    QuorumGovernance,
};
use multisig_types::{ActionId, ActionKind, Amount, Identity, MultisigResult, Notice};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Symbol of the in-memory asset scripts operate on
const SCRIPT_ASSET: &str = "MTK";

/// An operation script
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub ops: Vec<ScriptOp>,
}

/// One scripted operation
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ScriptOp {
    Deposit {
        from: Identity,
        amount: Amount,
    },
    Submit {
        caller: Identity,
        kind: ActionKind,
        destination: Identity,
        #[serde(default)]
        value: Amount,
    },
    Confirm {
        caller: Identity,
        action: u64,
    },
    Revoke {
        caller: Identity,
        action: u64,
    },
    Execute {
        caller: Identity,
        action: u64,
    },
    ChangeMaster {
        caller: Identity,
        new_master: Identity,
    },
    Withdraw {
        caller: Identity,
        destination: Identity,
        amount: Amount,
    },
    /// Credit units of the script asset
    Mint {
        holder: Identity,
        amount: Amount,
    },
    /// Let `spender` (the instance when omitted) move `owner`'s asset units
    Approve {
        owner: Identity,
        #[serde(default)]
        spender: Option<Identity>,
        amount: Amount,
    },
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::Deposit { .. } => "deposit",
            ScriptOp::Submit { .. } => "submit",
            ScriptOp::Confirm { .. } => "confirm",
            ScriptOp::Revoke { .. } => "revoke",
            ScriptOp::Execute { .. } => "execute",
            ScriptOp::ChangeMaster { .. } => "change-master",
            ScriptOp::Withdraw { .. } => "withdraw",
            ScriptOp::Mint { .. } => "mint",
            ScriptOp::Approve { .. } => "approve",
        }
    }
}

/// Result of one scripted operation
#[derive(Debug, Serialize)]
pub struct OpOutcome {
    pub step: usize,
    pub op: &'static str,
    pub ok: bool,
    pub detail: String,
    pub notices: Vec<Notice>,
}

/// Full report of a script run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub instance: InstanceSummary,
    pub outcomes: Vec<OpOutcome>,
    pub failures: usize,
}

pub fn load_script(path: &Path) -> CliResult<Script> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

pub fn execute(config_path: &Path, script_path: &Path, format: OutputFormat) -> CliResult<()> {
    let config = DeploymentConfig::load(config_path)?;
    let script = load_script(script_path)?;
    if script.ops.is_empty() {
        return Err(CliError::Script(format!(
            "{} contains no operations",
            script_path.display()
        )));
    }

    let ledger = Arc::new(InMemoryAssetLedger::new(SCRIPT_ASSET));
    let mut factory = InstanceFactory::new(Identity::new(CLI_FACTORY)).with_asset(ledger.clone());
    let handle = factory.create_instance_with_master(&config)?;
    let wallet = factory.instance_mut(&handle)?;

    let outcomes: Vec<OpOutcome> = script
        .ops
        .iter()
        .enumerate()
        .map(|(step, op)| run_step(wallet, &ledger, step, op))
        .collect();
    let failures = outcomes.iter().filter(|o| !o.ok).count();

    info!(
        instance = %handle,
        steps = outcomes.len(),
        failures,
        "Script finished"
    );

    let report = RunReport {
        instance: InstanceSummary::of(wallet, config.label.clone()),
        outcomes,
        failures,
    };

    if print_structured(format, &report)? {
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn run_step(
    wallet: &mut MultisigWallet,
    ledger: &InMemoryAssetLedger,
    step: usize,
    op: &ScriptOp,
) -> OpOutcome {
    let before = wallet.journal().len() as u64;
    let result = apply(wallet, ledger, op);
    let notices = wallet
        .journal()
        .since(before)
        .iter()
        .map(|r| r.notice.clone())
        .collect();

    match result {
        Ok(detail) => OpOutcome {
            step,
            op: op.name(),
            ok: true,
            detail,
            notices,
        },
        Err(e) => {
            warn!(step, op = op.name(), error = %e, "Script step failed");
            OpOutcome {
                step,
                op: op.name(),
                ok: false,
                detail: e.to_string(),
                notices,
            }
        }
    }
}

fn apply(
    wallet: &mut MultisigWallet,
    ledger: &InMemoryAssetLedger,
    op: &ScriptOp,
) -> MultisigResult<String> {
    match op {
        ScriptOp::Deposit { from, amount } => {
            wallet.deposit(from, *amount)?;
            Ok(format!("balance {}", wallet.balance()))
        }
        ScriptOp::Submit {
            caller,
            kind,
            destination,
            value,
        } => {
            let id = wallet.submit(caller, destination.clone(), *value, *kind)?;
            Ok(format!("{} action {}", kind, id))
        }
        ScriptOp::Confirm { caller, action } => {
            let id = ActionId::new(*action);
            wallet.confirm(caller, id)?;
            Ok(format!(
                "{} confirmations on {}",
                wallet.confirmation_count(id)?,
                id
            ))
        }
        ScriptOp::Revoke { caller, action } => {
            let id = ActionId::new(*action);
            wallet.revoke(caller, id)?;
            Ok(format!(
                "{} confirmations on {}",
                wallet.confirmation_count(id)?,
                id
            ))
        }
        ScriptOp::Execute { caller, action } => {
            let id = ActionId::new(*action);
            wallet.execute(caller, id)?;
            Ok(format!("{} executed", id))
        }
        ScriptOp::ChangeMaster { caller, new_master } => {
            wallet.change_master(caller, new_master.clone())?;
            Ok(format!("master is {}", wallet.master()))
        }
        ScriptOp::Withdraw {
            caller,
            destination,
            amount,
        } => {
            wallet.withdraw(caller, destination, *amount)?;
            Ok(format!("balance {}", wallet.balance()))
        }
        ScriptOp::Mint { holder, amount } => {
            ledger.mint(holder, *amount)?;
            Ok(format!("{} {} minted to {}", amount, SCRIPT_ASSET, holder))
        }
        ScriptOp::Approve {
            owner,
            spender,
            amount,
        } => {
            let spender = spender.clone().unwrap_or_else(|| wallet.principal().clone());
            ledger.approve(owner, &spender, *amount)?;
            Ok(format!("{} may move {} {} of {}", spender, amount, SCRIPT_ASSET, owner))
        }
    }
}

fn print_report(report: &RunReport) {
    println!("{}", "Script Run".bold().cyan());
    println!("{}", "=".repeat(60));
    for outcome in &report.outcomes {
        let mark = if outcome.ok {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} [{}] {:<14} {}",
            mark, outcome.step, outcome.op, outcome.detail
        );
        for notice in &outcome.notices {
            println!("        {} {}", "→".dimmed(), notice);
        }
    }
    println!();
    report.instance.print_table();
    println!();
    if report.failures > 0 {
        println!(
            "{}",
            format!("{} step(s) failed", report.failures).yellow()
        );
    } else {
        println!("{}", "All steps succeeded".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script: Script = toml::from_str(
            r#"
[[ops]]
op = "deposit"
from = "alice"
amount = 10

[[ops]]
op = "submit"
caller = "alice"
kind = "send_native"
destination = "bob"
value = 4

[[ops]]
op = "change-master"
caller = "alice"
new_master = "bob"

[[ops]]
op = "approve"
owner = "alice"
amount = 3
"#,
        )
        .unwrap();

        assert_eq!(script.ops.len(), 4);
        assert_eq!(script.ops[1].name(), "submit");
        assert!(matches!(
            script.ops[1],
            ScriptOp::Submit {
                kind: ActionKind::SendNative,
                ..
            }
        ));
        assert!(matches!(
            script.ops[3],
            ScriptOp::Approve { spender: None, .. }
        ));
    }

    #[test]
    fn test_failing_step_is_reported() {
        let ledger = InMemoryAssetLedger::new(SCRIPT_ASSET);
        let mut factory = InstanceFactory::new(Identity::new("f"));
        let config = DeploymentConfig::new(
            Identity::new("m"),
            vec![Identity::new("a"), Identity::new("b")],
            2,
        );
        let handle = factory.create_instance_with_master(&config).unwrap();
        let wallet = factory.instance_mut(&handle).unwrap();

        let submit = ScriptOp::Submit {
            caller: Identity::new("a"),
            kind: ActionKind::AddOwner,
            destination: Identity::new("c"),
            value: Amount::zero(),
        };
        let ok = run_step(wallet, &ledger, 0, &submit);
        assert!(ok.ok);
        assert_eq!(ok.notices.len(), 1);

        let execute = ScriptOp::Execute {
            caller: Identity::new("a"),
            action: 0,
        };
        let failed = run_step(wallet, &ledger, 1, &execute);
        assert!(!failed.ok);
        assert!(failed.detail.contains("Quorum not reached"));
        assert!(failed.notices.is_empty());
    }
}
