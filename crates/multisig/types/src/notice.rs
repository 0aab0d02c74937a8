//! Observable notices and the journal that records them
//!
//! Every accepted operation emits one or more notices carrying its
//! defining arguments. Within one operation the order is stable.

use crate::{ActionId, Amount, ContentHash, Identity, InstanceHandle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An observable notice emitted by a wallet instance or a factory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    Submission {
        content_hash: ContentHash,
        id: ActionId,
    },
    Confirmation {
        id: ActionId,
        confirmer: Identity,
    },
    Revocation {
        id: ActionId,
        revoker: Identity,
    },
    OwnerAddition {
        owner: Identity,
    },
    OwnerRemoval {
        owner: Identity,
    },
    QuorumChanged {
        new_quorum: u32,
    },
    MasterChanged {
        new_master: Identity,
    },
    Withdraw {
        destination: Identity,
        amount: Amount,
    },
    Deposit {
        depositor: Identity,
        amount: Amount,
    },
    ExecutionNative {
        amount: Amount,
    },
    ExecutionFungibleAsset {
        amount: Amount,
    },
    ContractInstantiation {
        handle: InstanceHandle,
    },
    InstanceCreation {
        handle: InstanceHandle,
    },
}

impl Notice {
    /// Stable name of the notice
    pub fn name(&self) -> &'static str {
        match self {
            Notice::Submission { .. } => "Submission",
            Notice::Confirmation { .. } => "Confirmation",
            Notice::Revocation { .. } => "Revocation",
            Notice::OwnerAddition { .. } => "OwnerAddition",
            Notice::OwnerRemoval { .. } => "OwnerRemoval",
            Notice::QuorumChanged { .. } => "QuorumChanged",
            Notice::MasterChanged { .. } => "MasterChanged",
            Notice::Withdraw { .. } => "Withdraw",
            Notice::Deposit { .. } => "Deposit",
            Notice::ExecutionNative { .. } => "ExecutionNative",
            Notice::ExecutionFungibleAsset { .. } => "ExecutionFungibleAsset",
            Notice::ContractInstantiation { .. } => "ContractInstantiation",
            Notice::InstanceCreation { .. } => "InstanceCreation",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Submission { content_hash, id } => {
                write!(f, "Submission({}, {})", &content_hash.to_hex()[..16], id)
            }
            Notice::Confirmation { id, confirmer } => write!(f, "Confirmation({}, {})", id, confirmer),
            Notice::Revocation { id, revoker } => write!(f, "Revocation({}, {})", id, revoker),
            Notice::OwnerAddition { owner } => write!(f, "OwnerAddition({})", owner),
            Notice::OwnerRemoval { owner } => write!(f, "OwnerRemoval({})", owner),
            Notice::QuorumChanged { new_quorum } => write!(f, "QuorumChanged({})", new_quorum),
            Notice::MasterChanged { new_master } => write!(f, "MasterChanged({})", new_master),
            Notice::Withdraw {
                destination,
                amount,
            } => write!(f, "Withdraw({}, {})", destination, amount),
            Notice::Deposit { depositor, amount } => write!(f, "Deposit({}, {})", depositor, amount),
            Notice::ExecutionNative { amount } => write!(f, "ExecutionNative({})", amount),
            Notice::ExecutionFungibleAsset { amount } => {
                write!(f, "ExecutionFungibleAsset({})", amount)
            }
            Notice::ContractInstantiation { handle } => {
                write!(f, "ContractInstantiation({})", handle)
            }
            Notice::InstanceCreation { handle } => write!(f, "InstanceCreation({})", handle),
        }
    }
}

/// A journaled notice
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoticeRecord {
    /// Position in the journal, starting at 0
    pub sequence: u64,
    /// Who emitted the notice (instance handle or factory identity)
    pub source: String,
    /// The notice itself
    pub notice: Notice,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

/// Append-only notice log of one instance or factory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoticeJournal {
    source: String,
    records: Vec<NoticeRecord>,
}

impl NoticeJournal {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
        }
    }

    pub fn for_instance(handle: &InstanceHandle) -> Self {
        Self::new(handle.0.clone())
    }

    /// Append notices in the given order
    pub fn log_all(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            let sequence = self.records.len() as u64;
            self.records.push(NoticeRecord {
                sequence,
                source: self.source.clone(),
                notice,
                timestamp: Utc::now(),
            });
        }
    }

    pub fn log(&mut self, notice: Notice) {
        self.log_all(std::iter::once(notice));
    }

    pub fn records(&self) -> &[NoticeRecord] {
        &self.records
    }

    /// Notices in emission order
    pub fn notices(&self) -> Vec<&Notice> {
        self.records.iter().map(|r| &r.notice).collect()
    }

    /// Records with `sequence >= from`
    pub fn since(&self, from: u64) -> &[NoticeRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&Notice> {
        self.records.last().map(|r| &r.notice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_sequence() {
        let mut journal = NoticeJournal::new("ms-1");
        assert!(journal.is_empty());

        journal.log(Notice::QuorumChanged { new_quorum: 1 });
        journal.log_all(vec![
            Notice::OwnerRemoval {
                owner: Identity::new("b"),
            },
            Notice::ExecutionNative {
                amount: Amount::new(3),
            },
        ]);

        assert_eq!(journal.len(), 3);
        let names: Vec<_> = journal.notices().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["QuorumChanged", "OwnerRemoval", "ExecutionNative"]);
        assert_eq!(journal.records()[2].sequence, 2);
        assert_eq!(journal.records()[0].source, "ms-1");
        assert_eq!(journal.since(1).len(), 2);
        assert!(journal.since(10).is_empty());
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::Withdraw {
            destination: Identity::new("r"),
            amount: Amount::new(7),
        };
        assert_eq!(notice.to_string(), "Withdraw(r, 7)");
    }

    #[test]
    fn test_notice_serializes_with_tag() {
        let notice = Notice::MasterChanged {
            new_master: Identity::new("m2"),
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["notice"], "master_changed");
        assert_eq!(json["new_master"], "m2");
    }

    #[test]
    fn test_submission_content_hash_is_hex() {
        let content_hash =
            ContentHash::of_action(&Identity::new("r"), Amount::new(5), crate::ActionKind::SendNative);
        let notice = Notice::Submission {
            content_hash,
            id: ActionId::new(0),
        };

        let json = serde_json::to_value(&notice).unwrap();
        let hex = json["content_hash"].as_str().unwrap();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, content_hash.to_hex());

        let back: Notice = serde_json::from_value(json).unwrap();
        assert_eq!(back, notice);
    }
}
