// Path: crates/types/src/app/history.rs
//! Operation history and its per-account linked list.
//!
//! History rows are the reaper's prey and the legacy bonus engine's activity
//! evidence; they are not consensus state themselves, but their presence and
//! pruning schedule are consensus-visible through the legacy activity gate.

use crate::amount::{AssetAmount, ShareAmount};
use crate::app::bonus::ChildBalance;
use crate::ids::{
    AccountHistoryId, AccountId, BlindTransferId, ChequeId, FbaAccumulatorId, FundHistoryId,
    FundId, LimitOrderId, OperationHistoryId,
};
use crate::time::TimePoint;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An operation as recorded in history. The maintenance engine both emits
/// these (synthetic operations) and inspects them (legacy activity gate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Operation {
    /// A plain transfer between accounts.
    Transfer {
        /// Sending account.
        from: AccountId,
        /// Receiving account.
        to: AccountId,
        /// Amount moved.
        amount: AssetAmount,
    },
    /// Synthetic daily bonus issuance.
    DailyIssue {
        /// The asset's issuer.
        issuer: AccountId,
        /// Amount issued.
        asset_to_issue: AssetAmount,
        /// Receiving account.
        issue_to_account: AccountId,
        /// Receiver's real balance at issue time.
        account_balance: ShareAmount,
    },
    /// Synthetic referral-tree issuance.
    ReferralIssue {
        /// The asset's issuer.
        issuer: AccountId,
        /// Amount issued.
        asset_to_issue: AssetAmount,
        /// Receiving account.
        issue_to_account: AccountId,
        /// Receiver's real balance at issue time.
        account_balance: ShareAmount,
        /// Referral rank at issue time.
        rank: String,
        /// Contributing referrals.
        history: Vec<ChildBalance>,
    },
    /// Synthetic reversal of an expired cheque.
    ChequeReverse {
        /// The cheque being reversed.
        cheque_id: ChequeId,
        /// The drawer receiving the remainder.
        account_id: AccountId,
        /// Amount returned.
        amount: AssetAmount,
    },
    /// Limit order placed on the book.
    LimitOrderCreate {
        /// The selling account.
        seller: AccountId,
        /// Everything offered for sale.
        amount_to_sell: AssetAmount,
        /// Minimum acceptable counter-amount.
        min_to_receive: AssetAmount,
        /// Order expiration.
        expiration: TimePoint,
        /// Whether the order must fill immediately or die.
        fill_or_kill: bool,
    },
    /// Limit order cancelled.
    LimitOrderCancel {
        /// The order being cancelled.
        order: LimitOrderId,
        /// The account cancelling it.
        fee_paying_account: AccountId,
    },
    /// Membership upgrade.
    AccountUpgrade {
        /// The account being upgraded.
        account_to_upgrade: AccountId,
        /// Whether the upgrade is to lifetime membership.
        upgrade_to_lifetime_member: bool,
    },
    /// Virtual record of a fee-backed-asset distribution.
    FbaDistribute {
        /// Receiving account.
        account_id: AccountId,
        /// The pool that was split.
        fba_id: FbaAccumulatorId,
        /// Core satoshis credited.
        amount: ShareAmount,
    },
    /// Interest payment from a fund to a depositor.
    FundPayment {
        /// The paying fund.
        fund_id: FundId,
        /// The depositor.
        account_id: AccountId,
        /// Interest credited.
        amount: AssetAmount,
    },
}

impl Operation {
    /// The accounts whose history lists should reference this operation.
    pub fn affected_accounts(&self) -> Vec<AccountId> {
        match self {
            Operation::Transfer { from, to, .. } => vec![*from, *to],
            Operation::DailyIssue {
                issue_to_account, ..
            } => vec![*issue_to_account],
            Operation::ReferralIssue {
                issue_to_account, ..
            } => vec![*issue_to_account],
            Operation::ChequeReverse { account_id, .. } => vec![*account_id],
            Operation::LimitOrderCreate { seller, .. } => vec![*seller],
            Operation::LimitOrderCancel {
                fee_paying_account, ..
            } => vec![*fee_paying_account],
            Operation::AccountUpgrade {
                account_to_upgrade, ..
            } => vec![*account_to_upgrade],
            Operation::FbaDistribute { account_id, .. } => vec![*account_id],
            Operation::FundPayment { account_id, .. } => vec![*account_id],
        }
    }
}

/// A globally-ordered history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct OperationHistory {
    /// This row's id.
    pub id: OperationHistoryId,
    /// The recorded operation.
    pub op: Operation,
    /// Block the operation was applied in.
    pub block_num: u32,
    /// Timestamp of that block.
    pub time: TimePoint,
}

/// A node in an account's newest-first history linked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct AccountTransactionHistory {
    /// This row's id.
    pub id: AccountHistoryId,
    /// The account this node belongs to.
    pub account: AccountId,
    /// The global history row this node points at.
    pub operation_id: OperationHistoryId,
    /// Timestamp of the operation's block.
    pub block_time: TimePoint,
    /// The next-older node, if any.
    pub next: Option<AccountHistoryId>,
}

/// A fund-related history row; reaper prey only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FundTransactionHistory {
    /// This row's id.
    pub id: FundHistoryId,
    /// The fund the operation touched.
    pub fund: FundId,
    /// When the operation was applied.
    pub time: TimePoint,
}

/// A confidential transfer record; reaper prey only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BlindTransfer {
    /// This row's id.
    pub id: BlindTransferId,
    /// Sending account.
    pub from: AccountId,
    /// Receiving account.
    pub to: AccountId,
    /// Amount moved.
    pub amount: AssetAmount,
    /// When the transfer happened.
    pub datetime: TimePoint,
    /// Fee paid, in the asset configured by the blind-transfer settings.
    pub fee: AssetAmount,
}

/// Singleton settings for confidential transfers.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct BlindTransferSettings {
    /// Flat fee charged per blind transfer.
    pub blind_fee: AssetAmount,
}
