// Path: crates/types/src/app/banking.rs
//! Interest-bearing funds and transferable cheques.

use crate::amount::{AssetAmount, ShareAmount};
use crate::ids::{AccountId, AssetId, ChequeId, FundDepositId, FundId};
use crate::time::TimePoint;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An interest-bearing fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Fund {
    /// This row's id.
    pub id: FundId,
    /// Account operating the fund.
    pub owner: AccountId,
    /// Asset the fund is denominated in.
    pub asset_id: AssetId,
    /// Current fund balance.
    pub balance: ShareAmount,
    /// Whether the fund is accepting and paying deposits.
    pub enabled: bool,
    /// Instant after which the fund winds down.
    pub datetime_end: TimePoint,
}

/// A single deposit inside a fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FundDeposit {
    /// This row's id.
    pub id: FundDepositId,
    /// The fund holding the deposit.
    pub fund_id: FundId,
    /// The depositor.
    pub account_id: AccountId,
    /// Principal.
    pub amount: ShareAmount,
    /// Interest credited per daily maintenance pass.
    pub daily_payment: ShareAmount,
    /// Whether the deposit still accrues interest.
    pub enabled: bool,
    /// End of the deposit's term.
    pub datetime_end: TimePoint,
}

/// Lifecycle state of a cheque.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub enum ChequeStatus {
    /// Issued, not yet fully collected.
    #[default]
    New,
    /// Every payee has collected.
    Used,
    /// Expired; the remaining amount went back to the drawer.
    Reversed,
}

/// Per-payee slot of a cheque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ChequePayee {
    /// Account entitled to collect one payee amount.
    pub payee: AccountId,
    /// When this payee collected, if it did.
    pub datetime_used: TimePoint,
    /// This payee slot's own status.
    pub status: ChequeStatus,
}

/// A transferable cheque: an escrowed amount collectible by activation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Cheque {
    /// This row's id.
    pub id: ChequeId,
    /// Activation code, unique chain-wide.
    pub code: String,
    /// When the cheque was drawn.
    pub datetime_creation: TimePoint,
    /// When the cheque expires and becomes reversible.
    pub datetime_expiration: TimePoint,
    /// When the cheque was fully used or reversed.
    pub datetime_used: TimePoint,
    /// The account that drew the cheque and escrowed the funds.
    pub drawer: AccountId,
    /// Amount each payee may collect.
    pub amount_payee: ShareAmount,
    /// Escrowed amount not yet collected.
    pub amount_remaining: ShareAmount,
    /// Asset the cheque is denominated in.
    pub asset_id: AssetId,
    /// Lifecycle state.
    pub status: ChequeStatus,
    /// Payee slots allocated at creation.
    pub payees: Vec<ChequePayee>,
}

impl Cheque {
    /// The escrowed remainder as a tagged amount.
    pub fn remaining_amount(&self) -> AssetAmount {
        AssetAmount::new(self.amount_remaining, self.asset_id)
    }
}
