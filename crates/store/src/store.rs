// Path: crates/store/src/store.rs
//! The store aggregate: one table per object type, each with the secondary
//! indices the consensus engine traverses, plus the chain singletons.

use crate::table::{Row, Table, TableIndex};
use meridian_types::app::{
    Account, AccountBalance, AccountMatureBalance, AccountStatistics, AccountTransactionHistory,
    AccountsOnline, Asset, AssetDynamicData, BitassetData, BlindTransfer, BlindTransferSettings,
    BonusBalances, BudgetRecordEntry, Buyback, ChainProperties, Cheque, CommitteeMember,
    DynamicProperties, FbaAccumulator, Fund, FundDeposit, FundTransactionHistory,
    GlobalProperties, LimitOrder, OperationHistory, SpecialAuthorityRecord, VestingBalance,
    Witness, Worker,
};
use meridian_types::ids::*;
use meridian_types::{ShareAmount, StoreError, TimePoint};
use std::cmp::Reverse;
use std::collections::BTreeMap;

macro_rules! impl_row {
    ($ty:ty, $id:ty, $name:literal, $field:ident) => {
        impl Row for $ty {
            type Id = $id;
            const NAME: &'static str = $name;
            fn id(&self) -> $id {
                self.$field
            }
        }
    };
}

impl_row!(Account, AccountId, "account", id);
impl_row!(AccountBalance, BalanceId, "account balance", id);
impl_row!(AccountMatureBalance, MatureBalanceId, "mature balance", id);
impl_row!(BonusBalances, BonusBalancesId, "bonus balances", id);
impl_row!(Asset, AssetId, "asset", id);
impl_row!(AssetDynamicData, AssetId, "asset dynamic data", asset);
impl_row!(BitassetData, BitassetDataId, "bitasset data", id);
impl_row!(Witness, WitnessId, "witness", id);
impl_row!(CommitteeMember, CommitteeMemberId, "committee member", id);
impl_row!(Worker, WorkerId, "worker", id);
impl_row!(VestingBalance, VestingBalanceId, "vesting balance", id);
impl_row!(SpecialAuthorityRecord, SpecialAuthorityId, "special authority", id);
impl_row!(Buyback, BuybackId, "buyback", id);
impl_row!(FbaAccumulator, FbaAccumulatorId, "fba accumulator", id);
impl_row!(LimitOrder, LimitOrderId, "limit order", id);
impl_row!(Fund, FundId, "fund", id);
impl_row!(FundDeposit, FundDepositId, "fund deposit", id);
impl_row!(Cheque, ChequeId, "cheque", id);
impl_row!(OperationHistory, OperationHistoryId, "operation history", id);
impl_row!(AccountTransactionHistory, AccountHistoryId, "account history", id);
impl_row!(FundTransactionHistory, FundHistoryId, "fund history", id);
impl_row!(BlindTransfer, BlindTransferId, "blind transfer", id);
impl_row!(BudgetRecordEntry, BudgetRecordId, "budget record", id);

// Statistics rows share the account's id space.
impl Row for AccountStatistics {
    type Id = AccountId;
    const NAME: &'static str = "account statistics";
    fn id(&self) -> AccountId {
        self.owner
    }
}

/// Rows carrying a timestamp the reaper and history scans key on.
pub trait TimeKeyed: Row {
    /// The indexed timestamp.
    fn time_key(&self) -> TimePoint;
}

impl TimeKeyed for OperationHistory {
    fn time_key(&self) -> TimePoint {
        self.time
    }
}
impl TimeKeyed for AccountTransactionHistory {
    fn time_key(&self) -> TimePoint {
        self.block_time
    }
}
impl TimeKeyed for FundTransactionHistory {
    fn time_key(&self) -> TimePoint {
        self.time
    }
}
impl TimeKeyed for BlindTransfer {
    fn time_key(&self) -> TimePoint {
        self.datetime
    }
}
impl TimeKeyed for Cheque {
    fn time_key(&self) -> TimePoint {
        self.datetime_creation
    }
}

/// Ordered (time, id) index over a [`TimeKeyed`] table.
#[derive(Debug)]
pub struct ByTime<R: TimeKeyed> {
    map: BTreeMap<(TimePoint, R::Id), ()>,
}

impl<R: TimeKeyed> Default for ByTime<R> {
    fn default() -> Self {
        ByTime { map: BTreeMap::new() }
    }
}

impl<R: TimeKeyed> TableIndex<R> for ByTime<R> {
    fn on_insert(&mut self, row: &R) {
        self.map.insert((row.time_key(), row.id()), ());
    }
    fn on_remove(&mut self, row: &R) {
        self.map.remove(&(row.time_key(), row.id()));
    }
}

impl<R: TimeKeyed> ByTime<R> {
    /// Ids of rows strictly older than `cutoff`, oldest first.
    pub fn ids_before(&self, cutoff: TimePoint) -> Vec<R::Id> {
        self.map
            .range(..(cutoff, R::Id::from_instance(0)))
            .map(|((_, id), _)| *id)
            .collect()
    }
}

/// Secondary indices of the account table.
#[derive(Debug, Default)]
pub struct AccountIndexes {
    /// Unique name -> id; the canonical deterministic account sweep order.
    pub by_name: BTreeMap<String, AccountId>,
}

impl TableIndex<Account> for AccountIndexes {
    fn on_insert(&mut self, row: &Account) {
        self.by_name.insert(row.name.clone(), row.id);
    }
    fn on_remove(&mut self, row: &Account) {
        self.by_name.remove(&row.name);
    }
}

/// Secondary indices shared by the balance and mature-balance tables.
#[derive(Debug)]
pub struct BalanceIndexes<Id: Copy + Ord> {
    /// Unique (owner, asset) -> row id.
    pub by_account_asset: BTreeMap<(AccountId, AssetId), Id>,
    /// (asset, balance descending, owner) -> row id; feeds top-holder scans.
    pub by_asset_balance: BTreeMap<(AssetId, Reverse<ShareAmount>, AccountId), Id>,
}

impl<Id: Copy + Ord> Default for BalanceIndexes<Id> {
    fn default() -> Self {
        BalanceIndexes {
            by_account_asset: BTreeMap::new(),
            by_asset_balance: BTreeMap::new(),
        }
    }
}

impl TableIndex<AccountBalance> for BalanceIndexes<BalanceId> {
    fn on_insert(&mut self, row: &AccountBalance) {
        self.by_account_asset.insert((row.owner, row.asset_type), row.id);
        self.by_asset_balance
            .insert((row.asset_type, Reverse(row.balance), row.owner), row.id);
    }
    fn on_remove(&mut self, row: &AccountBalance) {
        self.by_account_asset.remove(&(row.owner, row.asset_type));
        self.by_asset_balance
            .remove(&(row.asset_type, Reverse(row.balance), row.owner));
    }
}

impl TableIndex<AccountMatureBalance> for BalanceIndexes<MatureBalanceId> {
    fn on_insert(&mut self, row: &AccountMatureBalance) {
        self.by_account_asset.insert((row.owner, row.asset_type), row.id);
        self.by_asset_balance
            .insert((row.asset_type, Reverse(row.balance), row.owner), row.id);
    }
    fn on_remove(&mut self, row: &AccountMatureBalance) {
        self.by_account_asset.remove(&(row.owner, row.asset_type));
        self.by_asset_balance
            .remove(&(row.asset_type, Reverse(row.balance), row.owner));
    }
}

impl<Id: Copy + Ord> BalanceIndexes<Id> {
    /// Row ids of an account's balances in ascending asset order.
    pub fn account_rows(&self, owner: AccountId) -> Vec<(AssetId, Id)> {
        self.by_account_asset
            .range((owner, AssetId(0))..=(owner, AssetId(u32::MAX)))
            .map(|((_, asset), id)| (*asset, *id))
            .collect()
    }

    /// Row ids holding `asset`, largest balance first, owner ascending on ties.
    pub fn asset_rows_by_balance(&self, asset: AssetId) -> Vec<Id> {
        self.by_asset_balance
            .range(
                (asset, Reverse(ShareAmount::MAX), AccountId(0))
                    ..=(asset, Reverse(ShareAmount::MIN), AccountId(u32::MAX)),
            )
            .map(|(_, id)| *id)
            .collect()
    }
}

/// Secondary indices of the asset table.
#[derive(Debug, Default)]
pub struct AssetIndexes {
    /// Unique symbol -> id.
    pub by_symbol: BTreeMap<String, AssetId>,
}

impl TableIndex<Asset> for AssetIndexes {
    fn on_insert(&mut self, row: &Asset) {
        self.by_symbol.insert(row.symbol.clone(), row.id);
    }
    fn on_remove(&mut self, row: &Asset) {
        self.by_symbol.remove(&row.symbol);
    }
}

/// Secondary indices of the worker table.
#[derive(Debug, Default)]
pub struct WorkerIndexes {
    /// (account, worker id) ordering; the worker-vote refresh sweep order.
    pub by_account: BTreeMap<(AccountId, WorkerId), ()>,
}

impl TableIndex<Worker> for WorkerIndexes {
    fn on_insert(&mut self, row: &Worker) {
        self.by_account.insert((row.worker_account, row.id), ());
    }
    fn on_remove(&mut self, row: &Worker) {
        self.by_account.remove(&(row.worker_account, row.id));
    }
}

/// Secondary indices of the bonus-balances table.
#[derive(Debug, Default)]
pub struct BonusBalancesIndexes {
    /// Unique owner -> ledger id.
    pub by_account: BTreeMap<AccountId, BonusBalancesId>,
}

impl TableIndex<BonusBalances> for BonusBalancesIndexes {
    fn on_insert(&mut self, row: &BonusBalances) {
        self.by_account.insert(row.owner, row.id);
    }
    fn on_remove(&mut self, row: &BonusBalances) {
        self.by_account.remove(&row.owner);
    }
}

/// The whole chain state the maintenance engine reads and mutates.
#[derive(Debug, Default)]
pub struct Store {
    /// Accounts, ordered by id, indexed by name.
    pub accounts: Table<Account, AccountIndexes>,
    /// Per-account statistics, keyed by the owning account's id.
    pub account_statistics: Table<AccountStatistics>,
    /// Per-(account, asset) balances.
    pub balances: Table<AccountBalance, BalanceIndexes<BalanceId>>,
    /// Per-(account, asset) mature balances.
    pub mature_balances: Table<AccountMatureBalance, BalanceIndexes<MatureBalanceId>>,
    /// Per-account pending-bonus ledgers.
    pub bonus_balances: Table<BonusBalances, BonusBalancesIndexes>,
    /// Asset definitions.
    pub assets: Table<Asset, AssetIndexes>,
    /// Asset supply tracking, keyed by asset id.
    pub asset_dynamic: Table<AssetDynamicData>,
    /// Market-pegged asset rows.
    pub bitassets: Table<BitassetData>,
    /// Block-producer candidates.
    pub witnesses: Table<Witness>,
    /// Governance-member candidates.
    pub committee_members: Table<CommitteeMember>,
    /// Worker proposals.
    pub workers: Table<Worker, WorkerIndexes>,
    /// Vesting pots.
    pub vesting_balances: Table<VestingBalance>,
    /// Special-authority registry.
    pub special_authorities: Table<SpecialAuthorityRecord>,
    /// Buyback-program registry.
    pub buybacks: Table<Buyback>,
    /// Fee-backed-asset pools.
    pub fba_accumulators: Table<FbaAccumulator>,
    /// Open limit orders.
    pub limit_orders: Table<LimitOrder>,
    /// Interest-bearing funds.
    pub funds: Table<Fund>,
    /// Deposits inside funds.
    pub fund_deposits: Table<FundDeposit>,
    /// Cheques, time-indexed by creation for the reaper.
    pub cheques: Table<Cheque, ByTime<Cheque>>,
    /// Global operation history.
    pub operation_history: Table<OperationHistory, ByTime<OperationHistory>>,
    /// Per-account history nodes.
    pub account_history: Table<AccountTransactionHistory, ByTime<AccountTransactionHistory>>,
    /// Fund history rows.
    pub fund_history: Table<FundTransactionHistory, ByTime<FundTransactionHistory>>,
    /// Blind-transfer records.
    pub blind_transfers: Table<BlindTransfer, ByTime<BlindTransfer>>,
    /// Append-only budget ledger.
    pub budget_records: Table<BudgetRecordEntry>,

    /// Governance-controlled singleton.
    pub global_properties: GlobalProperties,
    /// Per-block bookkeeping singleton.
    pub dynamic_properties: DynamicProperties,
    /// Genesis-frozen singleton.
    pub chain_properties: ChainProperties,
    /// Online-presence singleton (legacy bonus window only).
    pub accounts_online: AccountsOnline,
    /// Confidential-transfer settings singleton.
    pub blind_transfer_settings: BlindTransferSettings,
}

impl Store {
    /// An empty store with default singletons.
    pub fn new() -> Self {
        Store::default()
    }

    /// Account ids in ascending name order: the canonical sweep order for
    /// per-account maintenance.
    pub fn account_ids_by_name(&self) -> Vec<AccountId> {
        self.accounts.index().by_name.values().copied().collect()
    }

    /// Balance of `(owner, asset)`; zero when no row exists.
    pub fn get_balance(&self, owner: AccountId, asset: AssetId) -> ShareAmount {
        self.balances
            .index()
            .by_account_asset
            .get(&(owner, asset))
            .and_then(|id| self.balances.get(*id))
            .map(|row| row.balance)
            .unwrap_or(0)
    }

    /// Mature balance of `(owner, asset)`; zero when no row exists.
    pub fn get_mature_balance(&self, owner: AccountId, asset: AssetId) -> ShareAmount {
        self.mature_balances
            .index()
            .by_account_asset
            .get(&(owner, asset))
            .and_then(|id| self.mature_balances.get(*id))
            .map(|row| row.balance)
            .unwrap_or(0)
    }

    /// Adjusts the balance of `(owner, asset)` by `delta`, creating the row
    /// on first credit.
    pub fn adjust_balance(
        &mut self,
        owner: AccountId,
        asset: AssetId,
        delta: ShareAmount,
    ) -> Result<(), StoreError> {
        if delta == 0 {
            return Ok(());
        }
        let existing = self
            .balances
            .index()
            .by_account_asset
            .get(&(owner, asset))
            .copied();
        match existing {
            Some(id) => self.balances.modify(id, |row| row.balance += delta),
            None => {
                self.balances.create(|id| AccountBalance {
                    id,
                    owner,
                    asset_type: asset,
                    balance: delta,
                    mandatory_transfer: false,
                });
                Ok(())
            }
        }
    }

    /// Statistics row of `owner`, created on first access.
    pub fn statistics_mut(
        &mut self,
        owner: AccountId,
        mutate: impl FnOnce(&mut AccountStatistics),
    ) -> Result<(), StoreError> {
        if !self.account_statistics.contains(owner) {
            self.account_statistics.insert(AccountStatistics {
                owner,
                ..AccountStatistics::default()
            })?;
        }
        self.account_statistics.modify(owner, mutate)
    }

    /// Pending-bonus ledger of `owner`, created on first access.
    pub fn bonus_balances_mut(
        &mut self,
        owner: AccountId,
        referral_asset: AssetId,
        mutate: impl FnOnce(&mut BonusBalances),
    ) -> Result<(), StoreError> {
        let existing = self.bonus_balances.index().by_account.get(&owner).copied();
        let id = match existing {
            Some(id) => id,
            None => self
                .bonus_balances
                .create(|id| BonusBalances::new(id, owner, referral_asset)),
        };
        self.bonus_balances.modify(id, mutate)
    }
}
