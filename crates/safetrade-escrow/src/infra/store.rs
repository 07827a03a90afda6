//! Escrow Storage Implementations
//!
//! Storage backend seam for escrow records, their owning transactions and
//! the SMS delivery log. Production deployments put a relational store
//! behind [`EscrowStore`]; [`InMemoryStore`] is the reference backend used
//! for development and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use safetrade_common::{
    EscrowContext, EscrowError, EscrowParties, EscrowRecord, SettlementStatus, SmsLogEntry,
};

/// Errors from escrow store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Escrow record not found: {0}")]
    RecordNotFound(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Storage error: {0}")]
    Backend(String),
}

impl From<StoreError> for EscrowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound(id) => EscrowError::NotFound(format!("escrow record {id}")),
            StoreError::TransactionNotFound(id) => {
                EscrowError::NotFound(format!("transaction {id}"))
            }
            StoreError::Backend(msg) => EscrowError::Dependency(msg),
        }
    }
}

/// Predicate over raw record fields, used by the stats counts
///
/// Mirrors the chained equality filters of the relational store: every
/// `Some` field must match exactly.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub deposit_confirmed: Option<bool>,
    pub shipping_confirmed: Option<bool>,
    pub delivery_confirmed: Option<bool>,
    pub settlement_status: Option<SettlementStatus>,
}

impl RecordFilter {
    pub fn matches(&self, record: &EscrowRecord) -> bool {
        self.deposit_confirmed
            .map_or(true, |v| record.deposit_confirmed == v)
            && self
                .shipping_confirmed
                .map_or(true, |v| record.shipping_confirmed == v)
            && self
                .delivery_confirmed
                .map_or(true, |v| record.delivery_confirmed == v)
            && self
                .settlement_status
                .map_or(true, |v| record.settlement_status == v)
    }
}

/// Lifecycle of the owning marketplace transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Active,
    Completed,
}

/// The owning transaction aggregate, as far as this service needs it:
/// product/party context for notifications and the completed transition
/// triggered by settlement.
#[derive(Debug, Clone)]
pub struct OwningTransaction {
    pub id: Uuid,
    pub product_title: String,
    pub parties: EscrowParties,
    pub status: TransactionStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OwningTransaction {
    pub fn new(product_title: impl Into<String>, parties: EscrowParties) -> Self {
        Self {
            id: Uuid::now_v7(),
            product_title: product_title.into(),
            parties,
            status: TransactionStatus::Active,
            completed_at: None,
        }
    }
}

/// Trait for escrow storage backends
#[async_trait]
pub trait EscrowStore: Send + Sync {
    /// Fetch a record by id
    async fn get(&self, id: Uuid) -> Result<EscrowRecord, StoreError>;

    /// Write back a whole record. Last write wins; there is no optimistic
    /// locking, so concurrent admin actions on one record can interleave.
    async fn update(&self, record: EscrowRecord) -> Result<(), StoreError>;

    /// Fetch a record joined with its owning transaction's product title
    /// and party contacts
    async fn load_context(&self, id: Uuid) -> Result<EscrowContext, StoreError>;

    /// Count records matching a filter
    async fn count(&self, filter: &RecordFilter) -> Result<u64, StoreError>;

    /// Enriched records ordered by created_at descending, optionally
    /// filtered by exact settlement status, paginated by limit/offset
    async fn list(
        &self,
        status: Option<SettlementStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EscrowContext>, StoreError>;

    /// Transition the owning transaction to completed
    async fn complete_transaction(
        &self,
        transaction_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Persist one SMS delivery attempt
    async fn insert_sms_log(&self, entry: SmsLogEntry) -> Result<(), StoreError>;
}

/// In-memory storage implementation
///
/// Uses DashMap for concurrent access. Reference backend for development
/// and the fake store for tests.
pub struct InMemoryStore {
    records: DashMap<Uuid, EscrowRecord>,
    transactions: DashMap<Uuid, OwningTransaction>,
    sms_logs: RwLock<Vec<SmsLogEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            transactions: DashMap::new(),
            sms_logs: RwLock::new(Vec::new()),
        }
    }

    /// Seed a record (normally done by the order-placement process)
    pub fn insert_record(&self, record: EscrowRecord) {
        self.records.insert(record.id, record);
    }

    /// Seed an owning transaction
    pub fn insert_transaction(&self, transaction: OwningTransaction) {
        self.transactions.insert(transaction.id, transaction);
    }

    /// Snapshot of the owning transaction, if present
    pub fn transaction(&self, id: Uuid) -> Option<OwningTransaction> {
        self.transactions.get(&id).map(|t| t.clone())
    }

    /// Snapshot of the SMS delivery log
    pub fn sms_logs(&self) -> Vec<SmsLogEntry> {
        self.sms_logs.read().clone()
    }

    fn context_for(&self, record: EscrowRecord) -> Result<EscrowContext, StoreError> {
        let transaction = self
            .transactions
            .get(&record.transaction_id)
            .ok_or(StoreError::TransactionNotFound(record.transaction_id))?;

        Ok(EscrowContext {
            product_title: transaction.product_title.clone(),
            parties: transaction.parties.clone(),
            record,
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EscrowStore for InMemoryStore {
    async fn get(&self, id: Uuid) -> Result<EscrowRecord, StoreError> {
        self.records
            .get(&id)
            .map(|r| r.clone())
            .ok_or(StoreError::RecordNotFound(id))
    }

    async fn update(&self, record: EscrowRecord) -> Result<(), StoreError> {
        if !self.records.contains_key(&record.id) {
            return Err(StoreError::RecordNotFound(record.id));
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    async fn load_context(&self, id: Uuid) -> Result<EscrowContext, StoreError> {
        let record = self.get(id).await?;
        self.context_for(record)
    }

    async fn count(&self, filter: &RecordFilter) -> Result<u64, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }

    async fn list(
        &self,
        status: Option<SettlementStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EscrowContext>, StoreError> {
        let mut matching: Vec<EscrowRecord> = self
            .records
            .iter()
            .filter(|entry| status.map_or(true, |s| entry.settlement_status == s))
            .map(|entry| entry.clone())
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| self.context_for(record))
            .collect()
    }

    async fn complete_transaction(
        &self,
        transaction_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut transaction = self
            .transactions
            .get_mut(&transaction_id)
            .ok_or(StoreError::TransactionNotFound(transaction_id))?;

        transaction.status = TransactionStatus::Completed;
        transaction.completed_at = Some(completed_at);
        Ok(())
    }

    async fn insert_sms_log(&self, entry: SmsLogEntry) -> Result<(), StoreError> {
        self.sms_logs.write().push(entry);
        Ok(())
    }
}
