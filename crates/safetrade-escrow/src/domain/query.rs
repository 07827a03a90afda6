//! Operator Queries
//!
//! Read-only aggregation and listing over escrow records for the admin
//! dashboard. Each stats bucket is an independent predicate count over the
//! full record set; the buckets are not a partition and need not sum to
//! the total (a delivered record whose settlement is not yet ready matches
//! none of them).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use safetrade_common::{EscrowListing, Result, SettlementStatus};

use crate::infra::store::{EscrowStore, RecordFilter};

/// Dashboard counters for escrow records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowStats {
    pub total_count: u64,
    /// deposit_confirmed == false
    pub waiting_deposit_count: u64,
    /// deposit confirmed, shipping not
    pub waiting_shipping_count: u64,
    /// shipping confirmed, delivery not
    pub shipping_count: u64,
    /// settlement_status == waiting
    pub waiting_settlement_count: u64,
    /// settlement_status == settled
    pub completed_count: u64,
}

/// Read side of the escrow admin service
pub struct QueryService {
    store: Arc<dyn EscrowStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn EscrowStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<EscrowStats> {
        let total_count = self.store.count(&RecordFilter::default()).await?;

        let waiting_deposit_count = self
            .store
            .count(&RecordFilter {
                deposit_confirmed: Some(false),
                ..Default::default()
            })
            .await?;

        let waiting_shipping_count = self
            .store
            .count(&RecordFilter {
                deposit_confirmed: Some(true),
                shipping_confirmed: Some(false),
                ..Default::default()
            })
            .await?;

        let shipping_count = self
            .store
            .count(&RecordFilter {
                shipping_confirmed: Some(true),
                delivery_confirmed: Some(false),
                ..Default::default()
            })
            .await?;

        let waiting_settlement_count = self
            .store
            .count(&RecordFilter {
                settlement_status: Some(SettlementStatus::Waiting),
                ..Default::default()
            })
            .await?;

        let completed_count = self
            .store
            .count(&RecordFilter {
                settlement_status: Some(SettlementStatus::Settled),
                ..Default::default()
            })
            .await?;

        Ok(EscrowStats {
            total_count,
            waiting_deposit_count,
            waiting_shipping_count,
            shipping_count,
            waiting_settlement_count,
            completed_count,
        })
    }

    /// List records newest first, each with its derived step and progress
    pub async fn list(
        &self,
        status: Option<SettlementStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EscrowListing>> {
        let contexts = self.store.list(status, limit, offset).await?;
        Ok(contexts.into_iter().map(EscrowListing::from_context).collect())
    }
}
