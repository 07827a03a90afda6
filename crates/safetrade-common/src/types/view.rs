//! Derived Escrow View
//!
//! The display-only step/progress pair computed from a record's raw
//! progress fields. Never persisted; recomputed on every read.

use serde::{Deserialize, Serialize};

use crate::types::record::{EscrowRecord, SettlementStatus};

/// Progress fraction reported for each step
pub const PROGRESS_AWAITING_DEPOSIT: f32 = 0.0;
pub const PROGRESS_PREPARING_SHIPMENT: f32 = 0.2;
pub const PROGRESS_IN_TRANSIT: f32 = 0.4;
pub const PROGRESS_AWAITING_SETTLEMENT: f32 = 0.6;
pub const PROGRESS_SETTLEMENT_READY: f32 = 0.8;
pub const PROGRESS_SETTLED: f32 = 1.0;

/// Display step of an escrow record, least to most advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EscrowStep {
    AwaitingDeposit,
    PreparingShipment,
    InTransit,
    AwaitingSettlement,
    SettlementReady,
    Settled,
}

impl EscrowStep {
    /// Human-readable label for operator dashboards
    pub fn label(&self) -> &'static str {
        match self {
            EscrowStep::AwaitingDeposit => "Awaiting deposit",
            EscrowStep::PreparingShipment => "Preparing shipment",
            EscrowStep::InTransit => "In transit",
            EscrowStep::AwaitingSettlement => "Awaiting settlement",
            EscrowStep::SettlementReady => "Settlement ready",
            EscrowStep::Settled => "Settled",
        }
    }
}

impl std::fmt::Display for EscrowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Computed step/progress pair for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedView {
    pub current_step: EscrowStep,
    pub progress: f32,
}

impl DerivedView {
    /// Derive the view from a record's raw fields.
    ///
    /// Fixed priority ladder: each later condition overrides the earlier
    /// ones, so the most advanced matching step wins.
    pub fn for_record(record: &EscrowRecord) -> Self {
        let mut current_step = EscrowStep::AwaitingDeposit;
        let mut progress = PROGRESS_AWAITING_DEPOSIT;

        if record.deposit_confirmed {
            current_step = EscrowStep::PreparingShipment;
            progress = PROGRESS_PREPARING_SHIPMENT;
        }
        if record.shipping_confirmed {
            current_step = EscrowStep::InTransit;
            progress = PROGRESS_IN_TRANSIT;
        }
        if record.delivery_confirmed {
            current_step = EscrowStep::AwaitingSettlement;
            progress = PROGRESS_AWAITING_SETTLEMENT;
        }
        if record.settlement_status == SettlementStatus::ReadyForSettlement {
            current_step = EscrowStep::SettlementReady;
            progress = PROGRESS_SETTLEMENT_READY;
        }
        if record.settlement_status == SettlementStatus::Settled {
            current_step = EscrowStep::Settled;
            progress = PROGRESS_SETTLED;
        }

        Self {
            current_step,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn record_with(
        deposit: bool,
        shipping: bool,
        delivery: bool,
        status: SettlementStatus,
    ) -> EscrowRecord {
        let mut record = EscrowRecord::new(Uuid::now_v7(), dec!(100_000));
        record.deposit_confirmed = deposit;
        record.shipping_confirmed = shipping;
        record.delivery_confirmed = delivery;
        record.settlement_status = status;
        record
    }

    #[test]
    fn test_fresh_record_awaits_deposit() {
        let view = DerivedView::for_record(&record_with(false, false, false, SettlementStatus::Waiting));
        assert_eq!(view.current_step, EscrowStep::AwaitingDeposit);
        assert_eq!(view.progress, 0.0);
    }

    #[test]
    fn test_ladder_advances_step_by_step() {
        let cases = [
            (
                record_with(true, false, false, SettlementStatus::Waiting),
                EscrowStep::PreparingShipment,
                0.2,
            ),
            (
                record_with(true, true, false, SettlementStatus::Waiting),
                EscrowStep::InTransit,
                0.4,
            ),
            (
                record_with(true, true, true, SettlementStatus::Waiting),
                EscrowStep::AwaitingSettlement,
                0.6,
            ),
            (
                record_with(true, true, true, SettlementStatus::ReadyForSettlement),
                EscrowStep::SettlementReady,
                0.8,
            ),
            (
                record_with(true, true, true, SettlementStatus::Settled),
                EscrowStep::Settled,
                1.0,
            ),
        ];

        for (record, step, progress) in cases {
            let view = DerivedView::for_record(&record);
            assert_eq!(view.current_step, step);
            assert_eq!(view.progress, progress);
        }
    }

    #[test]
    fn test_settlement_overrides_earlier_flags() {
        // Flags can lag behind an externally advanced settlement status;
        // the most advanced condition still wins.
        let view = DerivedView::for_record(&record_with(true, false, false, SettlementStatus::Settled));
        assert_eq!(view.current_step, EscrowStep::Settled);
        assert_eq!(view.progress, 1.0);
    }

    fn any_status() -> impl Strategy<Value = SettlementStatus> {
        prop_oneof![
            Just(SettlementStatus::Waiting),
            Just(SettlementStatus::ReadyForSettlement),
            Just(SettlementStatus::Settled),
        ]
    }

    proptest! {
        // Setting any flag or advancing the settlement status never
        // decreases the derived progress.
        #[test]
        fn progress_is_monotonic(
            deposit in any::<bool>(),
            shipping in any::<bool>(),
            delivery in any::<bool>(),
            status in any_status(),
        ) {
            let record = record_with(deposit, shipping, delivery, status);
            let before = DerivedView::for_record(&record).progress;

            let mut advanced = Vec::new();
            for i in 0..4 {
                let mut next = record.clone();
                match i {
                    0 => next.deposit_confirmed = true,
                    1 => next.shipping_confirmed = true,
                    2 => next.delivery_confirmed = true,
                    _ => {
                        next.settlement_status = match next.settlement_status {
                            SettlementStatus::Waiting => SettlementStatus::ReadyForSettlement,
                            _ => SettlementStatus::Settled,
                        }
                    }
                }
                advanced.push(next);
            }

            for next in advanced {
                prop_assert!(DerivedView::for_record(&next).progress >= before);
            }
        }
    }
}
