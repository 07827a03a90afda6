//! Escrow Record Types
//!
//! The persisted state of a marketplace transaction placed under escrow,
//! plus the read-only party/product context resolved through the owning
//! transaction aggregate.
//!
//! A record moves forward only: deposit confirmation, shipping confirmation
//! and delivery confirmation are monotonic false→true flags, and the
//! settlement status progresses waiting → ready_for_settlement → settled.
//! Nothing in this crate ever un-sets one of these fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::types::view::DerivedView;

/// Settlement progression of an escrow record
///
/// `ReadyForSettlement` is driven externally (delivery-side checks); this
/// crate only moves records into `Settled`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Waiting,
    ReadyForSettlement,
    Settled,
}

impl SettlementStatus {
    /// Wire token used by the admin API's status filter
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Waiting => "waiting",
            SettlementStatus::ReadyForSettlement => "ready_for_settlement",
            SettlementStatus::Settled => "settled",
        }
    }
}

impl FromStr for SettlementStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(SettlementStatus::Waiting),
            "ready_for_settlement" => Ok(SettlementStatus::ReadyForSettlement),
            "settled" => Ok(SettlementStatus::Settled),
            other => Err(format!("unknown settlement status: {other}")),
        }
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted escrow record, one per marketplace transaction under escrow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Unique, immutable identifier
    pub id: Uuid,

    /// Owning marketplace transaction (1:1)
    pub transaction_id: Uuid,

    /// Amount held in escrow; positive, immutable once set
    pub deposit_amount: Decimal,

    /// Monotonic false→true
    pub deposit_confirmed: bool,

    /// Set exactly once, when the deposit is first confirmed
    pub deposit_confirmed_at: Option<DateTime<Utc>>,

    /// Monotonic false→true
    pub shipping_confirmed: bool,

    /// Set exactly once, when shipping is first confirmed
    pub shipping_confirmed_at: Option<DateTime<Utc>>,

    /// Set only at shipping confirmation, immutable thereafter
    pub tracking_number: Option<String>,

    /// Set only at shipping confirmation, immutable thereafter
    pub courier: Option<String>,

    /// Driven externally (buyer-side receipt confirmation); read-only here
    pub delivery_confirmed: bool,

    pub settlement_status: SettlementStatus,

    /// Operator note; overwritten on every note update and on every
    /// automated status transition
    pub admin_notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EscrowRecord {
    /// Create a fresh record for a transaction entering escrow
    pub fn new(transaction_id: Uuid, deposit_amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            transaction_id,
            deposit_amount,
            deposit_confirmed: false,
            deposit_confirmed_at: None,
            shipping_confirmed: false,
            shipping_confirmed_at: None,
            tracking_number: None,
            courier: None,
            delivery_confirmed: false,
            settlement_status: SettlementStatus::Waiting,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A party reachable for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    /// Missing phone means the party cannot be notified; not an error
    pub phone: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            name: name.into(),
            phone,
        }
    }
}

/// Buyer, seller and optional reseller of the owning transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowParties {
    pub buyer: Contact,
    pub seller: Contact,
    pub reseller: Option<Contact>,
}

/// An escrow record enriched with its owning-transaction context
///
/// Produced by the store's join-like lookups; consumed by the notification
/// dispatcher (addresses, product title) and the list query (display rows).
#[derive(Debug, Clone)]
pub struct EscrowContext {
    pub record: EscrowRecord,
    pub product_title: String,
    pub parties: EscrowParties,
}

/// Display row returned by the admin list query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowListing {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_title: String,
    pub buyer_name: String,
    pub buyer_phone: Option<String>,
    pub seller_name: String,
    pub seller_phone: Option<String>,
    pub reseller_name: Option<String>,
    pub deposit_amount: Decimal,
    pub deposit_confirmed: bool,
    pub shipping_confirmed: bool,
    pub delivery_confirmed: bool,
    pub settlement_status: SettlementStatus,
    pub current_step: crate::types::view::EscrowStep,
    pub progress: f32,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EscrowListing {
    /// Flatten an enriched record into a display row with its derived view
    pub fn from_context(context: EscrowContext) -> Self {
        let view = DerivedView::for_record(&context.record);
        let EscrowContext {
            record,
            product_title,
            parties,
        } = context;

        Self {
            id: record.id,
            transaction_id: record.transaction_id,
            product_title,
            buyer_name: parties.buyer.name,
            buyer_phone: parties.buyer.phone,
            seller_name: parties.seller.name,
            seller_phone: parties.seller.phone,
            reseller_name: parties.reseller.map(|r| r.name),
            deposit_amount: record.deposit_amount,
            deposit_confirmed: record.deposit_confirmed,
            shipping_confirmed: record.shipping_confirmed,
            delivery_confirmed: record.delivery_confirmed,
            settlement_status: record.settlement_status,
            current_step: view.current_step,
            progress: view.progress,
            admin_notes: record.admin_notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Category of an outbound SMS, persisted with every delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsMessageType {
    DepositConfirmed,
    ShippingStarted,
}

impl std::fmt::Display for SmsMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmsMessageType::DepositConfirmed => write!(f, "deposit_confirmed"),
            SmsMessageType::ShippingStarted => write!(f, "shipping_started"),
        }
    }
}

/// Delivery log entry, written once per dispatch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsLogEntry {
    pub id: Uuid,
    pub phone_number: String,
    pub message_type: SmsMessageType,
    pub message_content: String,
    pub is_sent: bool,
    pub sent_at: DateTime<Utc>,
}

impl SmsLogEntry {
    pub fn new(
        phone_number: impl Into<String>,
        message_type: SmsMessageType,
        message_content: impl Into<String>,
        is_sent: bool,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            phone_number: phone_number.into(),
            message_type,
            message_content: message_content.into(),
            is_sent,
            sent_at: Utc::now(),
        }
    }
}

/// Format a monetary amount for operator messages, e.g. `₩1,200,000`
pub fn format_currency(amount: &Decimal) -> String {
    let whole = amount.trunc().to_string();
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("₩{sign}{grouped}")
}
