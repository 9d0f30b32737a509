//! Stock item ("etalase") models and lifecycle rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{MovementLog, MovementStatus};

/// Packaging form of a stock lot ("bentuk barang")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormFactor {
    /// Master carton
    #[serde(rename = "MC")]
    Box,
    /// Karung
    #[serde(rename = "KRG")]
    Sack,
    /// Loose
    #[serde(rename = "PLS")]
    Loose,
}

impl FormFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormFactor::Box => "MC",
            FormFactor::Sack => "KRG",
            FormFactor::Loose => "PLS",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MC" => Some(FormFactor::Box),
            "KRG" => Some(FormFactor::Sack),
            "PLS" => Some(FormFactor::Loose),
            _ => None,
        }
    }
}

/// A tracked lot of fish inventory, joined with its supplier's name.
///
/// Quantities and prices are kept as text because legacy records contain
/// blanks and free-form values; they are coerced when read (see
/// [`crate::format`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub photo: Option<String>,
    pub size: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    /// Raw form factor as stored (`MC`, `KRG`, `PLS`)
    pub form_factor: String,
    /// Transport note / delivery order number ("no surat")
    pub transport_note: String,
    pub mc_setting: Option<String>,
    pub weight_kg: Option<String>,
    /// Carton / loose-pack count
    pub container_count: Option<String>,
    /// Sack count
    pub sack_count: Option<String>,
    pub buy_price: Option<String>,
    pub sell_price: Option<String>,
    /// Set when the lot is depleted; `None` while active
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub inactive_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accepts `null`, a missing field, an empty string, or an RFC 3339 timestamp
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

/// Input for recording a sale against a stock item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleInput {
    /// Remaining weight after the sale
    pub weight_after: Decimal,
    /// Remaining container count after the sale
    pub container_after: Option<Decimal>,
    pub payment_amount: Option<Decimal>,
    pub transport_note: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum StockError {
    #[error("quantity cannot be negative: {0}")]
    NegativeQuantity(Decimal),

    #[error("stock item is already inactive")]
    AlreadyInactive,
}

impl StockItem {
    /// New active item with empty quantities
    pub fn new(name: &str, size: &str, form_factor: &str, transport_note: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            photo: None,
            size: size.to_string(),
            supplier_id: None,
            supplier_name: None,
            form_factor: form_factor.to_string(),
            transport_note: transport_note.to_string(),
            mc_setting: None,
            weight_kg: None,
            container_count: None,
            sack_count: None,
            buy_price: None,
            sell_price: None,
            inactive_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_inactive(&self) -> bool {
        self.inactive_date.is_some()
    }

    /// Apply a sale: update remaining quantities, soft-deactivate the lot when
    /// nothing is left, and return the `OUT` movement log for the transition.
    pub fn apply_sale(
        &mut self,
        sale: &SaleInput,
        now: DateTime<Utc>,
    ) -> Result<MovementLog, StockError> {
        if self.is_inactive() {
            return Err(StockError::AlreadyInactive);
        }
        if sale.weight_after < Decimal::ZERO {
            return Err(StockError::NegativeQuantity(sale.weight_after));
        }
        if let Some(count) = sale.container_after {
            if count < Decimal::ZERO {
                return Err(StockError::NegativeQuantity(count));
            }
        }

        let weight_before = self.weight_kg.clone();
        let container_before = self.container_count.clone();

        self.weight_kg = Some(sale.weight_after.normalize().to_string());
        if let Some(count) = sale.container_after {
            self.container_count = Some(count.normalize().to_string());
        }
        if sale.weight_after.is_zero() {
            self.inactive_date = Some(now);
        }
        self.updated_at = now;

        let mut log = MovementLog::for_item(self, MovementStatus::Out, now);
        log.weight_before = weight_before;
        log.container_before = container_before;
        log.payment_amount = sale.payment_amount.map(|p| p.normalize().to_string());
        log.transport_note = sale.transport_note.clone();
        Ok(log)
    }
}
