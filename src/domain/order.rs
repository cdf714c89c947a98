use super::email::Email;
use crate::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier handed to the customer to reference an order.
///
/// Backed by a random (version 4) UUID drawn from the OS CSPRNG. It is never
/// derived from order content, a counter or the clock, so knowing one tracking
/// number tells nothing about any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(Uuid);

impl TrackingNumber {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TrackingNumber {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// A line item priced upstream. Only ever exists inside an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// The partially populated order submitted with a purchase.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderShell {
    #[serde(default)]
    pub total_quantity: u32,
    #[serde(default)]
    pub total_price: Decimal,
}

/// One checkout transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Assigned once at assembly, never reassigned.
    pub tracking_number: TrackingNumber,
    pub total_quantity: u32,
    pub total_price: Decimal,
    /// Back-reference to the owning customer.
    pub customer_email: Email,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
    pub date_created: DateTime<Utc>,
}

impl Order {
    /// Builds an order from the submitted shell, taking ownership of the items
    /// and both addresses.
    ///
    /// Fails with [`CheckoutError::EmptyOrder`] when `items` is empty.
    pub fn assemble(
        shell: OrderShell,
        tracking_number: TrackingNumber,
        items: Vec<OrderItem>,
        billing_address: Address,
        shipping_address: Address,
        customer_email: Email,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }

        Ok(Self {
            tracking_number,
            total_quantity: shell.total_quantity,
            total_price: shell.total_price,
            customer_email,
            billing_address,
            shipping_address,
            items,
            date_created: Utc::now(),
        })
    }
}
