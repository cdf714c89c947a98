use super::customer::CustomerDetails;
use super::order::{Address, OrderItem, OrderShell, TrackingNumber};
use serde::{Deserialize, Serialize};

/// A cart submission. Built per request and never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub customer: CustomerDetails,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub order: OrderShell,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// The only thing checkout echoes back: the order's tracking number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub order_tracking_number: String,
}

impl PurchaseResponse {
    pub fn new(tracking_number: TrackingNumber) -> Self {
        Self {
            order_tracking_number: tracking_number.to_string(),
        }
    }
}
