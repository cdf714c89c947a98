use super::email::Email;
use super::order::Order;
use serde::{Deserialize, Serialize};

/// Customer details as submitted with a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

/// A customer record and the orders it owns.
///
/// This is the aggregate root: saving a customer persists every order (with
/// its items and addresses) reachable from it as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    /// Identity key. At most one record exists per email.
    pub email: Email,
    pub orders: Vec<Order>,
    /// Storage version used for compare-and-swap saves. `0` means the record
    /// has never been persisted.
    #[serde(default)]
    pub version: u64,
}

impl Customer {
    pub fn new(details: CustomerDetails) -> Self {
        Self {
            first_name: details.first_name,
            last_name: details.last_name,
            email: details.email,
            orders: Vec::new(),
            version: 0,
        }
    }

    /// Attaches an order, pointing its back-reference at this customer.
    pub fn add_order(&mut self, mut order: Order) {
        order.customer_email = self.email.clone();
        self.orders.push(order);
    }

    pub fn is_new(&self) -> bool {
        self.version == 0
    }
}

impl From<CustomerDetails> for Customer {
    fn from(details: CustomerDetails) -> Self {
        Self::new(details)
    }
}
