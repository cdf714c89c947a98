//! Customer reconciliation: decides which customer record a new order
//! belongs to.
//!
//! Identity is the normalized email and the first record wins: when a
//! customer already exists, the submitted name fields are ignored and the new
//! order is attached to the stored record.

use crate::domain::customer::{Customer, CustomerDetails};
use crate::domain::order::Order;
use crate::domain::ports::CustomerStore;
use crate::error::{CheckoutError, Result};
use tracing::{debug, warn};

/// Lookup-attach-save attempts before a conflict is handed to the caller.
pub const MAX_ATTEMPTS: u32 = 3;

/// Returns the stored customer for the submitted email, or a fresh unsaved
/// customer built from the submitted details.
pub async fn resolve(store: &dyn CustomerStore, submitted: &CustomerDetails) -> Result<Customer> {
    match store.find_by_email(&submitted.email).await? {
        Some(existing) => {
            debug!(email = %existing.email, orders = existing.orders.len(), "existing customer");
            Ok(existing)
        }
        None => {
            debug!(email = %submitted.email, "new customer");
            Ok(Customer::new(submitted.clone()))
        }
    }
}

/// Attaches `order` to the customer owning `submitted.email` and saves the
/// aggregate.
///
/// The store's compare-and-swap save rejects a write based on a stale lookup,
/// so two first-time checkouts racing on one email cannot both create a
/// record. The loser re-runs the whole lookup and attaches to the winner.
pub async fn attach_order(
    store: &dyn CustomerStore,
    submitted: &CustomerDetails,
    order: Order,
) -> Result<Customer> {
    let mut attempt = 1;
    loop {
        let mut customer = resolve(store, submitted).await?;
        customer.add_order(order.clone());

        match store.save(customer).await {
            Err(CheckoutError::Conflict { email }) if attempt < MAX_ATTEMPTS => {
                warn!(%email, attempt, "customer changed concurrently, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
