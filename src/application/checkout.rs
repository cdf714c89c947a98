use super::reconciler;
use crate::domain::customer::Customer;
use crate::domain::order::{Order, TrackingNumber};
use crate::domain::ports::CustomerStoreBox;
use crate::domain::purchase::{Purchase, PurchaseResponse};
use crate::error::Result;
use tracing::{info, instrument};

/// Turns purchases into durable orders.
///
/// `CheckoutService` holds no state of its own between calls; every request
/// reads and writes through the customer store, which is also the only
/// synchronization point between concurrent checkouts.
pub struct CheckoutService {
    store: CustomerStoreBox,
}

impl CheckoutService {
    /// Creates a new `CheckoutService` over the given customer store.
    pub fn new(store: CustomerStoreBox) -> Self {
        Self { store }
    }

    /// Places an order for `purchase` and returns its tracking number.
    ///
    /// The order is assembled with a freshly generated tracking number,
    /// attached to the reconciled customer and saved with it as one unit.
    /// Any store failure aborts the whole checkout: no tracking number is
    /// returned and nothing is left behind.
    #[instrument(skip_all, fields(email = %purchase.customer.email))]
    pub async fn place_order(&self, purchase: Purchase) -> Result<PurchaseResponse> {
        let Purchase {
            customer,
            shipping_address,
            billing_address,
            order,
            order_items,
        } = purchase;

        let tracking_number = TrackingNumber::generate();
        let order = Order::assemble(
            order,
            tracking_number,
            order_items,
            billing_address,
            shipping_address,
            customer.email.clone(),
        )?;

        let saved = reconciler::attach_order(&*self.store, &customer, order).await?;

        info!(%tracking_number, orders = saved.orders.len(), "order placed");
        Ok(PurchaseResponse::new(tracking_number))
    }

    /// Looks up a placed order by its tracking number.
    pub async fn track_order(&self, tracking_number: &TrackingNumber) -> Result<Option<Order>> {
        self.store.find_order(tracking_number).await
    }

    /// Returns every stored customer with their orders.
    pub async fn customers(&self) -> Result<Vec<Customer>> {
        self.store.all_customers().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerDetails;
    use crate::domain::email::Email;
    use crate::domain::order::tests::{address, item};
    use crate::domain::order::OrderShell;
    use crate::domain::ports::CustomerStore;
    use crate::error::CheckoutError;
    use crate::infrastructure::in_memory::InMemoryCustomerStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn purchase(first_name: &str, email: &str) -> Purchase {
        Purchase {
            customer: CustomerDetails {
                first_name: first_name.to_string(),
                last_name: "Doe".to_string(),
                email: Email::parse(email).unwrap(),
            },
            shipping_address: address("2 Shipping Ave"),
            billing_address: address("1 Billing St"),
            order: OrderShell {
                total_quantity: 2,
                total_price: dec!(37.98),
            },
            order_items: vec![item(1)],
        }
    }

    /// Delegates reads, fails every save.
    struct FailingStore(InMemoryCustomerStore);

    #[async_trait]
    impl CustomerStore for FailingStore {
        async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>> {
            self.0.find_by_email(email).await
        }
        async fn save(&self, _customer: Customer) -> Result<Customer> {
            Err(CheckoutError::store("disk full"))
        }
        async fn find_order(&self, tn: &TrackingNumber) -> Result<Option<Order>> {
            self.0.find_order(tn).await
        }
        async fn all_customers(&self) -> Result<Vec<Customer>> {
            self.0.all_customers().await
        }
    }

    /// Reports a conflict on the first `conflicts` saves, then delegates.
    struct ContendedStore {
        inner: InMemoryCustomerStore,
        conflicts: u32,
        saves: AtomicU32,
    }

    #[async_trait]
    impl CustomerStore for ContendedStore {
        async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>> {
            self.inner.find_by_email(email).await
        }
        async fn save(&self, customer: Customer) -> Result<Customer> {
            if self.saves.fetch_add(1, Ordering::SeqCst) < self.conflicts {
                return Err(CheckoutError::Conflict {
                    email: customer.email,
                });
            }
            self.inner.save(customer).await
        }
        async fn find_order(&self, tn: &TrackingNumber) -> Result<Option<Order>> {
            self.inner.find_order(tn).await
        }
        async fn all_customers(&self) -> Result<Vec<Customer>> {
            self.inner.all_customers().await
        }
    }

    #[tokio::test]
    async fn test_new_customer_path() {
        let store = InMemoryCustomerStore::new();
        let service = CheckoutService::new(Box::new(store.clone()));

        let response = service
            .place_order(purchase("Jane", "jane@example.com"))
            .await
            .unwrap();

        let customers = store.all_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].orders.len(), 1);
        let order = &customers[0].orders[0];
        assert_eq!(order.tracking_number.to_string(), response.order_tracking_number);
        assert_eq!(order.billing_address.street, "1 Billing St");
        assert_eq!(order.shipping_address.street, "2 Shipping Ave");
        assert_eq!(order.customer_email, customers[0].email);
    }

    #[tokio::test]
    async fn test_existing_customer_path_keeps_profile() {
        let store = InMemoryCustomerStore::new();
        let service = CheckoutService::new(Box::new(store.clone()));

        service
            .place_order(purchase("Jane", "jane@example.com"))
            .await
            .unwrap();
        service
            .place_order(purchase("Janet", "Jane@Example.com"))
            .await
            .unwrap();

        let customers = store.all_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].first_name, "Jane");
        assert_eq!(customers[0].orders.len(), 2);
    }

    #[tokio::test]
    async fn test_same_email_accumulates_under_one_customer() {
        let store = InMemoryCustomerStore::new();
        let service = CheckoutService::new(Box::new(store.clone()));

        for _ in 0..5 {
            service
                .place_order(purchase("Jane", "jane@example.com"))
                .await
                .unwrap();
        }
        service
            .place_order(purchase("John", "john@example.com"))
            .await
            .unwrap();

        let customers = store.all_customers().await.unwrap();
        assert_eq!(customers.len(), 2);
        let jane = customers
            .iter()
            .find(|c| c.email.as_str() == "jane@example.com")
            .unwrap();
        assert_eq!(jane.orders.len(), 5);
    }

    #[tokio::test]
    async fn test_tracking_numbers_unique_across_checkouts() {
        let service = CheckoutService::new(Box::new(InMemoryCustomerStore::new()));

        let mut seen = HashSet::new();
        for i in 0..500 {
            let response = service
                .place_order(purchase("Jane", &format!("customer{}@example.com", i % 7)))
                .await
                .unwrap();
            assert!(seen.insert(response.order_tracking_number));
        }
    }

    #[tokio::test]
    async fn test_placed_order_is_trackable() {
        let service = CheckoutService::new(Box::new(InMemoryCustomerStore::new()));
        let response = service
            .place_order(purchase("Jane", "jane@example.com"))
            .await
            .unwrap();

        let tracking_number: TrackingNumber = response.order_tracking_number.parse().unwrap();
        let order = service.track_order(&tracking_number).await.unwrap().unwrap();
        assert_eq!(order.items, vec![item(1)]);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let store = InMemoryCustomerStore::new();
        let service = CheckoutService::new(Box::new(store.clone()));

        let mut empty = purchase("Jane", "jane@example.com");
        empty.order_items.clear();

        let result = service.place_order(empty).await;
        assert!(matches!(result, Err(CheckoutError::EmptyOrder)));
        assert!(store.all_customers().await.unwrap().is_empty());
    }

    // Rollback of partially applied writes is covered by the RocksDB store tests.
    #[tokio::test]
    async fn test_store_failure_aborts_checkout() {
        let inner = InMemoryCustomerStore::new();
        CheckoutService::new(Box::new(inner.clone()))
            .place_order(purchase("Jane", "jane@example.com"))
            .await
            .unwrap();
        let before = inner.all_customers().await.unwrap();

        let service = CheckoutService::new(Box::new(FailingStore(inner.clone())));
        let new_customer = service.place_order(purchase("John", "john@example.com")).await;
        let existing_customer = service.place_order(purchase("Jane", "jane@example.com")).await;

        assert!(matches!(new_customer, Err(CheckoutError::Store(_))));
        assert!(matches!(existing_customer, Err(CheckoutError::Store(_))));
        assert_eq!(inner.all_customers().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_conflict_is_retried() {
        let inner = InMemoryCustomerStore::new();
        let service = CheckoutService::new(Box::new(ContendedStore {
            inner: inner.clone(),
            conflicts: 2,
            saves: AtomicU32::new(0),
        }));

        service
            .place_order(purchase("Jane", "jane@example.com"))
            .await
            .unwrap();

        let customers = inner.all_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].orders.len(), 1);
    }

    #[tokio::test]
    async fn test_persistent_conflict_surfaces_retryable_error() {
        let inner = InMemoryCustomerStore::new();
        let service = CheckoutService::new(Box::new(ContendedStore {
            inner: inner.clone(),
            conflicts: u32::MAX,
            saves: AtomicU32::new(0),
        }));

        let err = service
            .place_order(purchase("Jane", "jane@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(inner.all_customers().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_checkouts_create_one_customer() {
        let store = InMemoryCustomerStore::new();
        let service = Arc::new(CheckoutService::new(Box::new(store.clone())));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .place_order(purchase("Jane", "new@example.com"))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let customers = store.all_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].orders.len(), 2);
    }
}
