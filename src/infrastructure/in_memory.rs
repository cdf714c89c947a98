use crate::domain::customer::Customer;
use crate::domain::email::Email;
use crate::domain::order::{Order, TrackingNumber};
use crate::domain::payment::{PaymentIntent, PaymentIntentRequest};
use crate::domain::ports::{CustomerStore, PaymentGateway};
use crate::error::{CheckoutError, GatewayError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct StoreState {
    customers: HashMap<Email, Customer>,
    /// Tracking number -> owning customer email.
    orders: HashMap<TrackingNumber, Email>,
}

/// A thread-safe in-memory customer store.
///
/// Uses `Arc<RwLock<..>>` so clones share the same data. `save` checks the
/// version and writes both the customer and the tracking index under a single
/// write lock, which makes it atomic with respect to every other call.
#[derive(Default, Clone)]
pub struct InMemoryCustomerStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryCustomerStore {
    /// Creates a new, empty in-memory customer store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>> {
        let state = self.state.read().await;
        Ok(state.customers.get(email).cloned())
    }

    async fn save(&self, mut customer: Customer) -> Result<Customer> {
        let mut state = self.state.write().await;

        let stored_version = state
            .customers
            .get(&customer.email)
            .map_or(0, |existing| existing.version);
        if stored_version != customer.version {
            return Err(CheckoutError::Conflict {
                email: customer.email,
            });
        }

        for order in &customer.orders {
            if let Some(owner) = state.orders.get(&order.tracking_number)
                && *owner != customer.email
            {
                return Err(CheckoutError::store(format!(
                    "Tracking number {} already assigned",
                    order.tracking_number
                )));
            }
        }

        customer.version += 1;
        for order in &customer.orders {
            state
                .orders
                .insert(order.tracking_number, customer.email.clone());
        }
        state
            .customers
            .insert(customer.email.clone(), customer.clone());

        Ok(customer)
    }

    async fn find_order(&self, tracking_number: &TrackingNumber) -> Result<Option<Order>> {
        let state = self.state.read().await;
        let order = state
            .orders
            .get(tracking_number)
            .and_then(|email| state.customers.get(email))
            .and_then(|customer| {
                customer
                    .orders
                    .iter()
                    .find(|order| order.tracking_number == *tracking_number)
            })
            .cloned();
        Ok(order)
    }

    async fn all_customers(&self) -> Result<Vec<Customer>> {
        let state = self.state.read().await;
        let mut customers: Vec<Customer> = state.customers.values().cloned().collect();
        customers.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(customers)
    }
}

/// Offline stand-in for the payment gateway.
///
/// Records every request it receives and answers with a fabricated intent
/// document. Non-positive amounts and malformed currency codes are rejected
/// the way the hosted gateway rejects them.
#[derive(Default, Clone)]
pub struct InMemoryPaymentGateway {
    requests: Arc<Mutex<Vec<PaymentIntentRequest>>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().await.clone()
    }

    fn reject(param: &str, message: &str) -> GatewayError {
        GatewayError::Rejected {
            status: 400,
            message: message.to_string(),
            body: json!({
                "error": {
                    "type": "invalid_request_error",
                    "param": param,
                    "message": message,
                }
            }),
        }
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> std::result::Result<PaymentIntent, GatewayError> {
        self.requests.lock().await.push(request.clone());

        if request.amount <= 0 {
            return Err(Self::reject(
                "amount",
                "This value must be greater than or equal to 1.",
            ));
        }
        if request.currency.len() != 3 || !request.currency.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(Self::reject(
                "currency",
                &format!("Invalid currency: {}", request.currency),
            ));
        }

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let client_secret = format!("{id}_secret_{}", Uuid::new_v4().simple());
        Ok(PaymentIntent::new(json!({
            "id": id,
            "object": "payment_intent",
            "amount": request.amount,
            "currency": request.currency.to_lowercase(),
            "payment_method_types": request.payment_method_types,
            "description": request.description,
            "receipt_email": request.receipt_email,
            "client_secret": client_secret,
            "status": "requires_payment_method",
        })))
    }
}
