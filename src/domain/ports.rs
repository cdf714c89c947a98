use super::customer::Customer;
use super::email::Email;
use super::order::{Order, TrackingNumber};
use super::payment::{PaymentIntent, PaymentIntentRequest};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;

/// Durable home of customer aggregates, keyed by email.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>>;

    /// Persists the customer and every order reachable from it as one unit.
    ///
    /// Compare-and-swap on [`Customer::version`]: when the stored version does
    /// not match (including a record that appeared for a customer believed to
    /// be new) nothing is written and `CheckoutError::Conflict` is returned.
    /// On success the saved customer is returned with its version bumped.
    async fn save(&self, customer: Customer) -> Result<Customer>;

    async fn find_order(&self, tracking_number: &TrackingNumber) -> Result<Option<Order>>;

    async fn all_customers(&self) -> Result<Vec<Customer>>;
}

/// External service that creates payment intents.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> std::result::Result<PaymentIntent, GatewayError>;
}

pub type CustomerStoreBox = Box<dyn CustomerStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
