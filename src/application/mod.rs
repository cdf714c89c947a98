//! Application layer containing the checkout orchestration.
//!
//! `CheckoutService` places orders against a customer store and
//! `PaymentIntentService` builds payment intents against a gateway. The two
//! share no state and can run in any order.

pub mod checkout;
pub mod payment;
pub mod reconciler;
