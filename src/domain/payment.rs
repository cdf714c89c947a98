use serde::{Deserialize, Serialize};

/// The only payment instrument offered at checkout.
pub const CARD_PAYMENT_METHOD: &str = "card";
/// Description attached to every payment intent.
pub const PAYMENT_DESCRIPTION: &str = "Shop purchase";

/// Monetary request submitted before an order is placed. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// Amount in minor currency units (e.g. cents).
    pub amount: i64,
    pub currency: String,
    pub receipt_email: String,
}

/// The exact parameter set sent to the payment gateway.
///
/// Amount and currency are forwarded untouched; the gateway owns their
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
    pub description: String,
    pub receipt_email: String,
}

impl PaymentIntentRequest {
    /// Flattens the request into form parameters, with list values in
    /// bracket notation.
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.clone()),
        ];
        params.extend(
            self.payment_method_types
                .iter()
                .map(|method| ("payment_method_types[]".to_string(), method.clone())),
        );
        params.push(("description".to_string(), self.description.clone()));
        params.push(("receipt_email".to_string(), self.receipt_email.clone()));
        params
    }
}

impl From<PaymentInfo> for PaymentIntentRequest {
    fn from(info: PaymentInfo) -> Self {
        Self {
            amount: info.amount,
            currency: info.currency,
            payment_method_types: vec![CARD_PAYMENT_METHOD.to_string()],
            description: PAYMENT_DESCRIPTION.to_string(),
            receipt_email: info.receipt_email,
        }
    }
}

/// Gateway-issued payment intent, kept exactly as the gateway returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentIntent(serde_json::Value);

impl PaymentIntent {
    pub fn new(document: serde_json::Value) -> Self {
        Self(document)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }

    /// Secret the client uses to confirm the payment.
    pub fn client_secret(&self) -> Option<&str> {
        self.0.get("client_secret").and_then(serde_json::Value::as_str)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }
}
