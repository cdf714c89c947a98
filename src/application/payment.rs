use crate::domain::payment::{PaymentInfo, PaymentIntent, PaymentIntentRequest};
use crate::domain::ports::PaymentGatewayBox;
use crate::error::GatewayError;
use tracing::{info, instrument};

/// Creates payment intents ahead of order placement.
///
/// Independent of the customer store: an intent can be created and then
/// abandoned without leaving any local trace.
pub struct PaymentIntentService {
    gateway: PaymentGatewayBox,
}

impl PaymentIntentService {
    pub fn new(gateway: PaymentGatewayBox) -> Self {
        Self { gateway }
    }

    /// Translates `payment_info` into the gateway's card intent request and
    /// returns the gateway's answer untouched, success or failure.
    #[instrument(skip_all, fields(amount = payment_info.amount, currency = %payment_info.currency))]
    pub async fn create_payment_intent(
        &self,
        payment_info: PaymentInfo,
    ) -> Result<PaymentIntent, GatewayError> {
        let request = PaymentIntentRequest::from(payment_info);
        let intent = self.gateway.create_payment_intent(&request).await?;
        info!(id = intent.id().unwrap_or_default(), "payment intent created");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PaymentGateway;
    use crate::infrastructure::in_memory::InMemoryPaymentGateway;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Answers every request with a canned outcome and keeps what it was sent.
    struct ScriptedGateway {
        outcome: Result<serde_json::Value, GatewayError>,
        seen: Arc<Mutex<Vec<PaymentIntentRequest>>>,
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn create_payment_intent(
            &self,
            request: &PaymentIntentRequest,
        ) -> Result<PaymentIntent, GatewayError> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcome.clone().map(PaymentIntent::new)
        }
    }

    fn info() -> PaymentInfo {
        PaymentInfo {
            amount: 1999,
            currency: "usd".to_string(),
            receipt_email: "a@b.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_request_shape_and_verbatim_response() {
        let document = json!({
            "id": "pi_1",
            "client_secret": "pi_1_secret",
            "livemode": false,
            "unexpected_field": [1, 2, 3],
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let service = PaymentIntentService::new(Box::new(ScriptedGateway {
            outcome: Ok(document.clone()),
            seen: Arc::clone(&seen),
        }));

        let intent = service.create_payment_intent(info()).await.unwrap();
        assert_eq!(intent.into_json(), document);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            serde_json::to_value(&seen[0]).unwrap(),
            json!({
                "amount": 1999,
                "currency": "usd",
                "payment_method_types": ["card"],
                "description": "Shop purchase",
                "receipt_email": "a@b.com",
            })
        );
    }

    #[tokio::test]
    async fn test_gateway_error_passes_through() {
        let error = GatewayError::Rejected {
            status: 402,
            message: "Your card was declined.".to_string(),
            body: json!({"error": {"code": "card_declined"}}),
        };
        let service = PaymentIntentService::new(Box::new(ScriptedGateway {
            outcome: Err(error.clone()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }));

        let result = service.create_payment_intent(info()).await;
        assert_eq!(result, Err(error));
    }

    #[tokio::test]
    async fn test_amount_is_not_revalidated_locally() {
        let gateway = InMemoryPaymentGateway::new();
        let service = PaymentIntentService::new(Box::new(gateway.clone()));

        let result = service
            .create_payment_intent(PaymentInfo {
                amount: -5,
                ..info()
            })
            .await;

        assert!(matches!(result, Err(GatewayError::Rejected { .. })));
        // The request still reached the gateway.
        assert_eq!(gateway.requests().await[0].amount, -5);
    }
}
