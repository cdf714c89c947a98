use crate::domain::payment::{PaymentIntent, PaymentIntentRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::GatewayError;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Credentials and endpoint for the hosted payment gateway.
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Payment gateway adapter speaking the Stripe REST API.
///
/// Sends one form-encoded `POST /v1/payment_intents` per call. Successful
/// responses are returned as-is; error responses become
/// [`GatewayError::Rejected`] with the gateway's own message and body. No
/// retries are attempted here.
#[derive(Clone, Debug)]
pub struct StripeGateway {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip_all, fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.secret_key, Some(""))
            .form(&request.form_params())
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Error pages from proxies in front of the gateway are often not JSON.
            let text = response
                .text()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            let body = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::Value::String(text.clone()));
            let message = body
                .pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown gateway error")
                        .to_string()
                });
            warn!(status = status.as_u16(), %message, "payment intent rejected");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let intent = PaymentIntent::new(body);
        debug!(id = intent.id().unwrap_or_default(), "payment intent created");
        Ok(intent)
    }
}
