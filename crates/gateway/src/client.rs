use async_trait::async_trait;
use metrics::counter;
use tracing::warn;

use streamrich_domain::config::GatewayConfig;

use crate::types::{Envelope, InitializeBody, VerifyData};
use crate::{
    GatewayError, InitializeRequest, InitializedTransaction, PaymentGateway, VerifiedTransaction,
};

/// The gateway bills in its minor unit (e.g. kobo), local amounts are major.
const MINOR_UNIT_SCALE: i64 = 100;

/// REST client for a Paystack-style gateway, authenticated with the bearer
/// secret key.
pub struct PaystackClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl PaystackClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url().trim_end_matches('/'), path)
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializedTransaction, GatewayError> {
        let body = InitializeBody {
            email: &request.email,
            amount: request.amount * MINOR_UNIT_SCALE,
            reference: &request.reference,
            callback_url: self.config.callback_url(),
            metadata: &request.metadata,
        };

        let response = self
            .http
            .post(self.endpoint("transaction/initialize"))
            .bearer_auth(self.config.secret_key())
            .json(&body)
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                counter!("gateway_requests_total", "endpoint" => "initialize", "result" => "transport_error")
                    .increment(1);
                warn!(reference = %request.reference, %err, "gateway initialize failed");
                return Err(err.into());
            }
        };

        let envelope: Envelope<InitializedTransaction> = response.json().await?;
        if !envelope.status {
            counter!("gateway_requests_total", "endpoint" => "initialize", "result" => "rejected")
                .increment(1);
            return Err(GatewayError::Rejected(envelope.message));
        }
        counter!("gateway_requests_total", "endpoint" => "initialize", "result" => "ok")
            .increment(1);
        envelope
            .data
            .ok_or_else(|| GatewayError::Decode("initialize response missing data".to_string()))
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        let response = self
            .http
            .get(self.endpoint(&format!("transaction/verify/{reference}")))
            .bearer_auth(self.config.secret_key())
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                counter!("gateway_requests_total", "endpoint" => "verify", "result" => "transport_error")
                    .increment(1);
                warn!(reference, %err, "gateway verify failed");
                return Err(err.into());
            }
        };

        let envelope: Envelope<serde_json::Value> = response.json().await?;
        if !envelope.status {
            counter!("gateway_requests_total", "endpoint" => "verify", "result" => "rejected")
                .increment(1);
            return Err(GatewayError::Rejected(envelope.message));
        }
        let raw = envelope
            .data
            .ok_or_else(|| GatewayError::Decode("verify response missing data".to_string()))?;
        let data: VerifyData = serde_json::from_value(raw.clone())
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        counter!("gateway_requests_total", "endpoint" => "verify", "result" => "ok").increment(1);

        Ok(VerifiedTransaction {
            status: data.status,
            reference: data.reference,
            amount: data.amount,
            paid_at: data.paid_at,
            raw,
        })
    }
}
