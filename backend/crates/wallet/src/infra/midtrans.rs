//! Midtrans Payment Gateway
//!
//! Snap opens the hosted payment page; the Core API status endpoint backs
//! the poll path. Both authenticate with the server key as the basic-auth
//! user name.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::application::config::MidtransEnvironment;
use crate::domain::gateway::{GatewayError, PaymentGateway, PaymentSessionRequest};
use crate::domain::topup::{ProcessorReport, parse_processor_time};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct MidtransGateway {
    client: Client,
    server_key: String,
    environment: MidtransEnvironment,
}

impl MidtransGateway {
    pub fn new(server_key: impl Into<String>, environment: MidtransEnvironment) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            server_key: server_key.into(),
            environment,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: Option<String>,
    #[serde(default)]
    error_messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status_code: Option<String>,
    status_message: Option<String>,
    transaction_status: Option<String>,
    fraud_status: Option<String>,
    payment_type: Option<String>,
    transaction_time: Option<String>,
}

impl PaymentGateway for MidtransGateway {
    async fn create_payment_session(&self, request: &PaymentSessionRequest) -> Result<String, GatewayError> {
        let items: Vec<_> = request
            .items
            .iter()
            .map(|item| {
                json!({
                    "id": item.id,
                    "name": item.name,
                    "price": item.price,
                    "quantity": item.quantity,
                })
            })
            .collect();
        let body = json!({
            "transaction_details": {
                "order_id": request.order_id,
                "gross_amount": request.gross_amount,
            },
            "customer_details": {
                "first_name": request.customer.name,
                "email": request.customer.email,
            },
            "item_details": items,
        });

        let response = self
            .client
            .post(self.environment.snap_url())
            .basic_auth(&self.server_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let snap: SnapResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        match snap.token {
            Some(token) if status.is_success() => Ok(token),
            _ => Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: snap.error_messages.join("; "),
            }),
        }
    }

    async fn query_transaction_status(&self, order_id: &str) -> Result<ProcessorReport, GatewayError> {
        let url = format!("{}/v2/{}/status", self.environment.api_base_url(), order_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.server_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let http_status = response.status();
        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        // Errors such as an unknown order come back as HTTP 200 with a
        // non-2xx `status_code` in the body and no `transaction_status`.
        let Some(transaction_status) = body.transaction_status else {
            let status = body
                .status_code
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(http_status.as_u16());
            return Err(GatewayError::Rejected {
                status,
                message: body.status_message.unwrap_or_default(),
            });
        };

        Ok(ProcessorReport {
            transaction_status,
            fraud_status: body.fraud_status.unwrap_or_default(),
            payment_type: body.payment_type,
            transaction_time: body
                .transaction_time
                .as_deref()
                .and_then(parse_processor_time),
        })
    }
}
