//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::{UserId, WithdrawalId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::topup::{InitiatedTopUp, ProcessorNotification};
use crate::application::withdrawal::WithdrawalInput;
use crate::domain::repository::Reconciled;
use crate::domain::signature::SignedFields;
use crate::domain::topup::{ProcessorReport, TopUpStatus, TopUpTransaction, parse_processor_time};
use crate::domain::withdrawal::{WithdrawalRequest, WithdrawalStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct InitiateTopUpRequest {
    /// Coins to buy
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateTopUpResponse {
    pub order_id: String,
    pub snap_token: String,
    pub client_key: String,
    pub amount: i64,
    pub price: i64,
}

impl From<InitiatedTopUp> for InitiateTopUpResponse {
    fn from(topup: InitiatedTopUp) -> Self {
        Self {
            order_id: topup.order_id,
            snap_token: topup.snap_token,
            client_key: topup.client_key,
            amount: topup.amount,
            price: topup.price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpResponse {
    pub order_id: String,
    pub amount: i64,
    pub price: i64,
    pub status: TopUpStatus,
    pub payment_type: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TopUpTransaction> for TopUpResponse {
    fn from(tx: TopUpTransaction) -> Self {
        Self {
            order_id: tx.order_id,
            amount: tx.amount,
            price: tx.price,
            status: tx.status,
            payment_type: tx.payment_type,
            transaction_time: tx.transaction_time,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

/// Response for POST /api/topup/{order_id}/confirm
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub order_id: String,
    pub previous_status: TopUpStatus,
    pub status: TopUpStatus,
    pub credited: i64,
}

impl From<Reconciled> for ReconcileResponse {
    fn from(reconciled: Reconciled) -> Self {
        Self {
            order_id: reconciled.transaction.order_id,
            previous_status: reconciled.outcome.previous,
            status: reconciled.outcome.current,
            credited: reconciled.outcome.credit,
        }
    }
}

/// Payment notification as posted by Midtrans. Amounts and codes arrive
/// as strings or numbers depending on the payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub order_id: Value,
    #[serde(default)]
    pub status_code: Value,
    #[serde(default)]
    pub gross_amount: Value,
    #[serde(default)]
    pub signature_key: Value,
    #[serde(default)]
    pub transaction_status: Value,
    #[serde(default)]
    pub fraud_status: Value,
    #[serde(default)]
    pub payment_type: Value,
    #[serde(default)]
    pub transaction_time: Value,
}

/// Whole numbers render without a fraction (`5000.0` becomes `5000`).
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_u64().map(|u| u.to_string()))
            .or_else(|| n.as_f64().map(|f| f.to_string()))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

impl From<WebhookPayload> for ProcessorNotification {
    fn from(payload: WebhookPayload) -> Self {
        let payment_type = text(&payload.payment_type);
        Self {
            signed: SignedFields {
                order_id: text(&payload.order_id),
                status_code: text(&payload.status_code),
                gross_amount: text(&payload.gross_amount),
                signature_key: text(&payload.signature_key),
            },
            report: ProcessorReport {
                transaction_status: text(&payload.transaction_status),
                fraud_status: text(&payload.fraud_status),
                payment_type: (!payment_type.is_empty()).then_some(payment_type),
                transaction_time: parse_processor_time(&text(&payload.transaction_time)),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalBody {
    pub coins: i64,
    pub method: String,
    pub account_name: String,
    pub account_number: String,
    #[serde(default)]
    pub note: String,
}

impl From<WithdrawalBody> for WithdrawalInput {
    fn from(body: WithdrawalBody) -> Self {
        Self {
            coins: body.coins,
            method: body.method,
            account_name: body.account_name,
            account_number: body.account_number,
            note: body.note,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    pub withdrawal_id: WithdrawalId,
    pub user_id: UserId,
    pub coins: i64,
    pub amount: i64,
    pub method: String,
    pub account_name: String,
    pub account_number: String,
    pub note: String,
    pub status: WithdrawalStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<WithdrawalRequest> for WithdrawalResponse {
    fn from(request: WithdrawalRequest) -> Self {
        Self {
            withdrawal_id: request.id,
            user_id: request.user_id,
            coins: request.coins,
            amount: request.amount,
            method: request.method,
            account_name: request.account_name,
            account_number: request.account_number,
            note: request.note,
            status: request.status,
            processed_at: request.processed_at,
            created_at: request.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_text_renders_whole_numbers_without_fraction() {
        assert_eq!(text(&json!(5000.0)), "5000");
        assert_eq!(text(&json!(200)), "200");
        assert_eq!(text(&json!(5000.5)), "5000.5");
    }

    #[test]
    fn test_text_passes_strings_and_maps_null_to_empty() {
        assert_eq!(text(&json!("5000.00")), "5000.00");
        assert_eq!(text(&Value::Null), "");
        assert_eq!(text(&json!(true)), "true");
    }

    #[test]
    fn test_numeric_webhook_fields_become_text() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "order_id": "TOPUP-abc-1700000000",
            "status_code": 200,
            "gross_amount": 5000.0,
            "signature_key": "sig",
            "transaction_status": "settlement",
        }))
        .unwrap();

        let notification = ProcessorNotification::from(payload);
        assert_eq!(notification.signed.status_code, "200");
        assert_eq!(notification.signed.gross_amount, "5000");
    }

    #[test]
    fn test_initiate_response_exposes_client_key() {
        let response = InitiateTopUpResponse::from(InitiatedTopUp {
            order_id: "TOPUP-abc-1700000000".into(),
            snap_token: "snap-token".into(),
            client_key: "SB-Mid-client-test".into(),
            amount: 500,
            price: 5_000,
        });

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["clientKey"], "SB-Mid-client-test");
        assert_eq!(body["snapToken"], "snap-token");
    }
}
