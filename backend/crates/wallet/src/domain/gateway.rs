//! Payment Gateway Port

use thiserror::Error;

use crate::domain::topup::ProcessorReport;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

/// Everything needed to open a hosted payment page
#[derive(Debug, Clone)]
pub struct PaymentSessionRequest {
    pub order_id: String,
    /// IDR
    pub gross_amount: i64,
    pub customer: Customer,
    pub items: Vec<LineItem>,
}

#[trait_variant::make(PaymentGateway: Send)]
pub trait LocalPaymentGateway {
    /// Returns the payment-session token for the client
    async fn create_payment_session(&self, request: &PaymentSessionRequest) -> Result<String, GatewayError>;

    async fn query_transaction_status(&self, order_id: &str) -> Result<ProcessorReport, GatewayError>;
}
