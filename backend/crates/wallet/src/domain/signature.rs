//! Webhook Signature
//!
//! `signature_key = hex(SHA-512(order_id || status_code || gross_amount || server_key))`

use platform::crypto::{constant_time_eq, sha512_hex};

/// Signed fields of a processor notification, already rendered as text
#[derive(Debug, Clone)]
pub struct SignedFields {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
}

impl SignedFields {
    pub fn expected_signature(&self, server_key: &str) -> String {
        sha512_hex(&[
            self.order_id.as_str(),
            self.status_code.as_str(),
            self.gross_amount.as_str(),
            server_key,
        ])
    }

    pub fn verify(&self, server_key: &str) -> bool {
        let expected = self.expected_signature(server_key);
        constant_time_eq(expected.as_bytes(), self.signature_key.as_bytes())
    }
}
