use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::CheckoutError;

fn non_blank(value: impl Into<String>, what: &str) -> Result<String, CheckoutError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(CheckoutError::Validation(format!("{what} must not be empty")));
    }
    Ok(value)
}

/// Order-system-issued correlator tying a browser session to exactly one
/// order for the duration of the multi-step checkout. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentToken(String);

impl PaymentToken {
    pub fn new(token: impl Into<String>) -> Result<Self, CheckoutError> {
        Ok(Self(non_blank(token, "payment token")?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Gateway-issued correlator for one checkout attempt. Arrives in the
/// returning browser request, so it is untrusted until confirmed by a
/// server-side details fetch.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Result<Self, CheckoutError> {
        Ok(Self(non_blank(token, "session token")?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Payer identifier returned by the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayerId(String);

impl PayerId {
    pub fn new(id: impl Into<String>) -> Result<Self, CheckoutError> {
        Ok(Self(non_blank(id, "payer id")?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durable correlation key for a charge and every later notification about
/// it, including refunds and reversals that reference it as a parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Result<Self, CheckoutError> {
        Ok(Self(non_blank(id, "transaction id")?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_are_rejected() {
        assert!(PaymentToken::new("").is_err());
        assert!(PaymentToken::new("   ").is_err());
        assert!(SessionToken::new("").is_err());
        assert!(PayerId::new("").is_err());
        assert!(TransactionId::new("").is_err());
    }

    #[test]
    fn tokens_keep_their_value() {
        let token = PaymentToken::new("abc123").unwrap();
        assert_eq!(token.as_str(), "abc123");
        assert_eq!(token.to_string(), "abc123");
    }
}
