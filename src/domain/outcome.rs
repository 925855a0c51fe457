use {
    super::status::CanonicalStatus,
    super::token::TransactionId,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    std::fmt,
};

/// Transaction evidence attached to a payment result on charge outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentData {
    pub transaction_id: Option<TransactionId>,
    pub error_code: Option<String>,
    /// Full flat gateway response the result was derived from, kept for
    /// forensic review.
    pub raw: BTreeMap<String, String>,
}

impl PaymentData {
    pub fn for_transaction(transaction_id: TransactionId, raw: BTreeMap<String, String>) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            error_code: None,
            raw,
        }
    }

    pub fn for_error_code(error_code: impl Into<String>) -> Self {
        Self {
            transaction_id: None,
            error_code: Some(error_code.into()),
            raw: BTreeMap::new(),
        }
    }
}

/// What a browser-facing entry point produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Send the browser to the gateway's hosted checkout page.
    Redirect(String),
    /// A payment result was emitted to the order system.
    Resolved(CanonicalStatus),
}

/// Why an asynchronous notification was dropped without emitting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    UnverifiedSignature,
    MissingTransactionId,
    MissingPaymentStatus,
    TransactionLookupFailed,
    UnmatchedTransaction,
    MissingStoredToken,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnverifiedSignature => "unverified signature",
            Self::MissingTransactionId => "missing transaction id",
            Self::MissingPaymentStatus => "missing payment status",
            Self::TransactionLookupFailed => "transaction lookup failed",
            Self::UnmatchedTransaction => "unmatched transaction",
            Self::MissingStoredToken => "missing stored token",
        };
        write!(f, "{s}")
    }
}

/// Notifications either apply a status or are discarded silently; the
/// webhook sender always gets an acknowledgement either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Applied(CanonicalStatus),
    Discarded(DiscardReason),
}
