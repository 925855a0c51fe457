use {
    chrono::{DateTime, Utc},
    uuid::Uuid,
};

/// One forensic record: what happened, for which checkout, for which
/// transaction, with the evidence attached.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub message: String,
    pub payment_token: Option<String>,
    pub transaction_id: Option<String>,
    pub detail: serde_json::Value,
}

impl AuditEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            recorded_at: Utc::now(),
            message: message.into(),
            payment_token: None,
            transaction_id: None,
            detail: serde_json::Value::Null,
        }
    }

    pub fn payment_token(mut self, token: impl Into<String>) -> Self {
        self.payment_token = Some(token.into());
        self
    }

    pub fn transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Destination for audit entries. Every significant event — success,
/// failure, amount mismatch, discarded notification — goes through here.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Production sink: structured tracing events, correlated by token and
/// transaction id.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        tracing::info!(
            audit_id = %entry.id,
            payment_token = entry.payment_token.as_deref().unwrap_or(""),
            transaction_id = entry.transaction_id.as_deref().unwrap_or(""),
            detail = %entry.detail,
            "{}",
            entry.message
        );
    }
}
