use {
    crate::domain::{
        order::{Order, OrderRecord},
        order_system::OrderSystem,
        outcome::PaymentData,
        status::CanonicalStatus,
        token::{PaymentToken, TransactionId},
    },
    async_trait::async_trait,
    std::{
        collections::{HashMap, HashSet},
        sync::Mutex,
    },
};

/// One `apply_payment_result` call, kept verbatim for inspection.
#[derive(Debug, Clone)]
pub struct AppliedResult {
    pub token: PaymentToken,
    pub status: CanonicalStatus,
    pub data: Option<PaymentData>,
}

/// In-memory order system backing the demo wiring and the integration
/// tests. Result application is last-write-wins on the per-token status,
/// which is exactly the idempotency contract the checkout core relies on;
/// the full call log stays available so tests can assert on duplicates.
#[derive(Default)]
pub struct MemoryOrderSystem {
    orders: Mutex<HashMap<String, Order>>,
    records: Mutex<Vec<OrderRecord>>,
    unavailable: Mutex<HashSet<String>>,
    applied: Mutex<Vec<AppliedResult>>,
    statuses: Mutex<HashMap<String, CanonicalStatus>>,
    currency: String,
    tickets_url: String,
}

impl MemoryOrderSystem {
    pub fn new(currency: impl Into<String>, tickets_url: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            tickets_url: tickets_url.into(),
            ..Self::default()
        }
    }

    pub fn insert_order(&self, token: &PaymentToken, order: Order) {
        self.orders
            .lock()
            .expect("orders lock poisoned")
            .insert(token.as_str().to_string(), order);
    }

    pub fn insert_record(&self, record: OrderRecord) {
        self.records
            .lock()
            .expect("records lock poisoned")
            .push(record);
    }

    /// Makes `verify_order` fail for the given order id.
    pub fn mark_unavailable(&self, order_id: &str) {
        self.unavailable
            .lock()
            .expect("unavailable lock poisoned")
            .insert(order_id.to_string());
    }

    /// Every result application so far, in call order.
    pub fn applied(&self) -> Vec<AppliedResult> {
        self.applied.lock().expect("applied lock poisoned").clone()
    }

    pub fn applied_for(&self, token: &PaymentToken) -> Vec<AppliedResult> {
        self.applied()
            .into_iter()
            .filter(|r| &r.token == token)
            .collect()
    }

    /// Current per-token status after all applications.
    pub fn status_of(&self, token: &PaymentToken) -> Option<CanonicalStatus> {
        self.statuses
            .lock()
            .expect("statuses lock poisoned")
            .get(token.as_str())
            .copied()
    }
}

#[async_trait]
impl OrderSystem for MemoryOrderSystem {
    async fn order_for_token(&self, token: &PaymentToken) -> Option<Order> {
        self.orders
            .lock()
            .expect("orders lock poisoned")
            .get(token.as_str())
            .cloned()
    }

    async fn verify_order(&self, order: &Order) -> bool {
        !self
            .unavailable
            .lock()
            .expect("unavailable lock poisoned")
            .contains(order.id())
    }

    async fn apply_payment_result(
        &self,
        token: &PaymentToken,
        status: CanonicalStatus,
        data: Option<PaymentData>,
    ) {
        self.applied
            .lock()
            .expect("applied lock poisoned")
            .push(AppliedResult {
                token: token.clone(),
                status,
                data,
            });
        self.statuses
            .lock()
            .expect("statuses lock poisoned")
            .insert(token.as_str().to_string(), status);
    }

    async fn find_order_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Option<OrderRecord> {
        self.records
            .lock()
            .expect("records lock poisoned")
            .iter()
            .rev()
            .find(|record| record.transaction_id() == Some(transaction_id))
            .cloned()
    }

    async fn stored_payment_token(&self, record: &OrderRecord) -> Option<PaymentToken> {
        record.payment_token().cloned()
    }

    fn configured_currency(&self) -> String {
        self.currency.clone()
    }

    fn tickets_page_url(&self) -> String {
        self.tickets_url.clone()
    }
}
