#![allow(dead_code)]

use {
    async_trait::async_trait,
    rust_decimal_macros::dec,
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
    tixpay::{
        domain::{
            audit::{AuditEntry, AuditSink},
            error::CheckoutError,
            gateway::ExpressGateway,
            nvp::{NvpPayload, NvpResponse},
            order::{LineItem, Order},
            token::{PaymentToken, SessionToken},
        },
        infra::memory::MemoryOrderSystem,
        services::checkout::CheckoutService,
    },
};

enum Scripted {
    Body(String),
    Transport,
}

/// Gateway double scripted per METHOD field. Unscripted methods answer
/// with an empty body, which the state machine reads as a gateway failure
/// (no ACK).
#[derive(Default)]
pub struct MockGateway {
    responses: Mutex<HashMap<String, Scripted>>,
    verified: Mutex<bool>,
    requests: Mutex<Vec<NvpPayload>>,
    verify_calls: Mutex<u32>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            verified: Mutex::new(true),
            ..Self::default()
        }
    }

    pub fn respond(&self, method: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Scripted::Body(body.to_string()));
    }

    pub fn fail_transport(&self, method: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Scripted::Transport);
    }

    pub fn set_verified(&self, verified: bool) {
        *self.verified.lock().unwrap() = verified;
    }

    pub fn requests(&self) -> Vec<NvpPayload> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, method: &str) -> Vec<NvpPayload> {
        self.requests()
            .into_iter()
            .filter(|p| p.get("METHOD") == Some(method))
            .collect()
    }

    pub fn verify_calls(&self) -> u32 {
        *self.verify_calls.lock().unwrap()
    }
}

#[async_trait]
impl ExpressGateway for MockGateway {
    async fn request(&self, payload: &NvpPayload) -> Result<NvpResponse, CheckoutError> {
        self.requests.lock().unwrap().push(payload.clone());
        let method = payload.get("METHOD").unwrap_or("").to_string();
        match self.responses.lock().unwrap().get(&method) {
            Some(Scripted::Body(body)) => Ok(NvpResponse::parse(body)),
            Some(Scripted::Transport) => Err(CheckoutError::Transport(
                "scripted transport failure".into(),
            )),
            None => Ok(NvpResponse::parse("")),
        }
    }

    async fn verify_notification(&self, _raw_body: &str) -> bool {
        *self.verify_calls.lock().unwrap() += 1;
        *self.verified.lock().unwrap()
    }

    fn checkout_redirect_url(&self, session_token: &SessionToken) -> String {
        format!("https://checkout.test/pay?token={}", session_token.as_str())
    }
}

/// Audit double collecting entries in memory.
#[derive(Default)]
pub struct CollectingAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl CollectingAudit {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditSink for CollectingAudit {
    fn record(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

pub const TICKETS_URL: &str = "https://conf.test/tickets";
pub const EVENT_LABEL: &str = "Conf 2026";

pub struct Harness {
    pub gateway: Arc<MockGateway>,
    pub orders: Arc<MemoryOrderSystem>,
    pub audit: Arc<CollectingAudit>,
    pub service: CheckoutService,
}

pub fn harness() -> Harness {
    harness_with_currency("USD")
}

pub fn harness_with_currency(currency: &str) -> Harness {
    let gateway = Arc::new(MockGateway::new());
    let orders = Arc::new(MemoryOrderSystem::new(currency, TICKETS_URL));
    let audit = Arc::new(CollectingAudit::default());
    let service = CheckoutService::new(
        gateway.clone(),
        orders.clone(),
        audit.clone(),
        EVENT_LABEL,
    );
    Harness {
        gateway,
        orders,
        audit,
        service,
    }
}

pub fn token(s: &str) -> PaymentToken {
    PaymentToken::new(s).unwrap()
}

/// Two tickets at 25.00, total 50.00 USD.
pub fn fifty_dollar_order() -> Order {
    Order::new(
        "order-1",
        vec![LineItem::new(
            "ticket-1",
            "General Admission",
            "Entry for one attendee",
            dec!(25.00),
            2,
        )],
        dec!(50.00),
        "USD",
    )
}
