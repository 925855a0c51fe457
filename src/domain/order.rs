use {
    super::token::{PaymentToken, TransactionId},
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
};

/// One purchasable position in an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    id: String,
    name: String,
    description: String,
    unit_price: Decimal,
    quantity: u32,
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            unit_price,
            quantity,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Read-only order snapshot owned by the order system.
///
/// The declared total is not assumed to match the line items; the payload
/// builder validates that at charge time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: String,
    items: Vec<LineItem>,
    total: Decimal,
    currency: String,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        items: Vec<LineItem>,
        total: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            items,
            total,
            currency: currency.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// Historical order record used by the legacy notification path to recover
/// a payment token from a previously stored transaction id.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    id: String,
    payment_token: Option<PaymentToken>,
    transaction_id: Option<TransactionId>,
}

impl OrderRecord {
    pub fn new(
        id: impl Into<String>,
        payment_token: Option<PaymentToken>,
        transaction_id: Option<TransactionId>,
    ) -> Self {
        Self {
            id: id.into(),
            payment_token,
            transaction_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payment_token(&self) -> Option<&PaymentToken> {
        self.payment_token.as_ref()
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }
}
