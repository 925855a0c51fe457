use {
    super::order::{Order, OrderRecord},
    super::outcome::PaymentData,
    super::status::CanonicalStatus,
    super::token::{PaymentToken, TransactionId},
    async_trait::async_trait,
};

/// The surrounding registration system, as consumed by the checkout core.
///
/// All durable state lives behind this trait; the core persists nothing
/// between entry points.
#[async_trait]
pub trait OrderSystem: Send + Sync {
    /// Order correlated to a payment token, if the token is known.
    async fn order_for_token(&self, token: &PaymentToken) -> Option<Order>;

    /// Last-moment availability check before a charge is attempted.
    async fn verify_order(&self, order: &Order) -> bool;

    /// Applies a canonical payment result to the order record.
    ///
    /// Both the browser return flow and the asynchronous notification flow
    /// can emit a result for the same token, so this must be safe to call
    /// more than once with the same logical outcome. The core deliberately
    /// does not deduplicate.
    async fn apply_payment_result(
        &self,
        token: &PaymentToken,
        status: CanonicalStatus,
        data: Option<PaymentData>,
    );

    /// Most recent order record whose stored transaction id matches.
    /// Legacy notification path only.
    async fn find_order_by_transaction(&self, transaction_id: &TransactionId)
        -> Option<OrderRecord>;

    /// Payment token persisted on a historical record, if any.
    /// Legacy notification path only.
    async fn stored_payment_token(&self, record: &OrderRecord) -> Option<PaymentToken>;

    /// Currency the registration system is configured to sell in.
    fn configured_currency(&self) -> String;

    /// Public tickets page; callback URLs are built on top of it and
    /// resolved results send the browser back to it.
    fn tickets_page_url(&self) -> String;
}
