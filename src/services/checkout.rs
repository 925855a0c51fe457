use {
    crate::domain::{
        audit::{AuditEntry, AuditSink},
        error::CheckoutError,
        gateway::ExpressGateway,
        nvp::{NvpPayload, NvpResponse},
        order_system::OrderSystem,
        outcome::{CheckoutOutcome, DiscardReason, NotifyOutcome, PaymentData},
        status::CanonicalStatus,
        token::{PayerId, PaymentToken, SessionToken, TransactionId},
    },
    crate::services::payload::{fill_payload_with_order, format_amount},
    rust_decimal::Decimal,
    std::str::FromStr,
    std::sync::Arc,
};

/// Discriminator carried on every callback URL and inbound request.
pub const PAYMENT_METHOD: &str = "paypal";

/// Currencies the express-checkout gateway accepts.
pub const SUPPORTED_CURRENCIES: [&str; 7] = ["USD", "EUR", "CAD", "NOK", "PLN", "JPY", "GBP"];

fn required_token<T>(
    value: Option<&str>,
    build: impl FnOnce(&str) -> Result<T, CheckoutError>,
) -> Result<T, CheckoutError> {
    match value {
        Some(v) => build(v.trim()).map_err(|_| CheckoutError::EmptyToken),
        None => Err(CheckoutError::EmptyToken),
    }
}

/// Checkout initiation: the user picked this payment method and is about
/// to be sent to the hosted checkout page.
#[derive(Debug)]
pub struct InitiateRequest {
    payment_token: PaymentToken,
}

impl InitiateRequest {
    pub fn new(payment_token: Option<&str>) -> Result<Self, CheckoutError> {
        Ok(Self {
            payment_token: required_token(payment_token, |v| PaymentToken::new(v))?,
        })
    }
}

/// Browser came back from the hosted page after the user clicked Pay.
/// Nothing has been charged yet at this point.
#[derive(Debug)]
pub struct ReturnRequest {
    payment_token: PaymentToken,
    session_token: SessionToken,
    payer_id: PayerId,
}

impl ReturnRequest {
    pub fn new(
        payment_token: Option<&str>,
        session_token: Option<&str>,
        payer_id: Option<&str>,
    ) -> Result<Self, CheckoutError> {
        Ok(Self {
            payment_token: required_token(payment_token, |v| PaymentToken::new(v))?,
            session_token: required_token(session_token, |v| SessionToken::new(v))?,
            payer_id: required_token(payer_id, |v| PayerId::new(v))?,
        })
    }
}

/// Browser came back via the cancel URL.
#[derive(Debug)]
pub struct CancelRequest {
    payment_token: PaymentToken,
    #[allow(dead_code)]
    session_token: SessionToken,
}

impl CancelRequest {
    pub fn new(
        payment_token: Option<&str>,
        session_token: Option<&str>,
    ) -> Result<Self, CheckoutError> {
        Ok(Self {
            payment_token: required_token(payment_token, |v| PaymentToken::new(v))?,
            session_token: required_token(session_token, |v| SessionToken::new(v))?,
        })
    }
}

/// Asynchronous server-to-server notification. The raw body is kept
/// verbatim because signature verification echoes it back exactly as
/// received.
#[derive(Debug)]
pub struct NotifyRequest {
    payment_token: PaymentToken,
    raw_body: String,
    fields: NvpResponse,
}

impl NotifyRequest {
    pub fn new(payment_token: Option<&str>, raw_body: impl Into<String>) -> Result<Self, CheckoutError> {
        Ok(Self::with_token(
            required_token(payment_token, |v| PaymentToken::new(v))?,
            raw_body,
        ))
    }

    /// Re-entry point for the legacy adapter once it has recovered a token.
    pub fn with_token(payment_token: PaymentToken, raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        let fields = NvpResponse::parse(&raw_body);
        Self {
            payment_token,
            raw_body,
            fields,
        }
    }
}

/// Old-style notification that carries no payment token; the token is
/// recovered from historical order records by transaction id.
#[derive(Debug)]
pub struct LegacyNotifyRequest {
    raw_body: String,
    fields: NvpResponse,
}

impl LegacyNotifyRequest {
    pub fn new(raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        let fields = NvpResponse::parse(&raw_body);
        Self { raw_body, fields }
    }
}

/// Notifications about refunds and reversals reference the original charge
/// through `parent_txn_id`; preferring it keeps later status changes
/// attached to the transaction we already know instead of surfacing as an
/// unrelated one.
fn correlated_transaction_id(fields: &NvpResponse) -> Option<TransactionId> {
    fields
        .get_non_empty("parent_txn_id")
        .or_else(|| fields.get_non_empty("txn_id"))
        .and_then(|id| TransactionId::new(id).ok())
}

/// The reconciliation core. Every entry point is a stateless handler that
/// reconstructs context from the payment token: order state is re-read
/// from the order system and transaction state is re-fetched from the
/// gateway, so concurrent delivery of return and notify for the same
/// token is safe without any lock held here.
pub struct CheckoutService {
    gateway: Arc<dyn ExpressGateway>,
    orders: Arc<dyn OrderSystem>,
    audit: Arc<dyn AuditSink>,
    event_label: String,
}

impl CheckoutService {
    pub fn new(
        gateway: Arc<dyn ExpressGateway>,
        orders: Arc<dyn OrderSystem>,
        audit: Arc<dyn AuditSink>,
        event_label: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            orders,
            audit,
            event_label: event_label.into(),
        }
    }

    /// Where the browser lands once a checkout is resolved.
    pub fn tickets_page_url(&self) -> String {
        self.orders.tickets_page_url()
    }

    /// Builds a callback URL on top of the tickets page, embedding the
    /// payment token and the action discriminator.
    fn action_url(&self, action: &str, token: &PaymentToken) -> Result<String, CheckoutError> {
        let base = self.orders.tickets_page_url();
        let mut url = url::Url::parse(&base)
            .map_err(|e| CheckoutError::Validation(format!("invalid tickets page url {base}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("action", action)
            .append_pair("payment_method", PAYMENT_METHOD)
            .append_pair("payment_token", token.as_str());
        Ok(url.into())
    }

    fn record(&self, entry: AuditEntry) {
        self.audit.record(entry);
    }

    /// ACK failure and transport failure share one terminal branch: audit,
    /// emit `Failed` to the order system, stop.
    async fn failed_result(
        &self,
        token: &PaymentToken,
        message: &str,
        data: Option<PaymentData>,
        detail: serde_json::Value,
    ) -> CheckoutOutcome {
        self.record(
            AuditEntry::new(message)
                .payment_token(token.as_str())
                .detail(detail),
        );
        self.orders
            .apply_payment_result(token, CanonicalStatus::Failed, data)
            .await;
        CheckoutOutcome::Resolved(CanonicalStatus::Failed)
    }

    /// Entry point 1: start a checkout. On success the browser is
    /// redirected to the gateway's hosted page; on gateway failure a
    /// `Failed` result is emitted instead and no redirect happens.
    #[tracing::instrument(name = "initiate", skip_all, fields(payment_token = %request.payment_token))]
    pub async fn initiate(&self, request: InitiateRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let token = request.payment_token;

        let currency = self.orders.configured_currency();
        if !SUPPORTED_CURRENCIES.contains(&currency.as_str()) {
            return Err(CheckoutError::UnsupportedCurrency(currency));
        }

        let order = self
            .orders
            .order_for_token(&token)
            .await
            .ok_or(CheckoutError::OrderNotFound)?;

        let return_url = self.action_url("payment_return", &token)?;
        let cancel_url = self.action_url("payment_cancel", &token)?;

        let mut payload = NvpPayload::new();
        payload.set("METHOD", "SetExpressCheckout");
        payload.set("PAYMENTREQUEST_0_PAYMENTACTION", "Sale");
        payload.set("PAYMENTREQUEST_0_ALLOWEDPAYMENTMETHOD", "InstantPaymentOnly");
        payload.set("RETURNURL", &return_url);
        payload.set("CANCELURL", &cancel_url);
        payload.set("ALLOWNOTE", "0");
        payload.set("NOSHIPPING", "1");
        payload.set("SOLUTIONTYPE", "Sole");
        fill_payload_with_order(&mut payload, &order, &self.event_label)?;

        let response = match self.gateway.request(&payload).await {
            Ok(response) => response,
            Err(err) => {
                let outcome = self
                    .failed_result(
                        &token,
                        "checkout initiation got no response from the gateway",
                        None,
                        serde_json::json!({ "error": err.to_string() }),
                    )
                    .await;
                return Ok(outcome);
            }
        };

        match (response.ack_success(), response.get_non_empty("TOKEN")) {
            (true, Some(session)) => {
                let session = SessionToken::new(session)?;
                Ok(CheckoutOutcome::Redirect(
                    self.gateway.checkout_redirect_url(&session),
                ))
            }
            _ => {
                let error_code = response
                    .get_non_empty("L_ERRORCODE0")
                    .unwrap_or("0")
                    .to_string();
                let outcome = self
                    .failed_result(
                        &token,
                        "error during checkout initiation",
                        Some(PaymentData::for_error_code(&error_code)),
                        serde_json::to_value(response.fields()).unwrap_or_default(),
                    )
                    .await;
                Ok(outcome)
            }
        }
    }

    /// Entry point 2: the user clicked Pay on the hosted page and came
    /// back. The checkout is re-verified server-side and only then charged;
    /// amounts arriving with the browser are never trusted.
    #[tracing::instrument(name = "payment_return", skip_all, fields(payment_token = %request.payment_token))]
    pub async fn payment_return(
        &self,
        request: ReturnRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let ReturnRequest {
            payment_token,
            session_token,
            payer_id,
        } = request;

        let order = self
            .orders
            .order_for_token(&payment_token)
            .await
            .ok_or(CheckoutError::OrderNotFound)?;

        let mut details_payload = NvpPayload::new();
        details_payload.set("METHOD", "GetExpressCheckoutDetails");
        details_payload.set("TOKEN", session_token.as_str());

        let details = match self.gateway.request(&details_payload).await {
            Ok(details) => details,
            Err(err) => {
                let outcome = self
                    .failed_result(
                        &payment_token,
                        "fetching checkout details got no response from the gateway",
                        None,
                        serde_json::json!({ "error": err.to_string() }),
                    )
                    .await;
                return Ok(outcome);
            }
        };

        if !details.ack_success() {
            let outcome = self
                .failed_result(
                    &payment_token,
                    "error while fetching checkout details",
                    None,
                    serde_json::to_value(details.fields()).unwrap_or_default(),
                )
                .await;
            return Ok(outcome);
        }

        let notify_url = self.action_url("payment_notify", &payment_token)?;

        let mut charge = NvpPayload::new();
        charge.set("METHOD", "DoExpressCheckoutPayment");
        charge.set("PAYMENTREQUEST_0_ALLOWEDPAYMENTMETHOD", "InstantPaymentOnly");
        charge.set("TOKEN", session_token.as_str());
        charge.set("PAYERID", payer_id.as_str());
        charge.set("PAYMENTREQUEST_0_NOTIFYURL", &notify_url);
        fill_payload_with_order(&mut charge, &order, &self.event_label)?;

        // Guards against a stale or substituted order between initiation
        // and return: the amount the gateway will charge must equal the
        // current order total exactly, or nothing is charged.
        let reported = details.get_non_empty("PAYMENTREQUEST_0_AMT").unwrap_or("");
        let matches = Decimal::from_str(reported)
            .map(|amount| amount == order.total())
            .unwrap_or(false);
        if !matches {
            self.record(
                AuditEntry::new("gateway-reported amount does not match order total")
                    .payment_token(payment_token.as_str())
                    .detail(serde_json::json!({
                        "reported": reported,
                        "order_total": format_amount(order.total()),
                    })),
            );
            return Err(CheckoutError::AmountMismatch {
                expected: format_amount(order.total()),
                got: reported.to_string(),
            });
        }

        // One final availability check before charging.
        if !self.orders.verify_order(&order).await {
            return Err(CheckoutError::OrderUnavailable);
        }

        let txn = match self.gateway.request(&charge).await {
            Ok(txn) => txn,
            Err(err) => {
                let outcome = self
                    .failed_result(
                        &payment_token,
                        "charge confirmation got no response from the gateway",
                        None,
                        serde_json::json!({ "error": err.to_string() }),
                    )
                    .await;
                return Ok(outcome);
            }
        };

        let provider_status = txn.get_non_empty("PAYMENTINFO_0_PAYMENTSTATUS");
        let transaction_id = txn
            .get_non_empty("PAYMENTINFO_0_TRANSACTIONID")
            .and_then(|id| TransactionId::new(id).ok());

        match (txn.ack_success(), provider_status, transaction_id) {
            (true, Some(provider_status), Some(transaction_id)) => {
                let status = CanonicalStatus::from_provider(provider_status);
                self.record(
                    AuditEntry::new("payment details after charge confirmation")
                        .payment_token(payment_token.as_str())
                        .transaction_id(transaction_id.as_str())
                        .detail(serde_json::to_value(txn.fields()).unwrap_or_default()),
                );
                self.orders
                    .apply_payment_result(
                        &payment_token,
                        status,
                        Some(PaymentData::for_transaction(transaction_id, txn.into_fields())),
                    )
                    .await;
                Ok(CheckoutOutcome::Resolved(status))
            }
            _ => {
                let outcome = self
                    .failed_result(
                        &payment_token,
                        "error during charge confirmation",
                        None,
                        serde_json::to_value(txn.fields()).unwrap_or_default(),
                    )
                    .await;
                Ok(outcome)
            }
        }
    }

    /// Entry point 3: the user cancelled on the hosted page. The redirect
    /// itself asserts the cancellation, so no gateway call is made.
    #[tracing::instrument(name = "payment_cancel", skip_all, fields(payment_token = %request.payment_token))]
    pub async fn payment_cancel(&self, request: CancelRequest) -> CheckoutOutcome {
        let token = request.payment_token;
        self.record(
            AuditEntry::new("checkout cancelled by the user").payment_token(token.as_str()),
        );
        self.orders
            .apply_payment_result(&token, CanonicalStatus::Cancelled, None)
            .await;
        CheckoutOutcome::Resolved(CanonicalStatus::Cancelled)
    }

    /// Entry point 4: asynchronous notification. Safe to receive any number
    /// of times for the same transaction; never surfaces an error to the
    /// sender. The notification body is a delivery hint only — the status
    /// applied comes from an authoritative transaction fetch, which also
    /// defuses races against the return-flow charge confirmation.
    #[tracing::instrument(name = "payment_notify", skip_all, fields(payment_token = %request.payment_token))]
    pub async fn payment_notify(&self, request: NotifyRequest) -> NotifyOutcome {
        let NotifyRequest {
            payment_token,
            raw_body,
            fields,
        } = request;

        if !self.gateway.verify_notification(&raw_body).await {
            self.record(
                AuditEntry::new("could not verify notification")
                    .payment_token(payment_token.as_str()),
            );
            return NotifyOutcome::Discarded(DiscardReason::UnverifiedSignature);
        }

        let Some(transaction_id) = correlated_transaction_id(&fields) else {
            self.record(
                AuditEntry::new("notification without a transaction id")
                    .payment_token(payment_token.as_str())
                    .detail(serde_json::to_value(fields.fields()).unwrap_or_default()),
            );
            return NotifyOutcome::Discarded(DiscardReason::MissingTransactionId);
        };

        if fields.get_non_empty("payment_status").is_none() {
            self.record(
                AuditEntry::new("notification with no payment status")
                    .payment_token(payment_token.as_str())
                    .transaction_id(transaction_id.as_str())
                    .detail(serde_json::to_value(fields.fields()).unwrap_or_default()),
            );
            return NotifyOutcome::Discarded(DiscardReason::MissingPaymentStatus);
        }

        let mut lookup = NvpPayload::new();
        lookup.set("METHOD", "GetTransactionDetails");
        lookup.set("TRANSACTIONID", transaction_id.as_str());

        let details = match self.gateway.request(&lookup).await {
            Ok(details) if details.ack_success() => details,
            Ok(details) => {
                self.record(
                    AuditEntry::new("fetching transaction after notification failed")
                        .payment_token(payment_token.as_str())
                        .transaction_id(transaction_id.as_str())
                        .detail(serde_json::to_value(details.fields()).unwrap_or_default()),
                );
                return NotifyOutcome::Discarded(DiscardReason::TransactionLookupFailed);
            }
            Err(err) => {
                self.record(
                    AuditEntry::new("fetching transaction after notification failed")
                        .payment_token(payment_token.as_str())
                        .transaction_id(transaction_id.as_str())
                        .detail(serde_json::json!({ "error": err.to_string() })),
                );
                return NotifyOutcome::Discarded(DiscardReason::TransactionLookupFailed);
            }
        };

        let status = CanonicalStatus::from_provider(details.get("PAYMENTSTATUS").unwrap_or(""));

        self.record(
            AuditEntry::new("payment details via notification")
                .payment_token(payment_token.as_str())
                .transaction_id(transaction_id.as_str())
                .detail(serde_json::to_value(details.fields()).unwrap_or_default()),
        );
        self.orders
            .apply_payment_result(
                &payment_token,
                status,
                Some(PaymentData::for_transaction(
                    transaction_id,
                    details.into_fields(),
                )),
            )
            .await;

        NotifyOutcome::Applied(status)
    }

    /// Compatibility shim for notifications sent to the old-style endpoint
    /// without a payment token: the token is recovered from the order
    /// record that stored this transaction id, then the normal notify flow
    /// runs as if the token had been supplied.
    #[tracing::instrument(name = "legacy_notify", skip_all)]
    pub async fn legacy_notify(&self, request: LegacyNotifyRequest) -> NotifyOutcome {
        let LegacyNotifyRequest { raw_body, fields } = request;

        let Some(transaction_id) = correlated_transaction_id(&fields) else {
            self.record(
                AuditEntry::new("old-style notification with an empty transaction id")
                    .detail(serde_json::to_value(fields.fields()).unwrap_or_default()),
            );
            return NotifyOutcome::Discarded(DiscardReason::MissingTransactionId);
        };

        let Some(record) = self.orders.find_order_by_transaction(&transaction_id).await else {
            self.record(
                AuditEntry::new("old-style notification could not be matched to an order")
                    .transaction_id(transaction_id.as_str()),
            );
            return NotifyOutcome::Discarded(DiscardReason::UnmatchedTransaction);
        };

        let Some(payment_token) = self.orders.stored_payment_token(&record).await else {
            self.record(
                AuditEntry::new("old-style notification matched an order without a stored token")
                    .transaction_id(transaction_id.as_str()),
            );
            return NotifyOutcome::Discarded(DiscardReason::MissingStoredToken);
        };

        self.payment_notify(NotifyRequest::with_token(payment_token, raw_body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_reject_missing_or_blank_tokens() {
        assert!(matches!(
            InitiateRequest::new(None),
            Err(CheckoutError::EmptyToken)
        ));
        assert!(matches!(
            ReturnRequest::new(Some("tok"), Some(""), Some("payer")),
            Err(CheckoutError::EmptyToken)
        ));
        assert!(matches!(
            CancelRequest::new(Some("  "), Some("EC-1")),
            Err(CheckoutError::EmptyToken)
        ));
        assert!(matches!(
            NotifyRequest::new(None, "txn_id=T1"),
            Err(CheckoutError::EmptyToken)
        ));
    }

    #[test]
    fn request_tokens_are_trimmed() {
        let request = ReturnRequest::new(Some(" tok "), Some("EC-1"), Some("PAYER")).unwrap();
        assert_eq!(request.payment_token.as_str(), "tok");
    }

    #[test]
    fn parent_transaction_id_is_preferred() {
        let fields = NvpResponse::parse("txn_id=T2&parent_txn_id=T1&payment_status=Refunded");
        assert_eq!(
            correlated_transaction_id(&fields).unwrap().as_str(),
            "T1"
        );

        let fields = NvpResponse::parse("txn_id=T2&payment_status=Completed");
        assert_eq!(
            correlated_transaction_id(&fields).unwrap().as_str(),
            "T2"
        );

        let fields = NvpResponse::parse("payment_status=Completed");
        assert!(correlated_transaction_id(&fields).is_none());
    }
}
