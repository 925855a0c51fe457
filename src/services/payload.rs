use {
    crate::domain::{error::CheckoutError, nvp::NvpPayload, order::Order},
    rust_decimal::Decimal,
};

/// Remote per-field length limit for item names and descriptions.
const FIELD_LIMIT: usize = 127;

/// Wire format for amounts: two decimal places, no thousands separators.
pub fn format_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

/// Hard cut at the field limit, no ellipsis, char-boundary safe.
fn truncate(value: &str) -> String {
    value.chars().take(FIELD_LIMIT).collect()
}

/// Fills `payload` with the line-item and amount fields for `order`.
///
/// Deterministic and side-effect-free: the same order always produces the
/// same fields. Used at both checkout initiation and charge confirmation,
/// which is what lets the return flow assert total consistency against the
/// gateway-reported amount.
///
/// The order's declared total is validated against the line items here
/// rather than assumed; a mismatch aborts before anything is sent.
pub fn fill_payload_with_order(
    payload: &mut NvpPayload,
    order: &Order,
    event_label: &str,
) -> Result<(), CheckoutError> {
    let mut computed = Decimal::ZERO;

    for (i, item) in order.items().iter().enumerate() {
        payload.set(
            format!("L_PAYMENTREQUEST_0_NAME{i}"),
            truncate(&format!("{event_label}: {}", item.name())),
        );
        payload.set(
            format!("L_PAYMENTREQUEST_0_DESC{i}"),
            truncate(item.description()),
        );
        payload.set(format!("L_PAYMENTREQUEST_0_NUMBER{i}"), item.id());
        payload.set(
            format!("L_PAYMENTREQUEST_0_AMT{i}"),
            format_amount(item.unit_price()),
        );
        payload.set(
            format!("L_PAYMENTREQUEST_0_QTY{i}"),
            item.quantity().to_string(),
        );
        computed += item.subtotal();
    }

    if computed != order.total() {
        return Err(CheckoutError::InconsistentTotal {
            computed: format_amount(computed),
            declared: format_amount(order.total()),
        });
    }

    payload.set("PAYMENTREQUEST_0_ITEMAMT", format_amount(order.total()));
    payload.set("PAYMENTREQUEST_0_AMT", format_amount(order.total()));
    payload.set("PAYMENTREQUEST_0_CURRENCYCODE", order.currency());

    Ok(())
}
