use thiserror::Error;

/// Failure taxonomy for the checkout flows.
///
/// Fatal variants terminate the current request before any charge is
/// attempted. A gateway response with `ACK != Success` is *not* an error —
/// the state machine turns it into a `Failed` payment result instead.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("empty token")]
    EmptyToken,

    #[error("could not find order")]
    OrderNotFound,

    #[error("unexpected total: gateway reported {got}, order total is {expected}")]
    AmountMismatch { expected: String, got: String },

    #[error("order is no longer available")]
    OrderUnavailable,

    #[error("the selected currency {0} is not supported by this payment method")]
    UnsupportedCurrency(String),

    #[error("order total {declared} does not match line items sum {computed}")]
    InconsistentTotal { computed: String, declared: String },

    #[error("validation: {0}")]
    Validation(String),

    #[error("gateway transport: {0}")]
    Transport(String),

    #[error("configuration: {0}")]
    Config(String),
}
