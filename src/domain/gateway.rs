use {
    super::error::CheckoutError,
    super::nvp::{NvpPayload, NvpResponse},
    super::token::SessionToken,
    async_trait::async_trait,
};

/// Remote payment gateway as the state machine sees it.
///
/// `request` returns `Ok` even when the processor answers with an error —
/// the `ACK` field inside the response carries that — and `Err` only when
/// there was no usable response at all (transport failure, timeout).
/// Transport failures are never retried within the same request.
#[async_trait]
pub trait ExpressGateway: Send + Sync {
    /// Signed flat name=value POST against the processor's API endpoint.
    async fn request(&self, payload: &NvpPayload) -> Result<NvpResponse, CheckoutError>;

    /// Echoes the exact received notification body back to the processor
    /// with the verification marker prefixed. `true` only for an HTTP 200
    /// whose body is exactly `VERIFIED`; anything else, including transport
    /// failure, means the notification must be discarded.
    async fn verify_notification(&self, raw_body: &str) -> bool;

    /// Hosted checkout page the browser is redirected to after a
    /// successful checkout initiation.
    fn checkout_redirect_url(&self, session_token: &SessionToken) -> String;
}
