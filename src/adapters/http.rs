use {
    crate::{
        AppState,
        domain::{error::CheckoutError, outcome::CheckoutOutcome},
        services::checkout::{
            CancelRequest, InitiateRequest, LegacyNotifyRequest, NotifyRequest, PAYMENT_METHOD,
            ReturnRequest,
        },
    },
    axum::{
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Redirect, Response},
    },
    serde::Deserialize,
};

/// Raw request discriminators and tokens, exactly as they arrive. The
/// validated per-entry-point request structs are built from this at the
/// boundary and passed into the state machine by value.
#[derive(Debug, Deserialize)]
pub struct DispatchParams {
    action: Option<String>,
    payment_method: Option<String>,
    payment_token: Option<String>,
    /// Gateway session token appended by the hosted checkout page.
    token: Option<String>,
    #[serde(rename = "PayerID")]
    payer_id: Option<String>,
    /// Legacy notification marker; such requests predate the
    /// action/method discriminators.
    ipn: Option<String>,
}

/// Boundary wrapper turning the error taxonomy into browser responses.
/// Fatal conditions surface as plain text and terminate the request.
struct ErrorResponse(CheckoutError);

impl From<CheckoutError> for ErrorResponse {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CheckoutError::EmptyToken
            | CheckoutError::UnsupportedCurrency(_)
            | CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
            CheckoutError::OrderNotFound => StatusCode::NOT_FOUND,
            CheckoutError::AmountMismatch { .. } | CheckoutError::OrderUnavailable => {
                StatusCode::CONFLICT
            }
            CheckoutError::Transport(err) => {
                tracing::error!("gateway transport error: {err}");
                StatusCode::BAD_GATEWAY
            }
            CheckoutError::InconsistentTotal { .. } | CheckoutError::Config(_) => {
                tracing::error!("internal error: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.0.to_string()).into_response()
    }
}

fn resolved_response(state: &AppState, outcome: CheckoutOutcome) -> Response {
    match outcome {
        CheckoutOutcome::Redirect(url) => Redirect::to(&url).into_response(),
        CheckoutOutcome::Resolved(_) => {
            Redirect::to(&state.checkout.tickets_page_url()).into_response()
        }
    }
}

/// Single dispatch entry for all four checkout actions plus the legacy
/// notification path. Routing inside the request (discriminators, not
/// paths) mirrors how the surrounding registration system addresses
/// payment methods.
#[tracing::instrument(name = "payment_dispatch", skip_all, fields(action = tracing::field::Empty))]
pub async fn payment_dispatch(
    State(state): State<AppState>,
    Query(params): Query<DispatchParams>,
    body: String,
) -> Response {
    // Old-style notifications carry only the ipn marker.
    if params.ipn.as_deref() == Some("1") {
        tracing::Span::current().record("action", "legacy_notify");
        let outcome = state
            .checkout
            .legacy_notify(LegacyNotifyRequest::new(body))
            .await;
        tracing::info!(?outcome, "legacy notification handled");
        return StatusCode::OK.into_response();
    }

    if params.payment_method.as_deref() != Some(PAYMENT_METHOD) {
        return (StatusCode::NOT_FOUND, "unknown payment method").into_response();
    }

    let action = params.action.as_deref().unwrap_or("");
    tracing::Span::current().record("action", action);

    match action {
        "initiate" => {
            let request = match InitiateRequest::new(params.payment_token.as_deref()) {
                Ok(request) => request,
                Err(err) => return ErrorResponse(err).into_response(),
            };
            match state.checkout.initiate(request).await {
                Ok(outcome) => resolved_response(&state, outcome),
                Err(err) => ErrorResponse(err).into_response(),
            }
        }
        "payment_return" => {
            let request = match ReturnRequest::new(
                params.payment_token.as_deref(),
                params.token.as_deref(),
                params.payer_id.as_deref(),
            ) {
                Ok(request) => request,
                Err(err) => return ErrorResponse(err).into_response(),
            };
            match state.checkout.payment_return(request).await {
                Ok(outcome) => resolved_response(&state, outcome),
                Err(err) => ErrorResponse(err).into_response(),
            }
        }
        "payment_cancel" => {
            let request = match CancelRequest::new(
                params.payment_token.as_deref(),
                params.token.as_deref(),
            ) {
                Ok(request) => request,
                Err(err) => return ErrorResponse(err).into_response(),
            };
            let outcome = state.checkout.payment_cancel(request).await;
            resolved_response(&state, outcome)
        }
        // The notify path always acknowledges: its caller is the remote
        // processor's webhook delivery, and surfacing an error would
        // trigger retries for conditions that are not transient.
        "payment_notify" => {
            match NotifyRequest::new(params.payment_token.as_deref(), body) {
                Ok(request) => {
                    let outcome = state.checkout.payment_notify(request).await;
                    tracing::info!(?outcome, "notification handled");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "notification without a payment token, ignored");
                }
            }
            StatusCode::OK.into_response()
        }
        _ => (StatusCode::NOT_FOUND, "unknown action").into_response(),
    }
}
