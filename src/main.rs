use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::get,
    },
    std::{env, sync::Arc, time::Duration},
    tixpay::{
        AppState,
        adapters::{http::payment_dispatch, paypal::PayPalGateway},
        domain::audit::TracingAuditSink,
        infra::memory::MemoryOrderSystem,
        services::checkout::CheckoutService,
    },
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let gateway = PayPalGateway::from_env().expect("gateway configuration");
    let tickets_url =
        env::var("TICKETS_PAGE_URL").unwrap_or_else(|_| "http://localhost:3000/tickets".into());
    let currency = env::var("CURRENCY").unwrap_or_else(|_| "USD".into());
    let event_label = env::var("EVENT_LABEL").unwrap_or_else(|_| "Event".into());

    let orders = Arc::new(MemoryOrderSystem::new(currency, tickets_url));
    let checkout = CheckoutService::new(
        Arc::new(gateway),
        orders,
        Arc::new(TracingAuditSink),
        event_label,
    );

    let state = AppState {
        checkout: Arc::new(checkout),
    };

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/payment", get(payment_dispatch).post(payment_dispatch))
        .layer(DefaultBodyLimit::max(64 * 1024)) // notification bodies are small
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("listening on 0.0.0.0:3000");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
