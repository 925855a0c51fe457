pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use std::sync::Arc;

use services::checkout::CheckoutService;

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
}
