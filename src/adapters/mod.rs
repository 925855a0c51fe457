pub mod http;
pub mod paypal;
