pub mod checkout;
pub mod payload;
