pub mod audit;
pub mod error;
pub mod gateway;
pub mod nvp;
pub mod order;
pub mod order_system;
pub mod outcome;
pub mod status;
pub mod token;
