//! Trade Decision Value Objects

mod action;
mod decision;
mod order_terms;

pub use action::Action;
pub use decision::Decision;
pub use order_terms::{OrderSide, OrderType, TimeInForce};
