//! Trade Decision Bounded Context
//!
//! Maps a fair value and a market price to BUY, SELL or HOLD, and defines
//! the order vocabulary used to act on the result.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::PolicyError;
pub use services::DecisionPolicy;
pub use value_objects::{Action, Decision, OrderSide, OrderType, TimeInForce};
