//! Application Layer
//!
//! Orchestrates the domain through use cases:
//!
//! - **Ports**: Interfaces to brokerage and market data
//! - **Services**: Contract screening and the sell retrier
//! - **Use Cases**: One evaluation cycle per underlying

pub mod ports;
pub mod services;
pub mod use_cases;

pub use ports::*;
pub use services::*;
pub use use_cases::*;
