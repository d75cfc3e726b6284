//! Application Services

mod contract_screen;
mod execution_retrier;

pub use contract_screen::ContractScreen;
pub use execution_retrier::{ExecutionRetrier, FallbackTrigger, RetryOutcome, RetryStatus};
