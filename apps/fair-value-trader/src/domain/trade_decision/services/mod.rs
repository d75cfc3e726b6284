//! Trade Decision Domain Services

mod decision_policy;

pub use decision_policy::DecisionPolicy;
