//! Application Use Cases

mod evaluate_underlying;

pub use evaluate_underlying::{
    ContractEvaluation, CycleError, CycleReport, CycleSettings, EvaluateUnderlyingUseCase,
    EvaluationOutcome, ExecutionResult,
};
