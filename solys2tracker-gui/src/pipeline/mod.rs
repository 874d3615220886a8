//! Background workers: instrument operations and capture analysis.

mod analysis;
mod instrument;

pub use analysis::{
    analyse, run_analysis_worker, AnalysisData, AnalysisKind, AnalysisRequest, AnalysisResult,
};
pub use instrument::{
    connect_worker, operation_worker, read_adjustment_worker, send_adjustment_worker,
    OperationPlan,
};
