//! Application message types for async communication.
//!
//! Messages are sent from background worker threads to the main UI thread
//! via channels to report completion and errors. Progress of a running
//! instrument operation arrives separately as `ControlEvent`s.

use solys2tracker_control::{ConnectOutcome, OperationSummary};
use solys2tracker_core::Offset;

use crate::pipeline::AnalysisResult;

/// Messages sent from background workers to the UI thread.
pub enum AppMessage {
    /// Connection check finished (successfully or not).
    ConnectResult(ConnectOutcome),

    /// Adjustment read from the instrument.
    AdjustmentLoaded(Offset),

    /// Increment applied; carries the adjustment the instrument now reports.
    AdjustmentSent(Offset),

    /// Reading or writing the adjustment failed.
    AdjustError(String),

    /// Tracking or sweep ended (finished or cancelled).
    OperationComplete(OperationSummary),

    /// Tracking or sweep aborted.
    OperationError(String),

    /// Capture analysis completed successfully.
    AnalysisComplete(Box<AnalysisResult>),

    /// Capture analysis failed.
    AnalysisError(String),
}
