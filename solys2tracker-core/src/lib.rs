//! solys2tracker-core: Core types for driving a Solys2 solar/lunar tracker.
//!
//! This crate provides the shared vocabulary used by the other crates:
//! target bodies, angular positions, session status, sweep plans for the
//! Cross and Mesh alignment patterns, and the analysis of the ASD
//! spectroradiometer captures taken during those sweeps.
//!

pub mod analysis;
pub mod body;
pub mod error;
pub mod position;
pub mod session;
pub mod sweep;

pub use analysis::{
    normalize_both, BandMeans, CrossProfile, MeshGrid, NextStep, Spectrum, DETECTOR_BANDS,
    DETECTOR_COUNT,
};
pub use body::Body;
pub use error::{Error, Result};
pub use position::{Observer, Offset, Position};
pub use session::{
    ConnectionParams, SessionStatus, DEFAULT_KERNELS_PATH, DEFAULT_PASSWORD, DEFAULT_PORT,
};
pub use sweep::{CrossPlan, MeshPlan, SweepKind, SweepPlan, SweepPoint, TrackPlan};
