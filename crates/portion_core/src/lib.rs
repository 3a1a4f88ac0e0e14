//! Core loaf portioning logic, independent of any UI shell.
//!
//! The crate hosts:
//! - the settings shared between a frontend and the engine
//! - randomized cross-section sampling and density inference
//! - weight-targeted portion segmentation with optional waste redistribution
//! - the average-weight ("three packers") compliance check
//! - tabular export of the resulting cut plan

pub mod compliance;
pub mod config;
pub mod density;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod redistribute;
pub mod segment;
pub mod slices;
pub mod tolerance;

/// Convenience re-export for the scalar type used across the engine.
pub type Scalar = f64;

pub use compliance::ComplianceReport;
pub use config::{IntegrationRule, InterpolationMode, PortionSettings, ScanDirection};
pub use error::PortionError;
pub use pipeline::{run, run_with_rng, PortionRun};
pub use segment::{Portion, Segmentation, WasteRecord};
pub use slices::Slice;
pub use tolerance::{ToleranceBands, ToleranceTable};
