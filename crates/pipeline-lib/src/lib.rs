//! Cleaning pipeline for distributed-testbed experiment telemetry
//!
//! This crate provides the batch stages that prepare raw experiment
//! folders for analysis:
//! - Layout classification and normalization of messy experiment folders
//! - Repeated header removal for process-mapping files
//! - Node-name standardization
//! - One-second resampling of raw energy traces
//! - A driver running all of the above with per-item failure isolation

pub mod config;
pub mod energy;
pub mod error;
pub mod layout;
pub mod mapping;
pub mod models;
pub mod observability;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use models::*;
pub use observability::ErrorLog;
pub use pipeline::{ExperimentSummary, Pipeline, PipelineSummary, Stage};
