//! Data models for extracted manifest records and configuration.

pub mod config;
pub mod record;

pub use config::MdfexConfig;
pub use record::{ExtractionResult, ManifestRecord};
