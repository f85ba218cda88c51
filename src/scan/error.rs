//! Scan Errors - Registration and options-file failures

use std::path::PathBuf;
use thiserror::Error;

/// A configuration field (or the handler) failed validation at registration.
///
/// The display text names the offending option by its configuration key.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScanConfigError {
    /// `barcodePrefix` missing or not a string.
    #[error("barcodePrefix must be a string")]
    BarcodePrefix,
    /// `barcodeValueTest` missing, not a string, or not a valid pattern.
    #[error("barcodeValueTest must be a regular expression")]
    BarcodeValueTest,
    /// `finishScanOnMatch` present but not a boolean.
    #[error("finishScanOnMatch must be a boolean")]
    FinishScanOnMatch,
    /// `scanDuration` present but not a non-negative number of milliseconds.
    #[error("scanDuration must be a number")]
    ScanDuration,
    /// No handler was supplied.
    #[error("scanHandler must be a function")]
    ScanHandler,
}

/// Errors loading scan options from a TOML file.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The file could not be read.
    #[error("Failed to read scan options {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML.
    #[error("Invalid scan options: {0}")]
    Parse(#[from] toml::de::Error),
}
