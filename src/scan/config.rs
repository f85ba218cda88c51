//! Scan Configuration - Raw options and their validated form
//!
//! `ScanOptions` is what a caller or a config file supplies: every field is
//! optional and loosely typed, so a value of the wrong type can still be
//! represented and rejected with a message naming the option.
//! `ScanConfig` is the validated, immutable result one listener runs with.
//!
//! # Example
//!
//! ```ignore
//! use barcode_scan_listener::scan::ScanOptions;
//!
//! let config = ScanOptions::new()
//!     .barcode_prefix("L%")
//!     .barcode_value_test("^123")
//!     .finish_scan_on_match(true)
//!     .validate()?;
//! assert_eq!(config.decode("L%123abc"), Some("123abc"));
//! ```
//!
//! The same options as TOML:
//!
//! ```toml
//! barcodePrefix = "L%"
//! barcodeValueTest = "^123"
//! finishScanOnMatch = true
//! scanDuration = 50
//! ```

use std::path::Path;
use std::time::Duration;

use log::debug;
use regex::Regex;
use serde::Deserialize;
use toml::Value;

use super::error::{OptionsError, ScanConfigError};

/// Inactivity window used when `scanDuration` is not given.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_millis(100);

// =============================================================================
// RAW OPTIONS
// =============================================================================

/// Unvalidated scan options, keyed like the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    /// Text a buffer must start with to be a scan candidate.
    /// An empty prefix makes every burst a candidate.
    pub barcode_prefix: Option<Value>,
    /// Regular expression applied to the payload.
    pub barcode_value_test: Option<Value>,
    /// End the session on the first passing match.
    pub finish_scan_on_match: Option<Value>,
    /// Inactivity window in milliseconds.
    pub scan_duration: Option<Value>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML options file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// An empty prefix is accepted; then any burst whose payload passes the
    /// value test counts as a scan.
    pub fn barcode_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.barcode_prefix = Some(Value::String(prefix.into()));
        self
    }

    pub fn barcode_value_test(mut self, pattern: impl Into<String>) -> Self {
        self.barcode_value_test = Some(Value::String(pattern.into()));
        self
    }

    pub fn finish_scan_on_match(mut self, finish: bool) -> Self {
        self.finish_scan_on_match = Some(Value::Boolean(finish));
        self
    }

    /// Whole milliseconds are stored as an integer, anything finer as a float.
    pub fn scan_duration(mut self, duration: Duration) -> Self {
        let value = match i64::try_from(duration.as_millis()) {
            Ok(millis) if duration.subsec_nanos() % 1_000_000 == 0 => Value::Integer(millis),
            _ => Value::Float(duration.as_secs_f64() * 1000.0),
        };
        self.scan_duration = Some(value);
        self
    }

    /// Check every option in declaration order and build the config.
    /// The first violated option decides the error.
    pub fn validate(&self) -> Result<ScanConfig, ScanConfigError> {
        let prefix = match &self.barcode_prefix {
            Some(Value::String(prefix)) => prefix.clone(),
            _ => return Err(ScanConfigError::BarcodePrefix),
        };

        let value_test = match &self.barcode_value_test {
            Some(Value::String(pattern)) => Regex::new(pattern).map_err(|err| {
                debug!("rejected barcodeValueTest {pattern:?}: {err}");
                ScanConfigError::BarcodeValueTest
            })?,
            _ => return Err(ScanConfigError::BarcodeValueTest),
        };

        let finish_scan_on_match = match &self.finish_scan_on_match {
            None => false,
            Some(Value::Boolean(finish)) => *finish,
            Some(_) => return Err(ScanConfigError::FinishScanOnMatch),
        };

        let scan_duration = match &self.scan_duration {
            None => DEFAULT_SCAN_DURATION,
            Some(value) => parse_millis(value).ok_or(ScanConfigError::ScanDuration)?,
        };

        Ok(ScanConfig {
            prefix,
            value_test,
            finish_scan_on_match,
            scan_duration,
        })
    }
}

/// Milliseconds as a `Duration`; integers and finite floats, never negative.
///
/// Floats are rounded to the nanosecond. Values past `u64::MAX` nanoseconds
/// (about 584 years) saturate to `Duration::MAX`.
fn parse_millis(value: &Value) -> Option<Duration> {
    match value {
        Value::Integer(ms) => u64::try_from(*ms).ok().map(Duration::from_millis),
        Value::Float(ms) if ms.is_finite() && *ms >= 0.0 => {
            let nanos = (ms * 1_000_000.0).round();
            if nanos < u64::MAX as f64 {
                Some(Duration::from_nanos(nanos as u64))
            } else {
                Some(Duration::MAX)
            }
        }
        _ => None,
    }
}

// =============================================================================
// VALIDATED CONFIG
// =============================================================================

/// Validated configuration for one scan listener.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    prefix: String,
    value_test: Regex,
    finish_scan_on_match: bool,
    scan_duration: Duration,
}

impl ScanConfig {
    /// Config with default `finish_scan_on_match` (false) and scan duration.
    pub fn new(prefix: impl Into<String>, value_test: Regex) -> Self {
        Self {
            prefix: prefix.into(),
            value_test,
            finish_scan_on_match: false,
            scan_duration: DEFAULT_SCAN_DURATION,
        }
    }

    pub fn with_finish_scan_on_match(mut self, finish: bool) -> Self {
        self.finish_scan_on_match = finish;
        self
    }

    pub fn with_scan_duration(mut self, duration: Duration) -> Self {
        self.scan_duration = duration;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn value_test(&self) -> &Regex {
        &self.value_test
    }

    pub fn finish_scan_on_match(&self) -> bool {
        self.finish_scan_on_match
    }

    pub fn scan_duration(&self) -> Duration {
        self.scan_duration
    }

    /// The payload of `buffer` if it is a complete, acceptable scan:
    /// it starts with the prefix and the value test matches what follows.
    ///
    /// The value test searches the payload; anchor the pattern to match
    /// all of it.
    pub fn decode<'a>(&self, buffer: &'a str) -> Option<&'a str> {
        let payload = buffer.strip_prefix(self.prefix.as_str())?;
        self.value_test.is_match(payload).then_some(payload)
    }
}

// =============================================================================
// TESTS
// =============================================================================
