//! Structured error types shared across the cast crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine readable error codes.
pub mod codes {
    /// An attribute name appears more than once in a design space.
    pub const DUPLICATE_ATTRIBUTE: &str = "duplicate-attribute";
    /// Two rows of a tag table derived the same case identifier.
    pub const DUPLICATE_CASE_ID: &str = "duplicate-case-id";
    /// A design space does not derive one of the mandatory case tags.
    pub const MISSING_CASE_TAG: &str = "missing-case-tag";
    /// A derived function failed while building a row.
    pub const FUNCTION_FAILED: &str = "function-failed";
    /// A filter referenced a column the table does not have.
    pub const COLUMN_NOT_FOUND: &str = "column-not-found";
    /// A seed was asked for a tag it does not carry.
    pub const UNKNOWN_TAG: &str = "unknown-tag";
    /// A statistic referenced a channel missing from the channel map.
    pub const UNKNOWN_CHANNEL: &str = "unknown-channel";
    /// A statistic name is not present in the registry.
    pub const UNKNOWN_STATISTIC: &str = "unknown-statistic";
    /// A compute function returned the wrong number of values.
    pub const STATISTIC_SHAPE: &str = "statistic-shape";
    /// A statistic was asked to summarise an empty series.
    pub const EMPTY_SERIES: &str = "empty-series";
    /// A filename pattern could not be compiled.
    pub const PATTERN_SYNTAX: &str = "pattern-syntax";
    /// A predicate clause could not be parsed.
    pub const PREDICATE_SYNTAX: &str = "predicate-syntax";
    /// An exported table could not be read back.
    pub const TABLE_FORMAT: &str = "table-format";
    /// Row widths disagree with the column header.
    pub const ROW_WIDTH: &str = "row-width";
    /// The result header lacks required lines or fields.
    pub const MALFORMED_HEADER: &str = "malformed-header";
    /// The result payload is shorter than a requested channel block.
    pub const TRUNCATED_PAYLOAD: &str = "truncated-payload";
    /// A requested channel index lies outside the payload.
    pub const CHANNEL_OUT_OF_RANGE: &str = "channel-out-of-range";
    /// A referenced file does not exist.
    pub const FILE_NOT_FOUND: &str = "file-not-found";
    /// Any other filesystem failure.
    pub const IO_FAILURE: &str = "io-failure";
    /// The worker pool for a batch could not be started.
    pub const THREAD_POOL: &str = "thread-pool";
    /// A batch was interrupted before every case completed.
    pub const BATCH_CANCELLED: &str = "batch-cancelled";
}

/// Structured payload attached to every [`CastError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, case ids, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for campaign management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CastError {
    /// Design space and schema errors. Always fatal before per-case work starts.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// Table query errors such as unknown columns.
    #[error("query error: {0}")]
    Query(ErrorInfo),
    /// Result file decoding errors, local to a single case.
    #[error("decode error: {0}")]
    Decode(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// A batch was interrupted and its partial output discarded.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CastError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CastError::Config(info)
            | CastError::Query(info)
            | CastError::Decode(info)
            | CastError::Io(info)
            | CastError::Serde(info)
            | CastError::Cancelled(info) => info,
        }
    }

    /// Returns the stable code of the error.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Builds a [`CastError::Query`] for a column lookup miss.
    pub fn column_not_found(name: &str) -> Self {
        CastError::Query(
            ErrorInfo::new(codes::COLUMN_NOT_FOUND, "no such column")
                .with_context("column", name),
        )
    }
}

/// Maps an [`io::Error`] raised while touching `path` into a [`CastError::Io`].
///
/// `NotFound` is reported with [`codes::FILE_NOT_FOUND`] so callers can tell an
/// absent artefact apart from a permission or device failure.
pub fn io_failure(path: &Path, err: io::Error) -> CastError {
    let code = if err.kind() == io::ErrorKind::NotFound {
        codes::FILE_NOT_FOUND
    } else {
        codes::IO_FAILURE
    };
    CastError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}
