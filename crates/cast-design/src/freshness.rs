use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use cast_core::{io_failure, CastError};
use serde::{Deserialize, Serialize};

/// Advisory staleness of a case relative to its design source.
///
/// The causal order is design source, then generated input, then result. A
/// violation flags the earliest stale artefact; nothing is regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Freshness {
    /// The input file is missing or older than the design source.
    UnsynchronizedInput,
    /// The result file is missing or older than the design source or input.
    UnsynchronizedResult,
    /// Design source, input and result are in causal order.
    Synchronized,
}

impl Freshness {
    pub fn label(&self) -> &'static str {
        match self {
            Freshness::UnsynchronizedInput => "input unsynchronised",
            Freshness::UnsynchronizedResult => "results unsynchronised",
            Freshness::Synchronized => "synchronised",
        }
    }
}

/// Compares modification times of the design source, input and result.
///
/// A missing design source is an error; missing input or result files are
/// reported as the corresponding unsynchronised state.
pub fn freshness(design: &Path, input: &Path, result: &Path) -> Result<Freshness, CastError> {
    let design_time = modified(design)?.ok_or_else(|| {
        io_failure(
            design,
            io::Error::new(io::ErrorKind::NotFound, "design source is missing"),
        )
    })?;
    let input_time = match modified(input)? {
        Some(time) if time >= design_time => time,
        _ => return Ok(Freshness::UnsynchronizedInput),
    };
    match modified(result)? {
        Some(time) if time >= input_time => Ok(Freshness::Synchronized),
        _ => Ok(Freshness::UnsynchronizedResult),
    }
}

fn modified(path: &Path) -> Result<Option<SystemTime>, CastError> {
    match fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|err| io_failure(path, err)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_failure(path, err)),
    }
}
