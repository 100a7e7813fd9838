use std::fs;
use std::path::Path;

use cast_core::errors::codes;
use cast_core::{io_failure, CastError, ErrorInfo};

/// Line holding `scan_count channel_count time format`.
pub const DIMENSION_LINE: usize = 8;
/// Scale factors start at `channel_count + SCALE_OFFSET`.
pub const SCALE_OFFSET: usize = 14;

/// Parsed companion header of a binary result payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultHeader {
    /// Samples per channel.
    pub scan_count: usize,
    /// Channels stored in the payload.
    pub channel_count: usize,
    /// Format tag from the dimension line.
    pub format: String,
    /// One scale factor per channel, in channel order.
    pub scale_factors: Vec<f64>,
}

impl ResultHeader {
    /// Reads and parses a header file.
    pub fn read(path: &Path) -> Result<Self, CastError> {
        let text = fs::read_to_string(path).map_err(|err| io_failure(path, err))?;
        Self::parse(&text).map_err(|err| match err {
            CastError::Decode(info) => {
                CastError::Decode(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Parses header text.
    pub fn parse(text: &str) -> Result<Self, CastError> {
        let lines: Vec<&str> = text.lines().collect();
        let dims = lines
            .get(DIMENSION_LINE)
            .ok_or_else(|| CastError::Decode(malformed("header ends before the dimension line")))?;
        let tokens: Vec<&str> = dims.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(CastError::Decode(
                malformed("dimension line needs four fields")
                    .with_context("line", DIMENSION_LINE.to_string()),
            ));
        }
        let scan_count = parse_count(tokens[0], "scan_count")?;
        let channel_count = parse_count(tokens[1], "channel_count")?;
        let format = tokens[3].to_string();

        let start = channel_count
            .checked_add(SCALE_OFFSET)
            .ok_or_else(|| CastError::Decode(oversized("channel_count", channel_count)))?;
        // Every block offset is bounded by the payload size checked here.
        (scan_count as u64)
            .checked_mul(2)
            .and_then(|block| block.checked_mul(channel_count as u64))
            .ok_or_else(|| CastError::Decode(oversized("scan_count", scan_count)))?;
        let scale_factors = lines
            .iter()
            .skip(start)
            .filter(|line| !line.trim().is_empty())
            .take(channel_count)
            .map(|line| {
                line.trim()
                    .parse::<f64>()
                    .map_err(|_| {
                        CastError::Decode(
                            malformed("scale factor is not a number")
                                .with_context("value", line.trim()),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if scale_factors.len() != channel_count {
            return Err(CastError::Decode(
                malformed("header lists too few scale factors")
                    .with_context("expected", channel_count.to_string())
                    .with_context("found", scale_factors.len().to_string()),
            ));
        }
        Ok(Self {
            scan_count,
            channel_count,
            format,
            scale_factors,
        })
    }

    /// Bytes occupied by one channel block.
    pub fn channel_bytes(&self) -> u64 {
        self.scan_count as u64 * 2
    }

    /// Byte offset of the 1-based channel `index`.
    pub fn channel_offset(&self, index: usize) -> u64 {
        (index as u64 - 1) * self.channel_bytes()
    }
}

fn parse_count(token: &str, field: &str) -> Result<usize, CastError> {
    token.parse::<usize>().map_err(|_| {
        CastError::Decode(
            malformed("dimension field is not a count")
                .with_context("field", field)
                .with_context("value", token),
        )
    })
}

fn oversized(field: &str, value: usize) -> ErrorInfo {
    malformed("dimension counts overflow the payload size")
        .with_context("field", field)
        .with_context("value", value.to_string())
}

fn malformed(message: &str) -> ErrorInfo {
    ErrorInfo::new(codes::MALFORMED_HEADER, message)
}
