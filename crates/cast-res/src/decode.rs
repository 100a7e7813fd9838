use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use cast_core::errors::codes;
use cast_core::{io_failure, CastError, ChannelMap, ErrorInfo};
use tracing::trace;

use crate::header::ResultHeader;

/// Extension of the text header file.
pub const HEADER_EXTENSION: &str = "sel";
/// Extension of the binary payload file.
pub const PAYLOAD_EXTENSION: &str = "dat";

/// Header and payload paths sharing one stem.
///
/// Extensions are appended rather than substituted since case ids may contain
/// dots (`wsp10.5_s1`).
pub fn result_pair(stem: &Path) -> (PathBuf, PathBuf) {
    (
        with_suffix(stem, HEADER_EXTENSION),
        with_suffix(stem, PAYLOAD_EXTENSION),
    )
}

pub(crate) fn with_suffix(stem: &Path, extension: &str) -> PathBuf {
    let mut raw = stem.as_os_str().to_owned();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// Decoded channels of one case, in channel-map order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedChannels {
    names: Vec<String>,
    series: Vec<Vec<f64>>,
}

impl DecodedChannels {
    /// Builds a decoded set from parallel name and series lists.
    pub fn from_parts(names: Vec<String>, series: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(names.len(), series.len());
        Self { names, series }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|idx| self.series[idx].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.series.iter().map(Vec::as_slice))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Decodes the channels named in `channels` from a header/payload pair.
///
/// Each requested channel is read with its own seek, so a small selection from
/// a large payload only touches the bytes it needs. An empty map decodes every
/// channel, named `"1"` to `"N"`.
pub fn decode(
    header_path: &Path,
    payload_path: &Path,
    channels: &ChannelMap,
) -> Result<DecodedChannels, CastError> {
    let header = ResultHeader::read(header_path)?;
    let channels = if channels.is_empty() {
        (1..=header.channel_count)
            .map(|idx| (idx.to_string(), idx))
            .collect()
    } else {
        channels.clone()
    };

    let file = File::open(payload_path).map_err(|err| io_failure(payload_path, err))?;
    let payload_len = file
        .metadata()
        .map_err(|err| io_failure(payload_path, err))?
        .len();
    let mut reader = BufReader::new(file);

    let mut names = Vec::with_capacity(channels.len());
    let mut series = Vec::with_capacity(channels.len());
    for (name, index) in channels.iter() {
        if index == 0 || index > header.channel_count {
            return Err(CastError::Decode(
                ErrorInfo::new(codes::CHANNEL_OUT_OF_RANGE, "channel index outside payload")
                    .with_context("channel", name)
                    .with_context("index", index.to_string())
                    .with_context("channel_count", header.channel_count.to_string()),
            ));
        }
        let offset = header.channel_offset(index);
        let end = offset + header.channel_bytes();
        if end > payload_len {
            return Err(CastError::Decode(
                ErrorInfo::new(codes::TRUNCATED_PAYLOAD, "payload ends inside a channel block")
                    .with_context("channel", name)
                    .with_context("required", end.to_string())
                    .with_context("available", payload_len.to_string())
                    .with_context("path", payload_path.display().to_string()),
            ));
        }
        trace!(channel = name, index, offset, "seeking channel block");
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(|err| io_failure(payload_path, err))?;
        let mut raw = vec![0i16; header.scan_count];
        reader
            .read_i16_into::<LittleEndian>(&mut raw)
            .map_err(|err| io_failure(payload_path, err))?;
        let scale = header.scale_factors[index - 1];
        names.push(name.to_string());
        series.push(raw.into_iter().map(|sample| sample as f64 * scale).collect());
    }
    Ok(DecodedChannels { names, series })
}

/// Decodes the pair `<stem>.sel` / `<stem>.dat`.
pub fn decode_stem(stem: &Path, channels: &ChannelMap) -> Result<DecodedChannels, CastError> {
    let (header, payload) = result_pair(stem);
    decode(&header, &payload, channels)
}
