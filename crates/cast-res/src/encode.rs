use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use cast_core::errors::codes;
use cast_core::{io_failure, CastError, ErrorInfo};

use crate::decode::{result_pair, PAYLOAD_EXTENSION};

const RULE: &str = "________________________________________________________________________";

/// Quantizes `value` to the int16 grid defined by `scale`.
pub fn quantize(value: f64, scale: f64) -> i16 {
    (value / scale)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Writes a header/payload pair for `<stem>` holding one channel per entry of
/// `channels`, each encoded with its scale factor.
///
/// Used to build fixtures; the layout matches what [`crate::decode`] expects.
pub fn write_result_pair(stem: &Path, channels: &[(f64, Vec<f64>)]) -> Result<(), CastError> {
    let scan_count = channels.first().map(|(_, data)| data.len()).unwrap_or(0);
    if channels.iter().any(|(_, data)| data.len() != scan_count) {
        return Err(CastError::Config(ErrorInfo::new(
            codes::ROW_WIDTH,
            "all channels must hold the same number of scans",
        )));
    }
    let (header_path, payload_path) = result_pair(stem);
    if let Some(parent) = header_path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_failure(parent, err))?;
    }

    let file = File::create(&payload_path).map_err(|err| io_failure(&payload_path, err))?;
    let mut writer = BufWriter::new(file);
    for (scale, data) in channels {
        for value in data {
            writer
                .write_i16::<LittleEndian>(quantize(*value, *scale))
                .map_err(|err| io_failure(&payload_path, err))?;
        }
    }
    writer
        .flush()
        .map_err(|err| io_failure(&payload_path, err))?;

    let header = render_header(stem, scan_count, channels);
    fs::write(&header_path, header).map_err(|err| io_failure(&header_path, err))
}

fn render_header(stem: &Path, scan_count: usize, channels: &[(f64, Vec<f64>)]) -> String {
    let name = stem
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut text = String::new();
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(text, "  Version ID : cast {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(text, "{:>60}", "Time : 00:00:00");
    let _ = writeln!(text, "{:>60}", "Date : 01:01.1970");
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(text, "  Result file : {name}.{PAYLOAD_EXTENSION}");
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(text, "   Scans    Channels    Time [sec]      Format");
    let _ = writeln!(
        text,
        "{:>8}{:>12}{:>14.3}       BINARY",
        scan_count,
        channels.len(),
        scan_count as f64
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "  Channel   Variable Description");
    let _ = writeln!(text);
    for idx in 1..=channels.len() {
        let _ = writeln!(text, "  {idx:<9} ch{idx}");
    }
    let _ = writeln!(text, "{RULE}");
    let _ = writeln!(text, "Scale factors:");
    for (scale, _) in channels {
        let _ = writeln!(text, "  {scale:E}");
    }
    text
}
