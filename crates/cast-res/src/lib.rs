//! Decoder for packed int16 simulation results described by a text header.
//!
//! A result is a pair of files sharing a stem: `<stem>.sel` is a line
//! oriented header whose line 8 carries the scan and channel counts and whose
//! tail lists one scale factor per channel; `<stem>.dat` holds the samples,
//! channel-major, as little-endian int16.

mod decode;
pub mod encode;
pub mod header;

pub use decode::{
    decode, decode_stem, result_pair, DecodedChannels, HEADER_EXTENSION, PAYLOAD_EXTENSION,
};
pub use encode::write_result_pair;
pub use header::ResultHeader;
