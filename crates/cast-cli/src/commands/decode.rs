use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use cast_res::decode_stem;
use clap::Args;
use csv::WriterBuilder;

use super::{channel_map, parse_channel};

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Result stem; `.sel` and `.dat` are appended.
    pub stem: PathBuf,
    /// Channel to decode as `name=index`; every channel when omitted.
    #[arg(long = "channel", value_name = "NAME=INDEX", value_parser = parse_channel)]
    pub channels: Vec<(String, usize)>,
    /// Write CSV here instead of standard output.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &DecodeArgs) -> Result<(), Box<dyn Error>> {
    let decoded = decode_stem(&args.stem, &channel_map(&args.channels))?;
    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = WriterBuilder::new().from_writer(sink);
    writer.write_record(decoded.names())?;
    let scans = decoded.iter().map(|(_, samples)| samples.len()).min().unwrap_or(0);
    for scan in 0..scans {
        writer.write_record(decoded.iter().map(|(_, samples)| samples[scan].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
