use std::error::Error;
use std::io;
use std::path::PathBuf;

use cast_post::export::write_csv_to;
use cast_post::{
    aggregate_columns, aggregate_rows, aggregate_rows_by, sort_columns, write_csv, Aggregation,
    PipelineOpts, StatParams,
};
use clap::Args;
use tracing::{info, warn};

use super::{channel_map, load_catalog, parse_channel, parse_predicate};

#[derive(Args, Debug)]
pub struct PostprocArgs {
    /// YAML design file of the campaign.
    #[arg(long, required_unless_present = "dir", conflicts_with = "dir")]
    pub design: Option<PathBuf>,
    /// Campaign root directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Directory of result files to scan instead of a campaign.
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Filename pattern with `{field}` placeholders for `--dir`.
    #[arg(long, default_value = "{case}")]
    pub pattern: String,
    /// Row filter, `column=value[,value...]`; repeat to combine.
    #[arg(long = "where", value_name = "CLAUSE")]
    pub filters: Vec<String>,
    /// Statistic name or label; repeat for several.
    #[arg(long = "stat", default_value = "mean")]
    pub stats: Vec<String>,
    /// Channel to aggregate; every mapped channel when omitted.
    #[arg(long = "channel")]
    pub channels: Vec<String>,
    /// Channel map entry `name=index`, replacing the design's map.
    #[arg(long = "map", value_name = "NAME=INDEX", value_parser = parse_channel)]
    pub map: Vec<(String, usize)>,
    /// Cases decoded in parallel.
    #[arg(long, default_value_t = 1)]
    pub workers: usize,
    /// Wöhler exponent for fatigue-equivalent loads.
    #[arg(long, default_value_t = 4.0)]
    pub wohler: f64,
    /// Sample rate in Hz for spectral densities.
    #[arg(long, default_value_t = 1.0)]
    pub sample_rate: f64,
    /// Welch segment length in samples.
    #[arg(long, default_value_t = 256)]
    pub segment: usize,
    /// Tag to average out, e.g. a turbulence seed. Campaigns group by their
    /// key tags.
    #[arg(long)]
    pub collapse: Option<String>,
    /// Channel name fragment to combine into one column per statistic.
    #[arg(long = "combine")]
    pub combine: Vec<String>,
    /// Put tags first and group statistics by channel.
    #[arg(long)]
    pub sort: bool,
    /// Write CSV here instead of standard output.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &PostprocArgs) -> Result<(), Box<dyn Error>> {
    let opts = PipelineOpts {
        workers: args.workers,
        cancel: None,
        stats: StatParams {
            wohler_exponent: args.wohler,
            sample_rate: args.sample_rate,
            segment_length: args.segment,
            ..StatParams::default()
        },
    };
    let predicate = parse_predicate(&args.filters)?;
    let mut key_tags = Vec::new();
    let mut agg = match (&args.design, &args.dir) {
        (Some(design), _) => {
            let catalog = load_catalog(design, &args.root)?;
            key_tags = catalog.meta().key_tags.clone();
            Aggregation::from_catalog(&catalog, &predicate, opts)?
        }
        (None, Some(dir)) => {
            let mut agg =
                Aggregation::from_directory(dir, &args.pattern, channel_map(&args.map), opts)?;
            agg.retain(&predicate)?;
            agg
        }
        (None, None) => return Err("either --design or --dir is required".into()),
    };
    if !args.map.is_empty() {
        agg = agg.with_channels(channel_map(&args.map));
    }

    for stat in &args.stats {
        let report = agg.add_builtin(stat, &args.channels)?;
        for (code, count) in report.failure_counts() {
            warn!(statistic = %report.label, code, count, "cases without results");
        }
    }
    let reports = agg.reports().len();

    let mut table = agg.into_table();
    if let Some(nuisance) = &args.collapse {
        table = if key_tags.is_empty() {
            aggregate_rows(&table, nuisance)?
        } else {
            aggregate_rows_by(&table, &key_tags, nuisance)?
        };
    }
    for stem in &args.combine {
        table = aggregate_columns(&table, stem)?;
    }
    if args.sort {
        sort_columns(&mut table);
    }
    match &args.out {
        Some(path) => {
            write_csv(&table, path)?;
            info!(rows = table.len(), batches = reports, path = %path.display(), "wrote result table");
        }
        None => write_csv_to(&table, io::stdout().lock())?,
    }
    Ok(())
}
