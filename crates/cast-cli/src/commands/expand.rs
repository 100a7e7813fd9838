use std::error::Error;
use std::io;
use std::path::PathBuf;

use cast_post::export::write_csv_to;
use cast_post::{from_tags, write_csv};
use clap::Args;
use tracing::info;

use super::{load_catalog, parse_predicate};

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// YAML design file.
    #[arg(long)]
    pub design: PathBuf,
    /// Campaign root directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Row filter, `column=value[,value...]`; repeat to combine.
    #[arg(long = "where", value_name = "CLAUSE")]
    pub filters: Vec<String>,
    /// Write the table here instead of standard output.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ExpandArgs) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(&args.design, &args.root)?;
    let predicate = parse_predicate(&args.filters)?;
    let tags = catalog.table().filter(&predicate)?;
    let table = from_tags(&tags)?;
    match &args.out {
        Some(path) => {
            write_csv(&table, path)?;
            info!(cases = table.len(), path = %path.display(), "wrote tag table");
        }
        None => write_csv_to(&table, io::stdout().lock())?,
    }
    Ok(())
}
