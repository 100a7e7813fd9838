use std::error::Error;
use std::path::PathBuf;

use cast_design::Freshness;
use clap::Args;

use super::{load_catalog, parse_predicate};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// YAML design file.
    #[arg(long)]
    pub design: PathBuf,
    /// Campaign root directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Row filter, `column=value[,value...]`; repeat to combine.
    #[arg(long = "where", value_name = "CLAUSE")]
    pub filters: Vec<String>,
}

pub fn run(args: &StatusArgs) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(&args.design, &args.root)?;
    let predicate = parse_predicate(&args.filters)?;
    let seeds = catalog.select(&predicate)?;
    let mut stale = 0usize;
    for seed in &seeds {
        let state = seed.freshness()?;
        if state != Freshness::Synchronized {
            stale += 1;
        }
        println!("{}\t{}\t{}", seed.casename(), seed.case_id(), state.label());
    }
    eprintln!("{} of {} cases synchronised", seeds.len() - stale, seeds.len());
    Ok(())
}
