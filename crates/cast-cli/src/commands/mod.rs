pub mod decode;
pub mod expand;
pub mod postproc;
pub mod status;

use std::path::Path;

use cast_core::{CastError, ChannelMap, Predicate};
use cast_design::{load_design, CampaignLayout, CaseCatalog};

/// Combines repeated `--where column=v1,v2` clauses.
pub fn parse_predicate(clauses: &[String]) -> Result<Predicate, CastError> {
    clauses
        .iter()
        .try_fold(Predicate::new(), |predicate, clause| predicate.parse_clause(clause))
}

/// Parses a `name=index` channel assignment.
pub fn parse_channel(text: &str) -> Result<(String, usize), String> {
    let (name, index) = text
        .split_once('=')
        .ok_or_else(|| format!("expected name=index, got `{text}`"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid channel index in `{text}`: {err}"))?;
    Ok((name.trim().to_string(), index))
}

pub fn channel_map(pairs: &[(String, usize)]) -> ChannelMap {
    pairs.iter().map(|(name, index)| (name.clone(), *index)).collect()
}

pub fn load_catalog(design: &Path, root: &Path) -> Result<CaseCatalog, CastError> {
    let space = load_design(design)?;
    CaseCatalog::build(&space, CampaignLayout::new(root))
}
