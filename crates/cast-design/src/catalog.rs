use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cast_core::errors::codes;
use cast_core::{stable_hash_string, CastError, ChannelMap, ErrorInfo, Predicate, TagTable, TagValue};
use cast_res::{decode_stem, result_pair, DecodedChannels};
use serde::Serialize;
use tracing::{debug, info};

use crate::design::DesignSpace;
use crate::freshness::{freshness, Freshness};

/// Tag grouping cases that share a directory.
pub const CASENAME: &str = "casename";
/// Tag naming each case; unique across the catalog and used as file stem.
pub const CASE_ID: &str = "case_id";

/// Fixed on-disk layout of a campaign below its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignLayout {
    root: PathBuf,
}

impl CampaignLayout {
    pub const INPUT_DIR: &'static str = "htc";
    pub const INPUT_EXTENSION: &'static str = "htc";
    pub const RESULT_DIR: &'static str = "res";
    pub const LOG_DIR: &'static str = "log";
    pub const LOG_EXTENSION: &'static str = "log";
    pub const POSTPROC_DIR: &'static str = "postproc";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves every artefact path of the case `casename/case_id`.
    pub fn paths(&self, casename: &str, case_id: &str) -> CasePaths {
        let under = |dir: &str| self.root.join(dir).join(casename);
        let result_stem = under(Self::RESULT_DIR).join(case_id);
        let (header, payload) = result_pair(&result_stem);
        CasePaths {
            input: under(Self::INPUT_DIR).join(format!("{case_id}.{}", Self::INPUT_EXTENSION)),
            result_stem,
            header,
            payload,
            log: under(Self::LOG_DIR).join(format!("{case_id}.{}", Self::LOG_EXTENSION)),
            postproc: under(Self::POSTPROC_DIR).join(case_id),
        }
    }
}

impl Default for CampaignLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Filesystem identities of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasePaths {
    pub input: PathBuf,
    pub result_stem: PathBuf,
    pub header: PathBuf,
    pub payload: PathBuf,
    pub log: PathBuf,
    pub postproc: PathBuf,
}

/// Design metadata shared read-only by every seed of a catalog.
#[derive(Debug)]
pub struct CatalogMeta {
    pub design_hash: String,
    pub source: Option<PathBuf>,
    pub key_tags: Vec<String>,
    pub channels: ChannelMap,
}

/// One case of the catalog: a tag row bound to its artefact paths.
#[derive(Clone)]
pub struct Seed {
    index: usize,
    case_id: String,
    casename: String,
    paths: CasePaths,
    table: Arc<TagTable>,
    meta: Arc<CatalogMeta>,
}

impl Seed {
    /// Position of the seed in catalog order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn casename(&self) -> &str {
        &self.casename
    }

    pub fn paths(&self) -> &CasePaths {
        &self.paths
    }

    pub fn meta(&self) -> &CatalogMeta {
        &self.meta
    }

    /// Full tag row, aligned with [`CaseCatalog::table`] columns.
    pub fn row(&self) -> &[TagValue] {
        &self.table.rows()[self.index]
    }

    /// Looks up a tag by name.
    pub fn tag(&self, name: &str) -> Result<&TagValue, CastError> {
        self.table
            .columns()
            .iter()
            .position(|column| column == name)
            .map(|idx| &self.row()[idx])
            .ok_or_else(|| {
                CastError::Query(
                    ErrorInfo::new(codes::UNKNOWN_TAG, "seed has no such tag")
                        .with_context("tag", name)
                        .with_context("case_id", self.case_id.as_str()),
                )
            })
    }

    /// `(name, value)` pairs of the design's key tags, or of every tag when
    /// the design names none.
    pub fn key_tags(&self) -> Vec<(&str, &TagValue)> {
        let columns = self.table.columns();
        if self.meta.key_tags.is_empty() {
            return columns
                .iter()
                .map(String::as_str)
                .zip(self.row())
                .collect();
        }
        self.meta
            .key_tags
            .iter()
            .filter_map(|tag| self.tag(tag).ok().map(|value| (tag.as_str(), value)))
            .collect()
    }

    /// Advisory staleness of this case against the design source.
    pub fn freshness(&self) -> Result<Freshness, CastError> {
        let source = self.meta.source.as_deref().ok_or_else(|| {
            CastError::Config(
                ErrorInfo::new(codes::FILE_NOT_FOUND, "design was not loaded from a file")
                    .with_hint("load the design with load_design to enable freshness checks"),
            )
        })?;
        freshness(source, &self.paths.input, &self.paths.header)
    }

    /// Decodes the design's channels from this case's result files.
    pub fn load(&self) -> Result<DecodedChannels, CastError> {
        self.load_channels(&self.meta.channels)
    }

    /// Decodes `channels` from this case's result files.
    pub fn load_channels(&self, channels: &ChannelMap) -> Result<DecodedChannels, CastError> {
        decode_stem(&self.paths.result_stem, channels).map_err(|err| match err {
            CastError::Decode(info) => {
                CastError::Decode(info.with_context("case_id", self.case_id.as_str()))
            }
            other => other,
        })
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed {}", self.case_id)
    }
}

/// Every case of an expanded design, in table order.
#[derive(Debug, Clone)]
pub struct CaseCatalog {
    table: Arc<TagTable>,
    seeds: Vec<Seed>,
    meta: Arc<CatalogMeta>,
    layout: CampaignLayout,
}

#[derive(Serialize)]
struct DesignFingerprint<'a> {
    columns: &'a [String],
    rows: &'a [Vec<TagValue>],
    key_tags: &'a [String],
    channels: &'a ChannelMap,
}

impl CaseCatalog {
    /// Expands `space` and binds each row to its artefact paths.
    ///
    /// Fails before any case is touched when the design does not derive
    /// `casename` and `case_id`, or when two rows share a `case_id`.
    pub fn build(space: &DesignSpace, layout: CampaignLayout) -> Result<Self, CastError> {
        let table = space.expand()?;
        let casename_col = mandatory_column(&table, CASENAME)?;
        let case_id_col = mandatory_column(&table, CASE_ID)?;

        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (row_idx, row) in table.rows().iter().enumerate() {
            let case_id = row[case_id_col].to_string();
            if let Some(previous) = first_seen.insert(case_id.clone(), row_idx) {
                return Err(CastError::Config(
                    ErrorInfo::new(codes::DUPLICATE_CASE_ID, "case_id is not unique")
                        .with_context("case_id", case_id)
                        .with_context("rows", format!("{previous},{row_idx}"))
                        .with_hint("derive case_id from every swept variable"),
                ));
            }
        }

        let design_hash = stable_hash_string(&DesignFingerprint {
            columns: table.columns(),
            rows: table.rows(),
            key_tags: space.key_tag_names(),
            channels: space.channel_map(),
        })?;
        let meta = Arc::new(CatalogMeta {
            design_hash,
            source: space.source_path().map(Path::to_path_buf),
            key_tags: space.key_tag_names().to_vec(),
            channels: space.channel_map().clone(),
        });
        let table = Arc::new(table);
        let seeds = table
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let casename = row[casename_col].to_string();
                let case_id = row[case_id_col].to_string();
                Seed {
                    index,
                    paths: layout.paths(&casename, &case_id),
                    case_id,
                    casename,
                    table: Arc::clone(&table),
                    meta: Arc::clone(&meta),
                }
            })
            .collect::<Vec<_>>();
        info!(cases = seeds.len(), design = %meta.design_hash, "built case catalog");
        Ok(Self {
            table,
            seeds,
            meta,
            layout,
        })
    }

    pub fn table(&self) -> &TagTable {
        &self.table
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn meta(&self) -> &CatalogMeta {
        &self.meta
    }

    pub fn layout(&self) -> &CampaignLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Seed> {
        self.seeds.iter()
    }

    /// Row mask of `predicate` over the tag table.
    pub fn mask(&self, predicate: &Predicate) -> Result<Vec<bool>, CastError> {
        self.table.mask(predicate)
    }

    /// Seeds matching `predicate`, in catalog order.
    pub fn select(&self, predicate: &Predicate) -> Result<Vec<&Seed>, CastError> {
        let mask = self.mask(predicate)?;
        let selected: Vec<&Seed> = self
            .seeds
            .iter()
            .zip(mask)
            .filter(|(_, keep)| *keep)
            .map(|(seed, _)| seed)
            .collect();
        debug!(selected = selected.len(), total = self.len(), "selected seeds");
        Ok(selected)
    }

    /// Selected seeds paired with their decoded design channels.
    ///
    /// Decoding failures are yielded alongside the seed rather than ending
    /// the iteration.
    pub fn iter_results<'a>(
        &'a self,
        predicate: &Predicate,
    ) -> Result<impl Iterator<Item = (&'a Seed, Result<DecodedChannels, CastError>)> + 'a, CastError>
    {
        let selected = self.select(predicate)?;
        Ok(selected.into_iter().map(|seed| (seed, seed.load())))
    }
}

impl<'a> IntoIterator for &'a CaseCatalog {
    type Item = &'a Seed;
    type IntoIter = std::slice::Iter<'a, Seed>;

    fn into_iter(self) -> Self::IntoIter {
        self.seeds.iter()
    }
}

fn mandatory_column(table: &TagTable, name: &str) -> Result<usize, CastError> {
    table
        .columns()
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| {
            CastError::Config(
                ErrorInfo::new(codes::MISSING_CASE_TAG, "design does not derive a mandatory tag")
                    .with_context("tag", name),
            )
        })
}
