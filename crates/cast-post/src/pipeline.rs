use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cast_core::errors::codes;
use cast_core::{CastError, ChannelMap, ErrorInfo, Predicate};
use cast_design::{CaseCatalog, Seed};
use cast_res::{decode_stem, DecodedChannels};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::fatigue::FatigueModel;
use crate::report::{BatchReport, CaseFailure};
use crate::stats::{lookup, StatParams, StatisticDef};
use crate::table::{from_tags, Cell, ColumnKey, ResultTable};

/// Statistic label of the columns produced by [`crawl`].
pub const CRAWL_LABEL: &str = "value";

/// Options governing an aggregation batch.
#[derive(Debug, Clone)]
pub struct PipelineOpts {
    /// Number of cases decoded in parallel.
    pub workers: usize,
    /// Raised by the caller to abandon the running batch.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Parameters of the built-in statistics.
    pub stats: StatParams,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            workers: 1,
            cancel: None,
            stats: StatParams::default(),
        }
    }
}

impl PipelineOpts {
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

/// A case the pipeline decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSource {
    /// Case identifier used in logs and reports.
    pub label: String,
    /// Result stem; header and payload extensions are appended.
    pub stem: PathBuf,
}

/// Result table under construction, aligned row-for-row with its cases.
#[derive(Debug, Clone)]
pub struct Aggregation {
    table: ResultTable,
    cases: Vec<CaseSource>,
    channels: ChannelMap,
    opts: PipelineOpts,
    reports: Vec<BatchReport>,
}

impl Aggregation {
    /// Wraps a table whose rows correspond to `cases`, in order.
    pub fn new(
        table: ResultTable,
        cases: Vec<CaseSource>,
        channels: ChannelMap,
        opts: PipelineOpts,
    ) -> Result<Self, CastError> {
        if table.len() != cases.len() {
            return Err(CastError::Config(
                ErrorInfo::new(codes::ROW_WIDTH, "result table and case list disagree")
                    .with_context("rows", table.len().to_string())
                    .with_context("cases", cases.len().to_string()),
            ));
        }
        Ok(Self {
            table,
            cases,
            channels,
            opts,
            reports: Vec::new(),
        })
    }

    /// Starts from the catalog rows selected by `predicate`, decoding with the
    /// design's channel map.
    pub fn from_catalog(
        catalog: &CaseCatalog,
        predicate: &Predicate,
        opts: PipelineOpts,
    ) -> Result<Self, CastError> {
        let mask = catalog.mask(predicate)?;
        let table = from_tags(&catalog.table().select_rows(&mask))?;
        let cases = catalog
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(seed, _)| CaseSource {
                label: seed.case_id().to_string(),
                stem: seed.paths().result_stem.clone(),
            })
            .collect();
        Self::new(table, cases, catalog.meta().channels.clone(), opts)
    }

    /// Drops the rows, and their cases, that do not match `predicate`.
    pub fn retain(&mut self, predicate: &Predicate) -> Result<(), CastError> {
        let mask = self.table.mask(predicate)?;
        self.table = self.table.select_rows(&mask);
        let mut keep = mask.into_iter();
        self.cases.retain(|_| keep.next().unwrap_or(false));
        Ok(())
    }

    /// Replaces the channel map used for decoding.
    pub fn with_channels(mut self, channels: ChannelMap) -> Self {
        self.channels = channels;
        self
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn into_table(self) -> ResultTable {
        self.table
    }

    pub fn cases(&self) -> &[CaseSource] {
        &self.cases
    }

    pub fn channel_map(&self) -> &ChannelMap {
        &self.channels
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Reports of every batch run so far, oldest first.
    pub fn reports(&self) -> &[BatchReport] {
        &self.reports
    }

    /// Computes `(channel, label)` columns for every case.
    ///
    /// `compute` receives the decoded `channels` of one case and returns one
    /// cell per channel. A case that fails to decode or compute gets `Missing`
    /// cells and a report entry; the batch continues. Raising the cancel flag
    /// aborts with [`CastError::Cancelled`] and leaves the table untouched.
    /// An empty channel list selects every channel of the map.
    pub fn add_statistic<S, F>(
        &mut self,
        label: &str,
        channels: &[S],
        compute: F,
    ) -> Result<&BatchReport, CastError>
    where
        S: AsRef<str>,
        F: Fn(&DecodedChannels) -> Result<Vec<Cell>, CastError> + Sync,
    {
        let subset = self.channels.subset(channels)?;
        if subset.is_empty() {
            return Err(CastError::Config(
                ErrorInfo::new(codes::UNKNOWN_CHANNEL, "no channels to aggregate")
                    .with_context("statistic", label)
                    .with_hint("declare channels in the design or pass a channel map"),
            ));
        }
        let names: Vec<String> = subset.names().map(str::to_string).collect();
        info!(
            statistic = label,
            cases = self.cases.len(),
            channels = names.len(),
            "computing statistic"
        );

        let outcomes = run_indexed(&self.cases, &self.opts, |case| {
            let decoded = decode_stem(&case.stem, &subset)?;
            let cells = compute(&decoded)?;
            if cells.len() != names.len() {
                return Err(CastError::Config(
                    ErrorInfo::new(codes::STATISTIC_SHAPE, "statistic returned the wrong number of values")
                        .with_context("expected", names.len().to_string())
                        .with_context("actual", cells.len().to_string()),
                ));
            }
            debug!(case = %case.label, statistic = label, "computed statistic");
            Ok(cells)
        })?;

        let mut failed = Vec::new();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(self.cases.len()); names.len()];
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(cells) => {
                    for (column, cell) in columns.iter_mut().zip(cells) {
                        column.push(cell);
                    }
                }
                Err(err) => {
                    let case = &self.cases[index];
                    warn!(case = %case.label, code = err.code(), "statistic failed for case");
                    failed.push(CaseFailure::new(index, case.label.as_str(), &err));
                    for column in &mut columns {
                        column.push(Cell::Missing);
                    }
                }
            }
        }
        for (name, values) in names.iter().zip(columns) {
            self.set_column(ColumnKey::computed(name.as_str(), label), values)?;
        }

        let report = BatchReport::new(label, self.cases.len(), failed);
        info!(
            statistic = label,
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "statistic complete"
        );
        self.reports.push(report);
        Ok(&self.reports[self.reports.len() - 1])
    }

    /// Computes a registered statistic by name or label.
    pub fn add_builtin<S: AsRef<str>>(
        &mut self,
        name: &str,
        channels: &[S],
    ) -> Result<&BatchReport, CastError> {
        let params = self.opts.stats;
        self.add_registered(lookup(name)?, channels, params)
    }

    pub fn add_mean<S: AsRef<str>>(&mut self, channels: &[S]) -> Result<&BatchReport, CastError> {
        self.add_builtin("mean", channels)
    }

    /// Fatigue-equivalent loads with Wöhler exponent `m`.
    pub fn add_del<S: AsRef<str>>(
        &mut self,
        channels: &[S],
        m: f64,
    ) -> Result<&BatchReport, CastError> {
        let params = StatParams {
            wohler_exponent: m,
            ..self.opts.stats
        };
        self.add_registered(lookup("DEL")?, channels, params)
    }

    /// Fatigue-equivalent loads computed by a caller-supplied model.
    pub fn add_del_with<S, M>(
        &mut self,
        channels: &[S],
        model: &M,
        m: f64,
    ) -> Result<&BatchReport, CastError>
    where
        S: AsRef<str>,
        M: FatigueModel + Sync,
    {
        self.add_statistic("DEL", channels, |decoded| {
            Ok(decoded
                .iter()
                .map(|(_, samples)| Cell::Value(model.equivalent_load(samples, m)))
                .collect())
        })
    }

    fn add_registered<S: AsRef<str>>(
        &mut self,
        def: &'static StatisticDef,
        channels: &[S],
        params: StatParams,
    ) -> Result<&BatchReport, CastError> {
        self.add_statistic(def.label, channels, move |decoded| {
            decoded
                .iter()
                .map(|(_, samples)| (def.compute)(samples, &params))
                .collect()
        })
    }

    fn set_column(&mut self, key: ColumnKey, values: Vec<Cell>) -> Result<(), CastError> {
        match self.table.columns().iter().position(|column| *column == key) {
            Some(index) => self.table.replace_column(index, values),
            None => self.table.push_column(key, values),
        }
    }
}

/// Applies `func` to every selected case and tabulates its named outputs.
///
/// Rows carry the case's tags followed by one `(name, "value")` column per
/// output name, in first-seen order. Cases that fail are left out of the
/// table and counted in the report.
pub fn crawl<F>(
    catalog: &CaseCatalog,
    predicate: &Predicate,
    opts: &PipelineOpts,
    func: F,
) -> Result<(ResultTable, BatchReport), CastError>
where
    F: Fn(&Seed, &DecodedChannels) -> Result<IndexMap<String, f64>, CastError> + Sync,
{
    let seeds = catalog.select(predicate)?;
    info!(cases = seeds.len(), "crawling cases");
    let outcomes = run_indexed(&seeds, opts, |seed| func(seed, &seed.load()?))?;

    let mut failed = Vec::new();
    let mut kept: Vec<(&Seed, IndexMap<String, f64>)> = Vec::new();
    for (index, (seed, outcome)) in seeds.iter().copied().zip(outcomes).enumerate() {
        match outcome {
            Ok(outputs) => kept.push((seed, outputs)),
            Err(err) => {
                warn!(case = %seed.case_id(), code = err.code(), "skipping case");
                failed.push(CaseFailure::new(index, seed.case_id(), &err));
            }
        }
    }

    let mut names: Vec<&str> = Vec::new();
    for (_, outputs) in &kept {
        for name in outputs.keys() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
    }
    let mut columns: Vec<ColumnKey> = catalog.table().columns().iter().map(ColumnKey::tag).collect();
    columns.extend(names.iter().map(|name| ColumnKey::computed(*name, CRAWL_LABEL)));
    let mut table = ResultTable::new(columns);
    for (seed, outputs) in &kept {
        let mut row: Vec<Cell> = seed.row().iter().cloned().map(Cell::Tag).collect();
        row.extend(names.iter().map(|name| {
            outputs
                .get(*name)
                .map(|value| Cell::Value(*value))
                .unwrap_or(Cell::Missing)
        }));
        table.push_row(row)?;
    }
    let report = BatchReport::new("crawl", seeds.len(), failed);
    info!(succeeded = report.succeeded, failed = report.failed.len(), "crawl complete");
    Ok((table, report))
}

fn run_indexed<I, T, F>(
    items: &[I],
    opts: &PipelineOpts,
    job: F,
) -> Result<Vec<Result<T, CastError>>, CastError>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> Result<T, CastError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.workers.max(1))
        .build()
        .map_err(|err| CastError::Io(ErrorInfo::new(codes::THREAD_POOL, err.to_string())))?;

    let results: Result<Vec<(usize, Result<T, CastError>)>, CastError> = pool.install(|| {
        items
            .par_iter()
            .enumerate()
            .map(|(index, item)| {
                if opts.is_cancelled() {
                    return Err(cancelled(index));
                }
                Ok((index, job(item)))
            })
            .collect()
    });

    let mut ordered = results?;
    if opts.is_cancelled() {
        return Err(cancelled(ordered.len()));
    }
    ordered.sort_by_key(|(index, _)| *index);
    Ok(ordered.into_iter().map(|(_, outcome)| outcome).collect())
}

fn cancelled(index: usize) -> CastError {
    CastError::Cancelled(
        ErrorInfo::new(codes::BATCH_CANCELLED, "batch interrupted; partial results discarded")
            .with_context("at_case", index.to_string()),
    )
}
