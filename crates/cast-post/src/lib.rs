//! Post-processing of decoded campaign results.
//!
//! An [`Aggregation`] pairs a result table with the cases its rows came from
//! and grows statistic columns batch by batch. Row and column roll-ups and CSV
//! export operate on the resulting [`ResultTable`].

pub mod export;
pub mod fatigue;
mod pipeline;
pub mod psd;
mod report;
pub mod rollup;
pub mod scan;
pub mod stats;
pub mod table;

pub use export::{read_csv, write_csv};
pub use fatigue::{FatigueModel, RainflowDel};
pub use pipeline::{crawl, Aggregation, CaseSource, PipelineOpts, CRAWL_LABEL};
pub use report::{BatchReport, CaseFailure};
pub use rollup::{aggregate_columns, aggregate_rows, aggregate_rows_by};
pub use scan::{scan_directory, FilenamePattern};
pub use stats::{lookup, registry, StatParams, StatisticDef};
pub use table::{from_tags, sort_columns, Cell, ColumnKey, ResultTable};
