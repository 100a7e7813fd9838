//! CSV form of result tables.
//!
//! The first header row holds channel or tag names, the second statistic
//! labels (empty for tags). Missing cells are written as empty fields and
//! series as `[a;b;c]`.
//!
//! Tag cells are written untyped and re-parsed on read, so numeric-looking
//! text comes back as a number (`"001"` reads as `1`) and an empty text tag
//! reads as missing.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use cast_core::errors::codes;
use cast_core::{io_failure, CastError, ErrorInfo, TagValue};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::table::{Cell, ColumnKey, ResultTable};

/// Writes `table` to `path`, creating parent directories.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<(), CastError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_failure(parent, err))?;
    }
    let file = File::create(path).map_err(|err| io_failure(path, err))?;
    write_csv_to(table, BufWriter::new(file)).map_err(|err| with_path(err, path))
}

/// Writes `table` to any writer.
pub fn write_csv_to<W: Write>(table: &ResultTable, writer: W) -> Result<(), CastError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    let columns = table.columns();
    writer
        .write_record(columns.iter().map(|column| column.name.as_str()))
        .map_err(|err| wrap_csv("csv-write", err))?;
    writer
        .write_record(columns.iter().map(|column| column.stat.as_str()))
        .map_err(|err| wrap_csv("csv-write", err))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(render_cell))
            .map_err(|err| wrap_csv("csv-write", err))?;
    }
    writer
        .flush()
        .map_err(|err| CastError::Io(ErrorInfo::new(codes::IO_FAILURE, err.to_string())))
}

/// Reads a table written by [`write_csv`].
pub fn read_csv(path: &Path) -> Result<ResultTable, CastError> {
    let file = File::open(path).map_err(|err| io_failure(path, err))?;
    read_csv_from(file).map_err(|err| with_path(err, path))
}

/// Reads a two-row-header table from any reader.
///
/// Statistic placeholders left by spreadsheet tools (`Unnamed: 3_level_1`) are
/// read as empty, marking the column as a tag.
pub fn read_csv_from<R: Read>(reader: R) -> Result<ResultTable, CastError> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_reader(reader);
    let mut records = reader.records();
    let mut header_row = |which: &str| -> Result<StringRecord, CastError> {
        records
            .next()
            .ok_or_else(|| {
                CastError::Serde(
                    ErrorInfo::new(codes::TABLE_FORMAT, "missing header row")
                        .with_context("row", which),
                )
            })?
            .map_err(|err| wrap_csv("csv-read", err))
    };
    let names = header_row("names")?;
    let stats = header_row("statistics")?;
    let columns: Vec<ColumnKey> = names
        .iter()
        .zip(stats.iter())
        .map(|(name, stat)| ColumnKey {
            name: name.to_string(),
            stat: normalise_stat(stat).to_string(),
        })
        .collect();

    let mut table = ResultTable::new(columns);
    for (row_idx, record) in records.enumerate() {
        let record = record.map_err(|err| wrap_csv("csv-read", err))?;
        let row = table
            .columns()
            .iter()
            .zip(record.iter())
            .map(|(column, raw)| {
                parse_cell(column, raw).map_err(|err| match err {
                    CastError::Serde(info) => CastError::Serde(
                        info.with_context("row", row_idx.to_string())
                            .with_context("column", column.to_string()),
                    ),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        table.push_row(row)?;
    }
    Ok(table)
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Tag(value) => value.to_string(),
        Cell::Value(value) => value.to_string(),
        Cell::Series(values) => {
            let inner: Vec<String> = values.iter().map(f64::to_string).collect();
            format!("[{}]", inner.join(";"))
        }
        Cell::Missing => String::new(),
    }
}

fn parse_cell(column: &ColumnKey, raw: &str) -> Result<Cell, CastError> {
    if raw.is_empty() {
        return Ok(Cell::Missing);
    }
    if !column.is_computed() {
        return Ok(Cell::Tag(TagValue::parse(raw)));
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        if inner.is_empty() {
            return Ok(Cell::Series(Vec::new()));
        }
        return inner
            .split(';')
            .map(parse_number)
            .collect::<Result<Vec<_>, _>>()
            .map(Cell::Series);
    }
    parse_number(raw).map(Cell::Value)
}

fn parse_number(raw: &str) -> Result<f64, CastError> {
    raw.trim().parse::<f64>().map_err(|err| {
        CastError::Serde(
            ErrorInfo::new(codes::TABLE_FORMAT, "statistic cell is not a number")
                .with_context("value", raw)
                .with_hint(err.to_string()),
        )
    })
}

fn normalise_stat(raw: &str) -> &str {
    let raw = raw.trim();
    if raw.starts_with("Unnamed:") {
        ""
    } else {
        raw
    }
}

fn with_path(err: CastError, path: &Path) -> CastError {
    match err {
        CastError::Serde(info) => {
            CastError::Serde(info.with_context("path", path.display().to_string()))
        }
        CastError::Io(info) => CastError::Io(info.with_context("path", path.display().to_string())),
        other => other,
    }
}

fn wrap_csv(code: &str, err: csv::Error) -> CastError {
    CastError::Serde(ErrorInfo::new(code, "CSV table failure").with_hint(err.to_string()))
}
