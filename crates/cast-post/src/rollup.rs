//! Row and column roll-ups over result tables.

use std::collections::HashMap;

use cast_core::CastError;
use tracing::debug;

use crate::table::{mean_cells, Cell, ColumnKey, ResultTable};

/// Collapses rows that differ only in the `nuisance` tag.
///
/// Rows are grouped by every other tag column; each computed column is
/// averaged across its group, skipping missing cells. The `nuisance` column is
/// dropped and groups appear in first-seen order.
pub fn aggregate_rows(table: &ResultTable, nuisance: &str) -> Result<ResultTable, CastError> {
    let keys: Vec<&str> = table
        .columns()
        .iter()
        .filter(|column| !column.is_computed() && column.name != nuisance)
        .map(|column| column.name.as_str())
        .collect();
    aggregate_rows_by(table, &keys, nuisance)
}

/// Like [`aggregate_rows`], grouping only by the `keys` tag columns.
///
/// Tag columns outside `keys`, such as per-case identifiers, are dropped.
pub fn aggregate_rows_by<S: AsRef<str>>(
    table: &ResultTable,
    keys: &[S],
    nuisance: &str,
) -> Result<ResultTable, CastError> {
    table.column_index(nuisance)?;
    let key_cols = keys
        .iter()
        .map(|key| key.as_ref())
        .filter(|name| *name != nuisance)
        .map(|name| table.column_index(name))
        .collect::<Result<Vec<usize>, CastError>>()?;
    let columns = table.columns();
    let value_cols: Vec<usize> = (0..columns.len())
        .filter(|&idx| columns[idx].is_computed())
        .collect();

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let key = group_key(key_cols.iter().map(|&idx| &row[idx]));
        let slot = *lookup.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row_idx);
    }

    let header: Vec<ColumnKey> = key_cols
        .iter()
        .chain(&value_cols)
        .map(|&idx| columns[idx].clone())
        .collect();
    let mut out = ResultTable::new(header);
    for members in &groups {
        let first = &table.rows()[members[0]];
        let mut row: Vec<Cell> = key_cols.iter().map(|&idx| first[idx].clone()).collect();
        for &col in &value_cols {
            row.push(mean_cells(
                members.iter().map(|&row_idx| &table.rows()[row_idx][col]),
            ));
        }
        out.push_row(row)?;
    }
    debug!(
        nuisance,
        rows = table.len(),
        groups = out.len(),
        "aggregated rows"
    );
    Ok(out)
}

/// Adds one `(stem, stat)` column per statistic label, averaging every
/// computed column whose channel name contains `stem`.
///
/// Original columns are kept. An existing `(stem, stat)` column is recomputed
/// in place rather than averaged into itself.
pub fn aggregate_columns(table: &ResultTable, stem: &str) -> Result<ResultTable, CastError> {
    let columns = table.columns();
    let mut labels: Vec<&str> = Vec::new();
    for column in columns.iter().filter(|column| column.is_computed()) {
        if !labels.contains(&column.stat.as_str()) {
            labels.push(&column.stat);
        }
    }

    let mut out = table.clone();
    for label in labels {
        let members: Vec<usize> = (0..columns.len())
            .filter(|&idx| {
                let column = &columns[idx];
                column.stat == label && column.name != stem && column.name.contains(stem)
            })
            .collect();
        if members.is_empty() {
            continue;
        }
        let values: Vec<Cell> = table
            .rows()
            .iter()
            .map(|row| mean_cells(members.iter().map(|&idx| &row[idx])))
            .collect();
        let key = ColumnKey::computed(stem, label);
        match out.columns().iter().position(|column| *column == key) {
            Some(idx) => out.replace_column(idx, values)?,
            None => out.push_column(key, values)?,
        }
        debug!(stem, statistic = label, members = members.len(), "aggregated columns");
    }
    Ok(out)
}

fn group_key<'a>(cells: impl Iterator<Item = &'a Cell>) -> String {
    cells
        .map(|cell| match cell.as_f64() {
            Some(number) => format!("n:{number}"),
            None => format!("{cell:?}"),
        })
        .collect::<Vec<_>>()
        .join("\u{1f}")
}
