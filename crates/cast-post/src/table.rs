use std::fmt;

use cast_core::{CastError, CellMatch, ColumnLabel, Table, TagTable, TagValue};
use serde::{Deserialize, Serialize};

/// Two-level column identity: a channel or tag name and a statistic label.
///
/// Tag columns carry an empty statistic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub name: String,
    pub stat: String,
}

impl ColumnKey {
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stat: String::new(),
        }
    }

    pub fn computed(name: impl Into<String>, stat: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stat: stat.into(),
        }
    }

    pub fn is_computed(&self) -> bool {
        !self.stat.is_empty()
    }
}

impl ColumnLabel for ColumnKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_tag(&self) -> bool {
        self.stat.is_empty()
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stat.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.name, self.stat)
        }
    }
}

/// One cell of a result table.
///
/// `Missing` marks a case whose statistic could not be computed and is never
/// conflated with a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Tag(TagValue),
    Value(f64),
    Series(Vec<f64>),
    Missing,
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Value(value) => Some(*value),
            Cell::Tag(tag) => tag.as_f64(),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Cell::Series(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl CellMatch for Cell {
    fn matches(&self, value: &TagValue) -> bool {
        match self {
            Cell::Tag(tag) => tag == value,
            Cell::Value(number) => value.as_f64() == Some(*number),
            Cell::Series(_) | Cell::Missing => false,
        }
    }
}

impl From<TagValue> for Cell {
    fn from(value: TagValue) -> Self {
        Cell::Tag(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Value(value)
    }
}

impl From<Vec<f64>> for Cell {
    fn from(values: Vec<f64>) -> Self {
        Cell::Series(values)
    }
}

/// Queryable table of tags and per-case statistics.
pub type ResultTable = Table<ColumnKey, Cell>;

/// Lifts a tag table into a result table without computed columns.
pub fn from_tags(tags: &TagTable) -> Result<ResultTable, CastError> {
    ResultTable::from_rows(
        tags.columns().iter().map(ColumnKey::tag).collect(),
        tags.rows()
            .iter()
            .map(|row| row.iter().cloned().map(Cell::Tag).collect())
            .collect(),
    )
}

/// Reorders columns: tags first, then computed columns grouped by channel.
///
/// Channels keep their first-seen order, as do statistics within a channel.
pub fn sort_columns(table: &mut ResultTable) {
    let columns = table.columns();
    let mut order: Vec<usize> = (0..columns.len())
        .filter(|&idx| !columns[idx].is_computed())
        .collect();
    let mut channels: Vec<&str> = Vec::new();
    for column in columns.iter().filter(|column| column.is_computed()) {
        if !channels.contains(&column.name.as_str()) {
            channels.push(&column.name);
        }
    }
    for channel in channels {
        order.extend(
            (0..columns.len())
                .filter(|&idx| columns[idx].is_computed() && columns[idx].name == channel),
        );
    }
    table.reorder_columns(&order);
}

/// Averages cells column-wise.
///
/// Missing cells are skipped; scalars give their mean, series of equal length
/// their elementwise mean. An all-missing input or a mix of shapes yields
/// `Missing`.
pub fn mean_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Cell {
    let mut scalars: Vec<f64> = Vec::new();
    let mut series: Vec<&[f64]> = Vec::new();
    for cell in cells {
        match cell {
            Cell::Value(value) => scalars.push(*value),
            Cell::Series(values) => series.push(values),
            Cell::Tag(tag) => match tag.as_f64() {
                Some(value) => scalars.push(value),
                None => return Cell::Missing,
            },
            Cell::Missing => {}
        }
    }
    match (scalars.is_empty(), series.is_empty()) {
        (false, true) => Cell::Value(scalars.iter().sum::<f64>() / scalars.len() as f64),
        (true, false) => {
            let width = series[0].len();
            if series.iter().any(|values| values.len() != width) {
                return Cell::Missing;
            }
            let count = series.len() as f64;
            Cell::Series(
                (0..width)
                    .map(|idx| series.iter().map(|values| values[idx]).sum::<f64>() / count)
                    .collect(),
            )
        }
        _ => Cell::Missing,
    }
}
