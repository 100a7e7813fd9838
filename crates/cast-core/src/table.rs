//! Row-oriented tables with keyword filtering.
//!
//! Every query in the workspace goes through [`Table::mask`]: a conjunction
//! across columns of per-column clauses, where each clause accepts either one
//! value or any value of a set.

use serde::{Deserialize, Serialize};

use crate::errors::{codes, CastError, ErrorInfo};
use crate::value::TagValue;

/// Column identity usable in a [`Predicate`].
pub trait ColumnLabel {
    /// Name matched against predicate keys.
    fn name(&self) -> &str;

    /// Whether the column holds tags and may be addressed by a predicate.
    fn is_tag(&self) -> bool {
        true
    }
}

impl ColumnLabel for String {
    fn name(&self) -> &str {
        self
    }
}

/// Cell comparison against a predicate value.
pub trait CellMatch {
    /// Whether the cell equals `value`.
    fn matches(&self, value: &TagValue) -> bool;
}

impl CellMatch for TagValue {
    fn matches(&self, value: &TagValue) -> bool {
        self == value
    }
}

/// Accepted values for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Accept {
    /// Exact equality.
    Equals(TagValue),
    /// Membership in a set (logical OR across the set).
    AnyOf(Vec<TagValue>),
}

impl Accept {
    fn accepts<V: CellMatch>(&self, cell: &V) -> bool {
        match self {
            Accept::Equals(value) => cell.matches(value),
            Accept::AnyOf(values) => values.iter().any(|value| cell.matches(value)),
        }
    }
}

/// One column constraint of a [`Predicate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Constrained column name.
    pub column: String,
    /// Values the column may take.
    pub accept: Accept,
}

/// Conjunction of column clauses. The empty predicate accepts every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Creates a predicate without constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `column` to equal `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.clauses.push(Clause {
            column: column.into(),
            accept: Accept::Equals(value.into()),
        });
        self
    }

    /// Requires `column` to equal any element of `values`.
    pub fn any_of<I, T>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagValue>,
    {
        self.clauses.push(Clause {
            column: column.into(),
            accept: Accept::AnyOf(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Parses a `column=v1,v2` clause as used on the command line.
    ///
    /// A single value becomes an equality clause, several become a set.
    pub fn parse_clause(self, text: &str) -> Result<Self, CastError> {
        let (column, values) = text.split_once('=').ok_or_else(|| {
            CastError::Query(
                ErrorInfo::new(codes::PREDICATE_SYNTAX, "expected column=value[,value...]")
                    .with_context("clause", text),
            )
        })?;
        let mut values: Vec<TagValue> = values.split(',').map(TagValue::parse).collect();
        let column = column.trim();
        Ok(if values.len() == 1 {
            self.eq(column, values.remove(0))
        } else {
            self.any_of(column, values)
        })
    }

    /// Clauses in declaration order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether the predicate is unconstrained.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Rectangular table: a column header and rows of equal width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table<K, V> {
    columns: Vec<K>,
    rows: Vec<Vec<V>>,
}

impl<K, V> Table<K, V> {
    /// Creates an empty table with the given header.
    pub fn new(columns: Vec<K>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from rows, checking every row against the header width.
    pub fn from_rows(columns: Vec<K>, rows: Vec<Vec<V>>) -> Result<Self, CastError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<V>) -> Result<(), CastError> {
        if row.len() != self.columns.len() {
            return Err(width_error(self.columns.len(), row.len()));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a column with one value per row.
    pub fn push_column(&mut self, column: K, values: Vec<V>) -> Result<(), CastError> {
        if values.len() != self.rows.len() {
            return Err(width_error(self.rows.len(), values.len()));
        }
        self.columns.push(column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Overwrites the column at `index` with one value per row.
    pub fn replace_column(&mut self, index: usize, values: Vec<V>) -> Result<(), CastError> {
        if values.len() != self.rows.len() {
            return Err(width_error(self.rows.len(), values.len()));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
        Ok(())
    }

    /// Column header.
    pub fn columns(&self) -> &[K] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<V>] {
        &self.rows
    }

    /// Row at `index`.
    pub fn row(&self, index: usize) -> Option<&[V]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Values of the column at `index`, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &V> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reorders columns by the given permutation of column indices.
    pub fn reorder_columns(&mut self, order: &[usize])
    where
        K: Clone,
        V: Clone,
    {
        self.columns = order.iter().map(|&idx| self.columns[idx].clone()).collect();
        for row in &mut self.rows {
            *row = order.iter().map(|&idx| row[idx].clone()).collect();
        }
    }

    /// Keeps the rows whose mask entry is true, preserving order and header.
    pub fn select_rows(&self, mask: &[bool]) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

impl<K: ColumnLabel, V: CellMatch> Table<K, V> {
    /// Position of the tag column named `name`.
    pub fn column_index(&self, name: &str) -> Result<usize, CastError> {
        self.columns
            .iter()
            .position(|column| column.is_tag() && column.name() == name)
            .ok_or_else(|| CastError::column_not_found(name))
    }

    /// Evaluates `predicate` on every row.
    ///
    /// Unknown columns fail with `column-not-found` even on an empty table.
    pub fn mask(&self, predicate: &Predicate) -> Result<Vec<bool>, CastError> {
        let resolved = predicate
            .clauses()
            .iter()
            .map(|clause| Ok((self.column_index(&clause.column)?, &clause.accept)))
            .collect::<Result<Vec<_>, CastError>>()?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                resolved
                    .iter()
                    .all(|(index, accept)| accept.accepts(&row[*index]))
            })
            .collect())
    }

    /// Rows matching `predicate`, in original order with the same header.
    pub fn filter(&self, predicate: &Predicate) -> Result<Self, CastError>
    where
        K: Clone,
        V: Clone,
    {
        let mask = self.mask(predicate)?;
        Ok(self.select_rows(&mask))
    }
}

fn width_error(expected: usize, actual: usize) -> CastError {
    CastError::Config(
        ErrorInfo::new(codes::ROW_WIDTH, "row width does not match the table")
            .with_context("expected", expected.to_string())
            .with_context("actual", actual.to_string()),
    )
}

/// Table of design-space tags, one row per case.
pub type TagTable = Table<String, TagValue>;
