use cast_core::{CastError, TagTable, TagValue};
use tracing::debug;

use crate::design::{Attributes, DesignSpace};

/// Expands `space` into one row per element of the Cartesian product of its
/// variables.
///
/// The left-most variable varies slowest. A design without variables yields a
/// single row; a variable with no values yields none. A failing function aborts
/// the whole expansion.
pub fn expand(space: &DesignSpace) -> Result<TagTable, CastError> {
    space.validate()?;
    let columns = space.attribute_names();
    let mut table = TagTable::new(columns);

    let sweeps: Vec<(&String, &Vec<TagValue>)> = space.variables.iter().collect();
    if sweeps.iter().any(|(_, values)| values.is_empty()) {
        debug!("design has an empty variable; expansion yields no cases");
        return Ok(table);
    }

    let mut odometer = vec![0usize; sweeps.len()];
    loop {
        let mut attrs: Attributes = space.constants.clone();
        for ((name, values), &pos) in sweeps.iter().zip(&odometer) {
            attrs.insert((*name).clone(), values[pos].clone());
        }
        for (name, derivation) in &space.functions {
            let value = derivation.evaluate(&attrs).map_err(|err| match err {
                CastError::Config(info) => CastError::Config(
                    info.with_context("function", name.as_str())
                        .with_context("row", table.len().to_string()),
                ),
                other => other,
            })?;
            attrs.insert(name.clone(), value);
        }
        table.push_row(attrs.into_values().collect())?;

        if !advance(&mut odometer, &sweeps) {
            break;
        }
    }
    debug!(cases = table.len(), "expanded design space");
    Ok(table)
}

fn advance(odometer: &mut [usize], sweeps: &[(&String, &Vec<TagValue>)]) -> bool {
    for slot in (0..odometer.len()).rev() {
        odometer[slot] += 1;
        if odometer[slot] < sweeps[slot].1.len() {
            return true;
        }
        odometer[slot] = 0;
    }
    false
}

impl DesignSpace {
    /// See [`expand`].
    pub fn expand(&self) -> Result<TagTable, CastError> {
        expand(self)
    }
}
