//! Static registry of built-in per-channel statistics.

use cast_core::errors::codes;
use cast_core::{CastError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::fatigue::{FatigueModel, RainflowDel};
use crate::psd::welch;
use crate::table::Cell;

/// Parameters shared by the built-in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatParams {
    /// Wöhler (S-N curve) exponent for fatigue-equivalent loads.
    pub wohler_exponent: f64,
    /// Equivalent cycle count the damage is normalised to.
    pub equivalent_cycles: f64,
    /// Sample rate in Hz for spectral estimates.
    pub sample_rate: f64,
    /// Welch segment length in samples.
    pub segment_length: usize,
}

impl Default for StatParams {
    fn default() -> Self {
        Self {
            wohler_exponent: 4.0,
            equivalent_cycles: 1.0,
            sample_rate: 1.0,
            segment_length: 256,
        }
    }
}

/// Per-channel statistic over one sample series.
pub type StatFn = fn(&[f64], &StatParams) -> Result<Cell, CastError>;

/// Registry entry: canonical name, column label and compute function.
#[derive(Debug, Clone, Copy)]
pub struct StatisticDef {
    pub name: &'static str,
    pub label: &'static str,
    pub compute: StatFn,
}

static REGISTRY: [StatisticDef; 6] = [
    StatisticDef {
        name: "mean",
        label: "mean",
        compute: mean,
    },
    StatisticDef {
        name: "variance",
        label: "var",
        compute: variance,
    },
    StatisticDef {
        name: "std",
        label: "std",
        compute: std_dev,
    },
    StatisticDef {
        name: "final-value",
        label: "final",
        compute: final_value,
    },
    StatisticDef {
        name: "fatigue-equivalent-load",
        label: "DEL",
        compute: equivalent_load,
    },
    StatisticDef {
        name: "power-spectral-density",
        label: "PSD",
        compute: spectral_density,
    },
];

/// Every built-in statistic in registration order.
pub fn registry() -> &'static [StatisticDef] {
    &REGISTRY
}

/// Finds a statistic by canonical name or column label.
pub fn lookup(name: &str) -> Result<&'static StatisticDef, CastError> {
    REGISTRY
        .iter()
        .find(|def| def.name == name || def.label == name)
        .ok_or_else(|| {
            let known: Vec<&str> = REGISTRY.iter().map(|def| def.name).collect();
            CastError::Config(
                ErrorInfo::new(codes::UNKNOWN_STATISTIC, "statistic is not registered")
                    .with_context("statistic", name)
                    .with_hint(format!("known statistics: {}", known.join(", "))),
            )
        })
}

fn non_empty(samples: &[f64]) -> Result<&[f64], CastError> {
    if samples.is_empty() {
        return Err(CastError::Decode(ErrorInfo::new(
            codes::EMPTY_SERIES,
            "cannot summarise an empty series",
        )));
    }
    Ok(samples)
}

fn average(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn population_variance(samples: &[f64]) -> f64 {
    let mean = average(samples);
    samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64
}

fn mean(samples: &[f64], _: &StatParams) -> Result<Cell, CastError> {
    Ok(Cell::Value(average(non_empty(samples)?)))
}

fn variance(samples: &[f64], _: &StatParams) -> Result<Cell, CastError> {
    Ok(Cell::Value(population_variance(non_empty(samples)?)))
}

fn std_dev(samples: &[f64], _: &StatParams) -> Result<Cell, CastError> {
    Ok(Cell::Value(population_variance(non_empty(samples)?).sqrt()))
}

fn final_value(samples: &[f64], _: &StatParams) -> Result<Cell, CastError> {
    non_empty(samples)?
        .last()
        .copied()
        .map(Cell::Value)
        .ok_or_else(|| CastError::Decode(ErrorInfo::new(codes::EMPTY_SERIES, "empty series")))
}

fn equivalent_load(samples: &[f64], params: &StatParams) -> Result<Cell, CastError> {
    let model = RainflowDel::new(params.equivalent_cycles);
    Ok(Cell::Value(
        model.equivalent_load(non_empty(samples)?, params.wohler_exponent),
    ))
}

fn spectral_density(samples: &[f64], params: &StatParams) -> Result<Cell, CastError> {
    Ok(Cell::Series(welch(
        non_empty(samples)?,
        params.sample_rate,
        params.segment_length,
    )))
}
