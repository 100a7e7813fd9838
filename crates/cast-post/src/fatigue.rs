//! Fatigue-equivalent load.

/// Reduces a load history to a single damage-equivalent amplitude.
pub trait FatigueModel {
    /// Equivalent load of `samples` for Wöhler exponent `m`.
    fn equivalent_load(&self, samples: &[f64], m: f64) -> f64;
}

/// Rainflow counting followed by Palmgren-Miner summation.
///
/// `DEL = (Σ n_i S_i^m / n_eq)^(1/m)` where `S_i` are cycle ranges, `n_i` is 1
/// for closed cycles and 0.5 for residual half cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainflowDel {
    pub equivalent_cycles: f64,
}

impl Default for RainflowDel {
    fn default() -> Self {
        Self {
            equivalent_cycles: 1.0,
        }
    }
}

impl RainflowDel {
    pub fn new(equivalent_cycles: f64) -> Self {
        Self { equivalent_cycles }
    }
}

impl FatigueModel for RainflowDel {
    fn equivalent_load(&self, samples: &[f64], m: f64) -> f64 {
        let damage: f64 = rainflow(samples)
            .into_iter()
            .map(|(range, count)| count * range.powf(m))
            .sum();
        (damage / self.equivalent_cycles).powf(1.0 / m)
    }
}

/// Turning points of `samples`, plateaus collapsed.
pub fn reversals(samples: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for &sample in samples {
        if out.last() == Some(&sample) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            if (b - a) * (sample - b) > 0.0 {
                // still climbing or falling; extend the excursion
                out.pop();
            }
        }
        out.push(sample);
    }
    out
}

/// Four-point rainflow count returning `(range, count)` pairs.
///
/// Closed cycles count 1, residual half cycles count 0.5.
pub fn rainflow(samples: &[f64]) -> Vec<(f64, f64)> {
    let mut cycles = Vec::new();
    let mut stack: Vec<f64> = Vec::new();
    for point in reversals(samples) {
        stack.push(point);
        while stack.len() >= 4 {
            let n = stack.len();
            let outer_first = (stack[n - 3] - stack[n - 4]).abs();
            let inner = (stack[n - 2] - stack[n - 3]).abs();
            let outer_last = (stack[n - 1] - stack[n - 2]).abs();
            if inner <= outer_first && inner <= outer_last {
                cycles.push((inner, 1.0));
                stack.drain(n - 3..n - 1);
            } else {
                break;
            }
        }
    }
    for pair in stack.windows(2) {
        cycles.push(((pair[1] - pair[0]).abs(), 0.5));
    }
    cycles
}
