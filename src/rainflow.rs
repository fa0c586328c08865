//! Four-point rainflow cycle counting (ASTM E1049-85).

use serde::Serialize;

use crate::error::Result;
use crate::extrema::extract_extrema;

/// A counted cycle: a half cycle has `weight` 0.5, a full cycle 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cycle {
    pub weight: f64,
    pub range: f64,
    pub mean: f64,
}

impl Cycle {
    fn between(weight: f64, from: f64, to: f64) -> Self {
        Cycle {
            weight,
            range: (from - to).abs(),
            mean: (from + to) / 2.0,
        }
    }
}

/// Counts the cycles of an extrema sequence.
///
/// The stack holds indices into `extrema`. Whenever the newest range is at
/// least as large as the one before it, the enclosed pair is closed: as a half
/// cycle when it sits at the bottom of the stack, otherwise as a full cycle.
/// What remains on the stack at the end is flushed as half cycles.
///
/// Cycles are returned in extraction order. Fewer than two extrema yield an
/// empty table.
pub fn count_cycles(extrema: &[f64]) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let mut stack: Vec<usize> = Vec::with_capacity(extrema.len());

    for i in 0..extrema.len() {
        stack.push(i);
        while stack.len() >= 3 {
            let top = stack.len();
            let (a, b, c) = (stack[top - 3], stack[top - 2], stack[top - 1]);
            let outer = (extrema[b] - extrema[c]).abs();
            let inner = (extrema[a] - extrema[b]).abs();
            if outer < inner {
                break;
            }
            if top == 3 {
                cycles.push(Cycle::between(0.5, extrema[a], extrema[b]));
                stack.remove(0);
            } else {
                cycles.push(Cycle::between(1.0, extrema[a], extrema[b]));
                stack.truncate(top - 3);
                stack.push(c);
            }
        }
    }

    for pair in stack.windows(2) {
        cycles.push(Cycle::between(0.5, extrema[pair[0]], extrema[pair[1]]));
    }

    cycles
}

/// Total cycle weight of a table.
pub fn total_weight(cycles: &[Cycle]) -> f64 {
    cycles.iter().map(|c| c.weight).sum()
}

/// Runs extraction and counting on a raw history and returns the cycle means
/// and ranges as two parallel columns.
pub fn rainflow(stress: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    let extrema = extract_extrema(stress)?;
    Ok(count_cycles(&extrema)
        .into_iter()
        .map(|c| (c.mean, c.range))
        .unzip())
}
