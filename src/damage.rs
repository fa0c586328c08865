//! Palmgren-Miner damage accumulation over a rainflow-counted history.

use log::{debug, trace};
use serde::Serialize;

use crate::curve::{endurance, CurveParams};
use crate::error::{FatigueError, Result};
use crate::extrema::extract_extrema;
use crate::rainflow::{count_cycles, Cycle};

/// Options applied when accumulating damage.
///
/// The defaults reduce the computation to the unscaled case: a direct stress
/// curve with slopes 3 and 5, unit safety factors and a single repetition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageConfig {
    pub curve: CurveParams,
    /// Partial factor on the stress ranges (γFf).
    pub amplitude_safety_factor: f64,
    /// Partial factor dividing the detail category (γMf).
    pub strength_safety_factor: f64,
    /// Number of times the history is applied.
    pub repetitions: f64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        DamageConfig {
            curve: CurveParams::default(),
            amplitude_safety_factor: 1.0,
            strength_safety_factor: 1.0,
            repetitions: 1.0,
        }
    }
}

impl DamageConfig {
    /// Validates the curve slopes and checks that the factors and the
    /// repetition count are finite and not negative.
    pub fn validate(&self) -> Result<()> {
        self.curve.validate()?;
        for (name, value) in [
            ("amplitude_safety_factor", self.amplitude_safety_factor),
            ("strength_safety_factor", self.strength_safety_factor),
            ("repetitions", self.repetitions),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FatigueError::Validation(format!(
                    "{} must be a finite number >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Damage contribution of a single counted cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleDamage {
    #[serde(flatten)]
    pub cycle: Cycle,
    /// `weight * repetitions`.
    pub applied_cycles: f64,
    /// Endurance at the factored range, `inf` below the cut-off.
    #[serde(serialize_with = "serialize_endurance")]
    pub endurance: f64,
    pub damage: f64,
}

/// Result data of a full assessment, read by whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageReport {
    pub extrema: Vec<f64>,
    pub cycles: Vec<CycleDamage>,
    pub damage: f64,
    /// `damage >= 1`.
    pub failed: bool,
    /// Repetitions of the history that accumulate a damage of exactly 1.
    #[serde(serialize_with = "serialize_endurance")]
    pub repetitions_to_failure: f64,
}

// JSON has no infinity; unbounded values are written as null.
fn serialize_endurance<S: serde::Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

/// Evaluates the damage of each cycle in `cycles`.
///
/// Ranges are multiplied by the amplitude factor and the detail category is
/// divided by the strength factor before the curve is evaluated. Cycles with
/// unbounded endurance contribute exactly zero.
pub fn cycle_damages(
    cycles: &[Cycle],
    detail_category: f64,
    config: &DamageConfig,
) -> Result<Vec<CycleDamage>> {
    if !(detail_category > 0.0) {
        return Err(FatigueError::Domain(format!(
            "detail category must be greater than 0, got {}",
            detail_category
        )));
    }
    config.validate()?;

    let effective_category = detail_category / config.strength_safety_factor;
    cycles
        .iter()
        .map(|cycle| {
            let endurance = endurance(
                cycle.range * config.amplitude_safety_factor,
                effective_category,
                &config.curve,
            )?;
            let applied_cycles = cycle.weight * config.repetitions;
            let damage = if endurance.is_infinite() {
                0.0
            } else {
                applied_cycles / endurance
            };
            trace!(
                "range {} mean {} weight {}: N = {}, D = {}",
                cycle.range, cycle.mean, cycle.weight, endurance, damage
            );
            Ok(CycleDamage {
                cycle: *cycle,
                applied_cycles,
                endurance,
                damage,
            })
        })
        .collect()
}

/// Sums the damage of an already counted cycle table.
pub fn damage_from_cycles(cycles: &[Cycle], detail_category: f64, config: &DamageConfig) -> Result<f64> {
    Ok(cycle_damages(cycles, detail_category, config)?
        .iter()
        .map(|c| c.damage)
        .sum())
}

/// Accumulated damage of `history` applied `config.repetitions` times.
///
/// Failure is predicted when the returned value is at least 1; that threshold
/// is left to the caller.
///
/// # Examples
///
/// ```
/// use fatigue_miner::damage::{accumulate_damage, DamageConfig};
///
/// let config = DamageConfig { repetitions: 1e6, ..Default::default() };
/// let damage = accumulate_damage(&[0.0, 80.0, 0.0, 80.0, 0.0], 80.0, &config).unwrap();
/// // Two cycles at the detail category, 1e6 times: 2e6 / 2e6.
/// assert!((damage - 1.0).abs() < 1e-9);
/// ```
pub fn accumulate_damage(history: &[f64], detail_category: f64, config: &DamageConfig) -> Result<f64> {
    let extrema = extract_extrema(history)?;
    let cycles = count_cycles(&extrema);
    damage_from_cycles(&cycles, detail_category, config)
}

/// Runs the whole pipeline and keeps every intermediate result.
pub fn assess(history: &[f64], detail_category: f64, config: &DamageConfig) -> Result<DamageReport> {
    let extrema = extract_extrema(history)?;
    let cycles = count_cycles(&extrema);
    debug!(
        "{} samples reduced to {} extrema and {} cycles",
        history.len(),
        extrema.len(),
        cycles.len()
    );

    let cycles = cycle_damages(&cycles, detail_category, config)?;
    let damage: f64 = cycles.iter().map(|c| c.damage).sum();
    let per_repetition: f64 = cycles
        .iter()
        .filter(|c| c.endurance.is_finite())
        .map(|c| c.cycle.weight / c.endurance)
        .sum();
    let repetitions_to_failure = if per_repetition > 0.0 {
        1.0 / per_repetition
    } else {
        f64::INFINITY
    };
    debug!("damage {} ({} repetitions to failure)", damage, repetitions_to_failure);

    Ok(DamageReport {
        extrema,
        cycles,
        damage,
        failed: damage >= 1.0,
        repetitions_to_failure,
    })
}
