//! Design S-N curves parameterised by detail category.
//!
//! Direct stress curves have two slopes joined at the constant-amplitude
//! fatigue limit and a cut-off at 1e8 cycles; shear curves have a single slope
//! with the same cut-off.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Deserialize;

use crate::error::{FatigueError, Result};

/// Reference endurance at which the detail category is defined.
const N_REFERENCE: f64 = 2e6;
/// Endurance at the constant-amplitude fatigue limit (knee of the direct curve).
const N_KNEE: f64 = 5e6;
/// Endurance at the cut-off limit.
const N_CUTOFF: f64 = 1e8;

/// Selects which S-N curve shape applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StressType {
    /// Normal stress ranges, two-slope curve.
    #[default]
    Direct,
    /// Shear stress ranges, single-slope curve.
    Shear,
}

impl FromStr for StressType {
    type Err = FatigueError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DIRECT" => Ok(StressType::Direct),
            "SHEAR" => Ok(StressType::Shear),
            _ => Err(FatigueError::UnsupportedStressType(format!(
                "stress_type must be DIRECT or SHEAR, got {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for StressType {
    type Error = FatigueError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for StressType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StressType::Direct => write!(f, "DIRECT"),
            StressType::Shear => write!(f, "SHEAR"),
        }
    }
}

/// Shape parameters of the S-N curve.
///
/// `m1` and `m2` apply to direct stress curves only, `m_shear` to shear curves.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CurveParams {
    pub stress_type: StressType,
    /// Slope above the constant-amplitude fatigue limit.
    #[serde(rename = "first_slope")]
    pub m1: f64,
    /// Slope between the fatigue limit and the cut-off.
    #[serde(rename = "second_slope")]
    pub m2: f64,
    #[serde(rename = "shear_slope")]
    pub m_shear: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        CurveParams {
            stress_type: StressType::Direct,
            m1: 3.0,
            m2: 5.0,
            m_shear: 5.0,
        }
    }
}

impl CurveParams {
    /// Shear curve with the default slope.
    pub fn shear() -> Self {
        CurveParams {
            stress_type: StressType::Shear,
            ..Default::default()
        }
    }

    /// Validates that every slope is a positive, finite number.
    ///
    /// All three slopes are checked regardless of the selected stress type, so a
    /// configuration stays valid when only the selector is switched.
    pub fn validate(&self) -> Result<()> {
        for (name, slope) in [
            ("first_slope", self.m1),
            ("second_slope", self.m2),
            ("shear_slope", self.m_shear),
        ] {
            if !(slope.is_finite() && slope > 0.0) {
                return Err(FatigueError::Validation(format!(
                    "{} must be greater than 0, got {}",
                    name, slope
                )));
            }
        }
        Ok(())
    }
}

/// Constant-amplitude fatigue limit of a direct stress curve, the stress range
/// whose endurance on the first slope is 5e6 cycles.
pub fn fatigue_limit(detail_category: f64, m1: f64) -> f64 {
    (2.0_f64 / 5.0).powf(1.0 / m1) * detail_category
}

/// Cycles to failure at `stress_range` for a detail of the given category.
///
/// A zero range never fails and yields `f64::INFINITY`, as does any range
/// below the cut-off. Overflow in the power terms follows IEEE-754.
///
/// # Errors
///
/// `FatigueError::Domain` for a negative or NaN stress range, or a detail
/// category that is not strictly positive.
///
/// # Examples
///
/// ```
/// use fatigue_miner::curve::{endurance, CurveParams};
///
/// // At the detail category itself the endurance is the reference 2e6 cycles.
/// let n = endurance(71.0, 71.0, &CurveParams::default()).unwrap();
/// assert!((n - 2e6).abs() < 1e-3);
/// ```
pub fn endurance(stress_range: f64, detail_category: f64, params: &CurveParams) -> Result<f64> {
    if !(detail_category > 0.0) {
        return Err(FatigueError::Domain(format!(
            "detail category must be greater than 0, got {}",
            detail_category
        )));
    }
    if !(stress_range >= 0.0) {
        return Err(FatigueError::Domain(format!(
            "stress range must not be negative, got {}",
            stress_range
        )));
    }
    if stress_range == 0.0 {
        return Ok(f64::INFINITY);
    }

    match params.stress_type {
        StressType::Direct => {
            let (m1, m2) = (params.m1, params.m2);
            let n1 = detail_category.powf(m1) * N_REFERENCE / stress_range.powf(m1);
            if n1 <= N_KNEE {
                return Ok(n1);
            }
            let limit = fatigue_limit(detail_category, m1);
            let n2 = limit.powf(m2) * N_KNEE / stress_range.powf(m2);
            if n2 <= N_CUTOFF {
                Ok(n2)
            } else {
                Ok(f64::INFINITY)
            }
        }
        StressType::Shear => {
            let m = params.m_shear;
            let n1 = detail_category.powf(m) * N_REFERENCE / stress_range.powf(m);
            if n1 <= N_CUTOFF {
                Ok(n1)
            } else {
                Ok(f64::INFINITY)
            }
        }
    }
}

/// Elementwise [`endurance`] over a slice of stress ranges, order preserved.
///
/// The first failing element aborts the whole evaluation.
pub fn endurance_many(
    stress_ranges: &[f64],
    detail_category: f64,
    params: &CurveParams,
) -> Result<Vec<f64>> {
    stress_ranges
        .par_iter()
        .map(|&range| endurance(range, detail_category, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direct_first_slope() {
        // 160 -> 200: n1 = 0.512 * 2e6
        let n = endurance(200.0, 160.0, &CurveParams::default()).unwrap();
        assert_relative_eq!(n, 1.024e6, max_relative = 1e-12);
    }

    #[test]
    fn test_direct_second_slope_branch() {
        let params = CurveParams::default();
        let n1 = 160.0_f64.powi(3) * 2e6 / 100.0_f64.powi(3);
        assert!(n1 > 5e6, "first slope must not apply, n1 = {}", n1);

        let d = (0.4_f64).powf(1.0 / 3.0) * 160.0;
        let expected = d.powf(5.0) * 5e6 / 100.0_f64.powf(5.0);
        let n = endurance(100.0, 160.0, &params).unwrap();
        assert_relative_eq!(n, expected, max_relative = 1e-12);
        assert!(n <= 1e8);
        assert_relative_eq!(n, 1.1385e7, max_relative = 1e-3);
    }

    #[test]
    fn test_knee_is_continuous() {
        let params = CurveParams::default();
        let limit = fatigue_limit(71.0, 3.0);
        let n = endurance(limit, 71.0, &params).unwrap();
        assert_relative_eq!(n, 5e6, max_relative = 1e-9);
        let below = endurance(limit * 0.999, 71.0, &params).unwrap();
        assert!(below > 5e6);
    }

    #[test]
    fn test_direct_cutoff() {
        let params = CurveParams::default();
        let cutoff = fatigue_limit(71.0, 3.0) * (0.05_f64).powf(1.0 / 5.0);
        assert!(endurance(cutoff * 1.001, 71.0, &params).unwrap().is_finite());
        assert_eq!(endurance(cutoff * 0.99, 71.0, &params).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_shear_curve() {
        let params = CurveParams::shear();
        let n = endurance(100.0, 80.0, &params).unwrap();
        assert_relative_eq!(n, 0.8_f64.powi(5) * 2e6, max_relative = 1e-12);
        // The shear cut-off sits at 80 / 50^(1/5), roughly 36.6.
        assert!(endurance(37.0, 80.0, &params).unwrap().is_finite());
        assert_eq!(endurance(36.0, 80.0, &params).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_zero_range_is_infinite() {
        assert_eq!(endurance(0.0, 71.0, &CurveParams::default()).unwrap(), f64::INFINITY);
        assert_eq!(endurance(0.0, 71.0, &CurveParams::shear()).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_domain_errors() {
        let params = CurveParams::default();
        assert!(matches!(endurance(-1.0, 71.0, &params), Err(FatigueError::Domain(_))));
        assert!(matches!(endurance(f64::NAN, 71.0, &params), Err(FatigueError::Domain(_))));
        assert!(matches!(endurance(10.0, 0.0, &params), Err(FatigueError::Domain(_))));
        assert!(matches!(endurance(10.0, -71.0, &params), Err(FatigueError::Domain(_))));
    }

    #[test]
    fn test_stress_type_parsing() {
        assert_eq!("direct".parse::<StressType>().unwrap(), StressType::Direct);
        assert_eq!(" SHEAR ".parse::<StressType>().unwrap(), StressType::Shear);
        assert!(matches!(
            "torsion".parse::<StressType>(),
            Err(FatigueError::UnsupportedStressType(_))
        ));
    }

    #[test]
    fn test_endurance_many_preserves_order() {
        let params = CurveParams::default();
        let ranges = [200.0, 0.0, 100.0];
        let many = endurance_many(&ranges, 160.0, &params).unwrap();
        for (range, n) in ranges.iter().zip(many) {
            assert_eq!(n, endurance(*range, 160.0, &params).unwrap());
        }
        assert!(endurance_many(&[10.0, -1.0], 160.0, &params).is_err());
    }

    #[test]
    fn test_validate_slopes() {
        assert!(CurveParams::default().validate().is_ok());
        let params = CurveParams { m2: 0.0, ..Default::default() };
        assert!(matches!(params.validate(), Err(FatigueError::Validation(_))));
    }
}
