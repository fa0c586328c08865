//! Reduction of a raw stress history to its turning points.

use crate::error::{FatigueError, Result};

/// Extracts the local maxima and minima of `samples`, keeping both endpoints.
///
/// A sample is kept when it is strictly above (or strictly below) both the last
/// kept value and the next raw sample. Flat runs are never promoted, so a
/// plateau only survives through boundary samples that pass the test on their
/// own.
///
/// # Errors
///
/// Returns `FatigueError::InvalidInput` when fewer than two samples are given.
///
/// # Examples
///
/// ```
/// use fatigue_miner::extrema::extract_extrema;
///
/// let extrema = extract_extrema(&[0.0, 1.0, 2.0, 1.0, 3.0]).unwrap();
/// assert_eq!(extrema, vec![0.0, 2.0, 1.0, 3.0]);
/// ```
pub fn extract_extrema(samples: &[f64]) -> Result<Vec<f64>> {
    if samples.len() < 2 {
        return Err(FatigueError::InvalidInput(format!(
            "at least 2 samples are required to extract extrema, got {}",
            samples.len()
        )));
    }

    let mut extrema = vec![samples[0]];
    let mut last = samples[0];
    for window in samples.windows(2).skip(1) {
        let (current, next) = (window[0], window[1]);
        let peak = current > last && current > next;
        let valley = current < last && current < next;
        if peak || valley {
            extrema.push(current);
            last = current;
        }
    }
    extrema.push(samples[samples.len() - 1]);

    Ok(extrema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turning_points_are_kept() {
        let extrema = extract_extrema(&[1.0, 5.0, 1.0, 5.0, 1.0]).unwrap();
        assert_eq!(extrema, vec![1.0, 5.0, 1.0, 5.0, 1.0]);
    }

    #[test]
    fn test_monotone_runs_collapse() {
        let extrema = extract_extrema(&[0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 4.0]).unwrap();
        assert_eq!(extrema, vec![0.0, 3.0, 1.0, 4.0]);
    }

    #[test]
    fn test_flat_history_keeps_endpoints() {
        let extrema = extract_extrema(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(extrema, vec![0.0, 0.0]);
    }

    #[test]
    fn test_plateau_keeps_only_its_trailing_edge() {
        // The first plateau sample ties with its right neighbour and is dropped.
        let extrema = extract_extrema(&[0.0, 2.0, 2.0, 0.0]).unwrap();
        assert_eq!(extrema, vec![0.0, 2.0, 0.0]);

        let extrema = extract_extrema(&[0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(extrema, vec![0.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_two_samples_pass_through() {
        let extrema = extract_extrema(&[3.0, -1.0]).unwrap();
        assert_eq!(extrema, vec![3.0, -1.0]);
    }

    #[test]
    fn test_too_short_history_is_rejected() {
        assert!(matches!(
            extract_extrema(&[1.0]),
            Err(FatigueError::InvalidInput(_))
        ));
        assert!(matches!(
            extract_extrema(&[]),
            Err(FatigueError::InvalidInput(_))
        ));
    }
}
