extern crate nalgebra as na;
use na::{Const, Matrix3, SymmetricEigen, Vector6};

use crate::error::{FatigueError, Result};

#[derive(Debug, Clone)]
pub struct StressTensor {
    matrix: Matrix3<f64>,
    vector: Vector6<f64>,
}

impl StressTensor {
    pub fn new(matrix: Matrix3<f64>) -> Self {
        let vector = Self::matrix_to_vector(&matrix);
        StressTensor { matrix, vector }
    }

    /// Builds a tensor from its six components in Voigt order
    /// (σxx, σyy, σzz, τxy, τyz, τzx).
    pub fn from_voigt(components: &[f64; 6]) -> Self {
        let vector = Vector6::from_column_slice(components);
        StressTensor {
            matrix: Self::vector_to_matrix(&vector),
            vector,
        }
    }

    // Converts a Matrix3 to a Vector6 following Voigt notation
    fn matrix_to_vector(matrix: &Matrix3<f64>) -> Vector6<f64> {
        Vector6::new(
            matrix[(0, 0)], // σxx
            matrix[(1, 1)], // σyy
            matrix[(2, 2)], // σzz
            matrix[(0, 1)], // τxy
            matrix[(1, 2)], // τyz
            matrix[(0, 2)], // τzx
        )
    }

    fn vector_to_matrix(vector: &Vector6<f64>) -> Matrix3<f64> {
        Matrix3::new(
            vector[0], vector[3], vector[5], // Row 1: σxx, τxy, τzx
            vector[3], vector[1], vector[4], // Row 2: τxy, σyy, τyz
            vector[5], vector[4], vector[2], // Row 3: τzx, τyz, σzz
        )
    }

    pub fn principal_stresses(&self) -> SymmetricEigen<f64, Const<3>> {
        self.matrix.symmetric_eigen()
    }

    pub fn max_principal_stress(&self) -> f64 {
        self.principal_stresses()
            .eigenvalues
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn von_mises_stress(&self) -> f64 {
        let principal_stresses = self.principal_stresses();
        let s1 = principal_stresses.eigenvalues[0];
        let s2 = principal_stresses.eigenvalues[1];
        let s3 = principal_stresses.eigenvalues[2];
        (((s1 - s2).powi(2) + (s2 - s3).powi(2) + (s3 - s1).powi(2)) / 2.0).sqrt()
    }

    /// Von Mises stress carrying the sign of the principal stress with the
    /// largest magnitude, so that tension and compression stay distinguishable
    /// in a cycle count.
    pub fn signed_von_mises_stress(&self) -> f64 {
        let eigenvalues = self.principal_stresses().eigenvalues;
        let dominant = eigenvalues
            .iter()
            .copied()
            .fold(0.0_f64, |acc, s| if s.abs() > acc.abs() { s } else { acc });
        if dominant < 0.0 {
            -self.von_mises_stress()
        } else {
            self.von_mises_stress()
        }
    }

    /// Component `index` in Voigt order.
    pub fn component(&self, index: usize) -> Option<f64> {
        self.vector.get(index).copied()
    }
}

/// Reduces a multi-axial stress state to the scalar used for cycle counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressCriterion {
    VonMises,
    SignedVonMises,
    MaxPrincipal,
    /// A single Voigt component, 0 (σxx) to 5 (τzx).
    Component(usize),
}

impl StressCriterion {
    /// Parses the method names used in configuration files. `NONE` means the
    /// history is already scalar and yields `Ok(None)`.
    ///
    /// ```
    /// use fatigue_miner::stress::StressCriterion;
    ///
    /// assert_eq!(StressCriterion::from_method("VONMISES", None).unwrap(), Some(StressCriterion::VonMises));
    /// assert_eq!(StressCriterion::from_method("COMPONENT", Some(3)).unwrap(), Some(StressCriterion::Component(3)));
    /// assert!(StressCriterion::from_method("COMPONENT", None).is_err());
    /// assert_eq!(StressCriterion::from_method("NONE", None).unwrap(), None);
    /// ```
    pub fn from_method(method: &str, number: Option<usize>) -> Result<Option<Self>> {
        match method {
            "NONE" => Ok(None),
            "VONMISES" => Ok(Some(StressCriterion::VonMises)),
            "SIGNEDVONMISES" => Ok(Some(StressCriterion::SignedVonMises)),
            "MAXIMUM" => Ok(Some(StressCriterion::MaxPrincipal)),
            "COMPONENT" => match number {
                Some(index) if index < 6 => Ok(Some(StressCriterion::Component(index))),
                _ => Err(FatigueError::Validation(format!(
                    "number must be between 0 and 5 for method COMPONENT, got {:?}",
                    number
                ))),
            },
            _ => Err(FatigueError::Validation(format!(
                "method must be NONE, VONMISES, SIGNEDVONMISES, MAXIMUM or COMPONENT, got {}",
                method
            ))),
        }
    }

    pub fn evaluate(&self, tensor: &StressTensor) -> f64 {
        match *self {
            StressCriterion::VonMises => tensor.von_mises_stress(),
            StressCriterion::SignedVonMises => tensor.signed_von_mises_stress(),
            StressCriterion::MaxPrincipal => tensor.max_principal_stress(),
            StressCriterion::Component(index) => tensor.component(index).unwrap_or(f64::NAN),
        }
    }

    /// Maps a tensor history onto a scalar sample sequence.
    pub fn reduce(&self, tensors: &[StressTensor]) -> Vec<f64> {
        tensors.iter().map(|t| self.evaluate(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stress_tensor() {
        let matrix = Matrix3::new(
            1.0, 0.0, 2.0,
            0.0, 0.0, 0.0,
            2.0, 0.0, 3.0,
        );
        let stress = StressTensor::new(matrix);
        let max_principal_stress = stress.max_principal_stress();
        assert_relative_eq!(max_principal_stress, 4.2360679774997898, epsilon = 1e-6);
        let von_mises_stress = stress.von_mises_stress();
        assert_relative_eq!(von_mises_stress, 4.358898943540674, epsilon = 1e-6);
        assert_relative_eq!(stress.signed_von_mises_stress(), 4.358898943540674, epsilon = 1e-6);
    }

    #[test]
    fn test_signed_von_mises_follows_dominant_principal() {
        let compressive = StressTensor::from_voigt(&[-100.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(compressive.signed_von_mises_stress(), -100.0, epsilon = 1e-9);
        assert_relative_eq!(compressive.von_mises_stress(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_voigt_round_trip() {
        let vector = Vector6::new(1.0, 5.0, 9.0, 2.0, 6.0, 3.0);
        let expected_matrix = Matrix3::new(1.0, 2.0, 3.0, 2.0, 5.0, 6.0, 3.0, 6.0, 9.0);
        assert_eq!(StressTensor::vector_to_matrix(&vector), expected_matrix);

        let tensor = StressTensor::from_voigt(&[1.0, 5.0, 9.0, 2.0, 6.0, 3.0]);
        assert_eq!(tensor.matrix, expected_matrix);
        assert_eq!(tensor.component(3), Some(2.0));
        assert_eq!(tensor.component(6), None);
    }

    #[test]
    fn test_reduce_history() {
        let history = vec![
            StressTensor::from_voigt(&[10.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            StressTensor::from_voigt(&[-20.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            StressTensor::from_voigt(&[30.0, 0.0, 0.0, 4.0, 0.0, 0.0]),
        ];
        assert_eq!(StressCriterion::Component(0).reduce(&history), vec![10.0, -20.0, 30.0]);
        let signed = StressCriterion::SignedVonMises.reduce(&history);
        assert!(signed[0] > 0.0 && signed[1] < 0.0 && signed[2] > 0.0);
    }

    #[test]
    fn test_unknown_method() {
        assert!(StressCriterion::from_method("TRESCA", None).is_err());
        assert!(StressCriterion::from_method("COMPONENT", Some(6)).is_err());
    }
}
