//! Polar decomposition of 3x3 matrices into orthogonal and symmetric factors.

use crate::{
    consts::{POLAR_DECOMPOSITION_TOLERANCE, SMOOTHING_EPSILON},
    quaternion::Quaternion,
};
use anyhow::{Result, bail};
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Configuration parameters for the [`PolarDecomposer`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct PolarDecompositionConfig {
    /// The iteration stops when the 1-norm of the change in the orthogonal
    /// factor is at most this fraction of the 1-norm of the factor.
    pub tolerance: f32,
    /// The maximum number of Newton iterations to perform. If the tolerance
    /// has not been reached by then, the last iterate is used.
    pub max_iterations: u32,
    /// Entries of the symmetric factor within this distance of 0, 1 or -1
    /// are snapped to those values before the scaling is classified.
    pub smoothing_epsilon: f32,
}

/// Factors general 3x3 matrices `M` into an orthogonal matrix `Q` and a
/// symmetric matrix `S` with `M = Q S`, using a scaled Newton iteration
/// converging to the orthogonal matrix closest to `M`.
#[derive(Clone, Debug)]
pub struct PolarDecomposer {
    config: PolarDecompositionConfig,
}

/// The result of a successful polar decomposition `M = Q S`.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarDecomposition {
    orthogonal: Matrix3<f32>,
    symmetric: Matrix3<f32>,
    determinant: f32,
    n_iterations: u32,
    converged: bool,
    smoothing_epsilon: f32,
}

/// The kind of scaling represented by the symmetric factor of a polar
/// decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalingType {
    /// No scaling.
    Identity,
    /// The same scale factor along every axis.
    Uniform,
    /// Different scale factors along the coordinate axes.
    Aligned,
    /// Scaling along axes that are not the coordinate axes.
    Skew,
    /// The matrix could not be decomposed.
    Undefined,
}

/// Translation, rotation and scaling extracted from an affine transformation
/// matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineDecomposition {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion,
    /// Scaling (and possibly a reflection about the z-axis) applied before
    /// the rotation.
    pub scaling: Matrix3<f32>,
    /// Determinant of the orthogonal factor, -1 if the transformation
    /// includes a reflection.
    pub determinant: f32,
}

impl PolarDecomposer {
    /// Creates a new decomposer with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PolarDecompositionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolarDecompositionConfig {
        &self.config
    }

    /// Computes the polar decomposition of the given matrix, or returns
    /// [`None`] if the matrix (or one of the iterates) is singular.
    pub fn decompose(&self, m: &Matrix3<f32>) -> Option<PolarDecomposition> {
        let mut mk = *m;
        let mut mk_norm_1 = norm_1(&mk);
        let mut mk_norm_inf = norm_inf(&mk);

        let mut n_iterations = 0;
        let mut converged = false;

        while n_iterations < self.config.max_iterations {
            let Some(mk_inv_t) = inverse_transpose(&mk) else {
                log::debug!(
                    "Aborting polar decomposition on singular iterate after {n_iterations} iterations"
                );
                return None;
            };

            // The norm products scale as the fourth power of the matrix
            // scale, so they are formed in f64 to stay finite
            let ratio = (f64::from(norm_1(&mk_inv_t)) * f64::from(norm_inf(&mk_inv_t)))
                / (f64::from(mk_norm_1) * f64::from(mk_norm_inf));
            let gamma = ratio.sqrt().sqrt() as f32;

            let next = mk * (0.5 * gamma) + mk_inv_t * (0.5 / gamma);
            let step_norm_1 = norm_1(&(mk - next));

            mk = next;
            mk_norm_1 = norm_1(&mk);
            mk_norm_inf = norm_inf(&mk);
            n_iterations += 1;

            log::trace!(
                "Polar decomposition iteration {n_iterations}: step norm {step_norm_1}, gamma {gamma}"
            );

            if !mk.iter().all(|value| value.is_finite()) {
                log::debug!(
                    "Aborting polar decomposition on non-finite iterate after {n_iterations} iterations"
                );
                return None;
            }

            if step_norm_1 <= self.config.tolerance * mk_norm_1 {
                converged = true;
                break;
            }
        }

        if !converged {
            log::warn!(
                "Polar decomposition did not converge within {} iterations, using last iterate",
                self.config.max_iterations
            );
        }

        let q_t_m = mk.transpose() * m;
        let symmetric = (q_t_m + q_t_m.transpose()) * 0.5;

        Some(PolarDecomposition {
            orthogonal: mk,
            symmetric,
            determinant: mk.determinant(),
            n_iterations,
            converged,
            smoothing_epsilon: self.config.smoothing_epsilon,
        })
    }

    /// Decomposes the given matrix and classifies its scaling, giving
    /// [`ScalingType::Undefined`] if the matrix is singular.
    pub fn classify(&self, m: &Matrix3<f32>) -> ScalingType {
        self.decompose(m)
            .map_or(ScalingType::Undefined, |decomposition| decomposition.scaling_type())
    }

    /// Decomposes the affine transformation `matrix` (with the translation in
    /// the last column; the bottom row is ignored) into a translation, a
    /// rotation and a scaling matrix, so that the transformation is
    /// `x -> translation + rotation * scaling * x`. A reflection is absorbed
    /// into the scaling matrix. Returns [`None`] if the linear part is
    /// singular.
    pub fn decompose_affine(&self, matrix: &Matrix4<f32>) -> Option<AffineDecomposition> {
        let translation = matrix.fixed_view::<3, 1>(0, 3).into_owned();
        let linear_part = matrix.fixed_view::<3, 3>(0, 0).into_owned();

        let decomposition = self.decompose(&linear_part)?;

        Some(AffineDecomposition {
            translation,
            rotation: decomposition.rotation_quaternion(),
            scaling: decomposition.scaling(),
            determinant: decomposition.determinant(),
        })
    }
}

impl PolarDecompositionConfig {
    fn validate(&self) -> Result<()> {
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            bail!(
                "Invalid tolerance for polar decomposition: {}",
                self.tolerance
            );
        }
        if self.max_iterations == 0 {
            bail!(
                "Invalid maximum number of iterations for polar decomposition: {}",
                self.max_iterations
            );
        }
        if self.smoothing_epsilon.is_nan() || self.smoothing_epsilon < 0.0 {
            bail!(
                "Invalid smoothing epsilon for polar decomposition: {}",
                self.smoothing_epsilon
            );
        }
        Ok(())
    }
}

impl Default for PolarDecompositionConfig {
    fn default() -> Self {
        Self {
            tolerance: POLAR_DECOMPOSITION_TOLERANCE,
            max_iterations: 64,
            smoothing_epsilon: SMOOTHING_EPSILON,
        }
    }
}

impl Default for PolarDecomposer {
    fn default() -> Self {
        Self {
            config: PolarDecompositionConfig::default(),
        }
    }
}

impl PolarDecomposition {
    /// The orthogonal factor `Q`. Has determinant -1 if the decomposed matrix
    /// included a reflection.
    pub fn orthogonal(&self) -> &Matrix3<f32> {
        &self.orthogonal
    }

    /// The symmetric factor `S`.
    pub fn symmetric(&self) -> &Matrix3<f32> {
        &self.symmetric
    }

    /// The determinant of the orthogonal factor, either 1 or -1.
    pub fn determinant(&self) -> f32 {
        self.determinant
    }

    pub fn is_reflection(&self) -> bool {
        self.determinant < 0.0
    }

    pub fn n_iterations(&self) -> u32 {
        self.n_iterations
    }

    /// Whether the tolerance was reached before the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// The proper rotation part of the orthogonal factor. If the orthogonal
    /// factor includes a reflection, its third column is negated.
    pub fn rotation(&self) -> Matrix3<f32> {
        let mut rotation = self.orthogonal;
        if self.is_reflection() {
            rotation.column_mut(2).neg_mut();
        }
        rotation
    }

    /// The scaling to apply before [`Self::rotation`] to reproduce the
    /// decomposed matrix. Equals the symmetric factor unless the orthogonal
    /// factor includes a reflection, in which case the third row is negated
    /// to absorb it.
    pub fn scaling(&self) -> Matrix3<f32> {
        let mut scaling = self.symmetric;
        if self.is_reflection() {
            scaling.row_mut(2).neg_mut();
        }
        scaling
    }

    pub fn rotation_quaternion(&self) -> Quaternion {
        Quaternion::from_rotation_matrix(&self.rotation())
    }

    /// The symmetric factor with entries near 0, 1 and -1 snapped to those
    /// values.
    pub fn smoothed_symmetric(&self) -> Matrix3<f32> {
        smooth_matrix(&self.symmetric, self.smoothing_epsilon)
    }

    /// Classifies the symmetric factor after smoothing it.
    pub fn scaling_type(&self) -> ScalingType {
        ScalingType::of_matrix(&self.symmetric, self.smoothing_epsilon)
    }
}

impl ScalingType {
    /// Classifies the given symmetric scaling matrix after snapping its
    /// entries within `epsilon` of 0, 1 and -1. Diagonal entries within
    /// `epsilon` of each other count as equal.
    pub fn of_matrix(m: &Matrix3<f32>, epsilon: f32) -> Self {
        let m = smooth_matrix(m, epsilon);

        let has_off_diagonal = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .any(|(i, j)| i != j && m[(i, j)] != 0.0);
        if has_off_diagonal {
            return Self::Skew;
        }

        let diagonal = m.diagonal();
        if diagonal.iter().all(|&value| value == 1.0) {
            Self::Identity
        } else if (diagonal.x - diagonal.y).abs() <= epsilon
            && (diagonal.y - diagonal.z).abs() <= epsilon
        {
            Self::Uniform
        } else {
            Self::Aligned
        }
    }
}

/// Returns a copy of the matrix with entries within `epsilon` of 0, 1 or -1
/// replaced by those values.
pub fn smooth_matrix(m: &Matrix3<f32>, epsilon: f32) -> Matrix3<f32> {
    m.map(|value| {
        if value.abs() < epsilon {
            0.0
        } else if (value - 1.0).abs() < epsilon {
            1.0
        } else if (value + 1.0).abs() < epsilon {
            -1.0
        } else {
            value
        }
    })
}

/// Maximum absolute column sum.
fn norm_1(m: &Matrix3<f32>) -> f32 {
    m.column_iter()
        .map(|column| column.abs().sum())
        .fold(0.0, f32::max)
}

/// Maximum absolute row sum.
fn norm_inf(m: &Matrix3<f32>) -> f32 {
    m.row_iter().map(|row| row.abs().sum()).fold(0.0, f32::max)
}

fn inverse_transpose(m: &Matrix3<f32>) -> Option<Matrix3<f32>> {
    m.try_inverse().map(|inverse| inverse.transpose())
}

#[cfg(feature = "fuzzing")]
pub mod fuzzing {
    use super::*;
    use crate::quaternion::fuzzing::arbitrary_signed_norm_f32;
    use arbitrary::{Arbitrary, Result, Unstructured};

    /// A matrix with entries in `[-10, 10]`.
    #[derive(Clone, Debug)]
    pub struct ArbitraryMatrix3(pub Matrix3<f32>);

    impl Arbitrary<'_> for ArbitraryMatrix3 {
        fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self> {
            let mut m = Matrix3::zeros();
            for value in m.iter_mut() {
                *value = 10.0 * arbitrary_signed_norm_f32(u)?;
            }
            Ok(Self(m))
        }

        fn size_hint(_depth: usize) -> (usize, Option<usize>) {
            let size = 9 * std::mem::size_of::<i32>();
            (size, Some(size))
        }
    }

    pub fn fuzz_test_polar_decomposition(ArbitraryMatrix3(m): ArbitraryMatrix3) {
        let decomposer = PolarDecomposer::default();
        let Some(decomposition) = decomposer.decompose(&m) else {
            return;
        };
        if !decomposition.converged() {
            return;
        }
        let q = decomposition.orthogonal();
        let s = decomposition.symmetric();
        assert!((q.transpose() * q - Matrix3::identity()).abs().max() < 1e-2);
        assert!((s - s.transpose()).abs().max() < 1e-3 * m.abs().max().max(1.0));
    }
}
