//! Hermite curves on the rotation manifold.
//!
//! A segment interpolates between two orientations while matching given
//! angular velocities at both ends, making chains of segments C1-continuous.
//! The construction follows Kim, Kim and Shin, "A general construction scheme
//! for unit quaternion curves with simple high order derivatives" (SIGGRAPH
//! 1995): with cumulative cubic Bernstein bases `b1, b2, b3` and control
//! tangents `w1, w2, w3`,
//!
//! ```text
//! q(t) = q_start exp(w1 b1(t)) exp(w2 b2(t)) exp(w3 b3(t))
//! ```
//!
//! where `w1` and `w3` follow from the boundary angular velocities and `w2`
//! is chosen in closed form so that `q(1) = q_end`.

use crate::quaternion::Quaternion;
use anyhow::{Result, bail};
use nalgebra::Vector3;

/// Factor converting a boundary angular velocity into the rate of the
/// tangent vectors passed to [`Quaternion::exp`] by the curve construction.
///
/// The construction is formulated with the exponential map
/// `e^v = (cos|v|, sin|v| v/|v|)`, under which a rotation with angular
/// velocity `ω` has tangent rate `ω/2`. [`Quaternion::exp`] uses the
/// half-angle map `(cos(|v|/2), sin(|v|/2) v/|v|)`, which equals the former
/// at `2v`. The halving and the doubling cancel, leaving a factor of one.
pub const ANGULAR_VELOCITY_TO_TANGENT_RATE: f32 = 1.0;

/// A cubic Hermite segment on the rotation manifold between two orientations
/// with prescribed angular velocities at both ends.
///
/// Angular velocities are expressed in the rotating (body) frame, i.e. the
/// curve satisfies `q'(t) = q(t) (0, ω(t)/2)` at the ends, and are given per
/// unit curve parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HermiteQuaternionCurve {
    start: Quaternion,
    w1: Vector3<f32>,
    w2: Vector3<f32>,
    w3: Vector3<f32>,
}

impl HermiteQuaternionCurve {
    /// Creates the segment from `start` (with angular velocity
    /// `start_angular_velocity`) to `end` (with angular velocity
    /// `end_angular_velocity`).
    ///
    /// The segment follows the arc implied by the sign of `end` relative to
    /// `start`: if `start.dot(end) < 0`, it takes the long way round, by
    /// more than half a turn. Keyframes that may lie in opposite hemispheres,
    /// such as ones converted from rotation matrices, should have `end`
    /// negated first when the shortest arc is wanted.
    pub fn new(
        start: &Quaternion,
        end: &Quaternion,
        start_angular_velocity: &Vector3<f32>,
        end_angular_velocity: &Vector3<f32>,
    ) -> Self {
        // The cumulative bases have derivative 3 at their end of the segment
        let w1 = start_angular_velocity * (ANGULAR_VELOCITY_TO_TANGENT_RATE / 3.0);
        let w3 = end_angular_velocity * (ANGULAR_VELOCITY_TO_TANGENT_RATE / 3.0);

        // exp(w1)^-1 start^-1 end exp(w3)^-1
        let mut middle = Quaternion::exp(&w1)
            .conjugate()
            .mul_conjugate_right(start)
            .compose(end)
            .mul_conjugate_right(&Quaternion::exp(&w3));

        // For nearly identical endpoints, rounding can push the scalar part
        // of the unnormalized product past 1, so it must be normalized
        // before taking the logarithm
        middle.normalize();
        let w2 = middle.log();

        Self {
            start: *start,
            w1,
            w2,
            w3,
        }
    }

    /// Evaluates the curve at parameter `t`, where `t = 0` gives the start
    /// and `t = 1` the end orientation. `t` is not clamped.
    pub fn evaluate(&self, t: f32) -> Quaternion {
        let one_minus_t = 1.0 - t;
        let b1 = 1.0 - one_minus_t * one_minus_t * one_minus_t;
        let b2 = 3.0 * t * t - 2.0 * t * t * t;
        let b3 = t * t * t;

        self.start
            * Quaternion::exp(&(self.w1 * b1))
            * Quaternion::exp(&(self.w2 * b2))
            * Quaternion::exp(&(self.w3 * b3))
    }

    /// Evaluates the curve at each of the given parameters.
    ///
    /// # Errors
    /// Returns an error if `parameters` and `out` differ in length.
    pub fn evaluate_into(&self, parameters: &[f32], out: &mut [Quaternion]) -> Result<()> {
        if parameters.len() != out.len() {
            bail!(
                "Cannot evaluate curve at {} parameters into {} quaternions",
                parameters.len(),
                out.len()
            );
        }
        for (&t, q) in parameters.iter().zip(out) {
            *q = self.evaluate(t);
        }
        Ok(())
    }
}

/// Evaluates the Hermite segment from `start` to `end` with the given
/// boundary angular velocities at parameter `t`. Use
/// [`HermiteQuaternionCurve`] directly to evaluate the same segment at many
/// parameters.
pub fn hermite(
    start: &Quaternion,
    end: &Quaternion,
    start_angular_velocity: &Vector3<f32>,
    end_angular_velocity: &Vector3<f32>,
    t: f32,
) -> Quaternion {
    HermiteQuaternionCurve::new(start, end, start_angular_velocity, end_angular_velocity)
        .evaluate(t)
}
