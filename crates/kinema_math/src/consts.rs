//! Numeric constants whose values affect observable results. Changing any of
//! them changes the output of the operations using them.

/// Magnitude of a tangent vector (or rotation angle, for the logarithm) at or
/// below which the exponential and logarithmic maps use a Taylor expansion of
/// `sin(θ/2)/θ` instead of the closed form.
pub const EXP_MAP_TAYLOR_THRESHOLD: f32 = 0.019;

/// When `1 - |q1·q2|` is below this value, slerp blends the endpoints
/// linearly instead of using trigonometric weights.
pub const SLERP_LINEAR_THRESHOLD: f32 = 1e-3;

/// Relative 1-norm step size at which the polar decomposition iteration is
/// considered converged.
pub const POLAR_DECOMPOSITION_TOLERANCE: f32 = 1e-6;

/// Default snap distance used when smoothing the symmetric factor of a polar
/// decomposition and when smoothing quaternions towards ±identity.
pub const SMOOTHING_EPSILON: f32 = 1e-4;

/// Axes shorter than this are treated as zero when converting from
/// axis-angle, and imaginary parts with a squared norm at or below this are
/// treated as absent when converting to axis-angle.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Squared norm of the sum of two normalized directions below which they are
/// treated as antiparallel when computing the rotation between them.
pub const ANTIPARALLEL_THRESHOLD: f32 = 1e-3;
