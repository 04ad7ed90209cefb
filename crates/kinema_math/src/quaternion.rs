//! Quaternions representing rotations in 3D.

use crate::consts::{
    ANTIPARALLEL_THRESHOLD, AXIS_EPSILON, EXP_MAP_TAYLOR_THRESHOLD, SLERP_LINEAR_THRESHOLD,
};
use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix3, Vector3};
use num_traits::{One, Zero};
use std::f32::consts::PI;

/// A quaternion `s + xi + yj + zk`.
///
/// Values used as rotations should have unit norm, but nothing enforces
/// this: rates and intermediate products are ordinary quaternions, and the
/// Hamilton product does not renormalize its result. Callers that compose
/// many rotations should call [`Self::normalize`] now and then to counter
/// drift.
///
/// The fields are laid out as `[s, x, y, z]`, so a flat `f32` buffer with
/// four values per rotation can be viewed as a slice of quaternions (see
/// [`crate::view`]).
///
/// A rotation has two quaternion representations, `q` and `-q`. The derived
/// [`PartialEq`] and the [`approx`] traits compare components; use
/// [`Self::rotation_equivalent`] to compare the rotations themselves.
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Zeroable, Pod)]
pub struct Quaternion {
    pub s: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Creates a quaternion with the given scalar and imaginary components.
    #[inline]
    pub const fn new(s: f32, x: f32, y: f32, z: f32) -> Self {
        Self { s, x, y, z }
    }

    /// The identity rotation.
    #[inline]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn from_parts(real: f32, imag: &Vector3<f32>) -> Self {
        Self::new(real, imag.x, imag.y, imag.z)
    }

    #[inline]
    pub fn from_imag(imag: &Vector3<f32>) -> Self {
        Self::from_parts(0.0, imag)
    }

    #[inline]
    pub const fn from_array([s, x, y, z]: [f32; 4]) -> Self {
        Self::new(s, x, y, z)
    }

    #[inline]
    pub const fn to_array(&self) -> [f32; 4] {
        [self.s, self.x, self.y, self.z]
    }

    #[inline]
    pub fn real(&self) -> f32 {
        self.s
    }

    #[inline]
    pub fn imag(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.s * other.s + self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn norm_squared(&self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }

    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(self.s, -self.x, -self.y, -self.z)
    }

    /// Computes the multiplicative inverse `conj(q) / |q|²`. Unlike the
    /// conjugate, this is also the inverse for quaternions that are not
    /// normalized. The zero quaternion is returned unchanged.
    pub fn inverse(&self) -> Self {
        let norm_squared = self.norm_squared();
        if norm_squared == 0.0 {
            return *self;
        }
        self.conjugate() * norm_squared.recip()
    }

    /// Computes the Hamilton product `self * other`, i.e. the rotation
    /// `other` followed by `self`. The result is not normalized.
    #[inline]
    pub fn compose(&self, other: &Self) -> Self {
        let (a, b) = (self, other);
        Self::new(
            a.s * b.s - a.x * b.x - a.y * b.y - a.z * b.z,
            a.s * b.x + b.s * a.x + a.y * b.z - a.z * b.y,
            a.s * b.y + b.s * a.y + a.z * b.x - a.x * b.z,
            a.s * b.z + b.s * a.z + a.x * b.y - a.y * b.x,
        )
    }

    /// Computes `self * conj(other)` without forming the conjugate.
    #[inline]
    pub fn mul_conjugate_right(&self, other: &Self) -> Self {
        let (a, b) = (self, other);
        Self::new(
            a.s * b.s + a.x * b.x + a.y * b.y + a.z * b.z,
            b.s * a.x - a.s * b.x - a.y * b.z + a.z * b.y,
            b.s * a.y - a.s * b.y - a.z * b.x + a.x * b.z,
            b.s * a.z - a.s * b.z - a.x * b.y + a.y * b.x,
        )
    }

    /// Returns the quaternion scaled to unit norm. The zero quaternion is
    /// returned unchanged.
    pub fn normalized(&self) -> Self {
        let mut normalized = *self;
        normalized.normalize();
        normalized
    }

    /// Scales the quaternion to unit norm in place. Does nothing for the zero
    /// quaternion.
    pub fn normalize(&mut self) {
        let norm_squared = self.norm_squared();
        if norm_squared > 0.0 {
            *self *= norm_squared.sqrt().recip();
        }
    }

    /// Maps the tangent vector `v` to the rotation of angle `|v|` about `v`,
    /// i.e. `(cos(|v|/2), sin(|v|/2) v/|v|)`.
    pub fn exp(v: &Vector3<f32>) -> Self {
        let alpha = f64::from(v.norm());
        let a = if alpha <= f64::from(EXP_MAP_TAYLOR_THRESHOLD) {
            half_angle_sinc_taylor(alpha)
        } else {
            (0.5 * alpha).sin() / alpha
        };
        Self::from_parts((0.5 * alpha).cos() as f32, &(v * a as f32))
    }

    /// Maps the (unit) quaternion to the tangent vector `v` with
    /// `Quaternion::exp(&v) == self`. The length of `v` is the rotation angle
    /// in `[0, 2π]`.
    pub fn log(&self) -> Vector3<f32> {
        let imag = self.imag();
        let alpha = 2.0 * f64::from(imag.norm()).atan2(f64::from(self.s));
        let a = if alpha <= f64::from(EXP_MAP_TAYLOR_THRESHOLD) {
            half_angle_sinc_taylor(alpha).recip()
        } else {
            alpha / (0.5 * alpha).sin()
        };
        imag * a as f32
    }

    /// Raises the rotation to the given power, scaling its angle by `p`.
    pub fn powf(&self, p: f32) -> Self {
        Self::exp(&(self.log() * p))
    }

    /// Spherical linear interpolation from `self` (at `alpha = 0`) to
    /// `other` (at `alpha = 1`) along the shortest arc.
    ///
    /// If the quaternions lie in opposite hemispheres, `other` is negated
    /// first, so the result at `alpha = 1` is then `-other`. Nearly
    /// identical endpoints are blended linearly. `alpha` is not clamped.
    pub fn slerp(&self, other: &Self, alpha: f32) -> Self {
        let mut cos_omega = self.dot(other);
        let end = if cos_omega < 0.0 {
            cos_omega = -cos_omega;
            -other
        } else {
            *other
        };

        let (start_weight, end_weight) = if 1.0 - cos_omega < SLERP_LINEAR_THRESHOLD {
            (1.0 - alpha, alpha)
        } else {
            let omega = cos_omega.acos();
            let inv_sin_omega = omega.sin().recip();
            (
                ((1.0 - alpha) * omega).sin() * inv_sin_omega,
                (alpha * omega).sin() * inv_sin_omega,
            )
        };

        self * start_weight + end * end_weight
    }

    /// Spherical quadrangle interpolation between `q1` and `q2` with inner
    /// control rotations `a` and `b`.
    pub fn squad(q1: &Self, q2: &Self, a: &Self, b: &Self, alpha: f32) -> Self {
        let outer = q1.slerp(q2, alpha);
        let inner = a.slerp(b, alpha);
        outer.slerp(&inner, 2.0 * alpha * (1.0 - alpha))
    }

    /// Creates the rotation of `angle` radians about `axis`, which need not
    /// be normalized. An axis of (nearly) zero length gives the identity.
    pub fn from_axis_angle(axis: &Vector3<f32>, angle: f32) -> Self {
        let axis_norm = axis.norm();
        if axis_norm < AXIS_EPSILON {
            return Self::identity();
        }
        let (sin_half, cos_half) = (0.5 * angle).sin_cos();
        Self::from_parts(cos_half, &(axis * (sin_half / axis_norm)))
    }

    /// Returns the normalized rotation axis and the rotation angle in
    /// `[0, 2π]`. When the imaginary part is too small to define an axis,
    /// the x-axis is returned.
    pub fn to_axis_angle(&self) -> (Vector3<f32>, f32) {
        let imag = self.imag();
        let imag_norm_squared = imag.norm_squared();
        let axis = if imag_norm_squared > AXIS_EPSILON {
            imag / imag_norm_squared.sqrt()
        } else {
            Vector3::x()
        };
        (axis, self.angle())
    }

    /// The rotation angle in `[0, 2π]` of the (unit) quaternion.
    #[inline]
    pub fn angle(&self) -> f32 {
        2.0 * self.s.clamp(-1.0, 1.0).acos()
    }

    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (sin_half, cos_half) = (0.5 * angle).sin_cos();
        Self::new(cos_half, sin_half, 0.0, 0.0)
    }

    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (sin_half, cos_half) = (0.5 * angle).sin_cos();
        Self::new(cos_half, 0.0, sin_half, 0.0)
    }

    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let (sin_half, cos_half) = (0.5 * angle).sin_cos();
        Self::new(cos_half, 0.0, 0.0, sin_half)
    }

    /// Creates the rotation `Ry(yaw) * Rx(pitch) * Rz(roll)`, so the roll is
    /// about the object's own z-axis and the yaw is the heading about the
    /// y-axis. Angles are in radians.
    pub fn from_roll_pitch_yaw(roll: f32, pitch: f32, yaw: f32) -> Self {
        let (sx, cx) = (0.5 * f64::from(pitch)).sin_cos();
        let (sy, cy) = (0.5 * f64::from(yaw)).sin_cos();
        let (sz, cz) = (0.5 * f64::from(roll)).sin_cos();
        Self::new(
            (cx * cy * cz + sx * sy * sz) as f32,
            (cx * sy * sz + sx * cy * cz) as f32,
            (cx * sy * cz - sx * cy * sz) as f32,
            (cx * cy * sz - sx * sy * cz) as f32,
        )
    }

    /// Extracts `(roll, pitch, yaw)` such that
    /// [`Self::from_roll_pitch_yaw`] reproduces the rotation. The pitch is in
    /// `[-π/2, π/2]`.
    pub fn roll_pitch_yaw(&self) -> (f32, f32, f32) {
        let Self { s, x, y, z } = *self;
        let (ss, xx, yy, zz) = (s * s, x * x, y * y, z * z);
        let roll = (2.0 * (x * y + z * s)).atan2(ss + yy - xx - zz);
        let pitch = (-2.0 * (z * y - x * s)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (z * x + y * s)).atan2(ss + zz - xx - yy);
        (roll, pitch, yaw)
    }

    /// Creates the shortest-arc rotation taking the direction of `from` to
    /// the direction of `to`. Antiparallel directions give a half turn about
    /// an axis orthogonal to `from`. If either vector is zero, the identity
    /// is returned.
    pub fn rotation_between(from: &Vector3<f32>, to: &Vector3<f32>) -> Self {
        let (Some(from), Some(to)) = (from.try_normalize(0.0), to.try_normalize(0.0)) else {
            return Self::identity();
        };

        let halfway = from + to;
        if halfway.norm_squared() < ANTIPARALLEL_THRESHOLD {
            return Self::from_axis_angle(&orthogonal_direction(&from), PI);
        }
        let halfway = halfway.normalize();

        Self::from_parts(from.dot(&halfway), &from.cross(&halfway))
    }

    /// Creates the quaternion of the rotation matrix `m`.
    ///
    /// Which of the four algebraically equivalent expressions is used
    /// depends on the trace and the largest diagonal element, so that the
    /// divisor is never small. The result is normalized.
    pub fn from_rotation_matrix(m: &Matrix3<f32>) -> Self {
        let (m00, m01, m02) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
        let (m10, m11, m12) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
        let (m20, m21, m22) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);

        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let d = (trace + 1.0).sqrt() * 2.0;
            Self::new(0.25 * d, (m21 - m12) / d, (m02 - m20) / d, (m10 - m01) / d)
        } else if m00 > m11 && m00 > m22 {
            let d = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self::new((m21 - m12) / d, 0.25 * d, (m01 + m10) / d, (m02 + m20) / d)
        } else if m11 > m22 {
            let d = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self::new((m02 - m20) / d, (m01 + m10) / d, 0.25 * d, (m12 + m21) / d)
        } else {
            let d = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self::new((m10 - m01) / d, (m02 + m20) / d, (m12 + m21) / d, 0.25 * d)
        };

        q.normalized()
    }

    /// Computes the rotation matrix of the quaternion. Quaternions that are
    /// not normalized are treated as if they were; the zero quaternion gives
    /// the identity matrix.
    pub fn to_rotation_matrix(&self) -> Matrix3<f32> {
        let norm_squared = self.norm_squared();
        if norm_squared == 0.0 {
            return Matrix3::identity();
        }
        let f = 2.0 / norm_squared;
        let Self { s, x, y, z } = *self;

        let (xx, yy, zz) = (f * x * x, f * y * y, f * z * z);
        let (xy, xz, yz) = (f * x * y, f * x * z, f * y * z);
        let (sx, sy, sz) = (f * s * x, f * s * y, f * s * z);

        Matrix3::new(
            1.0 - yy - zz,
            xy - sz,
            xz + sy,
            xy + sz,
            1.0 - xx - zz,
            yz - sx,
            xz - sy,
            yz + sx,
            1.0 - xx - yy,
        )
    }

    /// Computes `Im(q (0, v) conj(q))`, which for a unit quaternion is `v`
    /// rotated by the quaternion.
    pub fn rotate_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.compose(&Self::from_imag(v))
            .mul_conjugate_right(self)
            .imag()
    }

    /// Rotates `v` by the inverse of the (unit) quaternion.
    pub fn inverse_rotate_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.conjugate().rotate_vector(v)
    }

    /// Computes the angular velocity `2 Im(q' conj(q))` of a rotation `q =
    /// self` changing at the rate `q'`.
    pub fn angular_velocity(&self, rate: &Self) -> Vector3<f32> {
        rate.mul_conjugate_right(self).imag() * 2.0
    }

    /// Computes the angular acceleration `2 Im(q'' conj(q))` of a rotation
    /// `q = self` whose rate changes at the rate `q''`.
    pub fn angular_acceleration(&self, rate_derivative: &Self) -> Vector3<f32> {
        rate_derivative.mul_conjugate_right(self).imag() * 2.0
    }

    /// Whether `self` and `other` represent the same rotation within
    /// `epsilon`, component-wise, taking into account that `q` and `-q` are
    /// the same rotation.
    pub fn rotation_equivalent(&self, other: &Self, epsilon: f32) -> bool {
        self.abs_diff_eq(other, epsilon) || self.abs_diff_eq(&-other, epsilon)
    }

    /// Returns exactly `±identity` if the scalar part is within `epsilon` of
    /// `±1`, and the quaternion unchanged otherwise.
    pub fn smoothed(&self, epsilon: f32) -> Self {
        if (self.s - 1.0).abs() < epsilon {
            Self::identity()
        } else if (self.s + 1.0).abs() < epsilon {
            -Self::identity()
        } else {
            *self
        }
    }

    /// Computes the angle, in `[0, π]`, by which the (unit) quaternion turns
    /// the plane orthogonal to `axis`.
    ///
    /// A direction orthogonal to `axis` is rotated, projected back onto the
    /// plane and compared with where it started. This is the magnitude of
    /// the twist in a swing-twist decomposition about `axis`. If the rotated
    /// direction ends up along `axis`, the twist is undefined and zero is
    /// returned. A zero `axis` also gives zero.
    pub fn twist_angle(&self, axis: &Vector3<f32>) -> f32 {
        let norm = axis.norm();
        if norm < AXIS_EPSILON {
            return 0.0;
        }
        let axis = axis / norm;

        let orthogonal = orthogonal_direction(&axis);
        let rotated = self.rotate_vector(&orthogonal);
        let flattened = rotated - axis * rotated.dot(&axis);

        let flattened_norm = flattened.norm();
        if flattened_norm < AXIS_EPSILON {
            return 0.0;
        }
        (orthogonal.dot(&flattened) / flattened_norm)
            .clamp(-1.0, 1.0)
            .acos()
    }
}

/// Taylor expansion of `sin(α/2)/α` around zero.
#[inline]
fn half_angle_sinc_taylor(alpha: f64) -> f64 {
    0.5 - alpha * alpha / 48.0
}

fn orthogonal_direction(direction: &Vector3<f32>) -> Vector3<f32> {
    let reference = if direction.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    reference.cross(direction).normalize()
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Zero for Quaternion {
    fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl One for Quaternion {
    fn one() -> Self {
        Self::identity()
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        Self::new(q.w, q.i, q.j, q.k)
    }
}

impl From<nalgebra::UnitQuaternion<f32>> for Quaternion {
    fn from(q: nalgebra::UnitQuaternion<f32>) -> Self {
        Self::from(q.into_inner())
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        nalgebra::Quaternion::new(q.s, q.x, q.y, q.z)
    }
}

impl_binop!(Mul, mul, Quaternion, Quaternion, Quaternion, |a, b| {
    a.compose(b)
});

impl_binop!(Mul, mul, Quaternion, f32, Quaternion, |a, b| {
    Quaternion::new(a.s * b, a.x * b, a.y * b, a.z * b)
});

impl_binop!(Add, add, Quaternion, Quaternion, Quaternion, |a, b| {
    Quaternion::new(a.s + b.s, a.x + b.x, a.y + b.y, a.z + b.z)
});

impl_binop!(Sub, sub, Quaternion, Quaternion, Quaternion, |a, b| {
    Quaternion::new(a.s - b.s, a.x - b.x, a.y - b.y, a.z - b.z)
});

impl_binop_assign!(MulAssign, mul_assign, Quaternion, Quaternion, |a, b| {
    *a = a.compose(b);
});

impl_binop_assign!(MulAssign, mul_assign, Quaternion, f32, |a, b| {
    *a = *a * *b;
});

impl_binop_assign!(AddAssign, add_assign, Quaternion, Quaternion, |a, b| {
    *a = *a + b;
});

impl_unary_op!(Neg, neg, Quaternion, Quaternion, |q| {
    Quaternion::new(-q.s, -q.x, -q.y, -q.z)
});

impl_abs_diff_eq!(Quaternion, |a, b, epsilon| {
    AbsDiffEq::abs_diff_eq(&a.s, &b.s, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.x, &b.x, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.y, &b.y, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.z, &b.z, epsilon)
});

impl_relative_eq!(Quaternion, |a, b, epsilon, max_relative| {
    RelativeEq::relative_eq(&a.s, &b.s, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.x, &b.x, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.y, &b.y, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.z, &b.z, epsilon, max_relative)
});

#[cfg(feature = "fuzzing")]
pub mod fuzzing {
    use super::*;
    use arbitrary::{Arbitrary, Result, Unstructured};
    use std::mem;

    impl Arbitrary<'_> for Quaternion {
        fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self> {
            let axis = Vector3::new(
                arbitrary_signed_norm_f32(u)?,
                arbitrary_signed_norm_f32(u)?,
                arbitrary_signed_norm_f32(u)?,
            );
            let angle = 2.0 * PI * arbitrary_signed_norm_f32(u)?;
            Ok(Self::from_axis_angle(&axis, angle))
        }

        fn size_hint(_depth: usize) -> (usize, Option<usize>) {
            let size = 4 * mem::size_of::<i32>();
            (size, Some(size))
        }
    }

    /// Generates a value in `[-1, 1]`.
    pub fn arbitrary_signed_norm_f32(u: &mut Unstructured<'_>) -> Result<f32> {
        Ok(u.int_in_range(-1000000_i32..=1000000)? as f32 / 1000000.0)
    }
}
