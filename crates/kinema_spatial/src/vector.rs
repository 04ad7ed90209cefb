//! Six-dimensional spatial vectors.

use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use kinema_math::{impl_abs_diff_eq, impl_binop, impl_binop_assign, impl_relative_eq, impl_unary_op};
use nalgebra::{Vector3, Vector6};

/// A spatial motion or force vector, stored angular part first.
///
/// Whether the vector represents motion (angular velocity, linear velocity)
/// or force (torque, force) is determined by how it is used: motion vectors
/// are transformed with [`SpatialTransform::transform_motion`] and force
/// vectors with [`SpatialTransform::transform_force`].
///
/// [`SpatialTransform::transform_motion`]: crate::SpatialTransform::transform_motion
/// [`SpatialTransform::transform_force`]: crate::SpatialTransform::transform_force
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Zeroable, Pod)]
pub struct SpatialVector {
    pub angular: Vector3<f32>,
    pub linear: Vector3<f32>,
}

impl SpatialVector {
    pub fn new(angular: Vector3<f32>, linear: Vector3<f32>) -> Self {
        Self { angular, linear }
    }

    pub fn zeros() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Creates a spatial vector from six components, angular part first.
    pub fn from_vector6(v: &Vector6<f32>) -> Self {
        Self::new(v.fixed_rows::<3>(0).clone_owned(), v.fixed_rows::<3>(3).clone_owned())
    }

    pub fn to_vector6(&self) -> Vector6<f32> {
        Vector6::new(
            self.angular.x,
            self.angular.y,
            self.angular.z,
            self.linear.x,
            self.linear.y,
            self.linear.z,
        )
    }

    /// Scalar product of a motion vector and a force vector (power).
    pub fn dot(&self, other: &Self) -> f32 {
        self.angular.dot(&other.angular) + self.linear.dot(&other.linear)
    }

    /// Spatial cross product `self ×m other` of two motion vectors.
    pub fn cross_motion(&self, other: &Self) -> Self {
        Self::new(
            self.angular.cross(&other.angular),
            self.angular.cross(&other.linear) + self.linear.cross(&other.angular),
        )
    }

    /// Spatial cross product `self ×f other` of a motion vector with a force
    /// vector.
    pub fn cross_force(&self, other: &Self) -> Self {
        Self::new(
            self.angular.cross(&other.angular) + self.linear.cross(&other.linear),
            self.angular.cross(&other.linear),
        )
    }
}

impl Default for SpatialVector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl_binop!(Add, add, SpatialVector, SpatialVector, SpatialVector, |a, b| {
    SpatialVector::new(a.angular + b.angular, a.linear + b.linear)
});

impl_binop!(Sub, sub, SpatialVector, SpatialVector, SpatialVector, |a, b| {
    SpatialVector::new(a.angular - b.angular, a.linear - b.linear)
});

impl_binop!(Mul, mul, SpatialVector, f32, SpatialVector, |a, b| {
    SpatialVector::new(a.angular * *b, a.linear * *b)
});

impl_binop_assign!(AddAssign, add_assign, SpatialVector, SpatialVector, |a, b| {
    a.angular += b.angular;
    a.linear += b.linear;
});

impl_binop_assign!(SubAssign, sub_assign, SpatialVector, SpatialVector, |a, b| {
    a.angular -= b.angular;
    a.linear -= b.linear;
});

impl_unary_op!(Neg, neg, SpatialVector, SpatialVector, |v| {
    SpatialVector::new(-v.angular, -v.linear)
});

impl_abs_diff_eq!(SpatialVector, |a, b, epsilon| {
    AbsDiffEq::abs_diff_eq(&a.angular, &b.angular, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.linear, &b.linear, epsilon)
});

impl_relative_eq!(SpatialVector, |a, b, epsilon, max_relative| {
    RelativeEq::relative_eq(&a.angular, &b.angular, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.linear, &b.linear, epsilon, max_relative)
});

#[cfg(feature = "fuzzing")]
pub mod fuzzing {
    use super::*;
    use arbitrary::{Arbitrary, Result, Unstructured};
    use kinema_math::quaternion::fuzzing::arbitrary_signed_norm_f32;
    use std::mem;

    const MAX_COMPONENT: f32 = 1e3;

    impl Arbitrary<'_> for SpatialVector {
        fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self> {
            Ok(Self::new(arbitrary_vector3(u)?, arbitrary_vector3(u)?))
        }

        fn size_hint(_depth: usize) -> (usize, Option<usize>) {
            let size = 6 * mem::size_of::<i32>();
            (size, Some(size))
        }
    }

    /// Generates a vector with components in `[-1000, 1000]`.
    pub fn arbitrary_vector3(u: &mut Unstructured<'_>) -> Result<Vector3<f32>> {
        Ok(Vector3::new(
            MAX_COMPONENT * arbitrary_signed_norm_f32(u)?,
            MAX_COMPONENT * arbitrary_signed_norm_f32(u)?,
            MAX_COMPONENT * arbitrary_signed_norm_f32(u)?,
        ))
    }
}
