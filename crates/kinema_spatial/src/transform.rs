//! Rigid coordinate transforms acting on spatial quantities.

use crate::vector::SpatialVector;
use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use kinema_math::{Quaternion, impl_abs_diff_eq, impl_binop, impl_relative_eq};
use nalgebra::{Matrix3, Matrix6, Vector3};

/// A rigid change of coordinates from frame A to frame B.
///
/// The transform is stored compactly as the rotation `E` taking
/// A-coordinates to B-coordinates and the position `r` of B's origin
/// expressed in A-coordinates. The corresponding dense 6x6 matrices are
/// `X = [E 0; -E r× E]` for motion vectors and `X* = [E -E r×; 0 E]` for
/// force vectors, but they are never formed when transforming.
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Zeroable, Pod)]
pub struct SpatialTransform {
    rotation: Matrix3<f32>,
    translation: Vector3<f32>,
}

impl SpatialTransform {
    /// Creates a transform from the rotation matrix `E` (A- to
    /// B-coordinates) and the position `r` of B's origin in A-coordinates.
    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn from_rotation(rotation: Matrix3<f32>) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// Creates a transform whose rotation matrix `E` is the matrix of the
    /// given quaternion.
    pub fn from_quaternion(rotation: &Quaternion, translation: Vector3<f32>) -> Self {
        Self::new(rotation.to_rotation_matrix(), translation)
    }

    pub fn rotation(&self) -> &Matrix3<f32> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f32> {
        &self.translation
    }

    /// The transform from B back to A: `(Eᵀ, -E r)`.
    pub fn inverse(&self) -> Self {
        Self::new(self.rotation.transpose(), -(self.rotation * self.translation))
    }

    /// Composes two transforms so that `self.compose(other)` applies `other`
    /// first and then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(
            self.rotation * other.rotation,
            other.translation + other.rotation.transpose() * self.translation,
        )
    }

    /// Computes `X v` for a motion vector `v`.
    pub fn transform_motion(&self, v: &SpatialVector) -> SpatialVector {
        SpatialVector::new(
            self.rotation * v.angular,
            self.rotation * (v.linear - self.translation.cross(&v.angular)),
        )
    }

    /// Computes `X* f` for a force vector `f`.
    pub fn transform_force(&self, f: &SpatialVector) -> SpatialVector {
        SpatialVector::new(
            self.rotation * (f.angular - self.translation.cross(&f.linear)),
            self.rotation * f.linear,
        )
    }

    /// Computes `X⁻¹ v` for a motion vector `v`. This is also the
    /// transposed force transform `X*ᵀ v`.
    pub fn inverse_transform_motion(&self, v: &SpatialVector) -> SpatialVector {
        let angular = self.rotation.transpose() * v.angular;
        SpatialVector::new(
            angular,
            self.rotation.transpose() * v.linear + self.translation.cross(&angular),
        )
    }

    /// Computes `X*⁻¹ f` for a force vector `f`. This is also the
    /// transposed motion transform `Xᵀ f`, which maps a force known in B
    /// back to A.
    pub fn inverse_transform_force(&self, f: &SpatialVector) -> SpatialVector {
        let linear = self.rotation.transpose() * f.linear;
        SpatialVector::new(
            self.rotation.transpose() * f.angular + self.translation.cross(&linear),
            linear,
        )
    }

    /// The dense 6x6 motion transform matrix `X`.
    pub fn motion_matrix(&self) -> Matrix6<f32> {
        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&(-self.rotation * self.translation.cross_matrix()));
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&self.rotation);
        m
    }

    /// The dense 6x6 force transform matrix `X*`.
    pub fn force_matrix(&self) -> Matrix6<f32> {
        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 3>(0, 3)
            .copy_from(&(-self.rotation * self.translation.cross_matrix()));
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&self.rotation);
        m
    }
}

impl Default for SpatialTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl_binop!(Mul, mul, SpatialTransform, SpatialTransform, SpatialTransform, |a, b| {
    a.compose(b)
});

impl_binop!(Mul, mul, SpatialTransform, SpatialVector, SpatialVector, |a, b| {
    a.transform_motion(b)
});

impl_abs_diff_eq!(SpatialTransform, |a, b, epsilon| {
    AbsDiffEq::abs_diff_eq(&a.rotation, &b.rotation, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.translation, &b.translation, epsilon)
});

impl_relative_eq!(SpatialTransform, |a, b, epsilon, max_relative| {
    RelativeEq::relative_eq(&a.rotation, &b.rotation, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.translation, &b.translation, epsilon, max_relative)
});

#[cfg(feature = "fuzzing")]
pub mod fuzzing {
    use super::*;
    use crate::vector::fuzzing::arbitrary_vector3;
    use arbitrary::{Arbitrary, Result, Unstructured};
    use std::mem;

    impl Arbitrary<'_> for SpatialTransform {
        fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self> {
            let rotation = Quaternion::arbitrary(u)?;
            Ok(Self::from_quaternion(&rotation, arbitrary_vector3(u)?))
        }

        fn size_hint(depth: usize) -> (usize, Option<usize>) {
            let (lower, upper) = Quaternion::size_hint(depth);
            let size = 3 * mem::size_of::<i32>();
            (lower + size, upper.map(|upper| upper + size))
        }
    }
}
