//! Rigid-body and articulated-body spatial inertias.

use crate::{transform::SpatialTransform, vector::SpatialVector};
use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use kinema_math::{impl_abs_diff_eq, impl_binop, impl_binop_assign, impl_relative_eq};
use nalgebra::{Matrix3, Matrix6, Vector3};
use std::iter::Sum;

/// The spatial inertia of a single rigid body, or of several rigidly
/// attached bodies, about the origin of some frame.
///
/// The 6x6 inertia `[I H; Hᵀ M]` is stored in 13 numbers: the rotational
/// inertia `I` about the origin, the first mass moment `h` (mass times
/// center of mass position), from which `H = h×` is formed, and the mass
/// `m`, so that `M = m 1`.
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Zeroable, Pod)]
pub struct SpatialInertia {
    rotational_inertia: Matrix3<f32>,
    first_moment: Vector3<f32>,
    mass: f32,
}

/// A general spatial inertia `[I H; Hᵀ M]` with unconstrained 3x3 blocks,
/// as arises when accumulating articulated-body inertias.
///
/// A [`SpatialInertia`] converts into this form without loss, but not the
/// other way around.
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Zeroable, Pod)]
pub struct ArticulatedBodyInertia {
    rotational: Matrix3<f32>,
    coupling: Matrix3<f32>,
    translational: Matrix3<f32>,
}

impl SpatialInertia {
    /// Creates the spatial inertia of a body with the given rotational
    /// inertia about its center of mass, center of mass position and mass.
    /// The rotational inertia is shifted to the origin using the parallel
    /// axis theorem.
    ///
    /// # Panics
    /// If the given mass is negative.
    pub fn new(
        rotational_inertia_about_center_of_mass: Matrix3<f32>,
        center_of_mass: Vector3<f32>,
        mass: f32,
    ) -> Self {
        assert!(mass >= 0.0, "Tried creating spatial inertia with negative mass");
        let com_cross = center_of_mass.cross_matrix();
        Self {
            rotational_inertia: rotational_inertia_about_center_of_mass
                - com_cross * com_cross * mass,
            first_moment: center_of_mass * mass,
            mass,
        }
    }

    /// Creates a spatial inertia directly from the rotational inertia about
    /// the origin, the first mass moment and the mass.
    ///
    /// # Panics
    /// If the given mass is negative.
    pub fn from_parts(rotational_inertia: Matrix3<f32>, first_moment: Vector3<f32>, mass: f32) -> Self {
        assert!(mass >= 0.0, "Tried creating spatial inertia with negative mass");
        Self {
            rotational_inertia,
            first_moment,
            mass,
        }
    }

    pub fn zero() -> Self {
        Self::zeroed()
    }

    /// Creates the spatial inertia of the uniformly dense box with the given
    /// extents and mass density, centered at the origin and with its extents
    /// along the x-, y- and z-axis.
    pub fn of_uniform_box(extent_x: f32, extent_y: f32, extent_z: f32, mass_density: f32) -> Self {
        let mass = extent_x * extent_y * extent_z * mass_density;
        let factor = mass / 12.0;
        let rotational_inertia = Matrix3::from_diagonal(&Vector3::new(
            factor * (extent_y.powi(2) + extent_z.powi(2)),
            factor * (extent_x.powi(2) + extent_z.powi(2)),
            factor * (extent_x.powi(2) + extent_y.powi(2)),
        ));
        Self::new(rotational_inertia, Vector3::zeros(), mass)
    }

    /// The rotational inertia `I` about the origin.
    pub fn rotational_inertia(&self) -> &Matrix3<f32> {
        &self.rotational_inertia
    }

    /// The first mass moment `h`.
    pub fn first_moment(&self) -> &Vector3<f32> {
        &self.first_moment
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// The center of mass position, or [`None`] if the mass is zero.
    pub fn center_of_mass(&self) -> Option<Vector3<f32>> {
        (self.mass != 0.0).then(|| self.first_moment / self.mass)
    }

    /// The rotational inertia about the center of mass, or [`None`] if the
    /// mass is zero.
    pub fn rotational_inertia_about_center_of_mass(&self) -> Option<Matrix3<f32>> {
        (self.mass != 0.0).then(|| {
            let h_cross = self.first_moment.cross_matrix();
            self.rotational_inertia + h_cross * h_cross / self.mass
        })
    }

    /// The coupling block `H = h×`.
    pub fn coupling(&self) -> Matrix3<f32> {
        self.first_moment.cross_matrix()
    }

    /// Computes the momentum `I v` of a body moving with the spatial
    /// velocity `v`.
    pub fn apply_to_motion(&self, v: &SpatialVector) -> SpatialVector {
        SpatialVector::new(
            self.rotational_inertia * v.angular + self.first_moment.cross(&v.linear),
            v.linear * self.mass - self.first_moment.cross(&v.angular),
        )
    }

    /// Computes the kinetic energy `½ vᵀ I v` of a body moving with the
    /// spatial velocity `v`.
    pub fn kinetic_energy(&self, v: &SpatialVector) -> f32 {
        0.5 * v.dot(&self.apply_to_motion(v))
    }

    /// Expresses the inertia in the frame that the given transform maps to,
    /// computing `X* I X⁻¹` in closed form.
    pub fn transformed(&self, transform: &SpatialTransform) -> Self {
        let rotation = transform.rotation();
        let r = transform.translation();
        let r_cross = r.cross_matrix();
        let h_cross = self.first_moment.cross_matrix();

        let shifted_inertia = self.rotational_inertia + h_cross * r_cross + r_cross * h_cross
            - r_cross * r_cross * self.mass;

        Self {
            rotational_inertia: rotation * shifted_inertia * rotation.transpose(),
            first_moment: rotation * (self.first_moment - r * self.mass),
            mass: self.mass,
        }
    }

    /// The dense 6x6 matrix `[I H; Hᵀ M]`.
    pub fn to_matrix(&self) -> Matrix6<f32> {
        ArticulatedBodyInertia::from(*self).to_matrix()
    }
}

impl Default for SpatialInertia {
    fn default() -> Self {
        Self::zero()
    }
}

impl_binop!(Add, add, SpatialInertia, SpatialInertia, SpatialInertia, |a, b| {
    SpatialInertia {
        rotational_inertia: a.rotational_inertia + b.rotational_inertia,
        first_moment: a.first_moment + b.first_moment,
        mass: a.mass + b.mass,
    }
});

impl_binop_assign!(AddAssign, add_assign, SpatialInertia, SpatialInertia, |a, b| {
    a.rotational_inertia += b.rotational_inertia;
    a.first_moment += b.first_moment;
    a.mass += b.mass;
});

impl Sum for SpatialInertia {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, inertia| acc + inertia)
    }
}

impl<'a> Sum<&'a SpatialInertia> for SpatialInertia {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, inertia| acc + inertia)
    }
}

impl_abs_diff_eq!(SpatialInertia, |a, b, epsilon| {
    AbsDiffEq::abs_diff_eq(&a.rotational_inertia, &b.rotational_inertia, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.first_moment, &b.first_moment, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.mass, &b.mass, epsilon)
});

impl_relative_eq!(SpatialInertia, |a, b, epsilon, max_relative| {
    RelativeEq::relative_eq(&a.rotational_inertia, &b.rotational_inertia, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.first_moment, &b.first_moment, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.mass, &b.mass, epsilon, max_relative)
});

impl ArticulatedBodyInertia {
    /// Creates an articulated-body inertia from its rotational block `I`,
    /// coupling block `H` and translational block `M`.
    pub fn new(rotational: Matrix3<f32>, coupling: Matrix3<f32>, translational: Matrix3<f32>) -> Self {
        Self {
            rotational,
            coupling,
            translational,
        }
    }

    pub fn zero() -> Self {
        Self::zeroed()
    }

    pub fn rotational(&self) -> &Matrix3<f32> {
        &self.rotational
    }

    pub fn coupling(&self) -> &Matrix3<f32> {
        &self.coupling
    }

    pub fn translational(&self) -> &Matrix3<f32> {
        &self.translational
    }

    /// Computes `[I H; Hᵀ M] v`.
    pub fn apply_to_motion(&self, v: &SpatialVector) -> SpatialVector {
        SpatialVector::new(
            self.rotational * v.angular + self.coupling * v.linear,
            self.translational * v.linear + self.coupling.tr_mul(&v.angular),
        )
    }

    /// Expresses the inertia in the frame that the given transform maps to,
    /// computing `X* I X⁻¹` in closed form. No symmetry of the blocks is
    /// assumed.
    pub fn transformed(&self, transform: &SpatialTransform) -> Self {
        let rotation = transform.rotation();
        let r_cross = transform.translation().cross_matrix();

        let shifted_coupling = self.coupling - r_cross * self.translational;
        let shifted_rotational =
            self.rotational - r_cross * self.coupling.transpose() + shifted_coupling * r_cross;

        Self {
            rotational: rotation * shifted_rotational * rotation.transpose(),
            coupling: rotation * shifted_coupling * rotation.transpose(),
            translational: rotation * self.translational * rotation.transpose(),
        }
    }

    /// The dense 6x6 matrix `[I H; Hᵀ M]`.
    pub fn to_matrix(&self) -> Matrix6<f32> {
        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotational);
        m.fixed_view_mut::<3, 3>(0, 3).copy_from(&self.coupling);
        m.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&self.coupling.transpose());
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&self.translational);
        m
    }
}

impl Default for ArticulatedBodyInertia {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<SpatialInertia> for ArticulatedBodyInertia {
    fn from(inertia: SpatialInertia) -> Self {
        Self::new(
            inertia.rotational_inertia,
            inertia.first_moment.cross_matrix(),
            Matrix3::from_diagonal_element(inertia.mass),
        )
    }
}

impl_binop!(
    Add,
    add,
    ArticulatedBodyInertia,
    ArticulatedBodyInertia,
    ArticulatedBodyInertia,
    |a, b| {
        ArticulatedBodyInertia::new(
            a.rotational + b.rotational,
            a.coupling + b.coupling,
            a.translational + b.translational,
        )
    }
);

impl_binop!(
    Add,
    add,
    ArticulatedBodyInertia,
    SpatialInertia,
    ArticulatedBodyInertia,
    |a, b| {
        let mut sum = *a;
        sum += b;
        sum
    }
);

impl_binop_assign!(
    AddAssign,
    add_assign,
    ArticulatedBodyInertia,
    ArticulatedBodyInertia,
    |a, b| {
        a.rotational += b.rotational;
        a.coupling += b.coupling;
        a.translational += b.translational;
    }
);

impl_binop_assign!(AddAssign, add_assign, ArticulatedBodyInertia, SpatialInertia, |a, b| {
    a.rotational += b.rotational_inertia;
    a.coupling += b.first_moment.cross_matrix();
    a.translational += Matrix3::from_diagonal_element(b.mass);
});

impl_abs_diff_eq!(ArticulatedBodyInertia, |a, b, epsilon| {
    AbsDiffEq::abs_diff_eq(&a.rotational, &b.rotational, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.coupling, &b.coupling, epsilon)
        && AbsDiffEq::abs_diff_eq(&a.translational, &b.translational, epsilon)
});

impl_relative_eq!(ArticulatedBodyInertia, |a, b, epsilon, max_relative| {
    RelativeEq::relative_eq(&a.rotational, &b.rotational, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.coupling, &b.coupling, epsilon, max_relative)
        && RelativeEq::relative_eq(&a.translational, &b.translational, epsilon, max_relative)
});

#[cfg(feature = "fuzzing")]
pub mod fuzzing {
    use super::*;
    use crate::vector::fuzzing::arbitrary_vector3;
    use arbitrary::{Arbitrary, Result, Unstructured};
    use kinema_math::quaternion::fuzzing::arbitrary_signed_norm_f32;
    use std::mem;

    const MAX_MASS: f32 = 1e3;
    const MAX_EXTENT: f32 = 10.0;

    impl Arbitrary<'_> for SpatialInertia {
        fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self> {
            let mass = MAX_MASS * arbitrary_signed_norm_f32(u)?.abs();
            let extents = arbitrary_vector3(u)?.abs() * (MAX_EXTENT / 1e3);
            let center_of_mass = arbitrary_vector3(u)? * (MAX_EXTENT / 1e3);
            let factor = mass / 12.0;
            let rotational_inertia = Matrix3::from_diagonal(&Vector3::new(
                factor * (extents.y.powi(2) + extents.z.powi(2)),
                factor * (extents.x.powi(2) + extents.z.powi(2)),
                factor * (extents.x.powi(2) + extents.y.powi(2)),
            ));
            Ok(Self::new(rotational_inertia, center_of_mass, mass))
        }

        fn size_hint(_depth: usize) -> (usize, Option<usize>) {
            let size = 7 * mem::size_of::<i32>();
            (size, Some(size))
        }
    }

    /// Checks that the closed-form inertia transform agrees with the dense
    /// `X* I X⁻¹` product and with the articulated-body transform, and that
    /// transforming back recovers the original inertia.
    pub fn fuzz_test_spatial_inertia_transform((inertia, transform): (SpatialInertia, SpatialTransform)) {
        let transformed = inertia.transformed(&transform);

        let dense = transform.force_matrix()
            * inertia.to_matrix()
            * transform.inverse().motion_matrix();
        let scale = 1.0 + dense.abs().max();
        assert!(transformed.to_matrix().relative_eq(&dense, 1e-4 * scale, 1e-3));

        let articulated = ArticulatedBodyInertia::from(inertia).transformed(&transform);
        assert!(articulated.relative_eq(&transformed.into(), 1e-4 * scale, 1e-3));

        let recovered = transformed.transformed(&transform.inverse());
        assert!(recovered.relative_eq(&inertia, 1e-4 * scale, 1e-3));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        transform::test::{rotation_strategy, transform_strategy},
        vector::test::{spatial_vector_strategy, vector3_strategy},
    };
    use approx::{abs_diff_eq, assert_abs_diff_eq};
    use proptest::prelude::*;

    prop_compose! {
        fn spatial_inertia_strategy()(
            mass in 0.1f32..10.0,
            extents in vector3_strategy(2.0),
            center_of_mass in vector3_strategy(2.0),
            rotation in rotation_strategy(),
        ) -> SpatialInertia {
            let squared_extents = extents.component_mul(&extents);
            let principal_inertia = Matrix3::from_diagonal(&Vector3::new(
                squared_extents.y + squared_extents.z,
                squared_extents.x + squared_extents.z,
                squared_extents.x + squared_extents.y,
            )) * (mass / 12.0);
            let rotation = rotation.to_rotation_matrix();
            SpatialInertia::new(
                rotation * principal_inertia * rotation.transpose(),
                center_of_mass,
                mass,
            )
        }
    }

    prop_compose! {
        fn articulated_body_inertia_strategy()(
            first in spatial_inertia_strategy(),
            second in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
            extra_coupling in vector3_strategy(1.0),
        ) -> ArticulatedBodyInertia {
            // A composite that is no longer of rigid-body form
            let mut inertia = ArticulatedBodyInertia::from(first) + second.transformed(&transform);
            inertia.translational += extra_coupling * extra_coupling.transpose();
            inertia
        }
    }

    fn assert_matrix_symmetric(matrix: &Matrix6<f32>, epsilon: f32) {
        assert_abs_diff_eq!(*matrix, matrix.transpose(), epsilon = epsilon);
    }

    #[test]
    fn should_shift_point_mass_inertia_with_parallel_axis_theorem() {
        let inertia = SpatialInertia::new(Matrix3::zeros(), Vector3::new(2.0, 0.0, 0.0), 3.0);
        assert_abs_diff_eq!(
            *inertia.rotational_inertia(),
            Matrix3::from_diagonal(&Vector3::new(0.0, 12.0, 12.0)),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(*inertia.first_moment(), Vector3::new(6.0, 0.0, 0.0));
        assert_eq!(inertia.mass(), 3.0);
    }

    #[test]
    fn should_recover_center_of_mass_and_its_rotational_inertia() {
        let inertia_about_com = Matrix3::new(2.0, 0.1, 0.0, 0.1, 3.0, -0.2, 0.0, -0.2, 1.5);
        let com = Vector3::new(0.5, -1.0, 2.0);
        let inertia = SpatialInertia::new(inertia_about_com, com, 4.0);

        assert_abs_diff_eq!(inertia.center_of_mass().unwrap(), com, epsilon = 1e-6);
        assert_abs_diff_eq!(
            inertia.rotational_inertia_about_center_of_mass().unwrap(),
            inertia_about_com,
            epsilon = 1e-5
        );
    }

    #[test]
    fn should_have_no_center_of_mass_without_mass() {
        assert!(SpatialInertia::zero().center_of_mass().is_none());
        assert!(
            SpatialInertia::zero()
                .rotational_inertia_about_center_of_mass()
                .is_none()
        );
    }

    #[test]
    #[should_panic]
    fn should_panic_on_negative_mass() {
        SpatialInertia::new(Matrix3::identity(), Vector3::zeros(), -1.0);
    }

    #[test]
    fn should_compute_uniform_cube_inertia() {
        let inertia = SpatialInertia::of_uniform_box(1.0, 1.0, 1.0, 6.0);
        assert_eq!(inertia.mass(), 6.0);
        assert_abs_diff_eq!(
            *inertia.rotational_inertia(),
            Matrix3::from_diagonal_element(1.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn should_give_momentum_of_translating_point_mass() {
        let inertia = SpatialInertia::new(Matrix3::zeros(), Vector3::new(0.0, 1.0, 0.0), 2.0);
        let v = SpatialVector::new(Vector3::zeros(), Vector3::x());
        let momentum = inertia.apply_to_motion(&v);
        // Linear momentum 2 x, angular momentum about the origin r × p = y × 2x
        assert_abs_diff_eq!(
            momentum,
            SpatialVector::new(Vector3::new(0.0, 0.0, -2.0), Vector3::new(2.0, 0.0, 0.0)),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(inertia.kinetic_energy(&v), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn should_leave_inertia_unchanged_under_identity_transform() {
        let inertia = SpatialInertia::new(Matrix3::identity(), Vector3::new(1.0, 2.0, 3.0), 2.0);
        assert_abs_diff_eq!(
            inertia.transformed(&SpatialTransform::identity()),
            inertia,
            epsilon = 1e-6
        );
    }

    #[test]
    fn should_move_center_of_mass_under_translation() {
        let inertia = SpatialInertia::new(Matrix3::identity(), Vector3::new(1.0, 0.0, 0.0), 2.0);
        let transform = SpatialTransform::from_translation(Vector3::new(3.0, 0.0, 0.0));
        let transformed = inertia.transformed(&transform);
        assert_abs_diff_eq!(
            transformed.center_of_mass().unwrap(),
            Vector3::new(-2.0, 0.0, 0.0),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            transformed.rotational_inertia_about_center_of_mass().unwrap(),
            Matrix3::identity(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn should_sum_inertias_blockwise() {
        let a = SpatialInertia::new(Matrix3::identity(), Vector3::x(), 1.0);
        let b = SpatialInertia::new(Matrix3::identity() * 2.0, -Vector3::x(), 1.0);
        let sum: SpatialInertia = [a, b].iter().sum();

        assert_abs_diff_eq!(sum, a + b);
        assert_eq!(sum.mass(), 2.0);
        assert_abs_diff_eq!(sum.center_of_mass().unwrap(), Vector3::zeros(), epsilon = 1e-6);

        let mut accumulated = SpatialInertia::zero();
        accumulated += a;
        accumulated += b;
        assert_abs_diff_eq!(accumulated, sum);
    }

    #[test]
    fn should_convert_rigid_inertia_to_articulated_inertia_losslessly() {
        let inertia = SpatialInertia::new(
            Matrix3::new(2.0, 0.1, 0.0, 0.1, 3.0, -0.2, 0.0, -0.2, 1.5),
            Vector3::new(0.5, -1.0, 2.0),
            4.0,
        );
        let articulated = ArticulatedBodyInertia::from(inertia);
        assert_eq!(articulated.rotational(), inertia.rotational_inertia());
        assert_eq!(*articulated.coupling(), inertia.coupling());
        assert_eq!(
            *articulated.translational(),
            Matrix3::from_diagonal_element(4.0)
        );
        assert_eq!(articulated.to_matrix(), inertia.to_matrix());
    }

    #[test]
    fn should_add_rigid_inertia_to_articulated_inertia() {
        let a = SpatialInertia::new(Matrix3::identity(), Vector3::x(), 1.0);
        let b = SpatialInertia::new(Matrix3::identity(), Vector3::y(), 3.0);
        assert_abs_diff_eq!(
            ArticulatedBodyInertia::from(a) + b,
            ArticulatedBodyInertia::from(a + b),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            ArticulatedBodyInertia::from(a) + ArticulatedBodyInertia::from(b),
            ArticulatedBodyInertia::from(a + b),
            epsilon = 1e-6
        );
    }

    proptest! {
        #[test]
        fn should_apply_inertia_like_dense_matrix(
            inertia in spatial_inertia_strategy(),
            v in spatial_vector_strategy(5.0),
        ) {
            let expected = inertia.to_matrix() * v.to_vector6();
            prop_assert!(abs_diff_eq!(
                inertia.apply_to_motion(&v).to_vector6(),
                expected,
                epsilon = 1e-2
            ));
            prop_assert!(abs_diff_eq!(
                ArticulatedBodyInertia::from(inertia).apply_to_motion(&v),
                inertia.apply_to_motion(&v),
                epsilon = 1e-2
            ));
        }
    }

    proptest! {
        #[test]
        fn should_apply_sum_of_inertias_as_sum_of_momenta(
            a in spatial_inertia_strategy(),
            b in spatial_inertia_strategy(),
            v in spatial_vector_strategy(5.0),
        ) {
            prop_assert!(abs_diff_eq!(
                (a + b).apply_to_motion(&v),
                a.apply_to_motion(&v) + b.apply_to_motion(&v),
                epsilon = 1e-2
            ));
        }
    }

    proptest! {
        #[test]
        fn should_transform_rigid_inertia_like_dense_congruence(
            inertia in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            let dense = transform.force_matrix()
                * inertia.to_matrix()
                * transform.inverse().motion_matrix();
            prop_assert!(abs_diff_eq!(
                inertia.transformed(&transform).to_matrix(),
                dense,
                epsilon = 1e-2
            ));
        }
    }

    proptest! {
        #[test]
        fn should_recover_rigid_inertia_after_transform_round_trip(
            inertia in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            let recovered = inertia
                .transformed(&transform)
                .transformed(&transform.inverse());
            prop_assert!(abs_diff_eq!(recovered, inertia, epsilon = 1e-2));
        }
    }

    proptest! {
        #[test]
        fn should_preserve_symmetry_of_rigid_inertia_under_transform(
            inertia in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            let transformed = inertia.transformed(&transform);
            assert_matrix_symmetric(&transformed.to_matrix(), 1e-3);
            prop_assert!(abs_diff_eq!(transformed.mass(), inertia.mass()));
        }
    }

    proptest! {
        #[test]
        fn should_keep_rotational_inertia_positive_semidefinite(
            a in spatial_inertia_strategy(),
            b in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            for inertia in [a, a.transformed(&transform), a + b] {
                let rotational_inertia = inertia.rotational_inertia();
                let min_eigenvalue = rotational_inertia.symmetric_eigen().eigenvalues.min();
                let scale = 1.0 + rotational_inertia.abs().max();
                prop_assert!(min_eigenvalue >= -1e-5 * scale);
            }
        }
    }

    proptest! {
        #[test]
        fn should_preserve_kinetic_energy_under_transform(
            inertia in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
            v in spatial_vector_strategy(2.0),
        ) {
            let energy = inertia.kinetic_energy(&v);
            let transformed_energy = inertia
                .transformed(&transform)
                .kinetic_energy(&transform.transform_motion(&v));
            prop_assert!(abs_diff_eq!(
                energy,
                transformed_energy,
                epsilon = 1e-3 * (1.0 + energy.abs())
            ));
        }
    }

    proptest! {
        #[test]
        fn should_transform_rigid_and_articulated_forms_consistently(
            inertia in spatial_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            prop_assert!(abs_diff_eq!(
                ArticulatedBodyInertia::from(inertia).transformed(&transform),
                ArticulatedBodyInertia::from(inertia.transformed(&transform)),
                epsilon = 1e-2
            ));
        }
    }

    proptest! {
        #[test]
        fn should_transform_articulated_inertia_like_dense_congruence(
            inertia in articulated_body_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            let dense = transform.force_matrix()
                * inertia.to_matrix()
                * transform.inverse().motion_matrix();
            prop_assert!(abs_diff_eq!(
                inertia.transformed(&transform).to_matrix(),
                dense,
                epsilon = 1e-1
            ));
        }
    }

    proptest! {
        #[test]
        fn should_recover_articulated_inertia_after_transform_round_trip(
            inertia in articulated_body_inertia_strategy(),
            transform in transform_strategy(2.0),
        ) {
            let recovered = inertia
                .transformed(&transform)
                .transformed(&transform.inverse());
            prop_assert!(abs_diff_eq!(recovered, inertia, epsilon = 1e-1));
        }
    }
}
