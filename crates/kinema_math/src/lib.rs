//! Rotation manifold, polar decomposition and quaternion curves.

#[macro_use]
mod macros;

pub mod consts;
pub mod polar;
pub mod quat_curve;
pub mod quaternion;
pub mod view;

pub use polar::{PolarDecomposer, PolarDecomposition, PolarDecompositionConfig, ScalingType};
pub use quat_curve::HermiteQuaternionCurve;
pub use quaternion::Quaternion;
