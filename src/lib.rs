//! Numerical kernel for 3D orientation and rigid-body spatial algebra.
//!
//! The [`math`] crate handles rotations on the quaternion manifold, polar
//! decomposition of 3x3 transforms and Hermite quaternion curves, while the
//! [`spatial`] crate handles spatial vectors, transforms and inertias.

pub use kinema_math as math;
pub use kinema_spatial as spatial;
