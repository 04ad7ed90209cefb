//! Featherstone-style spatial algebra for rigid-body dynamics.
//!
//! Spatial vectors, transforms and inertias use the angular-first
//! convention, and transforms and inertias are stored in compact form so
//! that the dense 6x6 matrices never have to be formed.

pub mod inertia;
pub mod transform;
pub mod tree;
pub mod vector;

pub use inertia::{ArticulatedBodyInertia, SpatialInertia};
pub use transform::SpatialTransform;
pub use tree::composite_inertias;
pub use vector::SpatialVector;
