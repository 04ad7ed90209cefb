//! Accumulation of composite inertias over a kinematic tree.

use crate::{inertia::SpatialInertia, transform::SpatialTransform};
use anyhow::{Result, bail};

/// Computes the composite inertia of every subtree of a kinematic tree.
///
/// Body `i` has parent `parents[i]` (or [`None`] for a root), spatial
/// inertia `body_inertias[i]` expressed in its own frame, and
/// `parent_to_body[i]` transforming from its parent's frame (or the world
/// frame, for roots) to its own. Bodies must be ordered so that every
/// parent precedes its children.
///
/// The returned composite inertia of body `i` is the sum of the inertias of
/// `i` and all its descendants, expressed in the frame of `i`.
///
/// # Errors
/// Returns an error if the slices have different lengths or a body does
/// not come after its parent.
pub fn composite_inertias(
    parents: &[Option<usize>],
    body_inertias: &[SpatialInertia],
    parent_to_body: &[SpatialTransform],
) -> Result<Vec<SpatialInertia>> {
    if parents.len() != body_inertias.len() || parents.len() != parent_to_body.len() {
        bail!(
            "Mismatched kinematic tree slice lengths: {} parents, {} inertias, {} transforms",
            parents.len(),
            body_inertias.len(),
            parent_to_body.len()
        );
    }
    for (body, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent.filter(|&parent| parent >= body) {
            bail!("Body {body} does not come after its parent {parent}");
        }
    }

    let mut composites = body_inertias.to_vec();

    for body in (0..parents.len()).rev() {
        if let Some(parent) = parents[body] {
            let in_parent_frame = composites[body].transformed(&parent_to_body[body].inverse());
            composites[parent] += in_parent_frame;
        }
    }

    Ok(composites)
}
