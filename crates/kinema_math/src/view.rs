//! Zero-copy views of flat `f32` buffers and batched rotation operations.
//!
//! Channels of many rotations are commonly stored as one flat buffer with
//! four values per quaternion. The functions here reinterpret such buffers
//! (or sub-slices of them) as slices of [`Quaternion`]s without copying, and
//! apply operations to whole slices at once. Overlapping input and output is
//! ruled out by the borrow rules: in-place variants take a single mutable
//! slice.

use crate::quaternion::Quaternion;
use anyhow::{Result, anyhow, bail};
use nalgebra::Vector3;

/// Number of `f32` values per quaternion in a flat buffer.
pub const QUATERNION_SIZE: usize = 4;

/// Number of `f32` values per axis-angle entry (`[x, y, z, angle]`) in a flat
/// buffer.
pub const AXIS_ANGLE_SIZE: usize = 4;

/// Views the given flat buffer as a slice of quaternions.
///
/// # Errors
/// Returns an error if the length of the buffer is not a multiple of
/// [`QUATERNION_SIZE`].
pub fn quaternions(values: &[f32]) -> Result<&[Quaternion]> {
    bytemuck::try_cast_slice(values)
        .map_err(|err| anyhow!("Invalid quaternion buffer of length {}: {err}", values.len()))
}

/// Views the given flat buffer as a mutable slice of quaternions.
///
/// # Errors
/// Returns an error if the length of the buffer is not a multiple of
/// [`QUATERNION_SIZE`].
pub fn quaternions_mut(values: &mut [f32]) -> Result<&mut [Quaternion]> {
    let len = values.len();
    bytemuck::try_cast_slice_mut(values)
        .map_err(|err| anyhow!("Invalid quaternion buffer of length {len}: {err}"))
}

/// Views the quaternion starting at the given offset in the flat buffer.
///
/// # Errors
/// Returns an error if fewer than [`QUATERNION_SIZE`] values remain after
/// `offset`.
pub fn quaternion_at(values: &[f32], offset: usize) -> Result<&Quaternion> {
    let Some(slice) = offset
        .checked_add(QUATERNION_SIZE)
        .and_then(|end| values.get(offset..end))
    else {
        bail!(
            "Quaternion at offset {offset} exceeds buffer of length {}",
            values.len()
        );
    };
    Ok(bytemuck::from_bytes(bytemuck::cast_slice(slice)))
}

/// Mutable variant of [`quaternion_at`].
///
/// # Errors
/// Returns an error if fewer than [`QUATERNION_SIZE`] values remain after
/// `offset`.
pub fn quaternion_at_mut(values: &mut [f32], offset: usize) -> Result<&mut Quaternion> {
    let len = values.len();
    let Some(slice) = offset
        .checked_add(QUATERNION_SIZE)
        .and_then(|end| values.get_mut(offset..end))
    else {
        bail!("Quaternion at offset {offset} exceeds buffer of length {len}");
    };
    Ok(bytemuck::from_bytes_mut(bytemuck::cast_slice_mut(slice)))
}

/// Normalizes every quaternion in the slice in place.
pub fn normalize_all(quaternions: &mut [Quaternion]) {
    for quaternion in quaternions {
        quaternion.normalize();
    }
}

/// Writes `slerp(start[i], end[i], alpha)` into `out[i]` for every `i`.
///
/// # Errors
/// Returns an error if the three slices do not have the same length.
pub fn interpolate_slices(
    start: &[Quaternion],
    end: &[Quaternion],
    alpha: f32,
    out: &mut [Quaternion],
) -> Result<()> {
    if start.len() != end.len() || start.len() != out.len() {
        bail!(
            "Mismatched interpolation slice lengths: start {}, end {}, output {}",
            start.len(),
            end.len(),
            out.len()
        );
    }
    for ((q_start, q_end), q_out) in start.iter().zip(end).zip(out) {
        *q_out = q_start.slerp(q_end, alpha);
    }
    Ok(())
}

/// Converts a flat buffer of `[x, y, z, angle]` entries into quaternions.
///
/// # Errors
/// Returns an error if the buffer length is not a multiple of
/// [`AXIS_ANGLE_SIZE`] or does not match the number of output quaternions.
pub fn from_axis_angle_slices(axis_angles: &[f32], out: &mut [Quaternion]) -> Result<()> {
    if axis_angles.len() % AXIS_ANGLE_SIZE != 0 {
        bail!(
            "Axis-angle buffer length {} is not a multiple of {AXIS_ANGLE_SIZE}",
            axis_angles.len()
        );
    }
    if axis_angles.len() / AXIS_ANGLE_SIZE != out.len() {
        bail!(
            "Axis-angle buffer holds {} entries but output holds {}",
            axis_angles.len() / AXIS_ANGLE_SIZE,
            out.len()
        );
    }
    for (entry, q) in axis_angles.chunks_exact(AXIS_ANGLE_SIZE).zip(out) {
        *q = Quaternion::from_axis_angle(&Vector3::new(entry[0], entry[1], entry[2]), entry[3]);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn should_view_flat_buffer_as_quaternions() {
        let values = [1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 0.5];
        let quaternions = quaternions(&values).unwrap();
        assert_eq!(quaternions.len(), 2);
        assert_eq!(quaternions[0], Quaternion::identity());
        assert_eq!(quaternions[1], Quaternion::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn should_fail_to_view_buffer_with_partial_quaternion() {
        let values = [1.0, 0.0, 0.0, 0.0, 0.5];
        assert!(quaternions(&values).is_err());
    }

    #[test]
    fn should_normalize_quaternion_at_offset_in_place() {
        let mut values = [9.0, 2.0, 0.0, 0.0, 0.0, 9.0];
        quaternion_at_mut(&mut values, 1).unwrap().normalize();
        assert_eq!(values, [9.0, 1.0, 0.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn should_fail_to_view_quaternion_past_end_of_buffer() {
        let values = [1.0, 0.0, 0.0, 0.0, 0.0];
        assert!(quaternion_at(&values, 1).is_ok());
        assert!(quaternion_at(&values, 2).is_err());
    }

    #[test]
    fn should_fail_to_view_quaternion_at_overflowing_offset() {
        let mut values = [1.0, 0.0, 0.0, 0.0];
        assert!(quaternion_at(&values, usize::MAX).is_err());
        assert!(quaternion_at(&values, usize::MAX - 2).is_err());
        assert!(quaternion_at_mut(&mut values, usize::MAX).is_err());
    }

    #[test]
    fn should_normalize_all_quaternions_in_channel() {
        let mut values = [2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 4.0];
        normalize_all(quaternions_mut(&mut values).unwrap());
        assert_abs_diff_eq!(
            values.as_slice(),
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.6, 0.8].as_slice(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn should_interpolate_every_channel_entry() {
        let start = [Quaternion::identity(), Quaternion::from_rotation_x(0.4)];
        let end = [
            Quaternion::from_rotation_z(1.0),
            Quaternion::from_rotation_x(1.2),
        ];
        let mut out = [Quaternion::identity(); 2];
        interpolate_slices(&start, &end, 0.5, &mut out).unwrap();
        assert_abs_diff_eq!(out[0], Quaternion::from_rotation_z(0.5), epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], Quaternion::from_rotation_x(0.8), epsilon = 1e-6);
    }

    #[test]
    fn should_fail_to_interpolate_mismatched_slices() {
        let start = [Quaternion::identity(); 2];
        let end = [Quaternion::identity(); 3];
        let mut out = [Quaternion::identity(); 2];
        assert!(interpolate_slices(&start, &end, 0.5, &mut out).is_err());
    }

    #[test]
    fn should_convert_axis_angle_buffer() {
        let axis_angles = [0.0, 0.0, 2.0, FRAC_PI_2, 0.0, 0.0, 0.0, 1.0];
        let mut out = [Quaternion::new(0.0, 0.0, 0.0, 0.0); 2];
        from_axis_angle_slices(&axis_angles, &mut out).unwrap();
        assert_abs_diff_eq!(out[0], Quaternion::from_rotation_z(FRAC_PI_2), epsilon = 1e-6);
        assert_eq!(out[1], Quaternion::identity());
    }

    #[test]
    fn should_fail_to_convert_axis_angle_buffer_of_wrong_length() {
        let mut out = [Quaternion::identity(); 1];
        assert!(from_axis_angle_slices(&[0.0, 0.0, 1.0], &mut out).is_err());
        assert!(from_axis_angle_slices(&[0.0; 8], &mut out).is_err());
    }
}
