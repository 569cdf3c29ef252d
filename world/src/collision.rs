//! Collision queries layered on top of [`MazeGrid`].

use glam::Vec3;

use crate::grid::MazeGrid;

/// Parameter used when the sampling step is unusable.
const FALLBACK_STEP: f32 = 1.0;

/// Clear point found while backing off along a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSample {
    /// World-space position of the sample.
    pub point: Vec3,
    /// Interpolation parameter, `0.0` at the anchor and `1.0` at the target.
    pub t: f32,
}

/// Reports whether a disc of `radius` centred on `position` stays clear of walls.
///
/// Only the horizontal x/z components of `position` take part in the test.
#[must_use]
pub fn footprint_clear(grid: &MazeGrid, position: Vec3, radius: f32) -> bool {
    !grid.collides(position.x, position.z, radius)
}

/// Walks the segment from `target` (t = 1) back to `anchor` (t = 0) in
/// decrements of `step`, returning the first sample whose footprint is clear.
///
/// The anchor itself is always sampled last. `None` means every sample
/// collided, including the anchor. Steps that are not finite and positive
/// degrade to testing only the two endpoints.
#[must_use]
pub fn back_off(
    grid: &MazeGrid,
    anchor: Vec3,
    target: Vec3,
    radius: f32,
    step: f32,
) -> Option<SegmentSample> {
    let step = if step.is_finite() && step > 0.0 {
        step.min(1.0)
    } else {
        FALLBACK_STEP
    };
    let samples = (1.0 / step).ceil() as u32;

    for index in 0..=samples {
        let t = (1.0 - index as f32 * step).max(0.0);
        let point = anchor.lerp(target, t);
        if footprint_clear(grid, point, radius) {
            return Some(SegmentSample { point, t });
        }
    }

    None
}
