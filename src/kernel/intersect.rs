//! Segment intersection tests
//!
//! Pure functions on plain data, shared by traversal and mirrored one-to-one
//! in the WGSL kernel. Anything numerically unusable reports "no hit".

use glam::Vec3;

use crate::constants::physics::{MIN_SEGMENT_LENGTH_SQ, TRIANGLE_EPSILON};
use crate::gpu::buffer_layouts::TriangleData;

/// Motion segment `origin + delta * t` for `t` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub origin: Vec3,
    pub delta: Vec3,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            origin: start,
            delta: end - start,
        }
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.delta * t
    }

    /// Zero-length or non-finite segments cannot hit anything
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !self.origin.is_finite()
            || !self.delta.is_finite()
            || self.delta.length_squared() < MIN_SEGMENT_LENGTH_SQ
    }
}

/// Slab test against a box. Returns the entry parameter clamped to [0, 1].
pub fn segment_aabb(segment: &Segment, bounds_min: Vec3, bounds_max: Vec3) -> Option<f32> {
    let origin = segment.origin.to_array();
    let delta = segment.delta.to_array();
    let lo = bounds_min.to_array();
    let hi = bounds_max.to_array();

    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = 1.0;

    for axis in 0..3 {
        if delta[axis] == 0.0 {
            // Parallel to this slab
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / delta[axis];
        let t1 = (lo[axis] - origin[axis]) * inv;
        let t2 = (hi[axis] - origin[axis]) * inv;

        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));

        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

/// Möller–Trumbore against one triangle.
///
/// Returns the hit parameter and the triangle normal oriented against the
/// motion, so the normal always points back towards the segment origin.
pub fn segment_triangle(segment: &Segment, triangle: &TriangleData) -> Option<(f32, Vec3)> {
    let [v0, v1, v2] = triangle.vertices();
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = segment.delta.cross(edge2);
    let det = edge1.dot(p);
    if !(det.abs() >= TRIANGLE_EPSILON) {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = segment.origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = segment.delta.dot(q) * inv_det;
    if !(v >= 0.0 && u + v <= 1.0) {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    // Providers may store unnormalized or blank normals
    let mut normal = triangle.normal().normalize_or_zero();
    if normal == Vec3::ZERO {
        normal = edge1.cross(edge2).normalize_or_zero();
    }
    if normal == Vec3::ZERO {
        return None;
    }
    if normal.dot(segment.delta) > 0.0 {
        normal = -normal;
    }

    Some((t, normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> TriangleData {
        TriangleData::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, 3.0),
            Vec3::new(3.0, 0.0, -1.0),
        )
    }

    #[test]
    fn test_segment_crosses_box() {
        let segment = Segment::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(2.0, 0.5, 0.5));
        let t = segment_aabb(&segment, Vec3::ZERO, Vec3::ONE).unwrap();
        assert!((t - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_segment_starting_inside_box() {
        let segment = Segment::new(Vec3::splat(0.5), Vec3::splat(0.6));
        assert_eq!(segment_aabb(&segment, Vec3::ZERO, Vec3::ONE), Some(0.0));
    }

    #[test]
    fn test_segment_stops_short_of_box() {
        let segment = Segment::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::new(-1.0, 0.5, 0.5));
        assert_eq!(segment_aabb(&segment, Vec3::ZERO, Vec3::ONE), None);
    }

    #[test]
    fn test_parallel_segment_outside_slab() {
        let segment = Segment::new(Vec3::new(-1.0, 2.0, 0.5), Vec3::new(2.0, 2.0, 0.5));
        assert_eq!(segment_aabb(&segment, Vec3::ZERO, Vec3::ONE), None);
    }

    #[test]
    fn test_flat_box_is_hit() {
        let segment = Segment::new(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.5, -1.0, 0.5));
        let t = segment_aabb(&segment, Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_hit_from_above() {
        let segment = Segment::new(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.5, -1.0, 0.5));
        let (t, normal) = segment_triangle(&segment, &ground()).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
        assert_eq!(normal, Vec3::Y);
    }

    #[test]
    fn test_triangle_normal_faces_incoming_side() {
        let segment = Segment::new(Vec3::new(0.5, -1.0, 0.5), Vec3::new(0.5, 1.0, 0.5));
        let (_, normal) = segment_triangle(&segment, &ground()).unwrap();
        assert_eq!(normal, Vec3::NEG_Y);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let segment = Segment::new(Vec3::new(5.0, 1.0, 5.0), Vec3::new(5.0, -1.0, 5.0));
        assert!(segment_triangle(&segment, &ground()).is_none());
    }

    #[test]
    fn test_triangle_miss_when_segment_ends_above() {
        let segment = Segment::new(Vec3::new(0.5, 2.0, 0.5), Vec3::new(0.5, 1.0, 0.5));
        assert!(segment_triangle(&segment, &ground()).is_none());
    }

    #[test]
    fn test_parallel_segment_misses() {
        let segment = Segment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(segment_triangle(&segment, &ground()).is_none());
    }

    #[test]
    fn test_degenerate_triangle_misses() {
        let sliver = TriangleData::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        let segment = Segment::new(Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.5, -1.0, 0.0));
        assert!(segment_triangle(&segment, &sliver).is_none());
    }

    #[test]
    fn test_stored_normal_is_renormalized() {
        let mut scaled = ground();
        scaled.normal = [0.0, 2.0, 0.0];
        let segment = Segment::new(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.5, -1.0, 0.5));
        let (_, normal) = segment_triangle(&segment, &scaled).unwrap();
        assert_eq!(normal, Vec3::Y);
    }

    #[test]
    fn test_unusable_stored_normal_falls_back_to_winding() {
        let mut blank = ground();
        blank.normal = [f32::NAN, 0.0, 0.0];
        let segment = Segment::new(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.5, -1.0, 0.5));
        let (_, normal) = segment_triangle(&segment, &blank).unwrap();
        assert_eq!(normal, Vec3::Y);
    }

    #[test]
    fn test_zero_length_segment_is_degenerate() {
        let segment = Segment::new(Vec3::ONE, Vec3::ONE);
        assert!(segment.is_degenerate());
        assert!(segment_triangle(&segment, &ground()).is_none());
    }
}
