//! Bounded-stack BVH traversal
//!
//! Each lane walks the tree with a fixed-size explicit stack, so the same loop
//! runs unchanged inside a compute shader where recursion is unavailable.

use glam::Vec3;

use crate::constants::dispatch::MAX_BVH_DEPTH;
use crate::gpu::buffer_layouts::{BvhNode, TriangleData};
use crate::kernel::intersect::{segment_aabb, segment_triangle, Segment};

/// Read-only view of the collision buffers for one dispatch
#[derive(Debug, Clone, Copy)]
pub struct BvhView<'a> {
    pub nodes: &'a [BvhNode],
    pub triangles: &'a [TriangleData],
}

impl<'a> BvhView<'a> {
    pub fn new(nodes: &'a [BvhNode], triangles: &'a [TriangleData]) -> Self {
        Self { nodes, triangles }
    }

    pub fn empty() -> Self {
        Self {
            nodes: &[],
            triangles: &[],
        }
    }

    /// Restrict the view to the first `node_count` nodes
    pub fn limited(self, node_count: u32) -> Self {
        let count = (node_count as usize).min(self.nodes.len());
        Self {
            nodes: &self.nodes[..count],
            triangles: self.triangles,
        }
    }
}

/// Closest intersection along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Segment parameter in [0, 1]
    pub t: f32,
    pub point: Vec3,
    /// Unit normal facing the segment origin
    pub normal: Vec3,
    pub triangle: u32,
}

/// Work counters for one query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose box the segment touched
    pub nodes_visited: u32,
    pub leaves_visited: u32,
    pub triangles_tested: u32,
}

/// Closest triangle hit along `segment`, or `None`
pub fn closest_hit(bvh: &BvhView<'_>, segment: &Segment) -> Option<SegmentHit> {
    closest_hit_with_stats(bvh, segment, &mut TraversalStats::default())
}

pub fn closest_hit_with_stats(
    bvh: &BvhView<'_>,
    segment: &Segment,
    stats: &mut TraversalStats,
) -> Option<SegmentHit> {
    if bvh.nodes.is_empty() || segment.is_degenerate() {
        return None;
    }

    let mut stack = [0u32; MAX_BVH_DEPTH];
    let mut top = 1usize;
    // A valid tree pops each node at most once
    let mut budget = bvh.nodes.len();

    let mut best_t = f32::INFINITY;
    let mut best: Option<SegmentHit> = None;

    while top > 0 && budget > 0 {
        top -= 1;
        budget -= 1;

        let index = stack[top] as usize;
        let Some(node) = bvh.nodes.get(index) else {
            continue;
        };

        let Some(entry) = segment_aabb(
            segment,
            Vec3::from(node.min_bounds),
            Vec3::from(node.max_bounds),
        ) else {
            continue;
        };
        if entry > best_t {
            continue;
        }
        stats.nodes_visited += 1;

        if node.is_leaf() {
            stats.leaves_visited += 1;
            let first = node.left_first as usize;
            let end = first
                .saturating_add(node.triangle_count as usize)
                .min(bvh.triangles.len());
            let Some(range) = bvh.triangles.get(first..end) else {
                continue;
            };

            for (offset, triangle) in range.iter().enumerate() {
                stats.triangles_tested += 1;
                if let Some((t, normal)) = segment_triangle(segment, triangle) {
                    if t < best_t {
                        best_t = t;
                        best = Some(SegmentHit {
                            t,
                            point: segment.point_at(t),
                            normal,
                            triangle: (first + offset) as u32,
                        });
                    }
                }
            }
        } else {
            // Overflow drops the subtree; host validation keeps trees shallow enough
            if top + 2 > MAX_BVH_DEPTH {
                continue;
            }
            // Right first so the left child pops next
            stack[top] = node.left_first.wrapping_add(1);
            stack[top + 1] = node.left_first;
            top += 2;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Aabb, BvhAsset, BvhBuffers, BvhProvider};

    fn quad_triangles(min: Vec3, max: Vec3, height: f32) -> Vec<TriangleData> {
        BvhAsset::ground_quad(&Aabb::new(min, max), height)
            .triangles()
            .to_vec()
    }

    /// Root with two leaves: a quad under the origin, one far away
    fn two_leaf_tree() -> BvhBuffers {
        let mut triangles = quad_triangles(Vec3::ZERO, Vec3::ONE, 0.0);
        triangles.extend(quad_triangles(Vec3::splat(10.0), Vec3::splat(11.0), 10.0));

        let near = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let far = Aabb::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(11.0, 10.0, 11.0));
        BvhBuffers::new(
            vec![
                BvhNode::internal(near.union(&far), 1),
                BvhNode::leaf(near, 0, 2),
                BvhNode::leaf(far, 2, 2),
            ],
            triangles,
        )
    }

    #[test]
    fn test_only_intersected_leaf_is_visited() {
        let buffers = two_leaf_tree();
        let bvh = BvhView::new(&buffers.nodes, &buffers.triangles);
        let segment = Segment::new(Vec3::new(0.25, 1.0, 0.4), Vec3::new(0.25, -1.0, 0.4));

        let mut stats = TraversalStats::default();
        let hit = closest_hit_with_stats(&bvh, &segment, &mut stats).unwrap();

        assert_eq!(stats.leaves_visited, 1);
        assert_eq!(stats.nodes_visited, 2);
        assert!(hit.triangle < 2);
        assert!((hit.point.y).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_missing_segment_visits_no_leaf() {
        let buffers = two_leaf_tree();
        let bvh = BvhView::new(&buffers.nodes, &buffers.triangles);
        let segment = Segment::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.0, 6.0, 5.0));

        let mut stats = TraversalStats::default();
        assert!(closest_hit_with_stats(&bvh, &segment, &mut stats).is_none());
        assert_eq!(stats.leaves_visited, 0);
    }

    #[test]
    fn test_closest_of_stacked_planes_wins() {
        let mut triangles = quad_triangles(Vec3::ZERO, Vec3::ONE, 0.0);
        triangles.extend(quad_triangles(Vec3::ZERO, Vec3::ONE, 0.5));
        let buffers = BvhAsset::single_leaf(triangles).create_buffers().unwrap();
        let bvh = BvhView::new(&buffers.nodes, &buffers.triangles);

        let segment = Segment::new(Vec3::new(0.3, 1.0, 0.3), Vec3::new(0.3, -1.0, 0.3));
        let hit = closest_hit(&bvh, &segment).unwrap();
        assert!((hit.point.y - 0.5).abs() < 1e-6);
        assert!(hit.triangle >= 2);
    }

    #[test]
    fn test_empty_bvh_and_zero_segment() {
        let segment = Segment::new(Vec3::ZERO, Vec3::NEG_Y);
        assert!(closest_hit(&BvhView::empty(), &segment).is_none());

        let buffers = two_leaf_tree();
        let bvh = BvhView::new(&buffers.nodes, &buffers.triangles);
        let still = Segment::new(Vec3::new(0.5, 0.0, 0.5), Vec3::new(0.5, 0.0, 0.5));
        assert!(closest_hit(&bvh, &still).is_none());
    }

    #[test]
    fn test_limited_view_hides_nodes() {
        let buffers = two_leaf_tree();
        let bvh = BvhView::new(&buffers.nodes, &buffers.triangles).limited(0);
        let segment = Segment::new(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.5, -1.0, 0.5));
        assert!(closest_hit(&bvh, &segment).is_none());
    }

    #[test]
    fn test_cyclic_tree_terminates() {
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let nodes = vec![
            BvhNode::internal(bounds, 1),
            BvhNode::internal(bounds, 0),
            BvhNode::internal(bounds, 0),
        ];
        let bvh = BvhView::new(&nodes, &[]);
        let segment = Segment::new(Vec3::ZERO, Vec3::X);
        assert!(closest_hit(&bvh, &segment).is_none());
    }
}
