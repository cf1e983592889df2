//! BVH/Mesh provider boundary
//!
//! Hierarchy construction lives outside this crate. Providers hand over flat
//! node and triangle buffers; the simulation validates them once and then
//! shares them read-only with every kernel lane.

pub mod aabb;
pub mod gizmo;

use std::sync::Arc;

use glam::Vec3;

use crate::constants::dispatch::MAX_BVH_DEPTH;
use crate::error::{invalid_bvh, SimulationResult};
use crate::gpu::buffer_layouts::{BvhNode, TriangleData};

pub use aabb::Aabb;
pub use gizmo::collect_gizmo_boxes;

/// Source of static collision geometry
pub trait BvhProvider {
    /// Produce the node and triangle buffers. Called once per simulation.
    fn create_buffers(&self) -> SimulationResult<BvhBuffers>;

    /// Boxes a debug renderer would draw for the given level
    fn gizmo_boxes(&self, depth: u32, leaf_only: bool) -> Vec<Aabb>;
}

/// Immutable BVH and triangle buffers shared by all lanes
#[derive(Debug, Clone)]
pub struct BvhBuffers {
    pub nodes: Arc<[BvhNode]>,
    pub triangles: Arc<[TriangleData]>,
}

impl BvhBuffers {
    pub fn new(nodes: Vec<BvhNode>, triangles: Vec<TriangleData>) -> Self {
        Self {
            nodes: nodes.into(),
            triangles: triangles.into(),
        }
    }

    /// No geometry: every query reports no collision
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check the traversal contract and return the tree height.
    ///
    /// Every child index and leaf range must be in bounds, every node reachable
    /// at most once, and the height small enough for the bounded kernel stack.
    pub fn validate(&self) -> SimulationResult<usize> {
        if self.nodes.is_empty() {
            return Ok(0);
        }

        let node_count = self.nodes.len();
        let triangle_count = self.triangles.len() as u64;
        let mut stack = vec![(0usize, 0usize)];
        let mut visited = 0usize;
        let mut height = 0usize;

        while let Some((index, depth)) = stack.pop() {
            visited += 1;
            if visited > node_count {
                return Err(invalid_bvh("node graph contains a cycle or shared child"));
            }
            height = height.max(depth);
            if height + 1 > MAX_BVH_DEPTH {
                return Err(invalid_bvh(format!(
                    "tree deeper than the traversal stack ({} levels)",
                    MAX_BVH_DEPTH
                )));
            }

            let node = &self.nodes[index];
            if !node.bounds().is_valid() {
                return Err(invalid_bvh(format!("node {} has invalid bounds", index)));
            }

            if node.is_leaf() {
                let end = node.left_first as u64 + node.triangle_count as u64;
                if end > triangle_count {
                    return Err(invalid_bvh(format!(
                        "leaf {} references triangles {}..{} of {}",
                        index, node.left_first, end, triangle_count
                    )));
                }
            } else {
                let left = node.left_first as usize;
                if left == 0 || left + 1 >= node_count {
                    return Err(invalid_bvh(format!(
                        "internal node {} has children {}/{} of {} nodes",
                        index,
                        left,
                        left + 1,
                        node_count
                    )));
                }
                stack.push((left + 1, depth + 1));
                stack.push((left, depth + 1));
            }
        }

        log::trace!(
            "[Bvh] Validated {} of {} nodes, height {}",
            visited,
            node_count,
            height
        );
        Ok(height)
    }
}

/// Provider over prebuilt buffers
#[derive(Debug, Clone, Default)]
pub struct BvhAsset {
    nodes: Vec<BvhNode>,
    triangles: Vec<TriangleData>,
}

impl BvhAsset {
    pub fn new(nodes: Vec<BvhNode>, triangles: Vec<TriangleData>) -> Self {
        Self { nodes, triangles }
    }

    /// One leaf holding every triangle
    pub fn single_leaf(triangles: Vec<TriangleData>) -> Self {
        let Some(bounds) = triangles
            .iter()
            .map(TriangleData::bounds)
            .reduce(|a, b| a.union(&b))
        else {
            return Self::default();
        };

        let root = BvhNode::leaf(bounds, 0, triangles.len() as u32);
        Self::new(vec![root], triangles)
    }

    /// Horizontal quad at `height` spanning the XZ footprint of `bounds`, facing +Y
    pub fn ground_quad(bounds: &Aabb, height: f32) -> Self {
        let (min, max) = (bounds.min, bounds.max);
        let a = Vec3::new(min.x, height, min.z);
        let b = Vec3::new(min.x, height, max.z);
        let c = Vec3::new(max.x, height, min.z);
        let d = Vec3::new(max.x, height, max.z);

        Self::single_leaf(vec![TriangleData::new(a, b, c), TriangleData::new(c, b, d)])
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn triangles(&self) -> &[TriangleData] {
        &self.triangles
    }
}

impl BvhProvider for BvhAsset {
    fn create_buffers(&self) -> SimulationResult<BvhBuffers> {
        Ok(BvhBuffers::new(self.nodes.clone(), self.triangles.clone()))
    }

    fn gizmo_boxes(&self, depth: u32, leaf_only: bool) -> Vec<Aabb> {
        collect_gizmo_boxes(&self.nodes, depth, leaf_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_ground_quad_faces_up() {
        let asset = BvhAsset::ground_quad(&unit_box(), 0.0);
        assert_eq!(asset.nodes().len(), 1);
        assert_eq!(asset.triangles().len(), 2);
        for tri in asset.triangles() {
            assert_eq!(tri.normal(), Vec3::Y);
        }
        let root = asset.nodes()[0];
        assert!(root.is_leaf());
        assert_eq!(root.bounds().min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(root.bounds().max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_single_leaf_of_nothing_is_empty() {
        let asset = BvhAsset::single_leaf(Vec::new());
        let buffers = asset.create_buffers().unwrap();
        assert!(buffers.is_empty());
        assert_eq!(buffers.validate().unwrap(), 0);
    }

    #[test]
    fn test_validate_two_level_tree() {
        let tri = TriangleData::new(Vec3::ZERO, Vec3::Z, Vec3::X);
        let buffers = BvhBuffers::new(
            vec![
                BvhNode::internal(unit_box(), 1),
                BvhNode::leaf(unit_box(), 0, 1),
                BvhNode::leaf(unit_box(), 1, 1),
            ],
            vec![tri, tri],
        );
        assert_eq!(buffers.validate().unwrap(), 1);
    }

    #[test]
    fn test_validate_rejects_out_of_range_leaf() {
        let buffers = BvhBuffers::new(vec![BvhNode::leaf(unit_box(), 0, 3)], Vec::new());
        assert!(buffers.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_child() {
        let buffers = BvhBuffers::new(vec![BvhNode::internal(unit_box(), 1)], Vec::new());
        assert!(buffers.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_self_reference() {
        let buffers = BvhBuffers::new(
            vec![
                BvhNode::internal(unit_box(), 1),
                BvhNode::internal(unit_box(), 1),
                BvhNode::leaf(unit_box(), 0, 0),
            ],
            Vec::new(),
        );
        assert!(buffers.validate().is_err());
    }
}
