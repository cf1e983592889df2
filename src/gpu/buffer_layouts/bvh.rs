//! BVH node and triangle layouts produced by the mesh provider

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::mesh::Aabb;

/// GPU BVH node for segment queries
/// Total size: 32 bytes (aligned)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    /// Minimum bounds
    pub min_bounds: [f32; 3],

    /// Left child index (right child is `left_first + 1`), or first triangle for leaf
    pub left_first: u32,

    /// Maximum bounds
    pub max_bounds: [f32; 3],

    /// Triangle count (0 for internal nodes)
    pub triangle_count: u32,
}

impl BvhNode {
    /// Internal node whose children sit at `left` and `left + 1`
    pub fn internal(bounds: Aabb, left: u32) -> Self {
        Self {
            min_bounds: bounds.min.into(),
            left_first: left,
            max_bounds: bounds.max.into(),
            triangle_count: 0,
        }
    }

    /// Leaf covering triangles `[first, first + count)`
    pub fn leaf(bounds: Aabb, first: u32, count: u32) -> Self {
        Self {
            min_bounds: bounds.min.into(),
            left_first: first,
            max_bounds: bounds.max.into(),
            triangle_count: count,
        }
    }

    /// Check if this is a leaf node
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.triangle_count > 0
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(Vec3::from(self.min_bounds), Vec3::from(self.max_bounds))
    }
}

/// Collision triangle with a precomputed unit normal
/// Total size: 64 bytes (aligned)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TriangleData {
    pub v0: [f32; 3],
    pub _pad0: f32,
    pub v1: [f32; 3],
    pub _pad1: f32,
    pub v2: [f32; 3],
    pub _pad2: f32,
    /// Surface normal, renormalized by the kernel; zero falls back to the winding
    pub normal: [f32; 3],
    pub _pad3: f32,
}

impl TriangleData {
    /// Build a triangle, deriving its normal from the winding order
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self {
            v0: v0.into(),
            _pad0: 0.0,
            v1: v1.into(),
            _pad1: 0.0,
            v2: v2.into(),
            _pad2: 0.0,
            normal: normal.into(),
            _pad3: 0.0,
        }
    }

    #[inline]
    pub fn vertices(&self) -> [Vec3; 3] {
        [Vec3::from(self.v0), Vec3::from(self.v1), Vec3::from(self.v2)]
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }

    pub fn bounds(&self) -> Aabb {
        let [a, b, c] = self.vertices();
        Aabb::new(a.min(b).min(c), a.max(b).max(c))
    }
}
