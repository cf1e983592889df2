//! Tests for GPU buffer layouts

use super::*;
use crate::mesh::Aabb;
use glam::Vec3;
use std::mem;

#[test]
fn test_buffer_sizes() {
    assert_eq!(mem::size_of::<ParticleData>(), PARTICLE_DATA_SIZE);
    assert_eq!(mem::size_of::<BvhNode>(), BVH_NODE_SIZE);
    assert_eq!(mem::size_of::<TriangleData>(), TRIANGLE_DATA_SIZE);
    assert_eq!(mem::size_of::<SimParams>(), SIM_PARAMS_SIZE);

    // Storage arrays need 16-byte strides, uniforms 16-byte sizes
    assert_eq!(PARTICLE_DATA_SIZE % 16, 0);
    assert_eq!(BVH_NODE_SIZE % 16, 0);
    assert_eq!(TRIANGLE_DATA_SIZE % 16, 0);
    assert_eq!(SIM_PARAMS_SIZE % 16, 0);
}

#[test]
fn test_particle_field_offsets() {
    let particle = ParticleData::new(Vec3::new(1.0, 2.0, 3.0), [0.1, 0.2, 0.3, 0.4], 7)
        .with_velocity(Vec3::new(4.0, 5.0, 6.0));
    let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&particle));

    assert_eq!(f32::from_bits(words[0]), 1.0);
    assert_eq!(words[3], 7);
    assert_eq!(f32::from_bits(words[4]), 4.0);
    assert_eq!(f32::from_bits(words[8]), 0.1);
    assert_eq!(f32::from_bits(words[11]), 0.4);
}

#[test]
fn test_bvh_node_kinds() {
    let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);
    let internal = BvhNode::internal(bounds, 1);
    let leaf = BvhNode::leaf(bounds, 4, 2);

    assert!(!internal.is_leaf());
    assert!(leaf.is_leaf());
    assert_eq!(leaf.left_first, 4);
    assert_eq!(leaf.bounds(), bounds);
}

#[test]
fn test_triangle_normal_follows_winding() {
    let tri = TriangleData::new(Vec3::ZERO, Vec3::Z, Vec3::X);
    assert_eq!(tri.normal(), Vec3::Y);

    let degenerate = TriangleData::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
    assert_eq!(degenerate.normal(), Vec3::ZERO);
}
