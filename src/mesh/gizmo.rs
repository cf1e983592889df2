//! Debug visualization path over the BVH buffer
//!
//! Read-only; produces the boxes a renderer would outline and never touches
//! simulation state.

use crate::gpu::buffer_layouts::BvhNode;
use crate::mesh::Aabb;

/// Collect node boxes for a debug overlay.
///
/// Without `leaf_only`, returns every node exactly `depth` levels below the
/// root. With `leaf_only`, returns the leaves at `depth` or deeper, i.e. the
/// leaves of the subtrees rooted at that level.
pub fn collect_gizmo_boxes(nodes: &[BvhNode], depth: u32, leaf_only: bool) -> Vec<Aabb> {
    let mut boxes = Vec::new();
    if nodes.is_empty() {
        return boxes;
    }

    let mut stack = vec![(0usize, 0u32)];
    let mut budget = nodes.len();

    while let Some((index, level)) = stack.pop() {
        // Malformed buffers must not hang the overlay
        if budget == 0 {
            log::warn!("[Gizmo] Node budget exhausted, BVH buffer is malformed");
            break;
        }
        budget -= 1;

        let Some(node) = nodes.get(index) else {
            continue;
        };

        let draw = if leaf_only {
            node.is_leaf() && level >= depth
        } else {
            level == depth
        };
        if draw {
            boxes.push(node.bounds());
        }

        let descend = !node.is_leaf() && (leaf_only || level < depth);
        if descend {
            let left = node.left_first as usize;
            stack.push((left + 1, level + 1));
            stack.push((left, level + 1));
        }
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn tree() -> Vec<BvhNode> {
        let root = Aabb::new(Vec3::ZERO, Vec3::splat(4.0));
        let left = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let right = Aabb::new(Vec3::splat(2.0), Vec3::splat(4.0));
        let right_a = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        let right_b = Aabb::new(Vec3::splat(3.0), Vec3::splat(4.0));
        vec![
            BvhNode::internal(root, 1),
            BvhNode::leaf(left, 0, 1),
            BvhNode::internal(right, 3),
            BvhNode::leaf(right_a, 1, 1),
            BvhNode::leaf(right_b, 2, 1),
        ]
    }

    #[test]
    fn test_depth_zero_is_root() {
        let boxes = collect_gizmo_boxes(&tree(), 0, false);
        assert_eq!(boxes, vec![Aabb::new(Vec3::ZERO, Vec3::splat(4.0))]);
    }

    #[test]
    fn test_depth_selects_level() {
        assert_eq!(collect_gizmo_boxes(&tree(), 1, false).len(), 2);
        assert_eq!(collect_gizmo_boxes(&tree(), 2, false).len(), 2);
        assert!(collect_gizmo_boxes(&tree(), 3, false).is_empty());
    }

    #[test]
    fn test_leaf_only() {
        assert_eq!(collect_gizmo_boxes(&tree(), 0, true).len(), 3);
        assert_eq!(collect_gizmo_boxes(&tree(), 2, true).len(), 2);
    }

    #[test]
    fn test_empty_buffer() {
        assert!(collect_gizmo_boxes(&[], 0, true).is_empty());
    }
}
