/// Axis-Aligned Bounding Box
///
/// Shared by the spawn volume, BVH node bounds and gizmo output.
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by its min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center point and full size
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// True if min <= max on every axis and all corners are finite
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    /// Inclusive point containment
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_size_round_trip() {
        let aabb = Aabb::from_center_size(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(10.0));
        assert_eq!(aabb.min, Vec3::new(-4.0, -3.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(6.0, 7.0, 8.0));
        assert_eq!(aabb.size(), Vec3::splat(10.0));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(aabb.contains_point(Vec3::ONE));
        assert!(!aabb.contains_point(Vec3::new(1.0001, 0.5, 0.5)));
    }

    #[test]
    fn test_validity() {
        assert!(Aabb::new(Vec3::ZERO, Vec3::ZERO).is_valid());
        assert!(!Aabb::new(Vec3::ONE, Vec3::ZERO).is_valid());
        assert!(!Aabb::new(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 1.0)).is_valid());
    }
}
