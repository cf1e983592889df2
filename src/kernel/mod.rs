//! CPU rendition of the parallel particle update kernel
//!
//! `update` is the per-lane program, `dispatch` fans it out over rayon
//! workgroups. The WGSL kernel in `shaders/compute/particle_update.wgsl` mirrors
//! these functions line for line.

pub mod dispatch;
pub mod intersect;
pub mod traversal;
pub mod update;

pub use dispatch::{dispatch_update, DispatchReport, DispatchSize};
pub use intersect::{segment_aabb, segment_triangle, Segment};
pub use traversal::{closest_hit, closest_hit_with_stats, BvhView, SegmentHit, TraversalStats};
pub use update::{update_particle, LaneOutcome};
