use glam::Vec3;

use crate::constants::physics::{GRAVITY_AXIS, SURFACE_OFFSET};
use crate::gpu::buffer_layouts::{ParticleData, SimParams};
use crate::kernel::intersect::Segment;
use crate::kernel::traversal::{closest_hit, BvhView};
use crate::particles::random::{advance, next_unit};

/// What happened to one lane during a dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneOutcome {
    pub collided: bool,
    pub respawned: bool,
}

/// Per-lane update: integrate, collide against the BVH, bounce, damp.
///
/// Touches only `particle`; `params` and `bvh` are shared read-only.
pub fn update_particle(
    particle: &mut ParticleData,
    params: &SimParams,
    bvh: &BvhView<'_>,
) -> LaneOutcome {
    let mut outcome = LaneOutcome::default();
    let mut random_state = advance(particle.random_state);

    let delta_time = if params.delta_time.is_finite() {
        params.delta_time.max(0.0)
    } else {
        0.0
    };

    // Semi-implicit Euler: velocity first, then position with the new velocity
    let acceleration = Vec3::from(GRAVITY_AXIS) * params.gravity;
    let start = particle.position();
    let mut velocity = particle.velocity() + acceleration * delta_time;
    let segment = Segment::new(start, start + velocity * delta_time);
    let mut position = segment.origin + segment.delta;

    if let Some(hit) = closest_hit(bvh, &segment) {
        let normal_speed = velocity.dot(hit.normal);
        if normal_speed < 0.0 {
            // v_t - bounce * v_n
            velocity -= hit.normal * normal_speed * (1.0 + params.bounce_rate);
        }
        position = hit.point + hit.normal * SURFACE_OFFSET;
        outcome.collided = true;
    }

    velocity *= params.damping;

    if params.respawn_out_of_bounds() {
        let spawn_min = params.spawn_min();
        let spawn_max = params.spawn_max();
        let inside = position.cmpge(spawn_min).all() && position.cmple(spawn_max).all();
        if !inside {
            let random_vector = Vec3::new(
                next_unit(&mut random_state),
                next_unit(&mut random_state),
                next_unit(&mut random_state),
            );
            position = spawn_min + random_vector * (spawn_max - spawn_min);
            velocity = Vec3::ZERO;
            outcome.respawned = true;
        }
    }

    // Non-finite results leave the slot where it was
    if position.is_finite() && velocity.is_finite() {
        particle.position = position.into();
        particle.velocity = velocity.into();
    }
    particle.random_state = random_state;

    outcome
}
