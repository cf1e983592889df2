use rayon::prelude::*;

use crate::constants::dispatch::WORKGROUP_SIZE;
use crate::gpu::buffer_layouts::{ParticleData, SimParams};
use crate::kernel::traversal::BvhView;
use crate::kernel::update::update_particle;

/// Workgroup count covering a particle population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSize {
    pub groups: u32,
    /// Total lanes launched, including idle lanes in the last group
    pub lanes: u32,
}

impl DispatchSize {
    pub fn for_particles(particle_count: u32) -> Self {
        let groups = particle_count.div_ceil(WORKGROUP_SIZE);
        Self {
            groups,
            lanes: groups.saturating_mul(WORKGROUP_SIZE),
        }
    }

    pub fn idle_lanes(&self, particle_count: u32) -> u32 {
        self.lanes.saturating_sub(particle_count)
    }
}

/// Summary of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub groups: u32,
    pub lanes: u32,
    pub collisions: u32,
    pub respawns: u32,
}

/// Run the update kernel over `params.particle_count` lanes.
///
/// Groups run in parallel on the current rayon pool; each group owns a
/// disjoint chunk of slots. Lanes at or beyond `particle_count` (the tail of
/// the last group) exit without touching memory. Only lanes backed by a slot
/// are launched.
pub fn dispatch_update(
    particles: &mut [ParticleData],
    params: &SimParams,
    bvh: &BvhView<'_>,
) -> DispatchReport {
    let slots = u32::try_from(particles.len()).unwrap_or(u32::MAX);
    let live = params.particle_count.min(slots);
    let size = DispatchSize::for_particles(live);
    let bvh = bvh.limited(params.node_count);
    let group_width = WORKGROUP_SIZE as usize;
    let particle_count = live as usize;

    let (collisions, respawns) = particles
        .par_chunks_mut(group_width)
        .take(size.groups as usize)
        .enumerate()
        .map(|(group, lanes)| {
            let mut collisions = 0u32;
            let mut respawns = 0u32;
            for local in 0..group_width {
                let index = group * group_width + local;
                if index >= particle_count {
                    break;
                }
                let Some(particle) = lanes.get_mut(local) else {
                    break;
                };
                let outcome = update_particle(particle, params, &bvh);
                collisions += outcome.collided as u32;
                respawns += outcome.respawned as u32;
            }
            (collisions, respawns)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    DispatchReport {
        groups: size.groups,
        lanes: size.lanes,
        collisions,
        respawns,
    }
}
