use crate::config::SimulationConfig;
use crate::constants::flags;
use crate::gpu::buffer_layouts::SimParams;
use crate::mesh::Aabb;
use crate::time::FrameTime;

/// Per-frame argument bundle for one dispatch.
///
/// Built fresh every frame and passed by value; nothing here outlives the
/// frame. Values are taken as-is, configuration already clamped them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    pub spawn_bounds: Aabb,
    pub bounce_rate: f32,
    pub gravity: f32,
    pub damping: f32,
    /// Absolute simulation time in seconds
    pub time: f32,
    pub delta_time: f32,
    pub respawn_out_of_bounds: bool,
}

impl SimulationParameters {
    pub fn from_config(config: &SimulationConfig, frame: FrameTime) -> Self {
        Self {
            spawn_bounds: config.spawn_bounds.aabb(),
            bounce_rate: config.bounce_rate,
            gravity: config.gravity,
            damping: config.damping,
            time: frame.time,
            delta_time: frame.delta_time,
            respawn_out_of_bounds: config.respawn_out_of_bounds,
        }
    }

    /// Pack into the uniform layout shared with the kernel
    pub fn to_gpu(&self, particle_count: u32, node_count: u32) -> SimParams {
        let mut packed_flags = 0;
        if self.respawn_out_of_bounds {
            packed_flags |= flags::RESPAWN_OUT_OF_BOUNDS;
        }

        SimParams {
            spawn_bounds_min: self.spawn_bounds.min.into(),
            bounce_rate: self.bounce_rate,
            spawn_bounds_max: self.spawn_bounds.max.into(),
            gravity: self.gravity,
            damping: self.damping,
            time: self.time,
            delta_time: self.delta_time,
            particle_count,
            node_count,
            flags: packed_flags,
            _padding: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameClock;
    use glam::Vec3;

    #[test]
    fn test_from_config_and_pack() {
        let config = SimulationConfig {
            gravity: -9.8,
            ..SimulationConfig::default()
        };
        let mut clock = FrameClock::new();
        clock.tick_secs(0.5);
        let frame = clock.tick_secs(0.25);

        let params = SimulationParameters::from_config(&config, frame);
        assert_eq!(params.time, 0.75);
        assert_eq!(params.delta_time, 0.25);
        assert_eq!(params.spawn_bounds.min, Vec3::splat(-5.0));

        let packed = params.to_gpu(100, 7);
        assert_eq!(packed.particle_count, 100);
        assert_eq!(packed.node_count, 7);
        assert_eq!(packed.gravity, -9.8);
        assert_eq!(packed.spawn_bounds_max, [5.0; 3]);
        assert!(packed.respawn_out_of_bounds());
    }

    #[test]
    fn test_respawn_flag_off() {
        let config = SimulationConfig {
            respawn_out_of_bounds: false,
            ..SimulationConfig::default()
        };
        let frame = FrameClock::new().tick_secs(0.1);
        let packed = SimulationParameters::from_config(&config, frame).to_gpu(1, 0);
        assert_eq!(packed.flags, 0);
    }
}
