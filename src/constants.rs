// BVH Particles Constants - SINGLE SOURCE OF TRUTH
//
// Host code, the CPU kernel and the WGSL kernel all read these values.
// The WGSL preamble is generated from this module at pipeline creation,
// so do NOT redefine any of these inside shader sources.

/// Parallel dispatch constants
pub mod dispatch {
    /// Lanes per workgroup. Must match `@workgroup_size` in the update kernel.
    pub const WORKGROUP_SIZE: u32 = 64;

    /// Maximum BVH depth the bounded traversal stack can hold
    pub const MAX_BVH_DEPTH: usize = 32;
}

/// Collision and integration constants
pub mod physics {
    /// Distance a colliding particle is pushed back off the surface
    pub const SURFACE_OFFSET: f32 = 1.0e-4;

    /// Determinant threshold below which a triangle counts as parallel/degenerate
    pub const TRIANGLE_EPSILON: f32 = 1.0e-8;

    /// Squared segment length below which motion is treated as zero
    pub const MIN_SEGMENT_LENGTH_SQ: f32 = 1.0e-12;

    /// World axis gravity acts along (negative gravity pulls towards -Y)
    pub const GRAVITY_AXIS: [f32; 3] = [0.0, 1.0, 0.0];
}

/// Random stream constants
pub mod random {
    /// Replacement state used if a lane ever observes the reserved zero state
    pub const ZERO_STATE_REPLACEMENT: u32 = 0x9E37_79B9;

    /// Scale turning the top 24 bits of a state into a float in [0, 1)
    pub const UNIT_FLOAT_SCALE: f32 = 1.0 / 16_777_216.0;
}

/// Particle colour endpoints, lerped by a random factor at spawn
pub mod colors {
    pub const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

/// Configuration defaults
pub mod defaults {
    pub const PARTICLE_COUNT: u32 = 10_000;
    pub const BOUNCE_RATE: f32 = 0.5;
    pub const SPAWN_SIZE: f32 = 10.0;
    pub const GRAVITY: f32 = 0.0;
    pub const DAMPING: f32 = 0.9;

    /// Fixed step used by the driver binary
    pub const FIXED_DELTA_TIME: f32 = 1.0 / 60.0;
    pub const DRIVER_FRAMES: u32 = 600;
}

/// Bit flags packed into `SimParams::flags`
pub mod flags {
    /// Respawn particles that leave the spawn volume
    pub const RESPAWN_OUT_OF_BOUNDS: u32 = 1 << 0;
}
