//! WGSL source assembly and offline validation
//!
//! Kernel constants live in `crate::constants` only. The preamble below is
//! prepended to the kernel source so the shader and the CPU kernel can never
//! disagree on them.

use std::fmt::Write;

use crate::constants::{dispatch, flags, physics, random};
use crate::error::{SimulationError, SimulationResult};

const PARTICLE_UPDATE_WGSL: &str = include_str!("../shaders/compute/particle_update.wgsl");

/// Name the update kernel is registered under in errors and labels
pub const PARTICLE_UPDATE_SHADER: &str = "particle_update";

fn push_f32(out: &mut String, name: &str, value: f32) {
    // `{:?}` always keeps a decimal point, so WGSL reads it as a float
    let _ = writeln!(out, "const {}: f32 = {:?};", name, value);
}

fn push_u32(out: &mut String, name: &str, value: u32) {
    let _ = writeln!(out, "const {}: u32 = {}u;", name, value);
}

/// WGSL `const` declarations for every value the kernel shares with the host
pub fn wgsl_constants() -> String {
    let mut out = String::from("// Generated from crate::constants\n");

    push_u32(&mut out, "WORKGROUP_SIZE", dispatch::WORKGROUP_SIZE);
    push_u32(&mut out, "MAX_BVH_DEPTH", dispatch::MAX_BVH_DEPTH as u32);
    push_f32(&mut out, "SURFACE_OFFSET", physics::SURFACE_OFFSET);
    push_f32(&mut out, "TRIANGLE_EPSILON", physics::TRIANGLE_EPSILON);
    push_f32(&mut out, "MIN_SEGMENT_LENGTH_SQ", physics::MIN_SEGMENT_LENGTH_SQ);
    push_f32(&mut out, "F32_MAX", f32::MAX);
    push_u32(&mut out, "ZERO_STATE_REPLACEMENT", random::ZERO_STATE_REPLACEMENT);
    push_f32(&mut out, "UNIT_FLOAT_SCALE", random::UNIT_FLOAT_SCALE);
    push_u32(&mut out, "FLAG_RESPAWN_OUT_OF_BOUNDS", flags::RESPAWN_OUT_OF_BOUNDS);

    let [x, y, z] = physics::GRAVITY_AXIS;
    let _ = writeln!(
        out,
        "const GRAVITY_AXIS: vec3<f32> = vec3<f32>({:?}, {:?}, {:?});",
        x, y, z
    );

    out.push('\n');
    out
}

/// Complete update kernel source: preamble followed by the kernel body
pub fn particle_update_source() -> String {
    let mut source = wgsl_constants();
    source.push_str(PARTICLE_UPDATE_WGSL);
    source
}

/// Parse and validate WGSL with naga, without a device
pub fn validate_wgsl(name: &str, source: &str) -> SimulationResult<naga::Module> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        SimulationError::ShaderCompilationFailed {
            shader: name.to_string(),
            error: e.emit_to_string(source),
        }
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| SimulationError::ShaderCompilationFailed {
            shader: name.to_string(),
            error: e.into_inner().to_string(),
        })?;

    Ok(module)
}
