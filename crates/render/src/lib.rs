//! Rendering core: a GL-style context trait, shader program building, and
//! the manually rendered, color-graded cube.
//!
//! # Invariants
//! - The cube's GPU objects are created once by [`init_cube_renderer`] and
//!   only receive uniform writes afterwards.
//! - A failed build yields an error, never a half-built [`CubeGpuState`];
//!   no buffers exist unless a program linked.
//! - Nothing in this crate panics across the build/render boundary.
//!
//! # Debug backend
//! [`RecordingContext`] implements [`GraphicsContext`] without a GPU. It
//! records every call and lets callers script compiler and linker outcomes,
//! which is how the CLI dry-run and the tests drive the cube.

mod camera;
mod context;
mod cube;
mod program;
mod recording;

pub use camera::{CameraMatrices, StaticCamera};
pub use context::{
    BlendFactor, BufferTarget, BufferUsage, Capability, DepthFunc, Face, GraphicsContext,
    IndexType, ShaderStage, Topology, UniformValue,
};
pub use cube::{
    CUBE_COLORS, CUBE_INDEX_COUNT, CUBE_INDICES, CUBE_MODEL_MATRIX, CUBE_POSITIONS,
    CubeBuildError, CubeGpuState, CubeLocations, init_cube_renderer, init_cube_renderer_with,
    model_view_matrix, render_cube,
};
pub use program::{ProgramError, build_program, compile_shader, link_program};
pub use recording::{GlCall, RecordingContext, UniformSlot};

pub fn crate_info() -> &'static str {
    "splatview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
