//! The manually rendered cube: fixed geometry, a program composed from the
//! shader template, and the per-frame draw.

mod builder;
mod geometry;
mod renderer;

pub use builder::{CubeBuildError, init_cube_renderer, init_cube_renderer_with};
pub use geometry::{CUBE_COLORS, CUBE_INDEX_COUNT, CUBE_INDICES, CUBE_POSITIONS};
pub use renderer::{CUBE_MODEL_MATRIX, model_view_matrix, render_cube};

use crate::context::{GraphicsContext, UniformValue};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute and uniform locations resolved once at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeLocations<L> {
    pub position: u32,
    pub color: u32,
    pub model_view: L,
    pub projection: L,
}

/// Everything the cube owns on the GPU.
///
/// Only [`init_cube_renderer`] creates one, and only when every object was
/// created; there is no partially built state. After that, the only
/// mutation is writing uniforms.
pub struct CubeGpuState<C: GraphicsContext> {
    program: C::Program,
    position_buffer: C::Buffer,
    color_buffer: C::Buffer,
    index_buffer: C::Buffer,
    locations: CubeLocations<C::UniformLocation>,
    /// Caller-added uniforms. `None` caches a failed lookup so the warning
    /// is logged once.
    extra_uniforms: BTreeMap<String, Option<C::UniformLocation>>,
}

impl<C: GraphicsContext> fmt::Debug for CubeGpuState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeGpuState")
            .field("program", &self.program)
            .field("position_buffer", &self.position_buffer)
            .field("color_buffer", &self.color_buffer)
            .field("index_buffer", &self.index_buffer)
            .field("locations", &self.locations)
            .field("extra_uniforms", &self.extra_uniforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C: GraphicsContext> CubeGpuState<C> {
    pub fn program(&self) -> C::Program {
        self.program
    }

    pub fn locations(&self) -> &CubeLocations<C::UniformLocation> {
        &self.locations
    }

    /// Write a caller-added uniform such as `uTime`.
    ///
    /// Binds the cube program first. Returns whether the uniform exists in
    /// the linked program; unknown names are logged once and then ignored.
    pub fn set_uniform(&mut self, ctx: &C, name: &str, value: UniformValue) -> bool {
        let program = self.program;
        let location = self
            .extra_uniforms
            .entry(name.to_owned())
            .or_insert_with(|| {
                let location = ctx.uniform_location(program, name);
                if location.is_none() {
                    tracing::warn!(uniform = name, "uniform not found in cube program");
                }
                location
            });

        match location {
            Some(location) => {
                ctx.use_program(Some(program));
                ctx.uniform(location, value);
                true
            }
            None => false,
        }
    }

    /// Release every GPU object.
    pub fn destroy(self, ctx: &C) {
        ctx.delete_buffer(self.position_buffer);
        ctx.delete_buffer(self.color_buffer);
        ctx.delete_buffer(self.index_buffer);
        ctx.delete_program(self.program);
        tracing::debug!("cube resources released");
    }
}
