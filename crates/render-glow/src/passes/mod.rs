//! Scene passes drawn around the cube. Generic over the context so they run
//! against the recording backend in tests.

mod grid;
mod splat;

pub use grid::GridPass;
pub use splat::SplatPass;

use splatview_render::{BufferTarget, BufferUsage, GraphicsContext, ProgramError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PassError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error("attribute `{0}` not found in linked program")]
    MissingAttribute(&'static str),
    #[error("uniform `{0}` not found in linked program")]
    MissingUniform(&'static str),
    #[error("buffer allocation failed: {0}")]
    Buffer(String),
}

fn attribute<C: GraphicsContext>(
    ctx: &C,
    program: C::Program,
    name: &'static str,
) -> Result<u32, PassError> {
    ctx.attrib_location(program, name)
        .ok_or(PassError::MissingAttribute(name))
}

fn uniform<C: GraphicsContext>(
    ctx: &C,
    program: C::Program,
    name: &'static str,
) -> Result<C::UniformLocation, PassError> {
    ctx.uniform_location(program, name)
        .ok_or(PassError::MissingUniform(name))
}

fn static_vertex_buffer<C: GraphicsContext>(ctx: &C, bytes: &[u8]) -> Result<C::Buffer, PassError> {
    let buffer = ctx.create_buffer().map_err(PassError::Buffer)?;
    ctx.bind_buffer(BufferTarget::Array, Some(buffer));
    ctx.buffer_data(BufferTarget::Array, bytes, BufferUsage::StaticDraw);
    Ok(buffer)
}
