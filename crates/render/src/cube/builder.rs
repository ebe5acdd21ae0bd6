use super::geometry::{CUBE_COLORS, CUBE_INDICES, CUBE_POSITIONS};
use super::{CubeGpuState, CubeLocations};
use crate::camera::CameraMatrices;
use crate::context::{BufferTarget, BufferUsage, GraphicsContext};
use crate::program::{ProgramError, build_program};
use splatview_shader::{
    COLOR_ATTRIBUTE, COLOR_CORRECTION_ENTRY_POINT, ComposeError, MODEL_VIEW_UNIFORM,
    POSITION_ATTRIBUTE, PROJECTION_UNIFORM, ShaderCustomization, ShaderTemplate, compose,
};
use std::collections::BTreeMap;

/// Why the cube could not be built. The cube is then skipped for the session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CubeBuildError {
    #[error("shader composition failed: {0}")]
    Compose(#[from] ComposeError),
    #[error("color correction zone does not define `{entry_point}`")]
    MissingEntryPoint { entry_point: &'static str },
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error("attribute `{0}` not found in linked program")]
    MissingAttribute(&'static str),
    #[error("uniform `{0}` not found in linked program")]
    MissingUniform(&'static str),
    #[error("buffer allocation failed: {0}")]
    Buffer(String),
}

/// Build the cube from the stock template.
///
/// `camera` is accepted for symmetry with [`render_cube`](super::render_cube)
/// and is not read at build time.
pub fn init_cube_renderer<C, K>(
    ctx: &C,
    camera: &K,
    customization: Option<&ShaderCustomization>,
) -> Result<CubeGpuState<C>, CubeBuildError>
where
    C: GraphicsContext,
    K: CameraMatrices + ?Sized,
{
    init_cube_renderer_with(ctx, camera, &ShaderTemplate::cube(), customization)
}

/// Build the cube from an explicit template.
///
/// Nothing is allocated on the GPU until composition succeeds, and buffers
/// are only created once a program has linked. Every object created by a
/// failing step is deleted before returning.
pub fn init_cube_renderer_with<C, K>(
    ctx: &C,
    _camera: &K,
    template: &ShaderTemplate,
    customization: Option<&ShaderCustomization>,
) -> Result<CubeGpuState<C>, CubeBuildError>
where
    C: GraphicsContext,
    K: CameraMatrices + ?Sized,
{
    let default_customization = ShaderCustomization::default();
    let customization = customization.unwrap_or(&default_customization);

    let composed = compose(template, customization)?;
    if !composed.defines_color_correction() {
        tracing::error!(
            entry_point = COLOR_CORRECTION_ENTRY_POINT,
            "color correction zone does not define the entry point"
        );
        return Err(CubeBuildError::MissingEntryPoint {
            entry_point: COLOR_CORRECTION_ENTRY_POINT,
        });
    }

    let program = build_program(ctx, &composed.vertex, &composed.fragment)?;

    let locations = match resolve_locations(ctx, program) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::error!("{e}");
            ctx.delete_program(program);
            return Err(e);
        }
    };

    let mut buffers = Vec::with_capacity(3);
    let uploads: [(BufferTarget, &[u8]); 3] = [
        (BufferTarget::Array, bytemuck::cast_slice(&CUBE_POSITIONS)),
        (BufferTarget::Array, bytemuck::cast_slice(&CUBE_COLORS)),
        (BufferTarget::ElementArray, bytemuck::cast_slice(&CUBE_INDICES)),
    ];
    for (target, bytes) in uploads {
        match upload(ctx, target, bytes) {
            Ok(buffer) => buffers.push(buffer),
            Err(reason) => {
                tracing::error!("cube buffer allocation failed: {reason}");
                for buffer in buffers {
                    ctx.delete_buffer(buffer);
                }
                ctx.delete_program(program);
                return Err(CubeBuildError::Buffer(reason));
            }
        }
    }
    let [position_buffer, color_buffer, index_buffer] = [buffers[0], buffers[1], buffers[2]];

    tracing::info!(
        customized = !customization.is_empty(),
        "cube renderer initialized"
    );

    Ok(CubeGpuState {
        program,
        position_buffer,
        color_buffer,
        index_buffer,
        locations,
        extra_uniforms: BTreeMap::new(),
    })
}

fn resolve_locations<C: GraphicsContext>(
    ctx: &C,
    program: C::Program,
) -> Result<CubeLocations<C::UniformLocation>, CubeBuildError> {
    let attribute = |name: &'static str| {
        ctx.attrib_location(program, name)
            .ok_or(CubeBuildError::MissingAttribute(name))
    };
    let uniform = |name: &'static str| {
        ctx.uniform_location(program, name)
            .ok_or(CubeBuildError::MissingUniform(name))
    };

    Ok(CubeLocations {
        position: attribute(POSITION_ATTRIBUTE)?,
        color: attribute(COLOR_ATTRIBUTE)?,
        model_view: uniform(MODEL_VIEW_UNIFORM)?,
        projection: uniform(PROJECTION_UNIFORM)?,
    })
}

fn upload<C: GraphicsContext>(
    ctx: &C,
    target: BufferTarget,
    bytes: &[u8],
) -> Result<C::Buffer, String> {
    let buffer = ctx.create_buffer()?;
    ctx.bind_buffer(target, Some(buffer));
    ctx.buffer_data(target, bytes, BufferUsage::StaticDraw);
    Ok(buffer)
}
