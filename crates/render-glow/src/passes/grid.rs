use super::{PassError, attribute, static_vertex_buffer, uniform};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use splatview_render::{
    BufferTarget, CameraMatrices, Capability, DepthFunc, GraphicsContext, Topology, build_program,
};
use std::mem::{offset_of, size_of};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct GridVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Line list on the y = 0 plane, `2 * half_extent + 1` lines along each axis.
fn grid_mesh(half_extent: i32, spacing: f32) -> Vec<GridVertex> {
    let mut verts = Vec::new();
    let color = [0.4, 0.4, 0.4, 1.0];
    let axis_color = [0.6, 0.6, 0.6, 1.0];
    let extent = half_extent as f32 * spacing;

    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        let color = if i == 0 { axis_color } else { color };
        // Lines along X
        verts.push(GridVertex {
            position: [-extent, 0.0, offset],
            color,
        });
        verts.push(GridVertex {
            position: [extent, 0.0, offset],
            color,
        });
        // Lines along Z
        verts.push(GridVertex {
            position: [offset, 0.0, -extent],
            color,
        });
        verts.push(GridVertex {
            position: [offset, 0.0, extent],
            color,
        });
    }
    verts
}

fn locate<C: GraphicsContext>(
    ctx: &C,
    program: C::Program,
) -> Result<(u32, u32, C::UniformLocation), PassError> {
    Ok((
        attribute(ctx, program, "aPosition")?,
        attribute(ctx, program, "aColor")?,
        uniform(ctx, program, "uViewProjection")?,
    ))
}

/// Ground grid. Stands in for the scene graph's main render.
pub struct GridPass<C: GraphicsContext> {
    program: C::Program,
    vertex_buffer: C::Buffer,
    vertex_count: i32,
    position: u32,
    color: u32,
    view_projection: C::UniformLocation,
}

impl<C: GraphicsContext> GridPass<C> {
    pub fn new(ctx: &C, half_extent: i32, spacing: f32) -> Result<Self, PassError> {
        let program = build_program(ctx, shaders::GRID_VERTEX, shaders::GRID_FRAGMENT)?;
        let (position, color, view_projection) = match locate(ctx, program) {
            Ok(found) => found,
            Err(e) => {
                ctx.delete_program(program);
                return Err(e);
            }
        };

        let mesh = grid_mesh(half_extent, spacing);
        let vertex_buffer = match static_vertex_buffer(ctx, bytemuck::cast_slice(&mesh)) {
            Ok(buffer) => buffer,
            Err(e) => {
                ctx.delete_program(program);
                return Err(e);
            }
        };
        tracing::debug!(lines = mesh.len() / 2, "grid pass ready");

        Ok(Self {
            program,
            vertex_buffer,
            vertex_count: mesh.len() as i32,
            position,
            color,
            view_projection,
        })
    }

    pub fn render<K: CameraMatrices + ?Sized>(&self, ctx: &C, camera: &K) {
        let view_projection = camera.projection_matrix().multiply(&camera.view_matrix());
        let stride = size_of::<GridVertex>() as i32;

        ctx.use_program(Some(self.program));
        ctx.enable(Capability::DepthTest);
        ctx.depth_func(DepthFunc::LessEqual);
        ctx.disable(Capability::CullFace);

        ctx.bind_buffer(BufferTarget::Array, Some(self.vertex_buffer));
        ctx.vertex_attrib_pointer_f32(
            self.position,
            3,
            stride,
            offset_of!(GridVertex, position) as i32,
        );
        ctx.enable_vertex_attrib_array(self.position);
        ctx.vertex_attrib_pointer_f32(self.color, 4, stride, offset_of!(GridVertex, color) as i32);
        ctx.enable_vertex_attrib_array(self.color);

        ctx.uniform_matrix4(&self.view_projection, &view_projection);
        ctx.draw_arrays(Topology::Lines, 0, self.vertex_count);
    }

    pub fn destroy(self, ctx: &C) {
        ctx.delete_buffer(self.vertex_buffer);
        ctx.delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splatview_render::{GlCall, RecordingContext, StaticCamera};

    #[test]
    fn grid_mesh_counts() {
        let verts = grid_mesh(10, 1.0);
        // 21 lines per axis, 2 axes, 2 vertices per line
        assert_eq!(verts.len(), 21 * 2 * 2);
        assert!(verts.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn draws_lines_with_interleaved_layout() {
        let ctx = RecordingContext::new();
        let grid = GridPass::new(&ctx, 2, 1.0).unwrap();
        ctx.take_calls();

        grid.render(&ctx, &StaticCamera::default());
        let calls = ctx.calls();

        assert!(calls.contains(&GlCall::VertexAttribPointer {
            index: 1,
            size: 4,
            stride: 28,
            offset: 12,
        }));
        assert_eq!(
            ctx.draw_calls(),
            [GlCall::DrawArrays {
                topology: Topology::Lines,
                first: 0,
                count: 20,
            }]
        );
    }

    #[test]
    fn failed_link_leaves_nothing_behind() {
        let ctx = RecordingContext::new().with_linker(|_, _| Err("bad".into()));
        assert!(GridPass::new(&ctx, 2, 1.0).is_err());
        assert_eq!((ctx.live_programs(), ctx.live_buffers()), (0, 0));
    }
}
