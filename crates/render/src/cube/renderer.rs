use super::CubeGpuState;
use super::geometry::CUBE_INDEX_COUNT;
use crate::camera::CameraMatrices;
use crate::context::{
    BufferTarget, Capability, DepthFunc, Face, GraphicsContext, IndexType, Topology,
};
use splatview_common::Matrix4;

/// Placement of the cube in the world: identity rotation, no translation.
///
/// The cube stays centered on the origin even though that overlaps the
/// ground grid.
pub const CUBE_MODEL_MATRIX: Matrix4 = Matrix4::translation(0.0, 0.0, 0.0);

/// `view × model` for the cube.
pub fn model_view_matrix(view: &Matrix4) -> Matrix4 {
    view.multiply(&CUBE_MODEL_MATRIX)
}

/// Draw the cube once into whatever framebuffer is bound.
///
/// Takes a built state, so there is nothing to re-validate per frame. The
/// pipeline state set here (program, depth test, culling, buffer bindings)
/// is left in place for the next renderer.
pub fn render_cube<C, K>(ctx: &C, state: &CubeGpuState<C>, camera: &K)
where
    C: GraphicsContext,
    K: CameraMatrices + ?Sized,
{
    let locations = &state.locations;

    ctx.use_program(Some(state.program));
    ctx.enable(Capability::DepthTest);
    ctx.depth_func(DepthFunc::Less);
    ctx.enable(Capability::CullFace);
    ctx.cull_face(Face::Back);

    ctx.bind_buffer(BufferTarget::Array, Some(state.position_buffer));
    ctx.vertex_attrib_pointer_f32(locations.position, 3, 0, 0);
    ctx.enable_vertex_attrib_array(locations.position);

    ctx.bind_buffer(BufferTarget::Array, Some(state.color_buffer));
    ctx.vertex_attrib_pointer_f32(locations.color, 4, 0, 0);
    ctx.enable_vertex_attrib_array(locations.color);

    ctx.bind_buffer(BufferTarget::ElementArray, Some(state.index_buffer));

    let model_view = model_view_matrix(&camera.view_matrix());
    ctx.uniform_matrix4(&locations.model_view, &model_view);
    ctx.uniform_matrix4(&locations.projection, &camera.projection_matrix());

    ctx.draw_elements(Topology::Triangles, CUBE_INDEX_COUNT, IndexType::U16, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::StaticCamera;
    use crate::cube::init_cube_renderer;
    use crate::recording::{GlCall, RecordingContext};

    /// Rotation of 90 degrees about Y followed by a translation, written out by hand.
    #[rustfmt::skip]
    fn rotated_translated_view() -> Matrix4 {
        Matrix4::from_rows([
             0.0, 0.0, 1.0,   2.0,
             0.0, 1.0, 0.0,  -3.0,
            -1.0, 0.0, 0.0, -10.0,
             0.0, 0.0, 0.0,   1.0,
        ])
    }

    #[test]
    fn model_matrix_is_identity() {
        assert_eq!(CUBE_MODEL_MATRIX, Matrix4::IDENTITY);
    }

    #[test]
    fn model_view_is_view_times_model() {
        let view = rotated_translated_view();
        assert_eq!(model_view_matrix(&view), view);

        // Same contraction against a model that is not the identity.
        let model = Matrix4::translation(1.0, 2.0, 3.0);
        #[rustfmt::skip]
        let expected = Matrix4::from_rows([
             0.0, 0.0, 1.0,   5.0,
             0.0, 1.0, 0.0,  -1.0,
            -1.0, 0.0, 0.0, -11.0,
             0.0, 0.0, 0.0,   1.0,
        ]);
        assert_eq!(view.multiply(&model), expected);
    }

    #[test]
    fn default_cube_draws_once_with_36_u16_indices() {
        let ctx = RecordingContext::new();
        let camera = StaticCamera::default();
        let cube = init_cube_renderer(&ctx, &camera, None).unwrap();

        render_cube(&ctx, &cube, &camera);

        assert_eq!(
            ctx.draw_calls(),
            [GlCall::DrawElements {
                topology: Topology::Triangles,
                count: 36,
                index_type: IndexType::U16,
                offset: 0,
            }]
        );
    }

    #[test]
    fn uploads_model_view_and_projection() {
        let ctx = RecordingContext::new();
        let camera = StaticCamera::new(
            rotated_translated_view(),
            Matrix4::from_rows([
                1.5, 0.0, 0.0, 0.0, //
                0.0, 2.0, 0.0, 0.0, //
                0.0, 0.0, -1.0, -0.2, //
                0.0, 0.0, -1.0, 0.0, //
            ]),
        );
        let cube = init_cube_renderer(&ctx, &camera, None).unwrap();
        ctx.take_calls();

        render_cube(&ctx, &cube, &camera);

        let uploads: Vec<_> = ctx
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::UniformMatrix4 { name, matrix } => Some((name, matrix)),
                _ => None,
            })
            .collect();
        assert_eq!(
            uploads,
            [
                ("uModelViewMatrix".to_owned(), rotated_translated_view()),
                ("uProjectionMatrix".to_owned(), camera.projection),
            ]
        );
    }

    #[test]
    fn pipeline_state_precedes_the_draw() {
        let ctx = RecordingContext::new();
        let camera = StaticCamera::default();
        let cube = init_cube_renderer(&ctx, &camera, None).unwrap();
        ctx.take_calls();

        render_cube(&ctx, &cube, &camera);
        let calls = ctx.calls();

        assert_eq!(
            calls[..5],
            [
                GlCall::UseProgram(Some(cube.program())),
                GlCall::Enable(Capability::DepthTest),
                GlCall::DepthFunc(DepthFunc::Less),
                GlCall::Enable(Capability::CullFace),
                GlCall::CullFace(Face::Back),
            ]
        );
        assert!(calls.contains(&GlCall::VertexAttribPointer {
            index: cube.locations().position,
            size: 3,
            stride: 0,
            offset: 0,
        }));
        assert!(calls.contains(&GlCall::VertexAttribPointer {
            index: cube.locations().color,
            size: 4,
            stride: 0,
            offset: 0,
        }));
        assert!(matches!(calls.last(), Some(GlCall::DrawElements { .. })));
    }

    #[test]
    fn render_touches_no_buffers_or_programs() {
        let ctx = RecordingContext::new();
        let camera = StaticCamera::default();
        let cube = init_cube_renderer(&ctx, &camera, None).unwrap();
        for _ in 0..3 {
            render_cube(&ctx, &cube, &camera);
        }
        assert_eq!((ctx.live_programs(), ctx.live_buffers()), (1, 3));
        let creates = ctx
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::CreateBuffer(_) | GlCall::CreateProgram(_)))
            .count();
        assert_eq!(creates, 4);
    }
}
