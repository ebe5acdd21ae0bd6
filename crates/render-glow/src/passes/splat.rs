use super::{PassError, attribute, static_vertex_buffer, uniform};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use splatview_render::{
    BlendFactor, BufferTarget, CameraMatrices, Capability, DepthFunc, GraphicsContext, Topology,
    UniformValue, build_program,
};
use std::mem::{offset_of, size_of};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct SplatVertex {
    position: [f32; 3],
    color: [f32; 4],
    size: f32,
}

const GOLDEN_ANGLE: f32 = 2.399_963;

/// Deterministic cloud on a rippled spherical shell around the origin.
fn splat_cloud(count: usize, radius: f32) -> Vec<SplatVertex> {
    (0..count)
        .map(|i| {
            let t = (i as f32 + 0.5) / count as f32;
            let y = 1.0 - 2.0 * t;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * i as f32;
            let r = radius * (1.0 + 0.12 * (i as f32 * 0.37).sin());
            SplatVertex {
                position: [r * ring * theta.cos(), r * y, r * ring * theta.sin()],
                color: [0.35 + 0.5 * t, 0.55, 1.0 - 0.6 * t, 0.8],
                size: 0.2 + 0.1 * (i as f32 * 1.7).sin().abs(),
            }
        })
        .collect()
}

/// Stand-in for the external splat renderer: soft, alpha-blended points.
///
/// Drawn last, without depth writes, so it may overdraw the cube.
pub struct SplatPass<C: GraphicsContext> {
    program: C::Program,
    vertex_buffer: C::Buffer,
    count: i32,
    position: u32,
    color: u32,
    size: u32,
    view: C::UniformLocation,
    projection: C::UniformLocation,
    point_scale: C::UniformLocation,
}

struct Locations<L> {
    position: u32,
    color: u32,
    size: u32,
    view: L,
    projection: L,
    point_scale: L,
}

fn locate<C: GraphicsContext>(
    ctx: &C,
    program: C::Program,
) -> Result<Locations<C::UniformLocation>, PassError> {
    Ok(Locations {
        position: attribute(ctx, program, "aPosition")?,
        color: attribute(ctx, program, "aColor")?,
        size: attribute(ctx, program, "aSize")?,
        view: uniform(ctx, program, "uView")?,
        projection: uniform(ctx, program, "uProjection")?,
        point_scale: uniform(ctx, program, "uPointScale")?,
    })
}

impl<C: GraphicsContext> SplatPass<C> {
    /// Pixels covered by a size-1 splat one unit from the eye.
    pub const POINT_SCALE: f32 = 120.0;

    pub fn new(ctx: &C, count: usize, radius: f32) -> Result<Self, PassError> {
        let program = build_program(ctx, shaders::SPLAT_VERTEX, shaders::SPLAT_FRAGMENT)?;
        let locations = match locate(ctx, program) {
            Ok(found) => found,
            Err(e) => {
                ctx.delete_program(program);
                return Err(e);
            }
        };

        let cloud = splat_cloud(count, radius);
        let vertex_buffer = match static_vertex_buffer(ctx, bytemuck::cast_slice(&cloud)) {
            Ok(buffer) => buffer,
            Err(e) => {
                ctx.delete_program(program);
                return Err(e);
            }
        };
        tracing::debug!(count, radius, "splat pass ready");

        Ok(Self {
            program,
            vertex_buffer,
            count: cloud.len() as i32,
            position: locations.position,
            color: locations.color,
            size: locations.size,
            view: locations.view,
            projection: locations.projection,
            point_scale: locations.point_scale,
        })
    }

    pub fn render<K: CameraMatrices + ?Sized>(&self, ctx: &C, camera: &K) {
        let stride = size_of::<SplatVertex>() as i32;

        ctx.use_program(Some(self.program));
        ctx.enable(Capability::DepthTest);
        ctx.depth_func(DepthFunc::Less);
        ctx.depth_mask(false);
        ctx.enable(Capability::Blend);
        ctx.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        ctx.enable(Capability::ProgramPointSize);

        ctx.bind_buffer(BufferTarget::Array, Some(self.vertex_buffer));
        let layout = [
            (self.position, 3, offset_of!(SplatVertex, position)),
            (self.color, 4, offset_of!(SplatVertex, color)),
            (self.size, 1, offset_of!(SplatVertex, size)),
        ];
        for (index, components, offset) in layout {
            ctx.vertex_attrib_pointer_f32(index, components, stride, offset as i32);
            ctx.enable_vertex_attrib_array(index);
        }

        ctx.uniform_matrix4(&self.view, &camera.view_matrix());
        ctx.uniform_matrix4(&self.projection, &camera.projection_matrix());
        ctx.uniform(&self.point_scale, UniformValue::Float(Self::POINT_SCALE));
        ctx.draw_arrays(Topology::Points, 0, self.count);

        ctx.disable(Capability::Blend);
        ctx.depth_mask(true);
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
    fn cloud_is_deterministic_and_on_shell() {
        let a = splat_cloud(500, 3.0);
        assert_eq!(a, splat_cloud(500, 3.0));
        for v in &a {
            let [x, y, z] = v.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!((2.6..=3.4).contains(&r), "radius {r}");
            assert!(v.color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn blends_without_depth_writes_and_restores() {
        let ctx = RecordingContext::new();
        let splats = SplatPass::new(&ctx, 64, 3.0).unwrap();
        ctx.take_calls();

        splats.render(&ctx, &StaticCamera::default());
        let calls = ctx.calls();

        let draw = calls
            .iter()
            .position(|c| matches!(c, GlCall::DrawArrays { .. }))
            .unwrap();
        assert_eq!(
            calls[draw],
            GlCall::DrawArrays {
                topology: Topology::Points,
                first: 0,
                count: 64,
            }
        );
        assert!(calls[..draw].contains(&GlCall::DepthMask(false)));
        assert!(calls[..draw].contains(&GlCall::Enable(Capability::Blend)));
        assert_eq!(
            calls[draw + 1..],
            [GlCall::Disable(Capability::Blend), GlCall::DepthMask(true)]
        );
    }

    #[test]
    fn missing_size_attribute_fails_cleanly() {
        let ctx = RecordingContext::new().without_symbol("aSize");
        let Err(err) = SplatPass::new(&ctx, 8, 1.0) else {
            panic!("splat pass built without its size attribute");
        };
        assert_eq!(err, PassError::MissingAttribute("aSize"));
        assert_eq!((ctx.live_programs(), ctx.live_buffers()), (0, 0));
    }
}
