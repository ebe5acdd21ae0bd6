use glow::HasContext;
use splatview_common::Matrix4;
use splatview_render::{
    BlendFactor, BufferTarget, BufferUsage, Capability, DepthFunc, Face, GraphicsContext,
    IndexType, ShaderStage, Topology, UniformValue,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to create vertex array object: {0}")]
    VertexArray(String),
}

/// [`GraphicsContext`] over a `glow` OpenGL context.
///
/// Core profiles refuse attribute setup without a bound vertex array, so one
/// VAO is created up front and stays bound; every renderer sharing this
/// context records its attribute pointers into it.
pub struct GlowContext {
    gl: Arc<glow::Context>,
    vertex_array: glow::VertexArray,
}

impl GlowContext {
    /// # Safety
    ///
    /// The GL context behind `gl` must be current on this thread whenever a
    /// method of the returned value is called.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Result<Self, BackendError> {
        let vertex_array = unsafe { gl.create_vertex_array() }.map_err(BackendError::VertexArray)?;
        unsafe { gl.bind_vertex_array(Some(vertex_array)) };

        let version = gl.version();
        tracing::info!(
            "GL context ready: {}.{} {}",
            version.major,
            version.minor,
            version.vendor_info
        );
        Ok(Self { gl, vertex_array })
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Release the shared vertex array.
    pub fn destroy(self) {
        unsafe { self.gl.delete_vertex_array(self.vertex_array) };
    }
}

fn shader_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn capability(capability: Capability) -> u32 {
    match capability {
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::CullFace => glow::CULL_FACE,
        Capability::Blend => glow::BLEND,
        Capability::ProgramPointSize => glow::PROGRAM_POINT_SIZE,
    }
}

fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
    }
}

fn topology(topology: Topology) -> u32 {
    match topology {
        Topology::Triangles => glow::TRIANGLES,
        Topology::Lines => glow::LINES,
        Topology::Points => glow::POINTS,
    }
}

// SAFETY for every `unsafe` block below: `GlowContext::new` requires the
// context to be current, and handles only ever come from this context.
impl GraphicsContext for GlowContext {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(shader_kind(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(buffer_target(target), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let usage = match usage {
            BufferUsage::StaticDraw => glow::STATIC_DRAW,
            BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        };
        unsafe { self.gl.buffer_data_u8_slice(buffer_target(target), data, usage) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        }
    }

    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &Matrix4) {
        // GL reads columns; transposing on our side keeps `transpose = false`,
        // which GLES also accepts.
        let columns = matrix.to_column_major();
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, &columns)
        }
    }

    fn uniform(&self, location: &Self::UniformLocation, value: UniformValue) {
        let location = Some(location);
        unsafe {
            match value {
                UniformValue::Float(x) => self.gl.uniform_1_f32(location, x),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(location, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(location, x, y, z, w),
            }
        }
    }

    fn enable(&self, cap: Capability) {
        unsafe { self.gl.enable(capability(cap)) }
    }

    fn disable(&self, cap: Capability) {
        unsafe { self.gl.disable(capability(cap)) }
    }

    fn blend_func(&self, src: BlendFactor, dst: BlendFactor) {
        unsafe { self.gl.blend_func(blend_factor(src), blend_factor(dst)) }
    }

    fn depth_mask(&self, write: bool) {
        unsafe { self.gl.depth_mask(write) }
    }

    fn depth_func(&self, func: DepthFunc) {
        let func = match func {
            DepthFunc::Less => glow::LESS,
            DepthFunc::LessEqual => glow::LEQUAL,
            DepthFunc::Always => glow::ALWAYS,
        };
        unsafe { self.gl.depth_func(func) }
    }

    fn cull_face(&self, face: Face) {
        let face = match face {
            Face::Front => glow::FRONT,
            Face::Back => glow::BACK,
        };
        unsafe { self.gl.cull_face(face) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            // Depth writes must be on for the depth clear to take effect.
            self.gl.depth_mask(true);
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn draw_elements(&self, mode: Topology, count: i32, index_type: IndexType, offset: i32) {
        let index_type = match index_type {
            IndexType::U16 => glow::UNSIGNED_SHORT,
            IndexType::U32 => glow::UNSIGNED_INT,
        };
        unsafe {
            self.gl
                .draw_elements(topology(mode), count, index_type, offset)
        }
    }

    fn draw_arrays(&self, mode: Topology, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(topology(mode), first, count) }
    }
}
