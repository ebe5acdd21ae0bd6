use splatview_common::Matrix4;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
    CullFace,
    Blend,
    /// Let the vertex shader write `gl_PointSize`.
    ProgramPointSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

/// Value written to a caller-added uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

/// The slice of a GL-style rendering context this crate drives.
///
/// Methods take `&self` because the context is shared with other renderers
/// drawing into the same framebuffer; callers get exclusive use of pipeline
/// state only for the duration of their own call sequence.
///
/// Handles are opaque `Copy` values owned by the context. Creation methods
/// report driver failures as `Err(String)`; compile and link results are
/// queried separately, mirroring the GL object model.
pub trait GraphicsContext {
    type Shader: Copy + fmt::Debug + PartialEq;
    type Program: Copy + fmt::Debug + PartialEq;
    type Buffer: Copy + fmt::Debug + PartialEq;
    type UniformLocation: Clone + fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    fn enable_vertex_attrib_array(&self, index: u32);
    /// Point attribute `index` at tightly packed (`stride == 0`) or strided
    /// f32 components in the currently bound array buffer.
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);

    /// Upload a matrix given in row-major order. Backends convert to
    /// whatever layout their API expects.
    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &Matrix4);
    fn uniform(&self, location: &Self::UniformLocation, value: UniformValue);

    fn enable(&self, capability: Capability);
    fn disable(&self, capability: Capability);
    fn blend_func(&self, src: BlendFactor, dst: BlendFactor);
    fn depth_mask(&self, write: bool);
    fn depth_func(&self, func: DepthFunc);
    fn cull_face(&self, face: Face);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Clear color and depth.
    fn clear(&self, color: [f32; 4]);

    fn draw_elements(&self, topology: Topology, count: i32, index_type: IndexType, offset: i32);
    fn draw_arrays(&self, topology: Topology, first: i32, count: i32);
}
