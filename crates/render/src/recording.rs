use crate::context::{
    BlendFactor, BufferTarget, BufferUsage, Capability, DepthFunc, Face, GraphicsContext,
    IndexType, ShaderStage, Topology, UniformValue,
};
use splatview_common::Matrix4;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

type CompileHook = Box<dyn Fn(ShaderStage, &str) -> Result<(), String>>;
type LinkHook = Box<dyn Fn(&str, &str) -> Result<(), String>>;

/// Uniform location handed out by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub program: u32,
    pub name: String,
}

/// One recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader { shader: u32, stage: ShaderStage },
    ShaderSource { shader: u32, source: String },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    CreateBuffer(u32),
    BindBuffer { target: BufferTarget, buffer: Option<u32> },
    BufferData { target: BufferTarget, bytes: usize, usage: BufferUsage },
    DeleteBuffer(u32),
    GetAttribLocation { program: u32, name: String },
    GetUniformLocation { program: u32, name: String },
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    UniformMatrix4 { name: String, matrix: Matrix4 },
    Uniform { name: String, value: UniformValue },
    Enable(Capability),
    Disable(Capability),
    BlendFunc { src: BlendFactor, dst: BlendFactor },
    DepthMask(bool),
    DepthFunc(DepthFunc),
    CullFace(Face),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    Clear([f32; 4]),
    DrawElements { topology: Topology, count: i32, index_type: IndexType, offset: i32 },
    DrawArrays { topology: Topology, first: i32, count: i32 },
}

impl fmt::Display for GlCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlCall::CreateShader { shader, stage } => {
                write!(f, "create_shader({stage}) -> {shader}")
            }
            GlCall::ShaderSource { shader, source } => {
                write!(f, "shader_source({shader}, {} bytes)", source.len())
            }
            GlCall::CompileShader(s) => write!(f, "compile_shader({s})"),
            GlCall::DeleteShader(s) => write!(f, "delete_shader({s})"),
            GlCall::CreateProgram(p) => write!(f, "create_program() -> {p}"),
            GlCall::AttachShader { program, shader } => {
                write!(f, "attach_shader({program}, {shader})")
            }
            GlCall::LinkProgram(p) => write!(f, "link_program({p})"),
            GlCall::DeleteProgram(p) => write!(f, "delete_program({p})"),
            GlCall::UseProgram(p) => write!(f, "use_program({p:?})"),
            GlCall::CreateBuffer(b) => write!(f, "create_buffer() -> {b}"),
            GlCall::BindBuffer { target, buffer } => {
                write!(f, "bind_buffer({target:?}, {buffer:?})")
            }
            GlCall::BufferData {
                target,
                bytes,
                usage,
            } => write!(f, "buffer_data({target:?}, {bytes} bytes, {usage:?})"),
            GlCall::DeleteBuffer(b) => write!(f, "delete_buffer({b})"),
            GlCall::GetAttribLocation { program, name } => {
                write!(f, "get_attrib_location({program}, {name})")
            }
            GlCall::GetUniformLocation { program, name } => {
                write!(f, "get_uniform_location({program}, {name})")
            }
            GlCall::EnableVertexAttribArray(i) => write!(f, "enable_vertex_attrib_array({i})"),
            GlCall::VertexAttribPointer {
                index,
                size,
                stride,
                offset,
            } => write!(
                f,
                "vertex_attrib_pointer({index}, {size} x f32, stride {stride}, offset {offset})"
            ),
            GlCall::UniformMatrix4 { name, matrix } => {
                write!(f, "uniform_matrix4({name}, {:?})", matrix.as_rows())
            }
            GlCall::Uniform { name, value } => write!(f, "uniform({name}, {value:?})"),
            GlCall::Enable(c) => write!(f, "enable({c:?})"),
            GlCall::Disable(c) => write!(f, "disable({c:?})"),
            GlCall::BlendFunc { src, dst } => write!(f, "blend_func({src:?}, {dst:?})"),
            GlCall::DepthMask(write) => write!(f, "depth_mask({write})"),
            GlCall::DepthFunc(d) => write!(f, "depth_func({d:?})"),
            GlCall::CullFace(face) => write!(f, "cull_face({face:?})"),
            GlCall::Viewport {
                x,
                y,
                width,
                height,
            } => write!(f, "viewport({x}, {y}, {width}, {height})"),
            GlCall::Clear(c) => write!(f, "clear({c:?})"),
            GlCall::DrawElements {
                topology,
                count,
                index_type,
                offset,
            } => write!(
                f,
                "draw_elements({topology:?}, {count}, {index_type:?}, {offset})"
            ),
            GlCall::DrawArrays {
                topology,
                first,
                count,
            } => write!(f, "draw_arrays({topology:?}, {first}, {count})"),
        }
    }
}

#[derive(Default)]
struct Recorder {
    next_id: u32,
    calls: Vec<GlCall>,
    sources: BTreeMap<u32, (ShaderStage, String)>,
    compile_results: BTreeMap<u32, Result<(), String>>,
    attached: BTreeMap<u32, Vec<u32>>,
    link_results: BTreeMap<u32, Result<(), String>>,
    attrib_slots: BTreeMap<(u32, String), u32>,
    live_shaders: BTreeSet<u32>,
    live_programs: BTreeSet<u32>,
    live_buffers: BTreeSet<u32>,
    buffers_created: usize,
}

impl Recorder {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Headless [`GraphicsContext`] that records every call.
///
/// By default every shader compiles, every program links and every
/// attribute/uniform name resolves. Builder methods script failures.
pub struct RecordingContext {
    inner: RefCell<Recorder>,
    compiler: CompileHook,
    linker: LinkHook,
    missing_symbols: BTreeSet<String>,
    buffer_limit: Option<usize>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingContext")
            .field("calls", &self.inner.borrow().calls.len())
            .field("missing_symbols", &self.missing_symbols)
            .field("buffer_limit", &self.buffer_limit)
            .finish_non_exhaustive()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Recorder::default()),
            compiler: Box::new(|_, _| Ok(())),
            linker: Box::new(|_, _| Ok(())),
            missing_symbols: BTreeSet::new(),
            buffer_limit: None,
        }
    }

    /// Decide each compile from the stage and its source; `Err` is the info log.
    pub fn with_compiler(
        mut self,
        compiler: impl Fn(ShaderStage, &str) -> Result<(), String> + 'static,
    ) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Decide each link from the attached vertex and fragment sources.
    pub fn with_linker(
        mut self,
        linker: impl Fn(&str, &str) -> Result<(), String> + 'static,
    ) -> Self {
        self.linker = Box::new(linker);
        self
    }

    /// Make attribute and uniform lookups for `name` come back empty, as if
    /// the driver had optimized it away.
    pub fn without_symbol(mut self, name: impl Into<String>) -> Self {
        self.missing_symbols.insert(name.into());
        self
    }

    /// Fail buffer creation after `limit` buffers.
    pub fn with_buffer_limit(mut self, limit: usize) -> Self {
        self.buffer_limit = Some(limit);
        self
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.inner.borrow().calls.clone()
    }

    /// Drain the call log, keeping object state.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut self.inner.borrow_mut().calls)
    }

    pub fn draw_calls(&self) -> Vec<GlCall> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements { .. } | GlCall::DrawArrays { .. }))
            .cloned()
            .collect()
    }

    /// Source last handed to the first shader of `stage`, if any.
    pub fn shader_source_for(&self, stage: ShaderStage) -> Option<String> {
        self.inner
            .borrow()
            .sources
            .values()
            .find(|(s, _)| *s == stage)
            .map(|(_, source)| source.clone())
    }

    pub fn live_shaders(&self) -> usize {
        self.inner.borrow().live_shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.inner.borrow().live_programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.inner.borrow().live_buffers.len()
    }

    fn record(&self, call: GlCall) {
        self.inner.borrow_mut().calls.push(call);
    }
}

impl GraphicsContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = UniformSlot;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut rec = self.inner.borrow_mut();
        let shader = rec.next();
        rec.live_shaders.insert(shader);
        rec.sources.insert(shader, (stage, String::new()));
        rec.calls.push(GlCall::CreateShader { shader, stage });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut rec = self.inner.borrow_mut();
        if let Some(entry) = rec.sources.get_mut(&shader) {
            entry.1 = source.to_owned();
        }
        rec.calls.push(GlCall::ShaderSource {
            shader,
            source: source.to_owned(),
        });
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
        let source = self.inner.borrow().sources.get(&shader).cloned();
        let result = match source {
            Some((stage, source)) => (self.compiler)(stage, &source),
            None => Err(format!("invalid shader object {shader}")),
        };
        self.inner.borrow_mut().compile_results.insert(shader, result);
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        matches!(self.inner.borrow().compile_results.get(&shader), Some(Ok(())))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.inner.borrow().compile_results.get(&shader) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        let mut rec = self.inner.borrow_mut();
        rec.live_shaders.remove(&shader);
        rec.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut rec = self.inner.borrow_mut();
        let program = rec.next();
        rec.live_programs.insert(program);
        rec.calls.push(GlCall::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut rec = self.inner.borrow_mut();
        rec.attached.entry(program).or_default().push(shader);
        rec.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram(program));
        let (vertex, fragment) = {
            let rec = self.inner.borrow();
            let mut vertex = String::new();
            let mut fragment = String::new();
            for shader in rec.attached.get(&program).into_iter().flatten() {
                match rec.sources.get(shader) {
                    Some((ShaderStage::Vertex, src)) => vertex.clone_from(src),
                    Some((ShaderStage::Fragment, src)) => fragment.clone_from(src),
                    None => {}
                }
            }
            (vertex, fragment)
        };
        let result = (self.linker)(&vertex, &fragment);
        self.inner.borrow_mut().link_results.insert(program, result);
    }

    fn program_link_status(&self, program: u32) -> bool {
        matches!(self.inner.borrow().link_results.get(&program), Some(Ok(())))
    }

    fn program_info_log(&self, program: u32) -> String {
        match self.inner.borrow().link_results.get(&program) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&self, program: u32) {
        let mut rec = self.inner.borrow_mut();
        rec.live_programs.remove(&program);
        rec.calls.push(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut rec = self.inner.borrow_mut();
        if self.buffer_limit.is_some_and(|limit| rec.buffers_created >= limit) {
            return Err("out of memory".into());
        }
        let buffer = rec.next();
        rec.buffers_created += 1;
        rec.live_buffers.insert(buffer);
        rec.calls.push(GlCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(GlCall::BufferData {
            target,
            bytes: data.len(),
            usage,
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut rec = self.inner.borrow_mut();
        rec.live_buffers.remove(&buffer);
        rec.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let mut rec = self.inner.borrow_mut();
        rec.calls.push(GlCall::GetAttribLocation {
            program,
            name: name.to_owned(),
        });
        if self.missing_symbols.contains(name) {
            return None;
        }
        let key = (program, name.to_owned());
        if let Some(slot) = rec.attrib_slots.get(&key) {
            return Some(*slot);
        }
        let slot = rec.attrib_slots.keys().filter(|(p, _)| *p == program).count() as u32;
        rec.attrib_slots.insert(key, slot);
        Some(slot)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<UniformSlot> {
        self.record(GlCall::GetUniformLocation {
            program,
            name: name.to_owned(),
        });
        if self.missing_symbols.contains(name) {
            return None;
        }
        Some(UniformSlot {
            program,
            name: name.to_owned(),
        })
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn uniform_matrix4(&self, location: &UniformSlot, matrix: &Matrix4) {
        self.record(GlCall::UniformMatrix4 {
            name: location.name.clone(),
            matrix: *matrix,
        });
    }

    fn uniform(&self, location: &UniformSlot, value: UniformValue) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value,
        });
    }

    fn enable(&self, capability: Capability) {
        self.record(GlCall::Enable(capability));
    }

    fn disable(&self, capability: Capability) {
        self.record(GlCall::Disable(capability));
    }

    fn blend_func(&self, src: BlendFactor, dst: BlendFactor) {
        self.record(GlCall::BlendFunc { src, dst });
    }

    fn depth_mask(&self, write: bool) {
        self.record(GlCall::DepthMask(write));
    }

    fn depth_func(&self, func: DepthFunc) {
        self.record(GlCall::DepthFunc(func));
    }

    fn cull_face(&self, face: Face) {
        self.record(GlCall::CullFace(face));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(GlCall::Clear(color));
    }

    fn draw_elements(&self, topology: Topology, count: i32, index_type: IndexType, offset: i32) {
        self.record(GlCall::DrawElements {
            topology,
            count,
            index_type,
            offset,
        });
    }

    fn draw_arrays(&self, topology: Topology, first: i32, count: i32) {
        self.record(GlCall::DrawArrays {
            topology,
            first,
            count,
        });
    }
}
