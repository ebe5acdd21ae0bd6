use crate::context::{GraphicsContext, ShaderStage};

/// Driver-side failures while turning source into a linked program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("failed to create {stage} shader object: {reason}")]
    CreateShader { stage: ShaderStage, reason: String },
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to create program object: {0}")]
    CreateProgram(String),
    #[error("program failed to link: {0}")]
    Link(String),
}

/// Compile one stage. On failure the info log is logged and returned, and
/// the shader object is deleted.
pub fn compile_shader<C: GraphicsContext>(
    ctx: &C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader, ProgramError> {
    let shader = ctx
        .create_shader(stage)
        .map_err(|reason| ProgramError::CreateShader { stage, reason })?;
    ctx.shader_source(shader, source);
    ctx.compile_shader(shader);

    if !ctx.shader_compile_status(shader) {
        let log = ctx.shader_info_log(shader);
        tracing::error!(%stage, "shader compilation failed: {log}");
        ctx.delete_shader(shader);
        return Err(ProgramError::Compile { stage, log });
    }

    tracing::debug!(%stage, ?shader, "shader compiled");
    Ok(shader)
}

/// Link two compiled stages. The shaders are left to the caller; a program
/// that fails to link is deleted.
pub fn link_program<C: GraphicsContext>(
    ctx: &C,
    vertex: C::Shader,
    fragment: C::Shader,
) -> Result<C::Program, ProgramError> {
    let program = ctx.create_program().map_err(ProgramError::CreateProgram)?;
    ctx.attach_shader(program, vertex);
    ctx.attach_shader(program, fragment);
    ctx.link_program(program);

    if !ctx.program_link_status(program) {
        let log = ctx.program_info_log(program);
        tracing::error!("program link failed: {log}");
        ctx.delete_program(program);
        return Err(ProgramError::Link(log));
    }

    tracing::debug!(?program, "program linked");
    Ok(program)
}

/// Compile both stages and link them. Shader objects are released on every
/// path once the link result is known.
pub fn build_program<C: GraphicsContext>(
    ctx: &C,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<C::Program, ProgramError> {
    let vertex = compile_shader(ctx, ShaderStage::Vertex, vertex_source)?;
    let fragment = match compile_shader(ctx, ShaderStage::Fragment, fragment_source) {
        Ok(fragment) => fragment,
        Err(e) => {
            ctx.delete_shader(vertex);
            return Err(e);
        }
    };

    let linked = link_program(ctx, vertex, fragment);
    ctx.delete_shader(vertex);
    ctx.delete_shader(fragment);
    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GlCall, RecordingContext};

    #[test]
    fn successful_build_releases_shaders() {
        let ctx = RecordingContext::new();
        let program = build_program(&ctx, "void main() {}", "void main() {}").unwrap();
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.live_programs(), 1);
        assert!(ctx.calls().contains(&GlCall::LinkProgram(program)));
    }

    #[test]
    fn compile_failure_reports_log_and_deletes_shader() {
        let ctx = RecordingContext::new()
            .with_compiler(|stage, _| match stage {
                ShaderStage::Vertex => Ok(()),
                ShaderStage::Fragment => Err("0:3: syntax error".into()),
            });
        let err = build_program(&ctx, "void main() {}", "void main( {}").unwrap_err();
        assert_eq!(
            err,
            ProgramError::Compile {
                stage: ShaderStage::Fragment,
                log: "0:3: syntax error".into(),
            }
        );
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.live_programs(), 0);
        assert!(!ctx.calls().iter().any(|c| matches!(c, GlCall::CreateProgram(_))));
    }

    #[test]
    fn link_failure_deletes_program_and_shaders() {
        let ctx = RecordingContext::new().with_linker(|_, _| Err("varying mismatch".into()));
        let err = build_program(&ctx, "void main() {}", "void main() {}").unwrap_err();
        assert_eq!(err, ProgramError::Link("varying mismatch".into()));
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.live_programs(), 0);
    }

    #[test]
    fn vertex_failure_stops_before_fragment() {
        let ctx = RecordingContext::new().with_compiler(|_, _| Err("no".into()));
        let err = build_program(&ctx, "x", "y").unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Compile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        let created = ctx
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::CreateShader { .. }))
            .count();
        assert_eq!(created, 1);
    }
}
