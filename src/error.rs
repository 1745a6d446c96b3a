use thiserror::Error;

/// Failures surfaced by the renderer. Everything except `Render` variants is
/// an initialization failure: the frame loop never starts.
#[derive(Debug, Error)]
pub enum HaloError {
    #[error("missing browser {0}")]
    MissingHost(&'static str),
    #[error("canvas #{0} not found")]
    CanvasNotFound(String),
    #[error("WebGL2 not supported")]
    WebGl2Unsupported,
    #[error("failed to create {0}")]
    Allocation(&'static str),
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("failed to link program: {0}")]
    ProgramLink(String),
    #[error("offscreen framebuffer incomplete (status 0x{0:04x})")]
    IncompleteFramebuffer(u32),
    #[error("WebGL context lost")]
    ContextLost,
    #[error("WebGL error 0x{0:04x}")]
    Gl(u32),
    #[error("{0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, HaloError>;
