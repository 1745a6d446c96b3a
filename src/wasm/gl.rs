//! Owned WebGL2 objects. Each wrapper deletes its GPU object on drop.

use js_sys::Float32Array;
use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{HaloError, Result};
use crate::shaders::POSITION_LOCATION;
use crate::viewport::DeviceSize;

pub struct Program {
    gl: GL,
    program: WebGlProgram,
}

impl Program {
    pub fn link(gl: &GL, vertex_src: &str, fragment_src: &str) -> Result<Self> {
        let vertex = compile_shader(gl, GL::VERTEX_SHADER, vertex_src)?;
        let fragment = match compile_shader(gl, GL::FRAGMENT_SHADER, fragment_src) {
            Ok(shader) => shader,
            Err(err) => {
                gl.delete_shader(Some(&vertex));
                return Err(err);
            }
        };
        let program = gl
            .create_program()
            .ok_or(HaloError::Allocation("program"))?;
        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);

        let linked = gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        gl.detach_shader(&program, &vertex);
        gl.detach_shader(&program, &fragment);
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));

        if linked {
            Ok(Self {
                gl: gl.clone(),
                program,
            })
        } else {
            let info = gl
                .get_program_info_log(&program)
                .unwrap_or_else(|| "unknown program error".to_string());
            gl.delete_program(Some(&program));
            Err(HaloError::ProgramLink(info))
        }
    }

    /// `None` when the uniform is absent or optimized out.
    pub fn uniform(&self, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(&self.program, name)
    }

    pub fn bind(&self) {
        self.gl.use_program(Some(&self.program));
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.gl.delete_program(Some(&self.program));
    }
}

fn compile_shader(gl: &GL, stage: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(stage)
        .ok_or(HaloError::Allocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown shader error".to_string());
        gl.delete_shader(Some(&shader));
        Err(HaloError::ShaderCompile {
            stage: if stage == GL::VERTEX_SHADER {
                "vertex"
            } else {
                "fragment"
            },
            log,
        })
    }
}

/// The 2x2 plane both layers are drawn on, as two triangles.
pub struct Quad {
    gl: GL,
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
}

const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

impl Quad {
    pub fn new(gl: &GL) -> Result<Self> {
        let vao = gl
            .create_vertex_array()
            .ok_or(HaloError::Allocation("quad VAO"))?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = match gl.create_buffer() {
            Some(buffer) => buffer,
            None => {
                gl.bind_vertex_array(None);
                gl.delete_vertex_array(Some(&vao));
                return Err(HaloError::Allocation("quad buffer"));
            }
        };
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        // SAFETY: the view is consumed by `buffer_data` before any allocation
        // can move wasm memory.
        unsafe {
            let view = Float32Array::view(&QUAD_VERTICES);
            gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &view, GL::STATIC_DRAW);
        }
        gl.vertex_attrib_pointer_with_i32(POSITION_LOCATION, 2, GL::FLOAT, false, 0, 0);
        gl.enable_vertex_attrib_array(POSITION_LOCATION);
        gl.bind_vertex_array(None);

        Ok(Self {
            gl: gl.clone(),
            vao,
            buffer,
        })
    }

    pub fn draw(&self) {
        self.gl.bind_vertex_array(Some(&self.vao));
        self.gl.draw_arrays(GL::TRIANGLES, 0, 6);
        self.gl.bind_vertex_array(None);
    }
}

impl Drop for Quad {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_buffer(Some(&self.buffer));
    }
}

/// Storage of the offscreen colour buffer. Every variant must be blendable,
/// since the ring pass draws into it additively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// `RGBA32F`; needs `EXT_float_blend` on top of renderability. Linear
    /// filtering only when the float-linear extension exists.
    Float { linear: bool },
    /// `RGBA16F`, blendable wherever it is renderable.
    Half,
    /// Fallback without renderable float textures. Alpha saturates at 1.
    Rgba8,
}

impl TargetFormat {
    pub fn choose(color_buffer_float: bool, float_blend: bool, float_linear: bool) -> Self {
        match (color_buffer_float, float_blend) {
            (true, true) => TargetFormat::Float {
                linear: float_linear,
            },
            (true, false) => TargetFormat::Half,
            (false, _) => TargetFormat::Rgba8,
        }
    }

    pub fn detect(gl: &GL) -> Self {
        let has = |name: &str| gl.get_extension(name).ok().flatten().is_some();
        let format = Self::choose(
            has("EXT_color_buffer_float"),
            has("EXT_float_blend"),
            has("OES_texture_float_linear"),
        );
        match format {
            TargetFormat::Half => {
                log::info!("EXT_float_blend unavailable, offscreen buffer uses RGBA16F")
            }
            TargetFormat::Rgba8 => log::warn!(
                "EXT_color_buffer_float unavailable, offscreen buffer falls back to RGBA8"
            ),
            TargetFormat::Float { .. } => {}
        }
        format
    }

    fn internal_format(self) -> u32 {
        match self {
            TargetFormat::Float { .. } => GL::RGBA32F,
            TargetFormat::Half => GL::RGBA16F,
            TargetFormat::Rgba8 => GL::RGBA8,
        }
    }

    fn data_type(self) -> u32 {
        match self {
            TargetFormat::Float { .. } => GL::FLOAT,
            TargetFormat::Half => GL::HALF_FLOAT,
            TargetFormat::Rgba8 => GL::UNSIGNED_BYTE,
        }
    }

    fn filter(self) -> u32 {
        match self {
            TargetFormat::Float { linear: false } => GL::NEAREST,
            _ => GL::LINEAR,
        }
    }
}

/// Offscreen framebuffer with a single colour texture attachment.
pub struct OffscreenTarget {
    gl: GL,
    framebuffer: WebGlFramebuffer,
    texture: WebGlTexture,
    format: TargetFormat,
    size: Option<DeviceSize>,
}

impl OffscreenTarget {
    pub fn new(gl: &GL, format: TargetFormat) -> Result<Self> {
        let texture = gl
            .create_texture()
            .ok_or(HaloError::Allocation("offscreen texture"))?;
        let framebuffer = match gl.create_framebuffer() {
            Some(fb) => fb,
            None => {
                gl.delete_texture(Some(&texture));
                return Err(HaloError::Allocation("offscreen framebuffer"));
            }
        };

        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
        let filter = format.filter() as i32;
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, filter);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, filter);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
        gl.bind_texture(GL::TEXTURE_2D, None);

        Ok(Self {
            gl: gl.clone(),
            framebuffer,
            texture,
            format,
            size: None,
        })
    }

    pub fn size(&self) -> Option<DeviceSize> {
        self.size
    }

    /// Reallocates the colour texture at `size` and re-checks completeness.
    pub fn resize(&mut self, size: DeviceSize) -> Result<()> {
        let gl = &self.gl;
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            self.format.internal_format() as i32,
            size.width as i32,
            size.height as i32,
            0,
            GL::RGBA,
            self.format.data_type(),
            None,
        )
        .map_err(|e| HaloError::Js(format!("{e:?}")))?;
        gl.bind_texture(GL::TEXTURE_2D, None);

        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&self.framebuffer));
        gl.framebuffer_texture_2d(
            GL::FRAMEBUFFER,
            GL::COLOR_ATTACHMENT0,
            GL::TEXTURE_2D,
            Some(&self.texture),
            0,
        );
        let status = gl.check_framebuffer_status(GL::FRAMEBUFFER);
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        if status != GL::FRAMEBUFFER_COMPLETE {
            return Err(HaloError::IncompleteFramebuffer(status));
        }

        self.size = Some(size);
        Ok(())
    }

    pub fn bind_as_target(&self) {
        self.gl
            .bind_framebuffer(GL::FRAMEBUFFER, Some(&self.framebuffer));
    }

    pub fn texture(&self) -> &WebGlTexture {
        &self.texture
    }
}

impl Drop for OffscreenTarget {
    fn drop(&mut self) {
        self.gl.delete_framebuffer(Some(&self.framebuffer));
        self.gl.delete_texture(Some(&self.texture));
    }
}
