#![cfg(target_arch = "wasm32")]

use halo_wasm::shaders;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::WebGl2RenderingContext as GL;

wasm_bindgen_test_configure!(run_in_browser);

fn context() -> GL {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_width(64);
    canvas.set_height(64);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
        .get_context("webgl2")
        .unwrap()
        .expect("WebGL2 not supported")
        .dyn_into()
        .unwrap()
}

fn compiles(gl: &GL, stage: u32, src: &str) -> web_sys::WebGlShader {
    let shader = gl.create_shader(stage).unwrap();
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    assert!(ok, "{:?}", gl.get_shader_info_log(&shader));
    shader
}

#[wasm_bindgen_test]
fn pass_programs_link() {
    let gl = context();
    let vertex = compiles(&gl, GL::VERTEX_SHADER, shaders::QUAD_VERTEX);
    for fragment_src in [shaders::RING_FRAGMENT, shaders::HAZE_FRAGMENT] {
        let fragment = compiles(&gl, GL::FRAGMENT_SHADER, fragment_src);
        let program = gl.create_program().unwrap();
        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);
        let ok = gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        assert!(ok, "{:?}", gl.get_program_info_log(&program));
        assert!(gl
            .get_uniform_location(&program, shaders::uniform::RESOLUTION)
            .is_some());
    }
}
