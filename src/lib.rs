#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Two-pass glowing ring with a pointer-driven haze, rendered with WebGL2.
//!
//! Everything outside `wasm` is plain Rust so the math and the frame plan
//! can be tested on the host.

pub mod config;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod sdf;
pub mod shade;
pub mod shaders;
pub mod viewport;

pub use config::Settings;
pub use error::HaloError;
pub use frame::Session;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::Settings;
    use crate::error::HaloError;

    mod gl;
    mod render;

    impl From<HaloError> for JsValue {
        fn from(err: HaloError) -> Self {
            JsValue::from_str(&err.to_string())
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let window = web_sys::window().ok_or(HaloError::MissingHost("window"))?;
        let document = window.document().ok_or(HaloError::MissingHost("document"))?;

        let defaults = Settings::default();
        let canvas = document
            .get_element_by_id(&defaults.canvas_id)
            .ok_or_else(|| HaloError::CanvasNotFound(defaults.canvas_id.clone()))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;
        let dataset = canvas.dataset();
        let settings = defaults.with_overrides(|key| dataset.get(&data_key(key)));

        if let Err(err) = render::start(window, canvas, settings) {
            log::error!("halo failed to start: {err}");
            return Err(err.into());
        }
        Ok(())
    }

    /// `max-pixel-ratio` -> `maxPixelRatio`, the `DOMStringMap` spelling.
    fn data_key(key: &str) -> String {
        let mut out = String::with_capacity(key.len());
        let mut upper = false;
        for ch in key.chars() {
            if ch == '-' {
                upper = true;
            } else if upper {
                out.extend(ch.to_uppercase());
                upper = false;
            } else {
                out.push(ch);
            }
        }
        out
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
