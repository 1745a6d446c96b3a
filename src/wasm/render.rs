use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, HtmlCanvasElement, MouseEvent, PageTransitionEvent, TouchEvent,
    WebGl2RenderingContext as GL, WebGlContextAttributes, WebGlUniformLocation, Window,
};

use super::gl::{OffscreenTarget, Program, Quad, TargetFormat};
use crate::config::Settings;
use crate::error::{HaloError, Result};
use crate::frame::{Layer, Pass, Session, SurfaceSync, Target};
use crate::shaders::{self, uniform};

/// Cached uniform locations of one pass program.
#[derive(Default)]
struct Locations {
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    aspect_ratio: Option<WebGlUniformLocation>,
    mouse_position: Option<WebGlUniformLocation>,
    intensity: Option<WebGlUniformLocation>,
    source: Option<WebGlUniformLocation>,
}

impl Locations {
    fn of(program: &Program) -> Self {
        Self {
            time: program.uniform(uniform::TIME),
            resolution: program.uniform(uniform::RESOLUTION),
            aspect_ratio: program.uniform(uniform::ASPECT_RATIO),
            mouse_position: program.uniform(uniform::MOUSE_POSITION),
            intensity: program.uniform(uniform::INTENSITY),
            source: program.uniform(uniform::SOURCE),
        }
    }
}

struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    quad: Quad,
    ring: Program,
    ring_uniforms: Locations,
    haze: Program,
    haze_uniforms: Locations,
    offscreen: OffscreenTarget,
    sync: SurfaceSync,
}

impl Renderer {
    fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let attrs = WebGlContextAttributes::new();
        attrs.set_antialias(true);
        attrs.set_alpha(true);
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &attrs)
            .map_err(|e| HaloError::Js(format!("{e:?}")))?
            .ok_or(HaloError::WebGl2Unsupported)?
            .dyn_into()
            .map_err(|_| HaloError::WebGl2Unsupported)?;

        let ring = Program::link(&gl, shaders::QUAD_VERTEX, shaders::RING_FRAGMENT)?;
        let haze = Program::link(&gl, shaders::QUAD_VERTEX, shaders::HAZE_FRAGMENT)?;
        let quad = Quad::new(&gl)?;
        let offscreen = OffscreenTarget::new(&gl, TargetFormat::detect(&gl))?;

        // Additive, order independent, no depth writes.
        gl.enable(GL::BLEND);
        gl.blend_equation(GL::FUNC_ADD);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.disable(GL::DEPTH_TEST);
        gl.depth_mask(false);
        gl.disable(GL::CULL_FACE);

        Ok(Self {
            ring_uniforms: Locations::of(&ring),
            haze_uniforms: Locations::of(&haze),
            gl,
            canvas,
            quad,
            ring,
            haze,
            offscreen,
            sync: SurfaceSync::default(),
        })
    }

    /// Brings the canvas backing store and the offscreen buffer to the
    /// session's device size.
    fn provision(&mut self, session: &Session) -> Result<()> {
        if let Some(size) = self.sync.reconcile(session.viewport().device_size()) {
            self.canvas.set_width(size.width);
            self.canvas.set_height(size.height);
            self.offscreen.resize(size)?;
            log::info!("surfaces provisioned at {}x{}", size.width, size.height);
        }
        Ok(())
    }

    fn render(&mut self, passes: &[Pass], session: &Session) -> Result<()> {
        self.provision(session)?;
        let size = self
            .offscreen
            .size()
            .ok_or(HaloError::Allocation("offscreen storage"))?;

        for pass in passes {
            match pass.target {
                Target::Offscreen => self.offscreen.bind_as_target(),
                Target::Surface => self.gl.bind_framebuffer(GL::FRAMEBUFFER, None),
            }
            self.gl.viewport(0, 0, size.width as i32, size.height as i32);
            self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
            self.gl.clear(GL::COLOR_BUFFER_BIT);

            for layer in pass.draw.layers() {
                match layer {
                    Layer::Ring => self.draw_ring(session),
                    Layer::Haze => self.draw_haze(session),
                }
            }
        }

        self.check()
    }

    fn draw_ring(&self, session: &Session) {
        let gl = &self.gl;
        let u = session.ring();
        let loc = &self.ring_uniforms;
        self.ring.bind();
        gl.uniform1f(loc.time.as_ref(), u.time);
        gl.uniform2f(loc.resolution.as_ref(), u.resolution.x, u.resolution.y);
        gl.uniform1f(loc.aspect_ratio.as_ref(), u.aspect_ratio);
        self.quad.draw();
    }

    fn draw_haze(&self, session: &Session) {
        let gl = &self.gl;
        let u = session.haze();
        let loc = &self.haze_uniforms;
        self.haze.bind();
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(self.offscreen.texture()));
        gl.uniform1i(loc.source.as_ref(), 0);
        gl.uniform1f(loc.time.as_ref(), u.time);
        gl.uniform2f(loc.resolution.as_ref(), u.resolution.x, u.resolution.y);
        gl.uniform1f(loc.aspect_ratio.as_ref(), u.aspect_ratio);
        gl.uniform2f(
            loc.mouse_position.as_ref(),
            u.mouse_position.x,
            u.mouse_position.y,
        );
        gl.uniform1f(loc.intensity.as_ref(), u.intensity);
        self.quad.draw();
        // Unbound so the next ring pass never sees its own attachment.
        gl.bind_texture(GL::TEXTURE_2D, None);
    }

    fn check(&self) -> Result<()> {
        if self.gl.is_context_lost() {
            return Err(HaloError::ContextLost);
        }
        match self.gl.get_error() {
            GL::NO_ERROR => Ok(()),
            code => Err(HaloError::Gl(code)),
        }
    }
}

/// Everything the event handlers and the frame loop share.
struct App {
    window: Window,
    session: Session,
    renderer: Option<Renderer>,
}

impl App {
    /// One frame. Returns `false` once the loop should stop.
    fn tick(&mut self) -> bool {
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        let passes = self.session.begin_frame();
        match renderer.render(passes, &self.session) {
            Ok(()) => {
                self.session.end_frame();
                true
            }
            Err(err) => {
                log::error!("render failed, stopping: {err}");
                self.renderer = None;
                false
            }
        }
    }

    fn resized(&mut self) {
        let (w, h, ratio) = window_metrics(&self.window);
        self.session.resize(w, h, ratio);
    }

    /// Feeds the first active touch into the pointer path. Events without
    /// touches leave the session alone.
    fn touch_moved(&mut self, event: &TouchEvent) {
        if let Some((x, y)) = touch_point(event) {
            self.session.pointer_moved(x, y);
        }
    }

    /// Releases GPU objects unless the page is entering the back/forward
    /// cache, where it may be shown again with the loop still scheduled.
    fn page_hidden(&mut self, persisted: bool) {
        if persisted {
            log::info!("halo suspended");
            return;
        }
        self.renderer = None;
        log::info!("halo stopped");
    }
}

fn touch_point(event: &TouchEvent) -> Option<(f32, f32)> {
    let touch = event.touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}

fn window_metrics(window: &Window) -> (f32, f32, f32) {
    let px = |v: std::result::Result<JsValue, JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as f32
    };
    (
        px(window.inner_width()),
        px(window.inner_height()),
        window.device_pixel_ratio() as f32,
    )
}

fn js(err: JsValue) -> HaloError {
    HaloError::Js(format!("{err:?}"))
}

/// Compiles everything, wires input and starts the animation loop. Any
/// error here means the loop never runs.
pub fn start(window: Window, canvas: HtmlCanvasElement, settings: Settings) -> Result<()> {
    let renderer = Renderer::new(canvas)?;
    let (w, h, ratio) = window_metrics(&window);
    let session = Session::new(&settings, w, h, ratio);
    log::info!("halo started: {:?}", session.viewport().device_size());

    let app = Rc::new(RefCell::new(App {
        window: window.clone(),
        session,
        renderer: Some(renderer),
    }));
    let document = window.document().ok_or(HaloError::MissingHost("document"))?;

    let on_resize = {
        let app = app.clone();
        Closure::wrap(Box::new(move || app.borrow_mut().resized()) as Box<dyn FnMut()>)
    };
    window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .map_err(js)?;
    on_resize.forget();

    let on_mouse = {
        let app = app.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            app.borrow_mut()
                .session
                .pointer_moved(event.client_x() as f32, event.client_y() as f32);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    document
        .add_event_listener_with_callback("mousemove", on_mouse.as_ref().unchecked_ref())
        .map_err(js)?;
    on_mouse.forget();

    let on_touch = {
        let app = app.clone();
        Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
            app.borrow_mut().touch_moved(&event);
        }) as Box<dyn FnMut(TouchEvent)>)
    };
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    document
        .add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            on_touch.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(js)?;
    on_touch.forget();

    let on_hide = {
        let app = app.clone();
        Closure::wrap(Box::new(move |event: PageTransitionEvent| {
            app.borrow_mut().page_hidden(event.persisted());
        }) as Box<dyn FnMut(PageTransitionEvent)>)
    };
    window
        .add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())
        .map_err(js)?;
    on_hide.forget();

    // Animation loop
    // `f` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. Storing it inside an `Option`
    // allows us to create the `Closure` first and then obtain a reference to
    // it from within itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let mut state = app.borrow_mut();
        if !state.tick() {
            return;
        }

        // schedule next
        let scheduled = f
            .borrow()
            .as_ref()
            .map(|cb| state.window.request_animation_frame(cb.as_ref().unchecked_ref()));
        if let Some(Err(err)) = scheduled {
            log::error!("request_animation_frame failed: {err:?}");
            state.renderer = None;
        }
    }) as Box<dyn FnMut()>));

    if let Some(cb) = g.borrow().as_ref() {
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(js)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Pointer;
    use wasm_bindgen_test::*;
    use web_sys::WebglLoseContext as WebGlLoseContext;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        document
            .create_element("canvas")
            .unwrap()
            .dyn_into::<HtmlCanvasElement>()
            .unwrap()
    }

    fn app(renderer: Option<Renderer>) -> App {
        App {
            window: web_sys::window().unwrap(),
            session: Session::new(&Settings::default(), 320.0, 240.0, 1.0),
            renderer,
        }
    }

    #[wasm_bindgen_test]
    fn touch_without_touches_is_ignored() {
        let mut app = app(None);
        app.session.pointer_moved(0.0, 0.0);
        let before = (*app.session.haze(), *app.session.intensity());

        let event = TouchEvent::new("touchmove").unwrap();
        assert_eq!(event.touches().length(), 0);
        app.touch_moved(&event);

        assert_eq!((*app.session.haze(), *app.session.intensity()), before);
        assert_ne!(app.session.haze().mouse_position, Pointer::default().position);
    }

    #[wasm_bindgen_test]
    fn lost_context_stops_the_loop() {
        let canvas = canvas();
        let renderer = Renderer::new(canvas).unwrap();
        let lose: WebGlLoseContext = renderer
            .gl
            .get_extension("WEBGL_lose_context")
            .unwrap()
            .expect("WEBGL_lose_context unavailable")
            .unchecked_into();
        let mut app = app(Some(renderer));

        lose.lose_context();

        assert!(!app.tick());
        assert!(app.renderer.is_none());
        assert!(!app.tick());
    }

    #[wasm_bindgen_test]
    fn cached_page_keeps_its_renderer() {
        let mut app = app(Some(Renderer::new(canvas()).unwrap()));
        app.page_hidden(true);
        assert!(app.renderer.is_some());
        app.page_hidden(false);
        assert!(app.renderer.is_none());
    }
}
