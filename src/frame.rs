//! Platform-independent half of the frame driver: session state, uniform
//! sets and the fixed two-pass plan. The browser loop in `wasm::render`
//! executes the plan against WebGL.

use glam::Vec2;

use crate::config::Settings;
use crate::interaction::{Intensity, Pointer};
use crate::viewport::{DeviceSize, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingUniforms {
    pub time: f32,
    pub resolution: Vec2,
    pub aspect_ratio: f32,
}

/// Haze pass inputs. The source texture is bound by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazeUniforms {
    pub time: f32,
    pub resolution: Vec2,
    pub aspect_ratio: f32,
    pub mouse_position: Vec2,
    pub intensity: f32,
}

/// One full-screen mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Ring,
    Haze,
}

/// Which layers a pass draws, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawList {
    RingOnly,
    RingAndHaze,
}

impl DrawList {
    pub fn layers(self) -> &'static [Layer] {
        match self {
            DrawList::RingOnly => &[Layer::Ring],
            DrawList::RingAndHaze => &[Layer::Ring, Layer::Haze],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Offscreen,
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    pub draw: DrawList,
    pub target: Target,
}

/// Ring into the offscreen buffer, then everything onto the surface with the
/// offscreen colour bound as the haze source.
pub const FRAME_PASSES: [Pass; 2] = [
    Pass {
        draw: DrawList::RingOnly,
        target: Target::Offscreen,
    },
    Pass {
        draw: DrawList::RingAndHaze,
        target: Target::Surface,
    },
];

/// All mutable state of a running effect. Event handlers and the frame loop
/// share one of these; nothing here touches the GPU.
#[derive(Debug, Clone)]
pub struct Session {
    viewport: Viewport,
    pointer: Pointer,
    intensity: Intensity,
    time_step: f32,
    max_pixel_ratio: f32,
    ring: RingUniforms,
    haze: HazeUniforms,
}

impl Session {
    pub fn new(settings: &Settings, css_width: f32, css_height: f32, device_ratio: f32) -> Self {
        let viewport = Viewport::new(css_width, css_height, device_ratio, settings.max_pixel_ratio);
        let pointer = Pointer::default();
        let resolution = viewport.device_size().as_vec2();
        let aspect_ratio = viewport.aspect_ratio();
        Self {
            viewport,
            pointer,
            intensity: Intensity::new(settings.smoothing),
            time_step: settings.time_step,
            max_pixel_ratio: settings.max_pixel_ratio,
            ring: RingUniforms {
                time: 0.0,
                resolution,
                aspect_ratio,
            },
            haze: HazeUniforms {
                time: 0.0,
                resolution,
                aspect_ratio,
                mouse_position: pointer.position,
                intensity: 0.0,
            },
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn intensity(&self) -> &Intensity {
        &self.intensity
    }

    pub fn ring(&self) -> &RingUniforms {
        &self.ring
    }

    pub fn haze(&self) -> &HazeUniforms {
        &self.haze
    }

    /// Adopts a new window size; both passes see the new resolution and
    /// aspect immediately.
    pub fn resize(&mut self, css_width: f32, css_height: f32, device_ratio: f32) {
        self.viewport = Viewport::new(css_width, css_height, device_ratio, self.max_pixel_ratio);
        let resolution = self.viewport.device_size().as_vec2();
        let aspect_ratio = self.viewport.aspect_ratio();
        self.ring.resolution = resolution;
        self.ring.aspect_ratio = aspect_ratio;
        self.haze.resolution = resolution;
        self.haze.aspect_ratio = aspect_ratio;
        log::debug!(
            "viewport {}x{} css @{} -> {:?}",
            css_width,
            css_height,
            self.viewport.pixel_ratio(),
            self.viewport.device_size()
        );
    }

    /// Shared mouse/touch handler, client coordinates in CSS pixels.
    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        self.pointer = Pointer::from_client(client_x, client_y, self.viewport.css_size());
        self.haze.mouse_position = self.pointer.position;
        self.intensity.aim(&self.pointer);
    }

    /// Smooths the intensity and loads it into the haze uniforms. Returns the
    /// passes to execute.
    pub fn begin_frame(&mut self) -> &'static [Pass] {
        self.haze.intensity = self.intensity.step();
        &FRAME_PASSES
    }

    /// Advances shader time on both passes once the frame is presented.
    pub fn end_frame(&mut self) {
        self.ring.time += self.time_step;
        self.haze.time += self.time_step;
    }
}

/// Tracks the size the GPU surfaces were last allocated at.
#[derive(Debug, Default)]
pub struct SurfaceSync {
    provisioned: Option<DeviceSize>,
}

impl SurfaceSync {
    /// Returns the size to re-provision at when it differs from what is
    /// currently allocated, recording it as provisioned.
    pub fn reconcile(&mut self, wanted: DeviceSize) -> Option<DeviceSize> {
        if self.provisioned == Some(wanted) {
            return None;
        }
        self.provisioned = Some(wanted);
        Some(wanted)
    }

    pub fn provisioned(&self) -> Option<DeviceSize> {
        self.provisioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&Settings::default(), 800.0, 600.0, 1.0)
    }

    #[test]
    fn first_pass_excludes_haze() {
        assert_eq!(FRAME_PASSES[0].draw.layers(), &[Layer::Ring]);
        assert_eq!(FRAME_PASSES[0].target, Target::Offscreen);
        assert_eq!(FRAME_PASSES[1].draw.layers(), &[Layer::Ring, Layer::Haze]);
        assert_eq!(FRAME_PASSES[1].target, Target::Surface);
    }

    #[test]
    fn pointer_moves_do_not_smooth() {
        let mut session = session();
        session.pointer_moved(400.0, 300.0);
        session.pointer_moved(410.0, 290.0);
        assert_eq!(session.intensity().target, 1.0);
        assert_eq!(session.haze().intensity, 0.0);
        session.begin_frame();
        assert!((session.haze().intensity - 0.15).abs() < 1e-6);
    }

    #[test]
    fn time_advances_once_per_frame() {
        let mut session = session();
        for _ in 0..3 {
            session.begin_frame();
            session.end_frame();
        }
        assert!((session.ring().time - 0.03).abs() < 1e-6);
        assert_eq!(session.ring().time, session.haze().time);
    }

    #[test]
    fn surface_sync_only_fires_on_change() {
        let mut sync = SurfaceSync::default();
        let size = DeviceSize {
            width: 4,
            height: 3,
        };
        assert_eq!(sync.reconcile(size), Some(size));
        assert_eq!(sync.reconcile(size), None);
        let bigger = DeviceSize {
            width: 8,
            height: 6,
        };
        assert_eq!(sync.reconcile(bigger), Some(bigger));
        assert_eq!(sync.provisioned(), Some(bigger));
    }
}
