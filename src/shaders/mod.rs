//! GLSL ES 3.00 sources, compiled once when the renderer starts.

pub const QUAD_VERTEX: &str = include_str!("quad.vert");
pub const RING_FRAGMENT: &str = include_str!("ring.frag");
pub const HAZE_FRAGMENT: &str = include_str!("haze.frag");

/// Uniform names shared by the sources and the renderer.
pub mod uniform {
    pub const TIME: &str = "time";
    pub const RESOLUTION: &str = "resolution";
    pub const ASPECT_RATIO: &str = "aspectRatio";
    pub const MOUSE_POSITION: &str = "mousePosition";
    pub const INTENSITY: &str = "intensity";
    pub const SOURCE: &str = "tDiffuse";
}

/// Vertex attribute slot of the quad position.
pub const POSITION_LOCATION: u32 = 0;
