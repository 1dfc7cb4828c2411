pub mod canvas_renderer;
pub mod overlay;
pub mod resize;

pub use canvas_renderer::CanvasRenderer;
pub use overlay::DomBadgeSurface;
pub use resize::ResizeWatch;
