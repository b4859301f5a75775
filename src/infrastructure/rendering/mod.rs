pub mod canvas_surface;
pub mod frame_renderer;
pub mod scheduler;
pub mod surface;
pub mod trace_renderer;

pub use canvas_surface::CanvasSurface;
pub use frame_renderer::*;
pub use scheduler::FrameScheduler;
pub use surface::*;
pub use trace_renderer::*;
