//! Plot geometry: axis orientation, the coordinate-space stack, clipping,
//! tick placement and auto-scaling.

pub mod clip;
pub mod services;
pub mod stack;
pub mod ticks;
pub mod value_objects;

pub use clip::*;
pub use services::*;
pub use stack::*;
pub use value_objects::*;
