//! Layer aggregate: buffer accessors, the layer entity and sample transforms.

pub mod buffer;
pub mod entities;
pub mod transform;
pub mod value_objects;

pub use buffer::*;
pub use entities::*;
pub use transform::*;
pub use value_objects::*;
