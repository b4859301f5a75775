pub mod errors;
pub mod events;
pub mod layer;
pub mod logging;
pub mod plot;
