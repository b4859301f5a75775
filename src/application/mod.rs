pub mod controller;
pub mod menu;
pub mod scrollbar;
pub mod settings;
pub mod validation;

pub use controller::*;
pub use menu::*;
pub use scrollbar::*;
pub use settings::*;
pub use validation::*;
