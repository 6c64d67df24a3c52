pub mod display;
pub mod fps;
pub mod overlay;

pub use display::{open_window, DisplayWindow};
pub use fps::FpsCounter;
pub use overlay::show_fps;
