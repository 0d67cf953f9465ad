pub mod canvas;
pub mod controls;

pub use canvas::PlaybackCanvas;
pub use controls::{SessionAction, SessionView, SessionWindow};
