pub mod frame_display;
pub mod overlay;
