pub mod console_display;
pub mod snapshot_display;
