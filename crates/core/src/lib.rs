pub mod detection;
pub mod display;
pub mod lock;
pub mod monitor;
pub mod presence;
pub mod shared;
pub mod video;
