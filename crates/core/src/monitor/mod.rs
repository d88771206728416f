pub mod clock;
pub mod monitor_config;
pub mod monitor_logger;
pub mod presence_monitor_use_case;
pub mod quit_signal;
