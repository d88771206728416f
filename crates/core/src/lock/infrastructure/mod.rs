pub mod command_lock;
pub mod lock_registry;
