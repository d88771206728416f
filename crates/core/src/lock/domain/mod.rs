pub mod lock_mechanism;
