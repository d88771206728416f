pub mod presence_timer;
