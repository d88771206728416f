pub mod monitor_worker;
