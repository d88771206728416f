pub mod presence_detector;
