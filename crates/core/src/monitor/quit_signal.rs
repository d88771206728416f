use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

/// The monitor loop's only suspension point.
///
/// `wait` blocks for at most `timeout` and returns `true` if the user asked
/// to quit. It doubles as the loop throttle, so it should normally spend
/// the whole timeout when no request arrives.
pub trait QuitSignal: Send {
    fn wait(&mut self, timeout: Duration) -> bool;
}

/// Quits when a message arrives, or when every sender has gone away.
pub struct ChannelQuitSignal {
    rx: Receiver<()>,
}

impl ChannelQuitSignal {
    pub fn new(rx: Receiver<()>) -> Self {
        Self { rx }
    }
}

impl QuitSignal for ChannelQuitSignal {
    fn wait(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

/// Sleeps out the interval and never asks to quit.
pub struct NeverQuit;

impl QuitSignal for NeverQuit {
    fn wait(&mut self, timeout: Duration) -> bool {
        std::thread::sleep(timeout);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_times_out_without_request() {
        let (_tx, rx) = crossbeam_channel::unbounded();
        let mut signal = ChannelQuitSignal::new(rx);
        let start = Instant::now();
        assert!(!signal.wait(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_request_quits_immediately() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut signal = ChannelQuitSignal::new(rx);
        tx.send(()).unwrap();
        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_dropped_sender_quits() {
        let (tx, rx) = crossbeam_channel::unbounded::<()>();
        drop(tx);
        assert!(ChannelQuitSignal::new(rx).wait(Duration::from_secs(5)));
    }

    #[test]
    fn test_never_quit_returns_false() {
        assert!(!NeverQuit.wait(Duration::from_millis(1)));
    }
}
