use std::collections::HashMap;
use std::time::Instant;

use crate::presence::domain::presence_timer::PresenceState;

/// Observer for monitor loop events.
///
/// Keeps the loop free of any particular reporting mechanism; the CLI logs
/// a run summary, tests and the desktop app ignore it.
pub trait MonitorLogger: Send {
    /// One completed cycle and how it was classified.
    fn cycle(&mut self, state: PresenceState);

    /// How long a named stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// The detector failed and the cycle was treated as absent.
    fn detector_failure(&mut self);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullMonitorLogger;

impl MonitorLogger for NullMonitorLogger {
    fn cycle(&mut self, _state: PresenceState) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn detector_failure(&mut self) {}
}

/// Collects per-stage timings and presence counts for a closing summary.
pub struct StatsMonitorLogger {
    timings: HashMap<String, Vec<f64>>,
    present_cycles: usize,
    absent_cycles: usize,
    detector_failures: usize,
    start_time: Instant,
}

impl StatsMonitorLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            present_cycles: 0,
            absent_cycles: 0,
            detector_failures: 0,
            start_time: Instant::now(),
        }
    }

    pub fn cycles(&self) -> usize {
        self.present_cycles + self.absent_cycles
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// Returns the formatted summary, or `None` before the first cycle.
    pub fn summary_string(&self) -> Option<String> {
        let cycles = self.cycles();
        if cycles == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Monitor summary ({cycles} cycles, {elapsed_s:.1}s):"
        )];
        lines.push(format!(
            "  present {}  absent {}  detector failures {}",
            self.present_cycles, self.absent_cycles, self.detector_failures
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let avg_ms = durations.iter().sum::<f64>() / durations.len().max(1) as f64;
            lines.push(format!("  {stage:10}: avg {avg_ms:6.1}ms"));
        }

        if elapsed_s > 0.0 {
            lines.push(format!("  Throughput: {:.1} fps", cycles as f64 / elapsed_s));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StatsMonitorLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorLogger for StatsMonitorLogger {
    fn cycle(&mut self, state: PresenceState) {
        match state {
            PresenceState::Present => self.present_cycles += 1,
            PresenceState::Absent | PresenceState::Locked => self.absent_cycles += 1,
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn detector_failure(&mut self) {
        self.detector_failures += 1;
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
