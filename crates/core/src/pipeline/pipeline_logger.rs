use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Use cases report stage timings and counters through it so the CLI can
/// print a run summary while the desktop shell stays silent.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Add to a named counter (e.g. translated segments, no-match results).
    fn count(&mut self, name: &str, amount: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn count(&mut self, _name: &str, _amount: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that accumulates stage timings and counters and
/// reports them through the `log` crate.
pub struct StdoutPipelineLogger {
    timings: BTreeMap<String, f64>,
    counters: BTreeMap<String, usize>,
    start_time: Instant,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
            counters: BTreeMap::new(),
            start_time: Instant::now(),
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.counters.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Pipeline summary ({:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (stage, total_ms) in &self.timings {
            let pct = if elapsed_ms > 0.0 {
                (total_ms / elapsed_ms * 100.0).min(100.0)
            } else {
                0.0
            };
            lines.push(format!("  {stage:12}: {total_ms:8.0}ms  ({pct:4.1}%)"));
        }
        for (name, value) in &self.counters {
            lines.push(format!("  {name}: {value}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).copied()
    }

    pub fn count_for(&self, name: &str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        *self.timings.entry(stage.to_string()).or_default() += duration_ms;
    }

    fn count(&mut self, name: &str, amount: usize) {
        *self.counters.entry(name.to_string()).or_default() += amount;
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.timing("decode", 5.0);
        logger.count("segments", 3);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_accumulates_per_stage() {
        let mut logger = StdoutPipelineLogger::new();
        logger.timing("decode", 20.0);
        logger.timing("decode", 30.0);
        logger.timing("encode", 5.0);

        assert_eq!(logger.timing_for("decode"), Some(50.0));
        assert_eq!(logger.timing_for("encode"), Some(5.0));
        assert_eq!(logger.timing_for("missing"), None);
    }

    #[test]
    fn test_count_accumulates() {
        let mut logger = StdoutPipelineLogger::new();
        logger.count("translated", 1);
        logger.count("translated", 2);
        assert_eq!(logger.count_for("translated"), 3);
        assert_eq!(logger.count_for("no_match"), 0);
    }

    #[test]
    fn test_summary_lists_stages_and_counters() {
        let mut logger = StdoutPipelineLogger::new();
        logger.timing("recognize", 1200.0);
        logger.count("translated", 4);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Pipeline summary"));
        assert!(summary.contains("recognize"));
        assert!(summary.contains("translated: 4"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new().summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::default();
        logger.info("hello world");
        assert_eq!(logger.messages, vec!["hello world".to_string()]);
    }
}
