//! ABOUTME: Process-wide counters/gauges/histograms backing `rlm_get_metrics`
//! ABOUTME: Counters and gauges are atomic; histograms keep a bounded sliding window of <=1000 samples

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;

const HISTOGRAM_WINDOW: usize = 1_000;

struct Histogram {
    samples: Mutex<VecDeque<u64>>,
}

impl Histogram {
    fn new() -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(HISTOGRAM_WINDOW)),
        }
    }

    fn record(&self, value_ms: u64) {
        let mut samples = self.samples.lock();
        samples.push_back(value_ms);
        while samples.len() > HISTOGRAM_WINDOW {
            samples.pop_front();
        }
    }

    fn snapshot(&self) -> HistogramSnapshot {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return HistogramSnapshot::default();
        }
        let mut sorted: Vec<u64> = samples.iter().copied().collect();
        sorted.sort_unstable();
        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| -> u64 {
            let idx = ((p * count as f64).ceil() as usize).saturating_sub(1).min(count - 1);
            sorted[idx]
        };
        HistogramSnapshot {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            avg: sum as f64 / count as f64,
            sum,
            p50: percentile(0.50),
            p90: percentile(0.90),
            p95: percentile(0.95),
            p99: percentile(0.99),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HistogramSnapshot {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub avg: f64,
    pub sum: u64,
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

/// Named histograms tracked in the metrics snapshot shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistogramName {
    ToolDuration,
    SearchDuration,
    DecomposeDuration,
    CodeExecutionDuration,
    LoadContextDuration,
    AppendContextDuration,
}

impl HistogramName {
    const ALL: [Self; 6] = [
        Self::ToolDuration,
        Self::SearchDuration,
        Self::DecomposeDuration,
        Self::CodeExecutionDuration,
        Self::LoadContextDuration,
        Self::AppendContextDuration,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::ToolDuration => "tool_duration_ms",
            Self::SearchDuration => "search_duration_ms",
            Self::DecomposeDuration => "decompose_duration_ms",
            Self::CodeExecutionDuration => "code_execution_duration_ms",
            Self::LoadContextDuration => "load_context_duration_ms",
            Self::AppendContextDuration => "append_context_duration_ms",
        }
    }
}

/// Process-wide metrics registry: the only mutable state in the crate that
/// every tool handler touches on every call, purely via atomic updates.
pub struct Metrics {
    start: Instant,
    counters: DashMap<String, AtomicU64>,
    gauges: DashMap<String, AtomicI64>,
    histograms: DashMap<&'static str, Histogram>,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        let histograms = DashMap::new();
        for name in HistogramName::ALL {
            histograms.insert(name.key(), Histogram::new());
        }
        Self {
            start: Instant::now(),
            counters: DashMap::new(),
            gauges: DashMap::new(),
            histograms,
        }
    }

    pub fn incr(&self, name: &str) {
        self.incr_by(name, 1);
    }

    pub fn incr_by(&self, name: &str, delta: u64) {
        self.counters.entry(name.to_string()).or_insert_with(|| AtomicU64::new(0)).fetch_add(delta, Ordering::Relaxed);
    }

    pub fn set_gauge(&self, name: &str, value: i64) {
        self.gauges.entry(name.to_string()).or_insert_with(|| AtomicI64::new(0)).store(value, Ordering::Relaxed);
    }

    pub fn record(&self, name: HistogramName, value_ms: u64) {
        if let Some(hist) = self.histograms.get(name.key()) {
            hist.record(value_ms);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.counters.iter().map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed))).collect();
        let gauges = self.gauges.iter().map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed))).collect();
        let histograms = self
            .histograms
            .iter()
            .map(|e| (e.key().to_string(), e.value().snapshot()))
            .collect();
        MetricsSnapshot {
            uptime_secs: self.start.elapsed().as_secs(),
            counters,
            gauges,
            histograms,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "uptime")]
    pub uptime_secs: u64,
    pub counters: std::collections::HashMap<String, u64>,
    pub gauges: std::collections::HashMap<String, i64>,
    pub histograms: std::collections::HashMap<String, HistogramSnapshot>,
}

/// RAII timer that records elapsed milliseconds into a histogram on drop,
/// regardless of which branch the tool handler returns through.
pub struct Timer<'a> {
    metrics: &'a Metrics,
    name: HistogramName,
    start: Instant,
}

impl<'a> Timer<'a> {
    #[must_use]
    pub fn start(metrics: &'a Metrics, name: HistogramName) -> Self {
        Self {
            metrics,
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        self.metrics.record(self.name, elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_and_gauges_round_trip() {
        let metrics = Metrics::new();
        metrics.incr("tool_calls_total");
        metrics.incr("tool_calls_total");
        metrics.set_gauge("active_sessions", 3);
        let snap = metrics.snapshot();
        assert_eq!(snap.counters.get("tool_calls_total"), Some(&2));
        assert_eq!(snap.gauges.get("active_sessions"), Some(&3));
    }

    #[test]
    fn histogram_reports_percentiles() {
        let metrics = Metrics::new();
        for v in 1..=100u64 {
            metrics.record(HistogramName::ToolDuration, v);
        }
        let snap = metrics.snapshot();
        let hist = &snap.histograms["tool_duration_ms"];
        assert_eq!(hist.count, 100);
        assert_eq!(hist.min, 1);
        assert_eq!(hist.max, 100);
        assert_eq!(hist.p50, 50);
    }

    #[test]
    fn histogram_window_is_bounded() {
        let metrics = Metrics::new();
        for v in 0..2_000u64 {
            metrics.record(HistogramName::SearchDuration, v);
        }
        let snap = metrics.snapshot();
        assert_eq!(snap.histograms["search_duration_ms"].count, HISTOGRAM_WINDOW);
    }
}
