use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn histogram() -> Histogram<u64> {
    // 3 significant figures is always within hdrhistogram's supported range.
    Histogram::new(3).expect("valid histogram precision")
}

/// Wall-clock cost of the tick loop, shared between the tick source and the
/// reporting side.
#[derive(Clone)]
pub struct TimingMetrics {
    step_hist: Arc<Mutex<Histogram<u64>>>,
    tick_hist: Arc<Mutex<Histogram<u64>>>,
    jitter_hist: Arc<Mutex<Histogram<u64>>>,
    last_tick_ns: Arc<AtomicU64>,
    missed_deadlines: Arc<AtomicU64>,
}

impl TimingMetrics {
    pub fn new() -> Self {
        Self {
            step_hist: Arc::new(Mutex::new(histogram())),
            tick_hist: Arc::new(Mutex::new(histogram())),
            jitter_hist: Arc::new(Mutex::new(histogram())),
            last_tick_ns: Arc::new(AtomicU64::new(0)),
            missed_deadlines: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Time spent inside `step`, counted against the tick period.
    pub fn record_step(&self, duration: Duration, deadline: Duration) {
        self.step_hist.lock().record(duration.as_nanos() as u64).ok();
        if duration > deadline {
            self.missed_deadlines.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Period actually observed between two tick starts, and its variation
    /// from the previous period.
    pub fn record_tick_interval(&self, interval: Duration) {
        let ns = interval.as_nanos() as u64;
        self.tick_hist.lock().record(ns).ok();

        let last = self.last_tick_ns.swap(ns, Ordering::Relaxed);
        if last > 0 {
            self.jitter_hist.lock().record(ns.abs_diff(last)).ok();
        }
    }

    pub fn report(&self) -> MetricsReport {
        let step = self.step_hist.lock();
        let tick = self.tick_hist.lock();
        let jitter = self.jitter_hist.lock();

        MetricsReport {
            steps: step.len(),
            step_p50: Duration::from_nanos(step.value_at_quantile(0.5)),
            step_p99: Duration::from_nanos(step.value_at_quantile(0.99)),
            step_max: Duration::from_nanos(step.max()),
            tick_p50: Duration::from_nanos(tick.value_at_quantile(0.5)),
            tick_p99: Duration::from_nanos(tick.value_at_quantile(0.99)),
            jitter_p50: Duration::from_nanos(jitter.value_at_quantile(0.5)),
            jitter_p99: Duration::from_nanos(jitter.value_at_quantile(0.99)),
            missed_deadlines: self.missed_deadlines.load(Ordering::Relaxed),
        }
    }
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub steps: u64,
    pub step_p50: Duration,
    pub step_p99: Duration,
    pub step_max: Duration,
    pub tick_p50: Duration,
    pub tick_p99: Duration,
    pub jitter_p50: Duration,
    pub jitter_p99: Duration,
    pub missed_deadlines: u64,
}
