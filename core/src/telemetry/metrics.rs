use std::sync::Mutex;

#[derive(Debug)]
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug)]
struct Metrics {
    loads: usize,
    errors: usize,
    coverage_gaps: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                loads: 0,
                errors: 0,
                coverage_gaps: 0,
            }),
        }
    }

    pub fn record_load(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.loads += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn record_coverage_gaps(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.coverage_gaps += count;
        }
    }

    /// Returns `(loads, errors, coverage_gaps)`.
    pub fn snapshot(&self) -> (usize, usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.loads, metrics.errors, metrics.coverage_gaps)
        } else {
            (0, 0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
