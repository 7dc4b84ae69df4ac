pub mod format;
pub mod pool;
pub mod translate;
pub mod writer;

pub use pool::ConnectionPool;
pub use writer::{WriteError, Writer};

use std::collections::HashMap;

// ─── Tuning constants ────────────────────────────────────────────

/// Hard cap on concurrently open proxy connections (idle + checked out).
pub const MAX_CONNECTIONS: usize = 10;

/// A single sample translated into Wavefront terms, ready to format.
/// One is built per incoming sample and discarded after formatting.
#[derive(Debug, Clone)]
pub struct MetricPoint {
    /// Prefixed metric name, e.g. "prom_cpu_usage".
    pub name: String,
    pub value: f64,
    /// Epoch milliseconds, verbatim from the remote-write sample.
    pub timestamp_ms: i64,
    /// Escaped value of the `instance` label ("" when absent).
    pub source: String,
    /// Remaining labels; never contains `instance` or empty values.
    pub tags: HashMap<String, String>,
}
