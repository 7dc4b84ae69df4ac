use std::collections::HashMap;

use super::format::escape;
use super::MetricPoint;
use crate::prompb;

/// Label key carrying the metric name in the remote-write protocol.
const NAME_LABEL: &str = "__name__";

/// Label key whose value becomes the Wavefront point source.
const SOURCE_LABEL: &str = "instance";

/// Turn one decoded time series into Wavefront points, one per sample.
///
/// All points of a series share the same name, source, and tags; only
/// value and timestamp differ. Reserved labels are consumed:
/// `__name__` becomes the metric name (joined as `{prefix}_{name}`),
/// `instance` becomes the source. Labels with empty values carry no
/// information and would corrupt the line format, so they are dropped.
pub fn build_points(prefix: &str, series: &prompb::TimeSeries) -> Vec<MetricPoint> {
    // Unique-key label map; on a duplicate key the last value wins.
    let mut labels: HashMap<String, String> = series
        .labels
        .iter()
        .filter(|l| !l.value.is_empty())
        .map(|l| (l.name.clone(), l.value.clone()))
        .collect();

    let name = format!("{prefix}_{}", labels.remove(NAME_LABEL).unwrap_or_default());
    let source = labels.remove(SOURCE_LABEL).map(|s| escape(&s)).unwrap_or_default();

    series
        .samples
        .iter()
        .map(|sample| MetricPoint {
            name: name.clone(),
            value: sample.value,
            timestamp_ms: sample.timestamp,
            source: source.clone(),
            tags: labels.clone(),
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────
