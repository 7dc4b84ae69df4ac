use std::fmt::Write as _;

use super::MetricPoint;

// ─── Character rules ─────────────────────────────────────────────

/// Replace every character outside `[A-Za-z0-9_.-]` with `-`.
/// Applied to metric names and tag keys.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Escape a quoted string value: `"` becomes `\"`, `*` becomes `-`.
/// Applied to the source and every tag value.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '*' => out.push('-'),
            c => out.push(c),
        }
    }
    out
}

// ─── Line assembly ───────────────────────────────────────────────

/// Render one point as a newline-terminated Wavefront line:
///
/// ```text
/// <name> <value> <timestamp> source="<source>" <key>="<value>"...
/// ```
///
/// Values are fixed-point with six decimal places, timestamps are
/// epoch milliseconds. Tag order follows map iteration order and is
/// not significant to the proxy.
pub fn format_point(point: &MetricPoint) -> String {
    let mut line = String::with_capacity(64 + point.tags.len() * 16);

    line.push_str(&sanitize(&point.name));
    let _ = write!(
        line,
        " {:.6} {} source=\"{}\"",
        point.value,
        point.timestamp_ms,
        escape(&point.source)
    );

    for (key, value) in &point.tags {
        let _ = write!(line, " {}=\"{}\"", sanitize(key), escape(value));
    }

    line.push('\n');
    line
}

// ─── Tests ───────────────────────────────────────────────────────
