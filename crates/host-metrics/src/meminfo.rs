//! `/proc/meminfo` parsing.

use std::collections::HashMap;

use crate::error::{MetricsError, Result};
use crate::types::{MemoryStats, percent};

pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Parse the contents of a meminfo file into byte-valued statistics.
///
/// `MemTotal` and `MemAvailable` are required; everything else defaults to 0.
/// `path` is only used in error messages.
pub fn parse_meminfo(content: &str, path: &str) -> Result<MemoryStats> {
    let fields: HashMap<&str, u64> = content.lines().filter_map(parse_line).collect();

    let required = |key: &str| {
        fields.get(key).copied().ok_or_else(|| MetricsError::Parse {
            path: path.to_string(),
            detail: format!("missing {key}"),
        })
    };
    let optional = |key: &str| fields.get(key).copied().unwrap_or(0);

    let total = required("MemTotal")?;
    let available = required("MemAvailable")?;
    let free = optional("MemFree");
    let buffers = optional("Buffers");
    let cached = optional("Cached") + optional("SReclaimable");
    let swap_total = optional("SwapTotal");
    let swap_free = optional("SwapFree");

    let used = total
        .saturating_sub(free)
        .saturating_sub(buffers)
        .saturating_sub(cached);

    Ok(MemoryStats {
        total,
        available,
        used,
        used_percent: percent(used, total),
        free,
        buffers,
        cached,
        swap_total,
        swap_free,
        swap_used: swap_total.saturating_sub(swap_free),
    })
}

/// `"MemTotal:       16318412 kB"` → `("MemTotal", 16710053888)`.
fn parse_line(line: &str) -> Option<(&str, u64)> {
    let (key, rest) = line.split_once(':')?;
    let mut parts = rest.split_whitespace();
    let value: u64 = parts.next()?.parse().ok()?;
    let bytes = match parts.next() {
        Some("kB") => value.saturating_mul(1024),
        _ => value,
    };
    Some((key.trim(), bytes))
}

pub(crate) fn read_meminfo(path: &str) -> Result<MemoryStats> {
    let content = std::fs::read_to_string(path).map_err(|source| MetricsError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_meminfo(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
MemTotal:       16000000 kB
MemFree:         2000000 kB
MemAvailable:    8000000 kB
Buffers:          500000 kB
Cached:          3000000 kB
SwapCached:            0 kB
SwapTotal:       4000000 kB
SwapFree:        3000000 kB
SReclaimable:     500000 kB
HugePages_Total:       0
";

    #[test]
    fn parses_sample() {
        let stats = parse_meminfo(SAMPLE, "test").unwrap();
        assert_eq!(stats.total, 16_000_000 * 1024);
        assert_eq!(stats.available, 8_000_000 * 1024);
        assert_eq!(stats.free, 2_000_000 * 1024);
        assert_eq!(stats.buffers, 500_000 * 1024);
        assert_eq!(stats.cached, 3_500_000 * 1024);
        assert_eq!(stats.used, 10_000_000 * 1024);
        assert_eq!(stats.swap_used, 1_000_000 * 1024);
        assert!((stats.used_percent - 62.5).abs() < 1e-9);
    }

    #[test]
    fn unitless_values_are_not_scaled() {
        assert_eq!(parse_line("HugePages_Total:       7"), Some(("HugePages_Total", 7)));
    }

    #[test]
    fn garbage_lines_are_skipped() {
        assert_eq!(parse_line("not a meminfo line"), None);
        assert_eq!(parse_line("Foo: bar kB"), None);
    }

    #[test]
    fn missing_mem_available_is_an_error() {
        let err = parse_meminfo("MemTotal: 100 kB\nMemFree: 50 kB\n", "/proc/meminfo").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MemAvailable"), "got: {msg}");
        assert!(msg.contains("/proc/meminfo"), "got: {msg}");
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let err = read_meminfo("/nonexistent/meminfo").unwrap_err();
        assert!(matches!(err, MetricsError::Read { .. }));
    }

    #[test]
    fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, SAMPLE).unwrap();
        let stats = read_meminfo(path.to_str().unwrap()).unwrap();
        assert_eq!(stats.available, 8_000_000 * 1024);
    }
}
