//! Memory and swap state from `/proc/meminfo`.
//!
//! Usage follows the kernel's own accounting: used = MemTotal -
//! MemAvailable, which excludes reclaimable caches. A SwapTotal of zero
//! means no swap is configured; the widget omits its swap bar in that case.

use std::fs;

use tracing::debug;

const MEMINFO_PATH: &str = "/proc/meminfo";

/// One memory reading, all values in KiB as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    /// Whether /proc/meminfo was readable and parseable.
    pub available: bool,
    pub total_kib: u64,
    pub available_kib: u64,
    pub swap_total_kib: u64,
    pub swap_free_kib: u64,
}

impl MemorySample {
    pub fn unknown() -> Self {
        Self {
            available: false,
            total_kib: 0,
            available_kib: 0,
            swap_total_kib: 0,
            swap_free_kib: 0,
        }
    }

    pub fn used_kib(&self) -> u64 {
        self.total_kib.saturating_sub(self.available_kib)
    }

    /// Memory usage as a percentage 0.0-100.0.
    pub fn used_percent(&self) -> f64 {
        if self.total_kib == 0 {
            return 0.0;
        }
        self.used_kib() as f64 / self.total_kib as f64 * 100.0
    }

    /// Whether swap is configured at all.
    pub fn has_swap(&self) -> bool {
        self.swap_total_kib > 0
    }

    pub fn swap_used_kib(&self) -> u64 {
        self.swap_total_kib.saturating_sub(self.swap_free_kib)
    }

    /// Swap usage as a percentage, or None when no swap is configured.
    pub fn swap_percent(&self) -> Option<f64> {
        if !self.has_swap() {
            return None;
        }
        Some(self.swap_used_kib() as f64 / self.swap_total_kib as f64 * 100.0)
    }
}

/// Parse the contents of /proc/meminfo.
///
/// Returns None when any of the required fields is missing.
pub fn parse_meminfo(content: &str) -> Option<MemorySample> {
    let mut total = None;
    let mut avail = None;
    let mut swap_total = None;
    let mut swap_free = None;

    for line in content.lines() {
        let (key, rest) = line.split_once(':')?;
        let slot = match key {
            "MemTotal" => &mut total,
            "MemAvailable" => &mut avail,
            "SwapTotal" => &mut swap_total,
            "SwapFree" => &mut swap_free,
            _ => continue,
        };
        // Values look like "16384256 kB".
        let value = rest.trim().split_whitespace().next()?.parse::<u64>().ok()?;
        *slot = Some(value);
    }

    Some(MemorySample {
        available: true,
        total_kib: total?,
        available_kib: avail?,
        swap_total_kib: swap_total?,
        swap_free_kib: swap_free?,
    })
}

/// Read the current memory state.
pub fn read() -> MemorySample {
    match fs::read_to_string(MEMINFO_PATH) {
        Ok(content) => parse_meminfo(&content).unwrap_or_else(|| {
            debug!("Failed to parse {}", MEMINFO_PATH);
            MemorySample::unknown()
        }),
        Err(err) => {
            debug!("Failed to read {}: {}", MEMINFO_PATH, err);
            MemorySample::unknown()
        }
    }
}

/// Format a KiB count with a spaced unit for tooltips: "8.2 GiB".
pub fn format_kib_long(kib: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0;
    const MIB: f64 = 1024.0;

    let kib = kib as f64;
    if kib >= GIB {
        format!("{:.1} GiB", kib / GIB)
    } else if kib >= MIB {
        format!("{:.0} MiB", kib / MIB)
    } else {
        format!("{:.0} KiB", kib)
    }
}
