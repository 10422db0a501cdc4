//! Battery state from the kernel's power supply sysfs interface.
//!
//! Reads `/sys/class/power_supply/<name>/{capacity,status}` directly. A
//! missing device is not an error: the sample comes back unavailable and the
//! widget renders the unknown state.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Path to the kernel's power supply sysfs directory.
const POWER_SUPPLY_PATH: &str = "/sys/class/power_supply";

/// Charge state as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeStatus {
    Charging,
    Discharging,
    Full,
    Unknown,
}

impl ChargeStatus {
    /// Human-readable label for tooltips.
    pub fn label(self) -> &'static str {
        match self {
            ChargeStatus::Charging => "Charging",
            ChargeStatus::Discharging => "Discharging",
            ChargeStatus::Full => "Full",
            ChargeStatus::Unknown => "Unknown",
        }
    }

    /// Whether the charger is connected.
    pub fn plugged_in(self) -> bool {
        matches!(self, ChargeStatus::Charging | ChargeStatus::Full)
    }
}

/// One battery reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterySample {
    /// Whether the device exists and was readable.
    pub available: bool,
    /// Charge percentage 0-100 if known.
    pub percent: Option<u8>,
    /// Charge state.
    pub status: ChargeStatus,
}

impl BatterySample {
    pub fn unknown() -> Self {
        Self {
            available: false,
            percent: None,
            status: ChargeStatus::Unknown,
        }
    }
}

/// Parse a sysfs `capacity` file value, clamped to 0-100.
pub fn parse_capacity(content: &str) -> Option<u8> {
    content.trim().parse::<i64>().ok().map(|v| v.clamp(0, 100) as u8)
}

/// Parse a sysfs `status` file value.
///
/// The kernel also reports "Not charging" (plugged in, battery idle); that
/// maps to Full since the charger is connected.
pub fn parse_status(content: &str) -> ChargeStatus {
    match content.trim() {
        "Charging" => ChargeStatus::Charging,
        "Discharging" => ChargeStatus::Discharging,
        "Full" | "Not charging" => ChargeStatus::Full,
        _ => ChargeStatus::Unknown,
    }
}

fn device_dir(name: &str) -> PathBuf {
    Path::new(POWER_SUPPLY_PATH).join(name)
}

/// Read the current state of the named battery.
pub fn read(name: &str) -> BatterySample {
    let dir = device_dir(name);

    let capacity = match fs::read_to_string(dir.join("capacity")) {
        Ok(content) => parse_capacity(&content),
        Err(err) => {
            debug!("Failed to read {}/capacity: {}", dir.display(), err);
            return BatterySample::unknown();
        }
    };

    let status = fs::read_to_string(dir.join("status"))
        .map(|content| parse_status(&content))
        .unwrap_or(ChargeStatus::Unknown);

    BatterySample {
        available: true,
        percent: capacity,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capacity_basic() {
        assert_eq!(parse_capacity("57\n"), Some(57));
        assert_eq!(parse_capacity("0"), Some(0));
        assert_eq!(parse_capacity("100"), Some(100));
    }

    #[test]
    fn test_parse_capacity_clamped() {
        // Some firmware briefly reports values above 100.
        assert_eq!(parse_capacity("103"), Some(100));
        assert_eq!(parse_capacity("-1"), Some(0));
    }

    #[test]
    fn test_parse_capacity_invalid() {
        assert_eq!(parse_capacity("garbage"), None);
        assert_eq!(parse_capacity(""), None);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Charging\n"), ChargeStatus::Charging);
        assert_eq!(parse_status("Discharging"), ChargeStatus::Discharging);
        assert_eq!(parse_status("Full"), ChargeStatus::Full);
        assert_eq!(parse_status("Not charging"), ChargeStatus::Full);
        assert_eq!(parse_status("Mystery"), ChargeStatus::Unknown);
    }

    #[test]
    fn test_plugged_in() {
        assert!(ChargeStatus::Charging.plugged_in());
        assert!(ChargeStatus::Full.plugged_in());
        assert!(!ChargeStatus::Discharging.plugged_in());
        assert!(!ChargeStatus::Unknown.plugged_in());
    }

    #[test]
    fn test_read_missing_device_is_unavailable() {
        let sample = read("definitely-not-a-battery");
        assert!(!sample.available);
        assert_eq!(sample.percent, None);
        assert_eq!(sample.status, ChargeStatus::Unknown);
    }
}
