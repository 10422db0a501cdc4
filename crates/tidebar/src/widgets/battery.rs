//! Battery widget - displays charge state from the kernel's power supply
//! sysfs interface.
//!
//! Renders a themed icon, a vertical level bar, and a percentage label.
//! Polled through the shared polling service so several battery widgets
//! configured for the same device share one sysfs read per tick.

use std::collections::HashMap;

use gtk4::prelude::*;
use gtk4::{Label, LevelBar, Orientation};
use tidebar_core::schema::{FieldDescriptor, Validator};
use toml::Value;

use crate::services::icons::IconHandle;
use crate::services::poll::{PollRegistration, Poller};
use crate::services::power_supply::{self, BatterySample, ChargeStatus};
use crate::services::tooltip::TooltipManager;
use crate::styles::{state, widget};
use crate::widgets::base::BaseWidget;
use crate::widgets::{DEGRADED_SENTINEL, ResolvedConfig, WidgetConfig};

const DEFAULT_DEVICE: &str = "BAT0";
const DEFAULT_BAR_HEIGHT: i64 = 16;
const DEFAULT_BAR_WIDTH: i64 = 8;
const DEFAULT_UPDATE_INTERVAL: u32 = 30;

/// Percentage at or below which the widget shows the warning state.
const WARNING_THRESHOLD: u8 = 20;

/// Percentage at or below which the widget shows the urgent state.
const URGENT_THRESHOLD: u8 = 10;

/// Configuration for the battery widget.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryConfig {
    /// Power supply device name under /sys/class/power_supply.
    pub battery: String,
    /// Shell command to run on click.
    pub command: Option<String>,
    /// Hide the themed icon.
    pub no_icon: bool,
    /// Level bar height in pixels.
    pub progressbar_height: i32,
    /// Level bar width in pixels.
    pub progressbar_width: i32,
    /// Refresh interval in seconds.
    pub update_interval: u32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            battery: DEFAULT_DEVICE.to_string(),
            command: None,
            no_icon: false,
            progressbar_height: DEFAULT_BAR_HEIGHT as i32,
            progressbar_width: DEFAULT_BAR_WIDTH as i32,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

impl WidgetConfig for BatteryConfig {
    const NAME: &'static str = "battery";

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("battery", Validator::Str)
                .required()
                .default_value(DEFAULT_DEVICE),
            FieldDescriptor::new("command", Validator::Str),
            FieldDescriptor::new("no_icon", Validator::Bool).default_value(false),
            FieldDescriptor::new("progressbar_height", Validator::PositiveInt)
                .default_value(DEFAULT_BAR_HEIGHT),
            FieldDescriptor::new("progressbar_width", Validator::PositiveInt)
                .default_value(DEFAULT_BAR_WIDTH),
            FieldDescriptor::new("update_interval", Validator::PositiveInt)
                .default_value(DEFAULT_UPDATE_INTERVAL as i64),
        ]
    }

    fn from_table(table: &HashMap<String, Value>) -> Self {
        Self {
            battery: table
                .get("battery")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_DEVICE)
                .to_string(),
            command: table
                .get("command")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            no_icon: table
                .get("no_icon")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            progressbar_height: table
                .get("progressbar_height")
                .and_then(|v| v.as_integer())
                .unwrap_or(DEFAULT_BAR_HEIGHT) as i32,
            progressbar_width: table
                .get("progressbar_width")
                .and_then(|v| v.as_integer())
                .unwrap_or(DEFAULT_BAR_WIDTH) as i32,
            update_interval: table
                .get("update_interval")
                .and_then(|v| v.as_integer())
                .map(|n| n as u32)
                .unwrap_or(DEFAULT_UPDATE_INTERVAL),
        }
    }
}

/// Battery widget that displays icon, level bar, and percentage.
pub struct BatteryWidget {
    base: BaseWidget,
    _poll: Option<PollRegistration>,
}

impl BatteryWidget {
    /// Create a new battery widget from its resolved configuration.
    pub fn new(resolved: ResolvedConfig<BatteryConfig>) -> Self {
        let base = BaseWidget::new(&[widget::BATTERY]);
        let config = resolved.config;

        let icon_handle = if config.no_icon || resolved.fatal {
            None
        } else {
            Some(base.add_icon("battery-missing", &[]))
        };

        let bar = LevelBar::new();
        bar.set_orientation(Orientation::Vertical);
        bar.set_inverted(true);
        bar.set_min_value(0.0);
        bar.set_max_value(1.0);
        bar.set_size_request(config.progressbar_width, config.progressbar_height);
        bar.set_valign(gtk4::Align::Center);
        bar.add_css_class(widget::BATTERY_BAR);
        base.content().append(&bar);

        let label = base.add_label(None, &[widget::BATTERY_PERCENTAGE]);

        if resolved.fatal {
            label.set_label(DEGRADED_SENTINEL);
            bar.set_value(0.0);
            return Self { base, _poll: None };
        }

        if let Some(ref command) = config.command {
            base.set_click_command(command);
        }

        let cache_key = format!("battery:{}", config.battery);
        let device = config.battery.clone();
        let container = base.widget().clone();

        let poll = Poller::global().register(
            cache_key.as_str(),
            config.update_interval,
            move || power_supply::read(&device),
            move |sample: &BatterySample| {
                render_sample(&container, icon_handle.as_ref(), &bar, &label, sample);
            },
        );

        Self {
            base,
            _poll: Some(poll),
        }
    }

    /// Get the root GTK widget for embedding in the bar.
    pub fn widget(&self) -> &gtk4::Box {
        self.base.widget()
    }
}

/// Render one battery sample into the widget's GTK state.
fn render_sample(
    container: &gtk4::Box,
    icon_handle: Option<&IconHandle>,
    bar: &LevelBar,
    label: &Label,
    sample: &BatterySample,
) {
    let tooltip_manager = TooltipManager::global();

    if !sample.available {
        container.add_css_class(state::SERVICE_UNAVAILABLE);
        container.remove_css_class(state::CHARGING);
        container.remove_css_class(state::WARNING);
        container.remove_css_class(state::URGENT);

        if let Some(icon) = icon_handle {
            icon.set_icon("battery-missing");
        }
        label.set_label(DEGRADED_SENTINEL);
        bar.set_value(0.0);
        tooltip_manager.set_styled_tooltip(container, "Battery: unavailable");
        return;
    }
    container.remove_css_class(state::SERVICE_UNAVAILABLE);

    let percent = sample.percent.unwrap_or(0);
    let plugged_in = sample.status.plugged_in();

    if plugged_in {
        container.add_css_class(state::CHARGING);
    } else {
        container.remove_css_class(state::CHARGING);
    }

    // Urgent wins over warning; neither applies while plugged in.
    container.remove_css_class(state::WARNING);
    container.remove_css_class(state::URGENT);
    if !plugged_in {
        if percent <= URGENT_THRESHOLD {
            container.add_css_class(state::URGENT);
        } else if percent <= WARNING_THRESHOLD {
            container.add_css_class(state::WARNING);
        }
    }

    if let Some(icon) = icon_handle {
        let name = match sample.percent {
            Some(pct) => battery_icon_name(pct, plugged_in),
            None => "battery-missing".to_string(),
        };
        icon.set_icon(&name);
    }

    match sample.percent {
        Some(pct) => {
            label.set_label(&format!("{}%", pct));
            bar.set_value(pct as f64 / 100.0);
        }
        None => {
            label.set_label(DEGRADED_SENTINEL);
            bar.set_value(0.0);
        }
    }

    let tooltip = match sample.percent {
        Some(pct) => format!("Battery: {}%\nState: {}", pct, sample.status.label()),
        None => format!("Battery: unknown\nState: {}", sample.status.label()),
    };
    tooltip_manager.set_styled_tooltip(container, &tooltip);
}

/// Return a logical icon name for the given battery level.
///
/// Thresholds: full (>=90%), high (>=60%), medium (>=35%), low (>=10%),
/// critical (<10%).
pub fn battery_icon_name(percent: u8, charging: bool) -> String {
    let level = if percent >= 90 {
        "full"
    } else if percent >= 60 {
        "high"
    } else if percent >= 35 {
        "medium"
    } else if percent >= 10 {
        "low"
    } else {
        "critical"
    };

    if charging {
        format!("battery-{}-charging", level)
    } else {
        format!("battery-{}", level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidebar_core::config::WidgetEntry;

    use crate::widgets::resolve_config;

    fn entry_with(pairs: &[(&str, Value)]) -> WidgetEntry {
        let mut entry = WidgetEntry::new("battery");
        for (key, value) in pairs {
            entry.options.insert(key.to_string(), value.clone());
        }
        entry
    }

    #[test]
    fn test_battery_config_defaults() {
        let resolved = resolve_config::<BatteryConfig>(&WidgetEntry::new("battery"));
        assert!(!resolved.fatal);
        assert_eq!(resolved.config, BatteryConfig::default());
        assert_eq!(resolved.config.battery, "BAT0");
        assert_eq!(resolved.config.update_interval, 30);
        assert!(!resolved.config.no_icon);
    }

    #[test]
    fn test_battery_config_custom_device_and_bar() {
        let entry = entry_with(&[
            ("battery", Value::String("BAT1".into())),
            ("progressbar_height", Value::Integer(24)),
            ("no_icon", Value::Boolean(true)),
        ]);

        let resolved = resolve_config::<BatteryConfig>(&entry);
        assert!(!resolved.fatal);
        assert_eq!(resolved.config.battery, "BAT1");
        assert_eq!(resolved.config.progressbar_height, 24);
        assert!(resolved.config.no_icon);
    }

    #[test]
    fn test_battery_config_bad_device_type_is_fatal() {
        let entry = entry_with(&[("battery", Value::Integer(0))]);

        let resolved = resolve_config::<BatteryConfig>(&entry);
        assert!(resolved.fatal);
        assert_eq!(resolved.config, BatteryConfig::default());
    }

    #[test]
    fn test_battery_config_negative_bar_size_is_fatal() {
        let entry = entry_with(&[("progressbar_width", Value::Integer(-8))]);

        let resolved = resolve_config::<BatteryConfig>(&entry);
        assert!(resolved.fatal);
    }

    #[test]
    fn test_battery_icon_name_discharge() {
        assert_eq!(battery_icon_name(100, false), "battery-full");
        assert_eq!(battery_icon_name(90, false), "battery-full");
        assert_eq!(battery_icon_name(75, false), "battery-high");
        assert_eq!(battery_icon_name(50, false), "battery-medium");
        assert_eq!(battery_icon_name(15, false), "battery-low");
        assert_eq!(battery_icon_name(5, false), "battery-critical");
    }

    #[test]
    fn test_battery_icon_name_charging() {
        assert_eq!(battery_icon_name(95, true), "battery-full-charging");
        assert_eq!(battery_icon_name(50, true), "battery-medium-charging");
        assert_eq!(battery_icon_name(3, true), "battery-critical-charging");
    }

    #[test]
    fn test_thresholds_do_not_overlap() {
        assert!(URGENT_THRESHOLD < WARNING_THRESHOLD);
    }

    #[test]
    fn test_unknown_status_is_not_plugged_in() {
        assert!(!ChargeStatus::Unknown.plugged_in());
    }
}
