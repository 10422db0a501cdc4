//! Clock widget - displays chrono-formatted local time.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use gtk4::Label;
use tidebar_core::schema::{FieldDescriptor, Validator};
use toml::Value;

use crate::services::poll::{PollRegistration, Poller};
use crate::services::tooltip::TooltipManager;
use crate::styles::widget as wgt;
use crate::widgets::base::BaseWidget;
use crate::widgets::{DEGRADED_SENTINEL, ResolvedConfig, WidgetConfig};

/// Default format string for the clock display.
const DEFAULT_FORMAT: &str = "%a %d %H:%M";

/// Default format string for the tooltip (long date).
const DEFAULT_TOOLTIP_FORMAT: &str = "%A, %B %e, %Y";

const DEFAULT_UPDATE_INTERVAL: u32 = 60;

/// Configuration for the clock widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    /// strftime format string for the clock display.
    pub format: String,
    /// strftime format string for the hover tooltip.
    pub tooltip_format: String,
    /// Shell command to run on click.
    pub command: Option<String>,
    /// Refresh interval in seconds.
    pub update_interval: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            tooltip_format: DEFAULT_TOOLTIP_FORMAT.to_string(),
            command: None,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

impl WidgetConfig for ClockConfig {
    const NAME: &'static str = "clock";

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("format", Validator::Str).default_value(DEFAULT_FORMAT),
            FieldDescriptor::new("tooltip_format", Validator::Str)
                .default_value(DEFAULT_TOOLTIP_FORMAT),
            FieldDescriptor::new("command", Validator::Str),
            FieldDescriptor::new("update_interval", Validator::PositiveInt)
                .default_value(DEFAULT_UPDATE_INTERVAL as i64),
        ]
    }

    fn from_table(table: &HashMap<String, Value>) -> Self {
        Self {
            format: table
                .get("format")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_FORMAT)
                .to_string(),
            tooltip_format: table
                .get("tooltip_format")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_TOOLTIP_FORMAT)
                .to_string(),
            command: table
                .get("command")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            update_interval: table
                .get("update_interval")
                .and_then(|v| v.as_integer())
                .map(|n| n as u32)
                .unwrap_or(DEFAULT_UPDATE_INTERVAL),
        }
    }
}

/// Clock widget that displays and updates the current time.
pub struct ClockWidget {
    base: BaseWidget,
    _label: Label,
    /// Keeps the poll subscription alive; dropping cancels the timer.
    _poll: Option<PollRegistration>,
}

impl ClockWidget {
    /// Create a new clock widget from its resolved configuration.
    ///
    /// With a fatal config the widget renders the degraded sentinel and
    /// registers nothing: no timer, no tooltip, no click command.
    pub fn new(resolved: ResolvedConfig<ClockConfig>) -> Self {
        let base = BaseWidget::new(&[wgt::CLOCK]);
        let label = base.add_label(Some("--:--"), &[wgt::CLOCK_LABEL]);

        if resolved.fatal {
            label.set_label(DEGRADED_SENTINEL);
            return Self {
                base,
                _label: label,
                _poll: None,
            };
        }

        let config = resolved.config;

        if let Some(ref command) = config.command {
            base.set_click_command(command);
        }

        let format = config.format.clone();
        let tooltip_format = config.tooltip_format.clone();
        let label_for_tick = label.clone();
        let container = base.widget().clone();

        let poll = Poller::global().register(
            "clock",
            config.update_interval,
            Local::now,
            move |now: &DateTime<Local>| {
                label_for_tick.set_label(&now.format(&format).to_string());
                let tooltip = now.format(&tooltip_format).to_string();
                TooltipManager::global().set_styled_tooltip(&container, &tooltip);
            },
        );

        Self {
            base,
            _label: label,
            _poll: Some(poll),
        }
    }

    /// Get the root GTK widget for embedding in the bar.
    pub fn widget(&self) -> &gtk4::Box {
        self.base.widget()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidebar_core::config::WidgetEntry;

    use crate::widgets::resolve_config;

    fn entry_with(pairs: &[(&str, Value)]) -> WidgetEntry {
        let mut entry = WidgetEntry::new("clock");
        for (key, value) in pairs {
            entry.options.insert(key.to_string(), value.clone());
        }
        entry
    }

    #[test]
    fn test_clock_config_defaults() {
        let resolved = resolve_config::<ClockConfig>(&WidgetEntry::new("clock"));
        assert!(!resolved.fatal);
        assert_eq!(resolved.config, ClockConfig::default());
        assert_eq!(resolved.config.format, "%a %d %H:%M");
        assert_eq!(resolved.config.update_interval, 60);
    }

    #[test]
    fn test_clock_config_custom_format_and_interval() {
        let entry = entry_with(&[
            ("format", Value::String("%H:%M".into())),
            ("update_interval", Value::Integer(5)),
        ]);

        let resolved = resolve_config::<ClockConfig>(&entry);
        assert!(!resolved.fatal);
        assert_eq!(resolved.config.format, "%H:%M");
        assert_eq!(resolved.config.update_interval, 5);
    }

    #[test]
    fn test_clock_config_command_is_optional() {
        let resolved = resolve_config::<ClockConfig>(&WidgetEntry::new("clock"));
        assert_eq!(resolved.config.command, None);

        let entry = entry_with(&[("command", Value::String("gnome-calendar".into()))]);
        let resolved = resolve_config::<ClockConfig>(&entry);
        assert_eq!(resolved.config.command.as_deref(), Some("gnome-calendar"));
    }

    #[test]
    fn test_clock_config_non_string_format_is_fatal() {
        let entry = entry_with(&[("format", Value::Integer(123))]);

        let resolved = resolve_config::<ClockConfig>(&entry);
        assert!(resolved.fatal);
        assert_eq!(resolved.config, ClockConfig::default());
    }

    #[test]
    fn test_clock_config_zero_interval_is_fatal() {
        let entry = entry_with(&[("update_interval", Value::Integer(0))]);

        let resolved = resolve_config::<ClockConfig>(&entry);
        assert!(resolved.fatal);
    }

    #[test]
    fn test_clock_format_renders() {
        let now = Local::now();
        let text = now.format(DEFAULT_FORMAT).to_string();
        assert!(!text.is_empty());
    }
}
