//! Memory widget - displays RAM and swap usage from `/proc/meminfo`.
//!
//! Renders a themed icon, a vertical level bar for memory, and a second
//! level bar for swap. The swap bar is omitted when swap is disabled in
//! config or not configured on the host (SwapTotal == 0).

use std::collections::HashMap;

use gtk4::prelude::*;
use gtk4::{Label, LevelBar, Orientation};
use tidebar_core::schema::{FieldDescriptor, Validator};
use toml::Value;

use crate::services::meminfo::{self, MemorySample};
use crate::services::poll::{PollRegistration, Poller};
use crate::services::tooltip::TooltipManager;
use crate::styles::{state, widget};
use crate::widgets::base::BaseWidget;
use crate::widgets::{DEGRADED_SENTINEL, ResolvedConfig, WidgetConfig};

const DEFAULT_BAR_HEIGHT: i64 = 16;
const DEFAULT_BAR_WIDTH: i64 = 8;
const DEFAULT_UPDATE_INTERVAL: u32 = 5;

/// Memory usage percentage at which the warning state applies.
const WARNING_PERCENT: f64 = 80.0;

/// Memory usage percentage at which the urgent state applies.
const URGENT_PERCENT: f64 = 92.0;

/// Configuration for the memory widget.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryConfig {
    /// Hide the themed icon.
    pub no_icon: bool,
    /// Level bar height in pixels.
    pub progressbar_height: i32,
    /// Level bar width in pixels.
    pub progressbar_width: i32,
    /// Refresh interval in seconds.
    pub update_interval: u32,
    /// Shell command to run on click.
    pub command: Option<String>,
    /// Show the swap bar when the host has swap configured.
    pub swap: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            no_icon: false,
            progressbar_height: DEFAULT_BAR_HEIGHT as i32,
            progressbar_width: DEFAULT_BAR_WIDTH as i32,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            command: None,
            swap: true,
        }
    }
}

impl WidgetConfig for MemoryConfig {
    const NAME: &'static str = "memory";

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("no_icon", Validator::Bool).default_value(false),
            FieldDescriptor::new("progressbar_height", Validator::PositiveInt)
                .default_value(DEFAULT_BAR_HEIGHT),
            FieldDescriptor::new("progressbar_width", Validator::PositiveInt)
                .default_value(DEFAULT_BAR_WIDTH),
            FieldDescriptor::new("update_interval", Validator::PositiveInt)
                .default_value(DEFAULT_UPDATE_INTERVAL as i64),
            FieldDescriptor::new("command", Validator::Str),
            FieldDescriptor::new("swap", Validator::Bool).default_value(true),
        ]
    }

    fn from_table(table: &HashMap<String, Value>) -> Self {
        Self {
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
            command: table
                .get("command")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            swap: table.get("swap").and_then(|v| v.as_bool()).unwrap_or(true),
        }
    }
}

/// Memory widget that displays usage bars and a percentage.
pub struct MemoryWidget {
    base: BaseWidget,
    _poll: Option<PollRegistration>,
}

impl MemoryWidget {
    /// Create a new memory widget from its resolved configuration.
    pub fn new(resolved: ResolvedConfig<MemoryConfig>) -> Self {
        let base = BaseWidget::new(&[widget::MEMORY]);
        let config = resolved.config;

        if !config.no_icon && !resolved.fatal {
            base.add_icon("memory", &[]);
        }

        let mem_bar = make_bar(&config, widget::MEMORY_BAR);
        base.content().append(&mem_bar);

        let swap_bar = make_bar(&config, widget::SWAP_BAR);
        swap_bar.set_visible(false);
        base.content().append(&swap_bar);

        let label = base.add_label(None, &[widget::MEMORY_PERCENTAGE]);

        if resolved.fatal {
            label.set_label(DEGRADED_SENTINEL);
            return Self { base, _poll: None };
        }

        if let Some(ref command) = config.command {
            base.set_click_command(command);
        }

        let show_swap = config.swap;
        let container = base.widget().clone();

        // All memory widgets share one /proc/meminfo read per tick.
        let poll = Poller::global().register(
            "meminfo",
            config.update_interval,
            meminfo::read,
            move |sample: &MemorySample| {
                render_sample(&container, &mem_bar, &swap_bar, &label, show_swap, sample);
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

fn make_bar(config: &MemoryConfig, css_class: &str) -> LevelBar {
    let bar = LevelBar::new();
    bar.set_orientation(Orientation::Vertical);
    bar.set_inverted(true);
    bar.set_min_value(0.0);
    bar.set_max_value(1.0);
    bar.set_size_request(config.progressbar_width, config.progressbar_height);
    bar.set_valign(gtk4::Align::Center);
    bar.add_css_class(css_class);
    bar
}

/// Render one memory sample into the widget's GTK state.
fn render_sample(
    container: &gtk4::Box,
    mem_bar: &LevelBar,
    swap_bar: &LevelBar,
    label: &Label,
    show_swap: bool,
    sample: &MemorySample,
) {
    let tooltip_manager = TooltipManager::global();

    if !sample.available {
        container.add_css_class(state::SERVICE_UNAVAILABLE);
        container.remove_css_class(state::WARNING);
        container.remove_css_class(state::URGENT);

        label.set_label(DEGRADED_SENTINEL);
        mem_bar.set_value(0.0);
        swap_bar.set_visible(false);
        tooltip_manager.set_styled_tooltip(container, "Memory: unavailable");
        return;
    }
    container.remove_css_class(state::SERVICE_UNAVAILABLE);

    let used_percent = sample.used_percent();
    label.set_label(&format!("{:.0}%", used_percent));
    mem_bar.set_value(used_percent / 100.0);

    container.remove_css_class(state::WARNING);
    container.remove_css_class(state::URGENT);
    if used_percent >= URGENT_PERCENT {
        container.add_css_class(state::URGENT);
    } else if used_percent >= WARNING_PERCENT {
        container.add_css_class(state::WARNING);
    }

    // Swap bar only appears when requested and the host actually has swap.
    match sample.swap_percent() {
        Some(swap_percent) if show_swap => {
            swap_bar.set_value(swap_percent / 100.0);
            swap_bar.set_visible(true);
        }
        _ => swap_bar.set_visible(false),
    }

    tooltip_manager.set_styled_tooltip(container, &tooltip_text(sample, show_swap));
}

/// Build the hover tooltip text for a memory sample.
fn tooltip_text(sample: &MemorySample, show_swap: bool) -> String {
    let mut text = format!(
        "Memory: {} / {} ({:.0}%)",
        meminfo::format_kib_long(sample.used_kib()),
        meminfo::format_kib_long(sample.total_kib),
        sample.used_percent()
    );

    if show_swap && let Some(swap_percent) = sample.swap_percent() {
        text.push_str(&format!(
            "\nSwap: {} / {} ({:.0}%)",
            meminfo::format_kib_long(sample.swap_used_kib()),
            meminfo::format_kib_long(sample.swap_total_kib),
            swap_percent
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidebar_core::config::WidgetEntry;

    use crate::widgets::resolve_config;

    fn entry_with(pairs: &[(&str, Value)]) -> WidgetEntry {
        let mut entry = WidgetEntry::new("memory");
        for (key, value) in pairs {
            entry.options.insert(key.to_string(), value.clone());
        }
        entry
    }

    fn sample(total: u64, avail: u64, swap_total: u64, swap_free: u64) -> MemorySample {
        MemorySample {
            available: true,
            total_kib: total,
            available_kib: avail,
            swap_total_kib: swap_total,
            swap_free_kib: swap_free,
        }
    }

    #[test]
    fn test_memory_config_defaults() {
        let resolved = resolve_config::<MemoryConfig>(&WidgetEntry::new("memory"));
        assert!(!resolved.fatal);
        assert_eq!(resolved.config, MemoryConfig::default());
        assert_eq!(resolved.config.update_interval, 5);
        assert!(resolved.config.swap);
    }

    #[test]
    fn test_memory_config_swap_off() {
        let entry = entry_with(&[("swap", Value::Boolean(false))]);

        let resolved = resolve_config::<MemoryConfig>(&entry);
        assert!(!resolved.fatal);
        assert!(!resolved.config.swap);
    }

    #[test]
    fn test_memory_config_bad_swap_type_is_fatal() {
        let entry = entry_with(&[("swap", Value::String("yes".into()))]);

        let resolved = resolve_config::<MemoryConfig>(&entry);
        assert!(resolved.fatal);
        assert_eq!(resolved.config, MemoryConfig::default());
    }

    #[test]
    fn test_memory_config_zero_bar_height_is_fatal() {
        let entry = entry_with(&[("progressbar_height", Value::Integer(0))]);

        let resolved = resolve_config::<MemoryConfig>(&entry);
        assert!(resolved.fatal);
    }

    #[test]
    fn test_tooltip_text_with_swap() {
        let s = sample(16_777_216, 8_388_608, 4_194_304, 2_097_152);
        let text = tooltip_text(&s, true);

        assert!(text.starts_with("Memory: 8.0 GiB / 16.0 GiB (50%)"));
        assert!(text.contains("Swap: 2.0 GiB / 4.0 GiB (50%)"));
    }

    #[test]
    fn test_tooltip_text_without_swap_configured() {
        let s = sample(8_388_608, 4_194_304, 0, 0);
        let text = tooltip_text(&s, true);

        assert!(text.starts_with("Memory:"));
        assert!(!text.contains("Swap:"));
    }

    #[test]
    fn test_tooltip_text_swap_disabled_in_config() {
        let s = sample(8_388_608, 4_194_304, 4_194_304, 4_194_304);
        let text = tooltip_text(&s, false);

        assert!(!text.contains("Swap:"));
    }
}
