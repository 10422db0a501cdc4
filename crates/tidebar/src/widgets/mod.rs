//! Widget implementations for the tidebar bar.
//!
//! Each widget is a self-contained GTK4 component that displays some piece
//! of information (time, battery status, memory usage).
//!
//! The `WidgetFactory` constructs widgets from config entries, and
//! `BarState` owns the widget handles to keep them alive.
//!
//! # Widget Configuration Pattern
//!
//! Every widget config implements the `WidgetConfig` trait: a descriptor
//! list describing its options plus a constructor over the normalized
//! table. `resolve_config` drives the shared pipeline: unknown-key
//! warnings, normalization against defaults, validation with aggregated
//! errors. When validation fails the widget still builds, but with default
//! config and the `fatal` flag set, so it renders a placeholder instead of
//! pretending the bad options took effect.

mod base;
mod battery;
mod clock;
mod memory;

pub use base::BaseWidget;
pub use battery::{BatteryConfig, BatteryWidget};
pub use clock::{ClockConfig, ClockWidget};
pub use memory::{MemoryConfig, MemoryWidget};

use std::any::Any;
use std::collections::HashMap;

use gtk4::Widget;
use gtk4::prelude::*;
use tidebar_core::config::WidgetEntry;
use tidebar_core::schema::{self, FieldDescriptor};
use tracing::{error, warn};

/// Text shown in place of a widget's value when its configuration was
/// rejected or its data source is unavailable.
pub const DEGRADED_SENTINEL: &str = "?";

/// Trait for widget configuration types.
///
/// A config declares its option schema as [`FieldDescriptor`]s and knows how
/// to build itself from a table that has already been normalized and
/// validated against that schema. `Default` must produce the same values as
/// normalizing an empty user table; it is what a widget falls back to when
/// its configuration is rejected.
pub trait WidgetConfig: Sized + Default {
    /// Widget type name as used in config placement arrays.
    const NAME: &'static str;

    /// The option schema for this widget.
    fn descriptors() -> Vec<FieldDescriptor>;

    /// Build from a normalized, validated option table.
    ///
    /// The table is guaranteed to contain every required field with a value
    /// its validator accepted, so implementations read with `and_then` +
    /// `unwrap_or` against their own defaults rather than erroring.
    fn from_table(table: &HashMap<String, toml::Value>) -> Self;
}

/// A widget config together with the outcome of validating it.
pub struct ResolvedConfig<C> {
    pub config: C,
    /// True when the user's options were rejected and `config` is the
    /// default fallback. The widget renders a placeholder for its lifetime.
    pub fatal: bool,
}

/// Run a widget entry through the shared config pipeline.
///
/// Unknown keys are warned about and dropped, known keys are merged with
/// descriptor defaults, and the merged table is validated. All field errors
/// are reported in one aggregated log line; the widget is then degraded
/// rather than skipped so the user sees that something is wrong in the bar
/// itself.
pub fn resolve_config<C: WidgetConfig>(entry: &WidgetEntry) -> ResolvedConfig<C> {
    let descriptors = C::descriptors();
    warn_unknown_options(C::NAME, entry, &descriptors);

    let table = schema::normalize(&entry.options, &descriptors);
    match schema::validate(&table, &descriptors) {
        None => ResolvedConfig {
            config: C::from_table(&table),
            fatal: false,
        },
        Some(errors) => {
            error!("{}", schema::aggregate_errors(C::NAME, &errors));
            ResolvedConfig {
                config: C::default(),
                fatal: true,
            }
        }
    }
}

/// Log warnings for option keys no descriptor names (likely typos).
fn warn_unknown_options(widget_name: &str, entry: &WidgetEntry, descriptors: &[FieldDescriptor]) {
    for key in entry.options.keys() {
        if !descriptors.iter().any(|d| d.name == key.as_str()) {
            warn!(
                "Unknown option '{}' for widget '{}' - possible typo?",
                key, widget_name
            );
        }
    }
}

/// A built widget with its GTK widget and ownership handle.
pub struct BuiltWidget {
    /// The GTK widget to add to the container.
    pub widget: Widget,
    /// Opaque handle keeping the Rust-side state alive (timers, poll
    /// registrations, callbacks).
    pub handle: Box<dyn Any>,
}

/// Factory for constructing widgets from configuration entries.
pub struct WidgetFactory;

impl WidgetFactory {
    /// Build a widget from a config entry.
    ///
    /// Returns `None` if the widget type is not recognized.
    pub fn build(entry: &WidgetEntry) -> Option<BuiltWidget> {
        match entry.name.as_str() {
            "clock" => {
                let resolved = resolve_config::<ClockConfig>(entry);
                let clock = ClockWidget::new(resolved);
                let root = clock.widget().clone().upcast::<Widget>();
                Some(BuiltWidget {
                    widget: root,
                    handle: Box::new(clock),
                })
            }
            "battery" => {
                let resolved = resolve_config::<BatteryConfig>(entry);
                let battery = BatteryWidget::new(resolved);
                let root = battery.widget().clone().upcast::<Widget>();
                Some(BuiltWidget {
                    widget: root,
                    handle: Box::new(battery),
                })
            }
            "memory" => {
                let resolved = resolve_config::<MemoryConfig>(entry);
                let memory = MemoryWidget::new(resolved);
                let root = memory.widget().clone().upcast::<Widget>();
                Some(BuiltWidget {
                    widget: root,
                    handle: Box::new(memory),
                })
            }
            name => {
                warn!("Unknown widget type: '{}', skipping", name);
                None
            }
        }
    }
}

/// Holds widget handles to keep them alive for the lifetime of the bar.
///
/// Widget state (timers, poll registrations) is dropped, and therefore
/// cleaned up, when the owning `BarState` is dropped.
pub struct BarState {
    widget_handles: Vec<Box<dyn Any>>,
}

impl BarState {
    pub fn new() -> Self {
        Self {
            widget_handles: Vec::new(),
        }
    }

    pub fn add_handle(&mut self, handle: Box<dyn Any>) {
        self.widget_handles.push(handle);
    }

    pub fn handle_count(&self) -> usize {
        self.widget_handles.len()
    }
}

impl Default for BarState {
    fn default() -> Self {
        Self::new()
    }
}
