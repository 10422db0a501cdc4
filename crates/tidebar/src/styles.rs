//! Shared CSS class constants for tidebar.
//!
//! This module centralizes all CSS class names used across the codebase,
//! making them discoverable, avoiding typos, and enabling IDE autocompletion.
//!
//! # Usage
//!
//! ```ignore
//! use crate::styles::{class, widget, state};
//!
//! container.add_css_class(class::WIDGET);
//! label.add_css_class(widget::CLOCK_LABEL);
//! ```

/// Core structural/layout CSS classes.
pub mod class {
    /// Base widget container class (`.widget`).
    pub const WIDGET: &str = "widget";

    /// Widget content inner box (`.content`).
    pub const CONTENT: &str = "content";

    /// Bar window class (`.bar-window`).
    pub const BAR_WINDOW: &str = "bar-window";

    /// Main bar class (`.bar`).
    pub const BAR: &str = "bar";

    /// Bar section left (`.bar-section--left`).
    pub const BAR_SECTION_LEFT: &str = "bar-section--left";

    /// Bar section center (`.bar-section--center`).
    pub const BAR_SECTION_CENTER: &str = "bar-section--center";

    /// Bar section right (`.bar-section--right`).
    pub const BAR_SECTION_RIGHT: &str = "bar-section--right";
}

/// Per-widget classes.
pub mod widget {
    /// Clock widget (`.clock`).
    pub const CLOCK: &str = "clock";

    /// Clock label (`.clock-label`).
    pub const CLOCK_LABEL: &str = "clock-label";

    /// Battery widget (`.battery`).
    pub const BATTERY: &str = "battery";

    /// Battery percentage label (`.battery-percentage`).
    pub const BATTERY_PERCENTAGE: &str = "battery-percentage";

    /// Battery level bar (`.battery-bar`).
    pub const BATTERY_BAR: &str = "battery-bar";

    /// Memory widget (`.memory`).
    pub const MEMORY: &str = "memory";

    /// Memory percentage label (`.memory-percentage`).
    pub const MEMORY_PERCENTAGE: &str = "memory-percentage";

    /// Memory level bar (`.memory-bar`).
    pub const MEMORY_BAR: &str = "memory-bar";

    /// Swap level bar (`.swap-bar`).
    pub const SWAP_BAR: &str = "swap-bar";
}

/// Widget state classes.
pub mod state {
    /// Clickable element (`.clickable`).
    pub const CLICKABLE: &str = "clickable";

    /// Charging battery (`.charging`).
    pub const CHARGING: &str = "charging";

    /// Warning level (`.warning`).
    pub const WARNING: &str = "warning";

    /// Urgent/critical level (`.urgent`).
    pub const URGENT: &str = "urgent";

    /// Data source unavailable (`.service-unavailable`).
    pub const SERVICE_UNAVAILABLE: &str = "service-unavailable";
}

/// Icon classes.
pub mod icon {
    /// Icon root (`.icon-root`).
    pub const ROOT: &str = "icon-root";
}

/// Tooltip window classes.
pub mod tooltip {
    /// Tooltip window (`.tidebar-tooltip`).
    pub const WINDOW: &str = "tidebar-tooltip";

    /// Tooltip label (`.tidebar-tooltip-label`).
    pub const LABEL: &str = "tidebar-tooltip-label";
}
