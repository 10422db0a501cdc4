//! Shared services used by the bar and its widgets.

pub mod bar_manager;
pub mod callbacks;
pub mod config_manager;
pub mod icons;
pub mod meminfo;
pub mod poll;
pub mod power_supply;
pub mod spawn;
pub mod tooltip;
