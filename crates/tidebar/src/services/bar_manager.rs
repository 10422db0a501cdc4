//! Bar window management with multi-monitor and live reload support.
//!
//! Manages the bar window lifecycle across monitors: `sync_monitors()`
//! creates bars for new monitors and removes bars for disconnected ones,
//! honoring the `bar.outputs` allow-list; `reconfigure_all()` tears every
//! bar down and rebuilds it with new config for structural live reload.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow};
use tidebar_core::Config;
use tracing::{debug, info};

use crate::bar;
use crate::widgets::BarState;

/// State for a single bar instance on a specific monitor.
struct BarInstance {
    window: ApplicationWindow,
    /// Widget handles for this bar (timers, poll registrations).
    #[allow(dead_code)]
    state: BarState,
}

thread_local! {
    static BAR_MANAGER_INSTANCE: RefCell<Option<Rc<BarManager>>> = const { RefCell::new(None) };
}

/// Get a stable key for a monitor.
///
/// Uses the connector name if available (e.g., "eDP-1", "DP-1"), otherwise
/// falls back to "unknown-N". Monitors without connector names cannot be
/// reliably targeted via `bar.outputs`.
fn monitor_key(monitor: &gtk4::gdk::Monitor, index: u32) -> String {
    if let Some(conn) = monitor.connector() {
        conn.to_string()
    } else {
        format!("unknown-{}", index)
    }
}

/// Manages bar window lifecycle across multiple monitors.
pub struct BarManager {
    app: RefCell<Option<Application>>,
    /// Bar instances keyed by monitor connector name.
    bars: RefCell<HashMap<String, BarInstance>>,
}

impl BarManager {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            app: RefCell::new(None),
            bars: RefCell::new(HashMap::new()),
        })
    }

    /// Get the global BarManager singleton.
    pub fn global() -> Rc<Self> {
        BAR_MANAGER_INSTANCE.with(|cell| {
            let mut opt = cell.borrow_mut();
            if opt.is_none() {
                *opt = Some(BarManager::new());
            }
            opt.as_ref().unwrap().clone()
        })
    }

    /// Initialize with the GTK application reference.
    ///
    /// Call during application activation, before `sync_monitors()`.
    pub fn init(&self, app: &Application) {
        *self.app.borrow_mut() = Some(app.clone());
        debug!("BarManager initialized with app");
    }

    /// Create a bar for a specific monitor.
    ///
    /// Returns the monitor key, or None when the app is not initialized.
    pub fn create_bar_for_monitor(
        &self,
        monitor: &gtk4::gdk::Monitor,
        monitor_index: u32,
        config: &Config,
    ) -> Option<String> {
        let app = self.app.borrow();
        let app_ref = app.as_ref()?;
        let key = monitor_key(monitor, monitor_index);

        if self.bars.borrow().contains_key(&key) {
            debug!("Bar already exists for monitor key={}", key);
            return Some(key);
        }

        let mut state = BarState::new();
        let window = bar::create_bar_window(app_ref, config, monitor, &mut state);

        self.bars
            .borrow_mut()
            .insert(key.clone(), BarInstance { window, state });

        info!(
            "Created bar for monitor key={} connector={:?}",
            key,
            monitor.connector()
        );

        Some(key)
    }

    /// Remove a bar by its monitor key.
    ///
    /// Closes the window and drops the BarState, cancelling timers and poll
    /// registrations.
    pub fn remove_bar(&self, key: &str) {
        if let Some(instance) = self.bars.borrow_mut().remove(key) {
            debug!("Removing bar for key={}", key);
            instance.window.close();
        }
    }

    /// Synchronize bars with the current display monitors.
    ///
    /// Creates bars for new monitors (respecting the `bar.outputs`
    /// allow-list, empty meaning all monitors) and removes bars whose
    /// monitors disappeared or were filtered out. Call on activation and
    /// whenever monitors change.
    pub fn sync_monitors(&self, display: &gtk4::gdk::Display, config: &Config) {
        let monitors = display.monitors();
        let mut seen_keys = HashSet::new();

        for i in 0..monitors.n_items() {
            let Some(obj) = monitors.item(i) else {
                continue;
            };
            let Ok(monitor) = obj.downcast::<gtk4::gdk::Monitor>() else {
                continue;
            };
            let key = monitor_key(&monitor, i);

            if !config.bar.outputs.is_empty() && !config.bar.outputs.contains(&key) {
                debug!("Skipping monitor {} (not in bar.outputs)", key);
                continue;
            }

            seen_keys.insert(key.clone());

            if !self.bars.borrow().contains_key(&key) {
                self.create_bar_for_monitor(&monitor, i, config);
            }
        }

        let existing_keys: Vec<String> = self.bars.borrow().keys().cloned().collect();
        for key in existing_keys {
            if !seen_keys.contains(&key) {
                info!("Removing bar for disconnected/filtered monitor: {}", key);
                self.remove_bar(&key);
            }
        }

        info!(
            "Monitor sync complete: {} bar(s) active, {} total widget handles",
            self.bars.borrow().len(),
            self.handle_count()
        );
    }

    /// Destroy all bars and recreate them with new configuration.
    ///
    /// Used for live reload when widget placement, bar size, or the output
    /// allow-list change.
    pub fn reconfigure_all(&self, display: &gtk4::gdk::Display, config: &Config) {
        info!("Reconfiguring all bars...");

        let keys: Vec<String> = self.bars.borrow().keys().cloned().collect();
        for key in keys {
            self.remove_bar(&key);
        }

        self.sync_monitors(display, config);
    }

    /// Total number of widget handles across all bars.
    pub fn handle_count(&self) -> usize {
        self.bars
            .borrow()
            .values()
            .map(|instance| instance.state.handle_count())
            .sum()
    }

    /// Number of active bars.
    pub fn bar_count(&self) -> usize {
        self.bars.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_manager_starts_empty() {
        let manager = BarManager::new();
        assert_eq!(manager.bar_count(), 0);
        assert_eq!(manager.handle_count(), 0);
    }

    #[test]
    fn test_create_bar_without_app_returns_none() {
        let manager = BarManager::new();
        // No app initialized and no display in tests; removal of a key that
        // was never created is a no-op.
        manager.remove_bar("eDP-1");
        assert_eq!(manager.bar_count(), 0);
    }
}
