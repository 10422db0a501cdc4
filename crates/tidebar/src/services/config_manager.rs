//! Configuration manager with live reload support.
//!
//! A file watcher thread monitors the config file for modifications. On
//! change, the new config is parsed and validated; invalid configs are
//! rejected and the previous config stays active. Valid changes are
//! dispatched to the GTK main thread via `glib::idle_add_once`:
//!
//! - Theme changes update the CSS provider and tooltip surface styles.
//! - Structural changes (widget placement, bar size, margins, outputs)
//!   trigger a full bar rebuild through the bar manager.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use gtk4::glib;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer, notify::RecursiveMode};
use tracing::{debug, error, info, warn};

use tidebar_core::{Config, ThemePalette};

use crate::bar;
use crate::services::bar_manager::BarManager;
use crate::services::tooltip::TooltipManager;

/// Debounce interval (in ms) for file change events. Editors often trigger
/// multiple events for a single save; this batches them into one reload.
const FILE_CHANGE_DEBOUNCE_MS: u64 = 300;

/// Messages sent from the file watcher thread to the GTK main thread.
#[derive(Debug)]
pub enum ConfigMessage {
    /// A new valid config was loaded.
    Reloaded(Box<Config>),
    /// Config file changed but failed to load/validate.
    Error(String),
}

/// Send a config message to the main thread via glib::idle_add_once.
fn send_config_message(msg: ConfigMessage) {
    glib::idle_add_once(move || {
        ConfigManager::global().handle_config_message(msg);
    });
}

/// Manages configuration state and live reload.
///
/// This is a singleton service that holds the current configuration,
/// watches the config file for changes, and coordinates updates to
/// subsystems when the config changes.
pub struct ConfigManager {
    /// Current configuration.
    config: RefCell<Config>,
    /// Path to the config file being watched (if any).
    config_path: RefCell<Option<PathBuf>>,
    /// Shutdown flag for the file watcher thread.
    shutdown_flag: Arc<AtomicBool>,
}

thread_local! {
    static CONFIG_MANAGER_INSTANCE: RefCell<Option<Rc<ConfigManager>>> = const { RefCell::new(None) };
}

impl ConfigManager {
    fn new(config: Config, config_path: Option<PathBuf>) -> Rc<Self> {
        Rc::new(Self {
            config: RefCell::new(config),
            config_path: RefCell::new(config_path),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get the global ConfigManager singleton.
    ///
    /// Panics if `init_global` hasn't been called.
    pub fn global() -> Rc<Self> {
        CONFIG_MANAGER_INSTANCE.with(|cell| {
            cell.borrow()
                .as_ref()
                .expect("ConfigManager not initialized; call init_global first")
                .clone()
        })
    }

    /// Initialize the global ConfigManager singleton.
    ///
    /// Must be called once during application startup, before `global()` is
    /// used.
    pub fn init_global(config: Config, config_path: Option<PathBuf>) {
        CONFIG_MANAGER_INSTANCE.with(|cell| {
            let mut opt = cell.borrow_mut();
            if opt.is_some() {
                warn!("ConfigManager already initialized, ignoring init_global call");
                return;
            }
            *opt = Some(ConfigManager::new(config, config_path));
        });
    }

    /// Get a clone of the current configuration.
    pub fn config(&self) -> Config {
        self.config.borrow().clone()
    }

    /// Start watching the config file for changes.
    ///
    /// Spawns a background thread that monitors the config file. When
    /// changes are detected, the new config is parsed and sent to the GTK
    /// main thread. Does nothing if no config file path is set (using
    /// defaults).
    pub fn start_watching(self: &Rc<Self>) {
        let config_path = self.config_path.borrow().clone();
        let Some(path) = config_path else {
            info!("No config file to watch (using defaults)");
            return;
        };

        if !path.exists() {
            warn!(
                "Config file does not exist, cannot watch: {}",
                path.display()
            );
            return;
        }

        info!("Starting config file watcher for: {}", path.display());

        let shutdown_flag = self.shutdown_flag.clone();
        thread::spawn(move || {
            Self::run_file_watcher(path, shutdown_flag);
        });
    }

    /// Run the file watcher loop (called on a background thread).
    fn run_file_watcher(path: PathBuf, shutdown_flag: Arc<AtomicBool>) {
        let debounce_duration = Duration::from_millis(FILE_CHANGE_DEBOUNCE_MS);

        // Canonicalize so events from notify (absolute paths) compare equal.
        let canonical_path = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to canonicalize config path: {}", e);
                return;
            }
        };

        let path_for_handler = canonical_path.clone();
        let mut debouncer = match new_debouncer(debounce_duration, move |res: DebounceEventResult| {
            match res {
                Ok(events) => {
                    if events.iter().any(|e| e.path == path_for_handler) {
                        debug!("Config file change detected");
                        Self::reload_and_send(&path_for_handler);
                    }
                }
                Err(err) => {
                    error!("File watcher error: {}", err);
                }
            }
        }) {
            Ok(d) => d,
            Err(e) => {
                error!("Failed to create file watcher: {}", e);
                return;
            }
        };

        // Watch the parent directory; editors that replace the file on save
        // break a direct file watch.
        let watch_dir = canonical_path.parent().unwrap_or(&canonical_path);
        if let Err(e) = debouncer
            .watcher()
            .watch(watch_dir, RecursiveMode::NonRecursive)
        {
            error!("Failed to watch config directory: {}", e);
            return;
        }

        info!("File watcher started, watching: {}", watch_dir.display());

        // Keep the thread alive until shutdown is signaled. Short sleep
        // intervals keep shutdown responsive.
        while !shutdown_flag.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(500));
        }

        debug!("Config file watcher thread shutting down");
    }

    /// Reload config from file and send result to GTK thread.
    fn reload_and_send(path: &std::path::Path) {
        match Config::load(path) {
            Ok(new_config) => {
                if let Err(e) = new_config.validate() {
                    let msg = format!("Config validation failed: {}", e);
                    warn!("{}", msg);
                    send_config_message(ConfigMessage::Error(msg));
                    return;
                }

                for warning in new_config.warnings() {
                    warn!("Config warning: {}", warning);
                }

                info!("Config reloaded successfully from: {}", path.display());
                send_config_message(ConfigMessage::Reloaded(Box::new(new_config)));
            }
            Err(e) => {
                let msg = format!("Failed to reload config: {}", e);
                warn!("{}", msg);
                send_config_message(ConfigMessage::Error(msg));
            }
        }
    }

    /// Handle a config message from the file watcher.
    /// Called via glib::idle_add_once from send_config_message.
    pub(crate) fn handle_config_message(&self, msg: ConfigMessage) {
        match msg {
            ConfigMessage::Reloaded(new_config) => {
                self.apply_config(*new_config);
            }
            ConfigMessage::Error(err) => {
                // Keep using the previous config.
                error!("Config reload error: {}", err);
            }
        }
    }

    /// Apply a new configuration, updating all subsystems.
    ///
    /// This is the central fan-out that coordinates updates across services
    /// and widgets when the config changes.
    fn apply_config(&self, new_config: Config) {
        let old_config = self.config.borrow().clone();

        info!("Applying new configuration...");

        if config_theme_changed(&old_config, &new_config) {
            info!("Theme configuration changed, updating styles...");

            let palette = ThemePalette::from_config(&new_config);
            TooltipManager::global().reconfigure(palette.surface_styles());
            bar::load_css(&new_config);
        }

        // Store the new config before rebuilding so widgets created during
        // the rebuild see the new values.
        *self.config.borrow_mut() = new_config.clone();

        if config_structure_changed(&old_config, &new_config) {
            info!("Structural configuration changed, rebuilding bars...");
            if let Some(display) = gtk4::gdk::Display::default() {
                BarManager::global().reconfigure_all(&display, &new_config);
            }
        }

        info!("Configuration applied successfully");
    }

    /// Stop watching the config file.
    pub fn stop_watching(&self) {
        self.shutdown_flag.store(true, Ordering::Relaxed);
        debug!("Config watcher stopped");
    }
}

/// Check if theme-related config has changed.
fn config_theme_changed(old: &Config, new: &Config) -> bool {
    old.theme.mode != new.theme.mode
        || old.theme.accent != new.theme.accent
        || old.theme.widget_background_color != new.theme.widget_background_color
        || old.theme.bar_background_color != new.theme.bar_background_color
        || old.theme.typography.font_family != new.theme.typography.font_family
        || old.theme.typography.font_size != new.theme.typography.font_size
        // bar.size feeds the computed padding and icon sizes.
        || old.bar.size != new.bar.size
}

/// Check if structural configuration has changed (requires bar rebuild).
fn config_structure_changed(old: &Config, new: &Config) -> bool {
    if old.bar.size != new.bar.size {
        debug!("bar.size changed ({} -> {})", old.bar.size, new.bar.size);
        return true;
    }

    if old.bar.widget_spacing != new.bar.widget_spacing {
        debug!(
            "bar.widget_spacing changed ({} -> {})",
            old.bar.widget_spacing, new.bar.widget_spacing
        );
        return true;
    }

    if old.bar.outer_margin != new.bar.outer_margin {
        debug!(
            "bar.outer_margin changed ({} -> {})",
            old.bar.outer_margin, new.bar.outer_margin
        );
        return true;
    }

    if old.bar.outputs != new.bar.outputs {
        debug!(
            "bar.outputs changed ({:?} -> {:?})",
            old.bar.outputs, new.bar.outputs
        );
        return true;
    }

    let old_widgets = widget_summary(old);
    let new_widgets = widget_summary(new);
    if old_widgets != new_widgets {
        debug!("Widget configuration changed");
        debug!("Old widgets: {:?}", old_widgets);
        debug!("New widgets: {:?}", new_widgets);
        return true;
    }

    false
}

/// Summarize widget placement and options for comparison.
fn widget_summary(config: &Config) -> Vec<String> {
    let mut names = Vec::new();

    for (section, widgets) in [
        ("left", &config.widgets.left),
        ("center", &config.widgets.center),
        ("right", &config.widgets.right),
    ] {
        for name in widgets {
            names.push(format!("{}:{}", section, name));
        }
    }

    // Per-widget option tables also force a rebuild when they change;
    // widgets read their options only at construction. Options are collected
    // into a BTreeMap first: HashMap iteration order differs between
    // instances, and an order-dependent summary would misreport identical
    // configs as changed.
    let mut configs: Vec<String> = config
        .widgets
        .widget_configs
        .iter()
        .map(|(name, opts)| {
            let options: BTreeMap<&String, &toml::Value> = opts.options.iter().collect();
            format!("config:{}:disabled={},{:?}", name, opts.disabled, options)
        })
        .collect();
    configs.sort();
    names.extend(configs);

    names
}
