//! tidebar - a small GTK4 status bar for Wayland tiling compositors.

mod bar;
mod services;
pub mod styles;
mod widgets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gtk4::Application;
use gtk4::prelude::*;
use tracing::{debug, error, info, warn};

use tidebar_core::{Config, ThemePalette, logging};

use crate::services::bar_manager::BarManager;
use crate::services::config_manager::ConfigManager;
use crate::services::tooltip::TooltipManager;

/// tidebar - a small GTK4 status bar for Wayland tiling compositors
#[derive(Parser, Debug)]
#[command(name = "tidebar", version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Validate configuration and exit (returns non-zero on errors)
    #[arg(long)]
    check_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose);

    // --print-example-config needs no config lookup at all.
    if args.print_example_config {
        print!("{}", tidebar_core::config::DEFAULT_CONFIG_TOML);
        return ExitCode::SUCCESS;
    }

    // Load configuration using the XDG lookup chain. An explicit --config
    // path must exist and be valid (no fallback).
    let load_result = match Config::find_and_load(args.config.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref source) = load_result.source {
        info!("Loaded configuration from {:?}", source);
    } else if load_result.used_defaults {
        warn!("Using default configuration (no config file found)");
    }

    let config = load_result.config;

    // Strict validation; any invalid value is a startup failure.
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    for warning in config.warnings() {
        warn!("Config warning: {}", warning);
    }

    debug!("Configuration validated successfully");

    if args.check_config {
        if let Some(ref source) = load_result.source {
            println!("Configuration valid: {}", source.display());
        } else {
            println!("Configuration valid (using defaults)");
        }
        println!("{}", config.summary());
        return ExitCode::SUCCESS;
    }

    info!(
        "Widgets: {} left, {} center, {} right",
        config.widgets.left.len(),
        config.widgets.center.len(),
        config.widgets.right.len()
    );

    run_gtk_app(config, load_result.source)
}

/// Initialize and run the GTK4 application.
fn run_gtk_app(config: Config, config_source: Option<PathBuf>) -> ExitCode {
    if let Some(ref source) = config_source {
        info!("Running with configuration file: {}", source.display());
    } else {
        info!("Running with default configuration (no file found)");
    }

    // Config manager must exist before activate, so it's ready for live reload.
    ConfigManager::init_global(config.clone(), config_source);

    // Default to the Wayland backend.
    // SAFETY: called before GTK initialization; no other threads are
    // touching the environment yet.
    if std::env::var("GDK_BACKEND").is_err() {
        unsafe {
            std::env::set_var("GDK_BACKEND", "wayland");
        }
    }

    let app = Application::builder()
        .application_id("io.github.tidebar")
        .flags(gtk4::gio::ApplicationFlags::NON_UNIQUE)
        .build();

    let config_for_activate = config.clone();

    app.connect_activate(move |app| {
        info!("GTK application activated");

        bar::load_css(&config_for_activate);

        let palette = ThemePalette::from_config(&config_for_activate);
        TooltipManager::init_global(palette.surface_styles());
        debug!("Tooltip manager initialized with theme styles");

        let display = match gtk4::gdk::Display::default() {
            Some(d) => d,
            None => {
                error!("Could not get default display - is a display server running?");
                return;
            }
        };

        let bar_manager = BarManager::global();
        bar_manager.init(app);
        bar_manager.sync_monitors(&display, &config_for_activate);

        info!(
            "Bar(s) created: {} bar(s) with {} widget handle(s)",
            bar_manager.bar_count(),
            bar_manager.handle_count()
        );

        // Monitor hot-plug support. The display is captured directly so
        // sync_monitors runs even when every monitor disconnected, cleaning
        // up orphaned bars.
        {
            let display_for_hotplug = display.clone();
            display
                .monitors()
                .connect_items_changed(move |_monitors, _pos, _removed, _added| {
                    info!("Monitor configuration changed, syncing bars...");
                    let config = ConfigManager::global().config();
                    BarManager::global().sync_monitors(&display_for_hotplug, &config);
                });
        }

        // Start config file watcher for live reload.
        ConfigManager::global().start_watching();
    });

    app.connect_shutdown(|_| {
        info!("GTK application shutting down");
        ConfigManager::global().stop_watching();
    });

    // Run with empty args; clap already parsed the real ones.
    let empty_args: Vec<String> = vec![];
    let status = app.run_with_args(&empty_args);

    if status == gtk4::glib::ExitCode::SUCCESS {
        ExitCode::SUCCESS
    } else {
        error!("GTK application exited with error");
        ExitCode::FAILURE
    }
}
