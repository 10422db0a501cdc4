//! Bar window implementation using GTK4 and layer-shell.

use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::{debug, info, warn};

use tidebar_core::{Config, ThemePalette};

use crate::styles::class;
use crate::widgets::{BarState, WidgetFactory};

/// Create and configure the bar window with layer-shell.
///
/// The `state` parameter stores widget handles, keeping their timers and
/// poll registrations alive for the lifetime of the bar.
pub fn create_bar_window(
    app: &Application,
    config: &Config,
    monitor: &gtk4::gdk::Monitor,
    state: &mut BarState,
) -> ApplicationWindow {
    let bar_height = config.bar.size as i32;

    let window = ApplicationWindow::builder()
        .application(app)
        .title("tidebar")
        .decorated(false)
        .resizable(false)
        .default_height(bar_height)
        .build();

    window.add_css_class(class::BAR_WINDOW);

    window.init_layer_shell();
    window.set_layer(Layer::Top);

    window.set_monitor(Some(monitor));
    debug!("Bar bound to monitor: {:?}", monitor.connector());

    // Anchor to the top edge, stretched horizontally.
    window.set_anchor(Edge::Top, true);
    window.set_anchor(Edge::Left, true);
    window.set_anchor(Edge::Right, true);
    window.set_anchor(Edge::Bottom, false);

    // Reserve space so tiled windows don't overlap the bar.
    window.auto_exclusive_zone_enable();

    window.set_keyboard_mode(KeyboardMode::None);

    let margin = config.bar.outer_margin as i32;
    window.set_margin(Edge::Top, margin);
    window.set_margin(Edge::Left, margin);
    window.set_margin(Edge::Right, margin);

    let bar_box = gtk4::CenterBox::new();
    bar_box.add_css_class(class::BAR);
    bar_box.set_hexpand(true);
    bar_box.set_vexpand(true);

    bar_box.set_start_widget(Some(&create_section(
        class::BAR_SECTION_LEFT,
        &config.widgets.resolve_section(&config.widgets.left),
        config,
        state,
    )));
    bar_box.set_center_widget(Some(&create_section(
        class::BAR_SECTION_CENTER,
        &config.widgets.resolve_section(&config.widgets.center),
        config,
        state,
    )));
    bar_box.set_end_widget(Some(&create_section(
        class::BAR_SECTION_RIGHT,
        &config.widgets.resolve_section(&config.widgets.right),
        config,
        state,
    )));

    window.set_child(Some(&bar_box));

    // Set window width to the target monitor's width on map. The geometry is
    // captured now because the surface may not be on the right monitor yet.
    let target_width = monitor.geometry().width();
    window.connect_map(move |win| {
        win.set_default_size(target_width, bar_height);
        debug!("Set window width to target monitor size: {}px", target_width);
    });

    info!(
        "Bar window created: size={}px, margin={}px, monitor={:?}, widgets={}",
        config.bar.size,
        config.bar.outer_margin,
        monitor.connector(),
        state.handle_count()
    );

    window
}

/// Build one bar section from resolved widget entries.
fn create_section(
    section_class: &str,
    entries: &[tidebar_core::WidgetEntry],
    config: &Config,
    state: &mut BarState,
) -> gtk4::Box {
    let section = gtk4::Box::new(
        gtk4::Orientation::Horizontal,
        config.bar.widget_spacing as i32,
    );
    section.set_overflow(gtk4::Overflow::Hidden);
    section.add_css_class(section_class);

    let mut widget_count = 0;
    for entry in entries {
        if let Some(built) = WidgetFactory::build(entry) {
            section.append(&built.widget);
            state.add_handle(built.handle);
            widget_count += 1;
        }
    }

    debug!(
        "Created {} section with {} widget(s)",
        section_class, widget_count
    );
    section
}

/// Load and apply CSS styling to the application.
pub fn load_css(config: &Config) {
    let provider = gtk4::CssProvider::new();

    let palette = ThemePalette::from_config(config);
    let css = generate_css(&palette);

    debug!("Generated theme CSS (dark_mode={})", palette.is_dark_mode);

    provider.load_from_string(&css);

    // USER priority so the bar's styling overrides GTK themes.
    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_USER,
        );
    } else {
        warn!("No default display available, CSS styling not applied");
    }
}

/// Structural CSS shared by the bar and widgets, on top of the palette's
/// CSS variable block.
const BASE_CSS: &str = r#"
.bar-window {
    background-color: transparent;
}

.bar {
    background-color: var(--color-background-bar);
    min-height: var(--bar-height);
    font-family: var(--font-family);
    font-size: var(--font-size);
}

.widget {
    background-color: var(--color-background-widget);
    border: 1px solid var(--color-border-subtle);
    border-radius: 8px;
    margin-top: 3px;
    margin-bottom: 3px;
}

.widget:hover {
    background-color: var(--color-widget-overlay-hover);
}

.widget > .content {
    padding-left: var(--widget-padding-x);
    padding-right: var(--widget-padding-x);
}

.widget > .content > * {
    margin-left: 2px;
    margin-right: 2px;
}

.widget label {
    color: var(--color-foreground-primary);
}

.widget .icon-root {
    color: var(--color-foreground-muted);
    -gtk-icon-size: var(--icon-size);
}

.widget.clickable {
    cursor: pointer;
}

.widget levelbar trough {
    background-color: var(--color-widget-overlay-hover);
    border: none;
    min-width: 0;
    min-height: 0;
}

.widget levelbar block.filled {
    background-color: var(--color-accent-primary);
    border: none;
}

.widget.charging .icon-root,
.widget.charging levelbar block.filled {
    color: var(--color-accent-primary);
    background-color: var(--color-accent-primary);
}

.widget.warning label,
.widget.warning .icon-root {
    color: var(--color-state-warning);
}

.widget.warning levelbar block.filled {
    background-color: var(--color-state-warning);
}

.widget.urgent label,
.widget.urgent .icon-root {
    color: var(--color-state-urgent);
}

.widget.urgent levelbar block.filled {
    background-color: var(--color-state-urgent);
}

.widget.service-unavailable label,
.widget.service-unavailable .icon-root {
    color: var(--color-foreground-muted);
}
"#;

/// Generate the full CSS string from the theme palette.
fn generate_css(palette: &ThemePalette) -> String {
    format!("{}\n{}", palette.css_vars_block(), BASE_CSS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_css_contains_vars_and_rules() {
        let config = Config::from_default_toml().expect("default config parses");
        let palette = ThemePalette::from_config(&config);
        let css = generate_css(&palette);

        assert!(css.contains("--color-background-bar"));
        assert!(css.contains(".bar {"));
        assert!(css.contains("levelbar block.filled"));
    }
}
