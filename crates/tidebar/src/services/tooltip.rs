//! TooltipManager - process-wide tooltip handling for the bar.
//!
//! Uses layer-shell positioned tooltip windows instead of GTK's native
//! tooltips, which don't position correctly on layer-shell surfaces.
//!
//! Tooltip styling is derived from `ThemePalette::surface_styles()`.
//! Initialize with `TooltipManager::init_global(styles)` before first use.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use gtk4::glib::{self, SourceId};
use gtk4::prelude::*;
use gtk4::{Label, Window};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tidebar_core::SurfaceStyles;
use tracing::debug;

use crate::styles::tooltip;

thread_local! {
    static TOOLTIP_INSTANCE: RefCell<Option<Rc<TooltipManager>>> = const { RefCell::new(None) };
}

/// Delay before showing tooltip (ms)
const TOOLTIP_SHOW_DELAY_MS: u64 = 500;

/// Offset from cursor position
const TOOLTIP_CURSOR_OFFSET_X: i32 = 10;
const TOOLTIP_CURSOR_OFFSET_Y: i32 = 0;

/// Margin from screen edges
const SCREEN_EDGE_MARGIN: i32 = 8;

/// Fallback tooltip width when measurement fails
const FALLBACK_TOOLTIP_WIDTH: i32 = 300;

/// Default tooltip styles, used when init_global is not called.
fn default_surface_styles() -> SurfaceStyles {
    SurfaceStyles {
        background_color: "#16161e".to_string(),
        text_color: "#ffffff".to_string(),
        font_family: "monospace".to_string(),
        font_size: 13,
        border_color: "rgba(255, 255, 255, 0.10)".to_string(),
        is_dark_mode: true,
    }
}

/// A layer-shell tooltip window.
struct TooltipWindow {
    window: Window,
    label: Label,
}

/// Positioning mode for tooltips.
#[derive(Clone, Copy)]
enum TooltipAnchor {
    Left,
    Right,
}

impl TooltipWindow {
    fn new(styles: &SurfaceStyles) -> Self {
        let window = Window::builder().decorated(false).resizable(false).build();
        window.add_css_class(tooltip::WINDOW);

        window.init_layer_shell();
        window.set_layer(Layer::Overlay);
        window.set_exclusive_zone(0);
        window.set_keyboard_mode(KeyboardMode::None);

        // Initial anchors, adjusted per-show in show_at.
        window.set_anchor(Edge::Top, true);
        window.set_anchor(Edge::Left, true);
        window.set_anchor(Edge::Right, false);
        window.set_anchor(Edge::Bottom, false);

        let label = Label::new(None);
        label.add_css_class(tooltip::LABEL);
        window.set_child(Some(&label));

        Self::apply_styles(&window, styles);

        Self { window, label }
    }

    fn apply_styles(window: &Window, styles: &SurfaceStyles) {
        // Slight background transparency so the tooltip reads as an overlay.
        let bg = format!(
            "color-mix(in srgb, {} 85%, transparent)",
            styles.background_color
        );

        let css = format!(
            r#"
.tidebar-tooltip {{
    background-color: {bg};
    border: 1px solid {border};
    border-radius: 8px;
    padding: 6px 10px;
}}

.tidebar-tooltip-label {{
    font-family: {font};
    font-size: {size}px;
    color: {fg};
}}
"#,
            bg = bg,
            border = styles.border_color,
            font = styles.font_family,
            size = styles.font_size,
            fg = styles.text_color,
        );

        let provider = gtk4::CssProvider::new();
        provider.load_from_string(&css);

        let display = gtk4::prelude::WidgetExt::display(window);
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_USER + 10,
        );
    }

    /// Set the text and return the tooltip's natural width including padding.
    fn measure_width(&self, text: &str) -> i32 {
        self.label.set_text(text);
        let (_, natural_width, _, _) = self.label.measure(gtk4::Orientation::Horizontal, -1);
        // 10px horizontal padding on each side from the CSS above.
        natural_width + 20
    }

    fn show_at(&self, x: i32, y: i32, anchor: TooltipAnchor, monitor: Option<&gtk4::gdk::Monitor>) {
        if let Some(monitor) = monitor {
            self.window.set_monitor(Some(monitor));
        }

        match anchor {
            TooltipAnchor::Left => {
                self.window.set_anchor(Edge::Left, true);
                self.window.set_anchor(Edge::Right, false);
                self.window.set_margin(Edge::Left, x);
                self.window.set_margin(Edge::Right, 0);
            }
            TooltipAnchor::Right => {
                self.window.set_anchor(Edge::Left, false);
                self.window.set_anchor(Edge::Right, true);
                self.window.set_margin(Edge::Left, 0);
                self.window.set_margin(Edge::Right, x);
            }
        }

        self.window.set_margin(Edge::Top, y);
        self.window.present();
    }

    fn hide(&self) {
        self.window.set_visible(false);
    }

    fn update_styles(&self, styles: &SurfaceStyles) {
        Self::apply_styles(&self.window, styles);
    }
}

/// Process-wide tooltip manager using layer-shell windows.
pub struct TooltipManager {
    styles: RefCell<SurfaceStyles>,
    /// The tooltip window (lazily created).
    tooltip_window: RefCell<Option<TooltipWindow>>,
    /// Pending show timer source ID.
    pending_show: RefCell<Option<SourceId>>,
    /// Currently hovered widget (weak ref to avoid preventing cleanup).
    current_widget: RefCell<Option<glib::WeakRef<gtk4::Widget>>>,
    current_text: RefCell<String>,
    /// Map of widget pointer addresses to tooltip text.
    tooltip_texts: RefCell<HashMap<usize, String>>,
    /// Widget addresses that already have controllers attached.
    setup_widgets: RefCell<HashSet<usize>>,
    /// Last known cursor X position (relative to widget).
    cursor_x: Cell<f64>,
}

impl TooltipManager {
    fn new(styles: SurfaceStyles) -> Rc<Self> {
        Rc::new(Self {
            styles: RefCell::new(styles),
            tooltip_window: RefCell::new(None),
            pending_show: RefCell::new(None),
            current_widget: RefCell::new(None),
            current_text: RefCell::new(String::new()),
            tooltip_texts: RefCell::new(HashMap::new()),
            setup_widgets: RefCell::new(HashSet::new()),
            cursor_x: Cell::new(0.0),
        })
    }

    /// Initialize the global TooltipManager with styles from ThemePalette.
    pub fn init_global(styles: SurfaceStyles) {
        TOOLTIP_INSTANCE.with(|cell| {
            let mut opt = cell.borrow_mut();
            if opt.is_some() {
                debug!("TooltipManager already initialized, ignoring init_global call");
                return;
            }
            *opt = Some(TooltipManager::new(styles));
        });
    }

    /// Get the global TooltipManager singleton.
    ///
    /// If not initialized via `init_global`, uses default dark-mode styles.
    pub fn global() -> Rc<Self> {
        TOOLTIP_INSTANCE.with(|cell| {
            let mut opt = cell.borrow_mut();
            if opt.is_none() {
                debug!("TooltipManager not initialized, using defaults");
                *opt = Some(TooltipManager::new(default_surface_styles()));
            }
            opt.as_ref().unwrap().clone()
        })
    }

    /// Reconfigure with new styles (for live config reload).
    pub fn reconfigure(&self, styles: SurfaceStyles) {
        debug!(
            "TooltipManager reconfiguring: bg={} -> {}",
            self.styles.borrow().background_color,
            styles.background_color
        );
        *self.styles.borrow_mut() = styles.clone();

        if let Some(ref tooltip_window) = *self.tooltip_window.borrow() {
            tooltip_window.update_styles(&styles);
        }
    }

    /// Set a styled tooltip on a widget.
    ///
    /// Sets up hover handlers on the widget to show/hide the shared tooltip
    /// window; the tooltip appears after a short delay when hovering.
    pub fn set_styled_tooltip(&self, widget: &impl IsA<gtk4::Widget>, text: &str) {
        let widget = widget.as_ref();
        let widget_addr = widget.as_ptr() as usize;

        self.tooltip_texts
            .borrow_mut()
            .insert(widget_addr, text.to_string());

        // Controllers are attached once per widget; later calls just update text.
        if self.setup_widgets.borrow().contains(&widget_addr) {
            return;
        }
        self.setup_widgets.borrow_mut().insert(widget_addr);

        // Addresses can be reused for new widgets, so drop entries on destroy.
        let manager = Self::global();
        let addr = widget_addr;
        widget.connect_destroy(move |_| {
            manager.setup_widgets.borrow_mut().remove(&addr);
            manager.tooltip_texts.borrow_mut().remove(&addr);
        });

        let motion = gtk4::EventControllerMotion::new();

        let manager = Self::global();
        let addr = widget_addr;
        motion.connect_enter(move |controller, x, _y| {
            let Some(widget) = controller.widget() else {
                return;
            };
            manager.cursor_x.set(x);
            if let Some(text) = manager.tooltip_texts.borrow().get(&addr) {
                let text = text.clone();
                manager.schedule_show(&widget, &text);
            }
        });

        let manager = Self::global();
        motion.connect_motion(move |_controller, x, _y| {
            manager.cursor_x.set(x);
        });

        let manager = Self::global();
        motion.connect_leave(move |_controller| {
            manager.cancel_and_hide();
        });

        widget.add_controller(motion);
    }

    fn schedule_show(&self, widget: &gtk4::Widget, text: &str) {
        self.cancel_pending();

        let weak_ref = glib::WeakRef::new();
        weak_ref.set(Some(widget));
        *self.current_widget.borrow_mut() = Some(weak_ref);
        *self.current_text.borrow_mut() = text.to_string();

        let manager = Self::global();
        let source_id = glib::timeout_add_local_once(
            std::time::Duration::from_millis(TOOLTIP_SHOW_DELAY_MS),
            move || {
                manager.do_show();
            },
        );
        *self.pending_show.borrow_mut() = Some(source_id);
    }

    fn do_show(&self) {
        *self.pending_show.borrow_mut() = None;

        let text = self.current_text.borrow().clone();
        if text.is_empty() {
            return;
        }

        let widget = match self
            .current_widget
            .borrow()
            .as_ref()
            .and_then(|w| w.upgrade())
        {
            Some(w) => w,
            None => return,
        };

        if !widget.is_visible() {
            return;
        }

        let (monitor_width, monitor) = match self.get_monitor_info(&widget) {
            Some(info) => info,
            None => return,
        };

        // cursor_x is relative to the widget's top-left corner.
        let cursor_rel_x = self.cursor_x.get() as i32;
        let widget_in_window_x = self.get_widget_window_x(&widget).unwrap_or(0);
        let cursor_screen_x = widget_in_window_x + cursor_rel_x;

        // The bar's exclusive zone pushes the top anchor below the bar, so
        // only a small vertical offset is needed.
        let tooltip_y = TOOLTIP_CURSOR_OFFSET_Y;

        self.ensure_tooltip_window();

        if let Some(ref tooltip_window) = *self.tooltip_window.borrow() {
            let tooltip_width = tooltip_window.measure_width(&text);
            let effective_width = if tooltip_width > 0 {
                tooltip_width
            } else {
                FALLBACK_TOOLTIP_WIDTH
            };

            let tooltip_x = cursor_screen_x + TOOLTIP_CURSOR_OFFSET_X;

            // Flip to right-edge anchoring when the tooltip would overflow.
            let (anchor, x_margin) =
                if tooltip_x + effective_width > monitor_width - SCREEN_EDGE_MARGIN {
                    let right_margin = (monitor_width - cursor_screen_x + TOOLTIP_CURSOR_OFFSET_X)
                        .max(SCREEN_EDGE_MARGIN);
                    (TooltipAnchor::Right, right_margin)
                } else {
                    (TooltipAnchor::Left, tooltip_x.max(SCREEN_EDGE_MARGIN))
                };

            tooltip_window.show_at(x_margin, tooltip_y, anchor, monitor.as_ref());
        }
    }

    /// Get widget's X coordinate within its root window.
    fn get_widget_window_x(&self, widget: &gtk4::Widget) -> Option<i32> {
        let root = widget.root()?;
        let root_widget = root.clone().upcast::<gtk4::Widget>();
        let point = gtk4::graphene::Point::new(0.0, 0.0);
        let computed = widget.compute_point(&root_widget, &point)?;
        Some(computed.x() as i32)
    }

    fn get_monitor_info(&self, widget: &gtk4::Widget) -> Option<(i32, Option<gtk4::gdk::Monitor>)> {
        let root = widget.root()?;
        let surface = root.downcast_ref::<gtk4::Window>()?.surface()?;

        let display = gtk4::gdk::Display::default()?;
        let monitor = display.monitor_at_surface(&surface);

        let width = monitor
            .as_ref()
            .map(|m| m.geometry().width())
            .unwrap_or(1920);

        Some((width, monitor))
    }

    fn cancel_pending(&self) {
        if let Some(source_id) = self.pending_show.borrow_mut().take() {
            source_id.remove();
        }
    }

    /// Cancel pending timer and hide any visible tooltip.
    pub fn cancel_and_hide(&self) {
        self.cancel_pending();
        self.hide_tooltip();
    }

    fn hide_tooltip(&self) {
        if let Some(ref tooltip_window) = *self.tooltip_window.borrow() {
            tooltip_window.hide();
        }
        *self.current_widget.borrow_mut() = None;
        *self.current_text.borrow_mut() = String::new();
    }

    fn ensure_tooltip_window(&self) {
        if self.tooltip_window.borrow().is_some() {
            return;
        }

        let styles = self.styles.borrow();
        let tooltip_window = TooltipWindow::new(&styles);
        *self.tooltip_window.borrow_mut() = Some(tooltip_window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_surface_styles() {
        let styles = default_surface_styles();
        assert_eq!(styles.background_color, "#16161e");
        assert_eq!(styles.text_color, "#ffffff");
        assert!(styles.font_size > 0);
        assert!(styles.is_dark_mode);
    }
}
