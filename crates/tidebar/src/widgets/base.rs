//! Shared base widget abstraction for tidebar widgets.
//!
//! Provides a thin, reusable wrapper around a root `gtk4::Box` with common
//! CSS classes and helpers for labels, icons, and click commands.

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, GestureClick, Label, Orientation};

use crate::services::icons::{IconHandle, IconsService};
use crate::services::spawn::spawn_command;
use crate::styles::{class, state};

/// Shared base widget container.
///
/// Each widget owns a `BaseWidget` instance and exposes the underlying
/// `gtk4::Box` as its root widget.
///
/// The BaseWidget automatically creates an inner `.content` box for
/// consistent padding and theming across all widgets. Widgets should add
/// their children to `content()` rather than `widget()` directly.
pub struct BaseWidget {
    container: GtkBox,
    content: GtkBox,
}

impl BaseWidget {
    /// Create a new base widget container.
    ///
    /// - Uses a horizontal box with zero internal spacing.
    /// - Always adds the `widget` CSS class.
    /// - Creates an inner `.content` box for consistent padding/margins.
    /// - Applies any additional CSS classes passed in `extra_classes`.
    pub fn new(extra_classes: &[&str]) -> Self {
        let container = GtkBox::new(Orientation::Horizontal, 0);
        container.add_css_class(class::WIDGET);
        container.set_hexpand(false);
        for cls in extra_classes {
            container.add_css_class(cls);
        }

        // Child spacing is controlled via CSS (see .widget > .content rules).
        let content = GtkBox::new(Orientation::Horizontal, 0);
        content.add_css_class(class::CONTENT);
        content.set_vexpand(true);
        content.set_valign(Align::Fill);
        // Baseline alignment causes vertical offset issues with mixed text/icons.
        content.set_baseline_position(gtk4::BaselinePosition::Center);
        container.append(&content);

        Self { container, content }
    }

    /// Get the root GTK container for this widget.
    ///
    /// Most widgets should use `content()` to add children instead.
    pub fn widget(&self) -> &GtkBox {
        &self.container
    }

    /// Get the inner content box for adding widget children.
    pub fn content(&self) -> &GtkBox {
        &self.content
    }

    /// Create an icon via `IconsService`, pack it into the content box, and
    /// return its handle.
    pub fn add_icon(&self, icon_name: &str, css_classes: &[&str]) -> IconHandle {
        let icons = IconsService::global();
        let handle = icons.create_icon(icon_name, css_classes);
        self.content.append(&handle.widget());
        handle
    }

    /// Create a label and append it to the content box.
    pub fn add_label(&self, text: Option<&str>, css_classes: &[&str]) -> Label {
        let label = Label::new(text);
        for class in css_classes {
            label.add_css_class(class);
        }
        self.content.append(&label);
        label
    }

    /// Run a shell command on primary-button click.
    pub fn set_click_command(&self, command: &str) {
        let command = command.to_string();
        if command.trim().is_empty() {
            return;
        }

        self.container.add_css_class(state::CLICKABLE);

        let gesture = GestureClick::new();
        gesture.set_button(gtk4::gdk::BUTTON_PRIMARY);
        gesture.connect_pressed(move |_gesture, n_press, _x, _y| {
            if n_press == 1 {
                spawn_command(&command);
            }
        });
        self.container.add_controller(gesture);
    }
}
