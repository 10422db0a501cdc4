//! IconsService - process-wide icon rendering for the bar.
//!
//! Icons are rendered through GTK's icon theme (Adwaita, Breeze, Papirus,
//! etc.) as symbolic `gtk4::Image` widgets. Widgets hold an `IconHandle` and
//! update it by logical name; the handle resolves the logical name to
//! whatever the active theme actually ships. A name no theme can satisfy
//! hides the icon rather than showing a broken-image placeholder.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{IconTheme, Image};
use tracing::{debug, warn};

use crate::styles::icon;

thread_local! {
    static ICONS_INSTANCE: RefCell<Option<Rc<IconsService>>> = const { RefCell::new(None) };
}

/// Maps logical icon names to theme icon name candidates, in priority order.
///
/// Names follow the freedesktop.org icon naming spec. Themes differ in which
/// names they implement, so each logical name carries fallbacks; the resolver
/// takes the first one `IconTheme::has_icon()` accepts.
pub fn icon_candidates(logical: &str) -> &'static [&'static str] {
    match logical {
        "battery-full" => &[
            "battery-level-100-symbolic",
            "battery-full-symbolic",
            "battery-good-symbolic",
            "battery-symbolic",
        ],
        "battery-high" => &[
            "battery-level-80-symbolic",
            "battery-good-symbolic",
            "battery-full-symbolic",
            "battery-symbolic",
        ],
        "battery-medium" => &[
            "battery-level-50-symbolic",
            "battery-good-symbolic",
            "battery-symbolic",
        ],
        "battery-low" => &[
            "battery-level-20-symbolic",
            "battery-low-symbolic",
            "battery-caution-symbolic",
            "battery-symbolic",
        ],
        "battery-critical" => &[
            "battery-level-10-symbolic",
            "battery-caution-symbolic",
            "battery-empty-symbolic",
            "battery-low-symbolic",
            "battery-symbolic",
        ],
        "battery-missing" => &[
            "battery-missing-symbolic",
            "battery-empty-symbolic",
            "battery-caution-symbolic",
            "battery-symbolic",
        ],
        "battery-full-charging" => &[
            "battery-level-100-charged-symbolic",
            "battery-full-charging-symbolic",
            "battery-good-charging-symbolic",
            "battery-full-symbolic",
            "battery-symbolic",
        ],
        "battery-high-charging" => &[
            "battery-level-80-charging-symbolic",
            "battery-good-charging-symbolic",
            "battery-full-charging-symbolic",
            "battery-symbolic",
        ],
        "battery-medium-charging" => &[
            "battery-level-50-charging-symbolic",
            "battery-good-charging-symbolic",
            "battery-good-symbolic",
            "battery-symbolic",
        ],
        "battery-low-charging" => &[
            "battery-level-20-charging-symbolic",
            "battery-low-charging-symbolic",
            "battery-caution-charging-symbolic",
            "battery-symbolic",
        ],
        "battery-critical-charging" => &[
            "battery-level-10-charging-symbolic",
            "battery-caution-charging-symbolic",
            "battery-empty-charging-symbolic",
            "battery-symbolic",
        ],
        "memory" => &[
            "memory-symbolic",
            "drive-harddisk-solidstate-symbolic",
            "utilities-system-monitor-symbolic",
        ],
        _ => &[],
    }
}

/// Resolve a logical icon name against a theme.
///
/// Tries the mapped candidates first. Unknown logical names are treated as
/// direct theme names, with a `-symbolic` variant attempted before giving up.
fn resolve_icon(theme: &IconTheme, logical: &str) -> Option<String> {
    let candidates = icon_candidates(logical);
    if !candidates.is_empty() {
        return candidates
            .iter()
            .find(|c| theme.has_icon(c))
            .map(|c| c.to_string());
    }

    if theme.has_icon(logical) {
        return Some(logical.to_string());
    }
    if !logical.ends_with("-symbolic") {
        let symbolic = format!("{}-symbolic", logical);
        if theme.has_icon(&symbolic) {
            return Some(symbolic);
        }
    }
    None
}

struct IconHandleInner {
    image: Image,
    logical_name: RefCell<String>,
}

impl IconHandleInner {
    fn apply_icon(&self, theme: Option<&IconTheme>, name: &str) {
        *self.logical_name.borrow_mut() = name.to_string();

        let resolved = theme.and_then(|t| resolve_icon(t, name));
        match resolved {
            Some(theme_name) => {
                self.image.set_icon_name(Some(&theme_name));
                self.image.set_visible(true);
            }
            None => {
                // No theme match; hide rather than show a broken placeholder.
                debug!("No theme icon for '{}', hiding", name);
                self.image.set_visible(false);
            }
        }
    }
}

/// A handle to an icon widget.
///
/// Call `set_icon` with a logical name like "battery-low-charging" to change
/// the displayed icon.
#[derive(Clone)]
pub struct IconHandle {
    inner: Rc<IconHandleInner>,
}

impl IconHandle {
    pub fn widget(&self) -> gtk4::Widget {
        self.inner.image.clone().upcast()
    }

    pub fn add_css_class(&self, class: &str) {
        self.inner.image.add_css_class(class);
    }

    pub fn remove_css_class(&self, class: &str) {
        self.inner.image.remove_css_class(class);
    }

    /// Update the displayed icon by logical name.
    pub fn set_icon(&self, name: &str) {
        let theme = IconsService::global();
        self.inner.apply_icon(theme.icon_theme.borrow().as_ref(), name);
    }
}

/// Process-wide icon service singleton.
///
/// Holds the display's icon theme and hands out `IconHandle`s. Listens for
/// the theme's `changed` signal so icons re-resolve when the system icon
/// theme is switched at runtime.
pub struct IconsService {
    icon_theme: RefCell<Option<IconTheme>>,
    handles: RefCell<Vec<std::rc::Weak<IconHandleInner>>>,
}

impl IconsService {
    fn new() -> Rc<Self> {
        let service = Rc::new(Self {
            icon_theme: RefCell::new(None),
            handles: RefCell::new(Vec::new()),
        });

        if let Some(display) = gtk4::gdk::Display::default() {
            let theme = IconTheme::for_display(&display);

            let weak = Rc::downgrade(&service);
            theme.connect_changed(move |_| {
                if let Some(service) = weak.upgrade() {
                    service.reapply_all_icons();
                }
            });

            *service.icon_theme.borrow_mut() = Some(theme);
        } else {
            warn!("No display available; icons will not render");
        }

        service
    }

    /// Get the global IconsService singleton, creating it on first use.
    pub fn global() -> Rc<Self> {
        ICONS_INSTANCE.with(|cell| {
            let mut opt = cell.borrow_mut();
            if opt.is_none() {
                *opt = Some(IconsService::new());
            }
            opt.as_ref().unwrap().clone()
        })
    }

    /// Create an icon widget with the given initial icon and CSS classes.
    pub fn create_icon(&self, name: &str, css_classes: &[&str]) -> IconHandle {
        let image = Image::new();
        image.add_css_class(icon::ROOT);
        for class in css_classes {
            image.add_css_class(class);
        }

        let inner = Rc::new(IconHandleInner {
            image,
            logical_name: RefCell::new(String::new()),
        });
        self.handles.borrow_mut().push(Rc::downgrade(&inner));

        inner.apply_icon(self.icon_theme.borrow().as_ref(), name);
        IconHandle { inner }
    }

    /// Re-resolve every live handle's icon against the current theme.
    fn reapply_all_icons(&self) {
        let theme = self.icon_theme.borrow();
        let mut handles = self.handles.borrow_mut();
        handles.retain(|weak| {
            if let Some(inner) = weak.upgrade() {
                let name = inner.logical_name.borrow().clone();
                if !name.is_empty() {
                    inner.apply_icon(theme.as_ref(), &name);
                }
                true
            } else {
                false
            }
        });
        debug!("Re-resolved icons for {} active handles", handles.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_logical_names_have_candidates() {
        for name in [
            "battery-full",
            "battery-critical-charging",
            "battery-missing",
            "memory",
        ] {
            assert!(
                !icon_candidates(name).is_empty(),
                "no candidates for {}",
                name
            );
        }
    }

    #[test]
    fn test_candidates_are_symbolic() {
        // Bar icons follow the foreground color, which needs symbolic icons.
        for candidate in icon_candidates("battery-full") {
            assert!(candidate.ends_with("-symbolic"));
        }
    }

    #[test]
    fn test_unknown_logical_name_has_no_candidates() {
        assert!(icon_candidates("definitely-unmapped").is_empty());
    }
}
