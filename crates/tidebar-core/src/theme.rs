//! Theming for tidebar.
//!
//! `ThemePalette` is the single source of truth for theme values: it parses
//! config, resolves dark/light mode, computes derived colors and sizes, and
//! generates the `:root` CSS variable block the bar stylesheet consumes.

use crate::Config;

// Overlay opacities for widget hover states. Dark mode uses a lower base
// since white overlays on dark read as brighter.
const OVERLAY_OPACITY_DARK: f64 = 0.06;
const OVERLAY_OPACITY_LIGHT: f64 = 0.14;
const HOVER_MULTIPLIER: f64 = 2.2;

// Border opacities
const BORDER_OPACITY_DARK: f64 = 0.10;
const BORDER_OPACITY_LIGHT: f64 = 0.12;

// Foreground opacity for secondary text
const FOREGROUND_MUTED_OPACITY: f64 = 0.7;

// Default surface colors per mode
const DEFAULT_BAR_BG_DARK: &str = "#16161e";
const DEFAULT_BAR_BG_LIGHT: &str = "#e8e8e8";
const DEFAULT_WIDGET_BG_DARK: &str = "#1f2335";
const DEFAULT_WIDGET_BG_LIGHT: &str = "#ffffff";
const DEFAULT_STATE_WARNING: &str = "#e0af68";
const DEFAULT_STATE_URGENT: &str = "#f7768e";

// Size scaling factors, tuned for bar sizes in the 24-48px range.
const FONT_SCALE: f64 = 0.55;
const ICON_SCALE: f64 = 0.55;
const PADDING_SCALE: f64 = 0.25;

/// Parse a hex color string to an RGB tuple. Returns None if invalid.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim().trim_start_matches('#');

    // Expand shorthand ("fff" -> "ffffff")
    let color = if color.len() == 3 {
        color.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        color.to_string()
    };

    if color.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&color[0..2], 16).ok()?;
    let g = u8::from_str_radix(&color[2..4], 16).ok()?;
    let b = u8::from_str_radix(&color[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Relative luminance per the WCAG formula (0.0 = black, 1.0 = white).
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c_srgb = c as f64 / 255.0;
        if c_srgb <= 0.03928 {
            c_srgb / 12.92
        } else {
            ((c_srgb + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// True if the color is considered dark (low luminance).
pub fn is_dark_color(color: &str) -> bool {
    match parse_hex_color(color) {
        Some((r, g, b)) => relative_luminance(r, g, b) < 0.179,
        None => true, // Unparseable colors count as dark
    }
}

/// Convert an RGB tuple to a hex color string.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Format a CSS rgba() color string.
pub fn rgba_str(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({}, {}, {}, {:.2})", r, g, b, a)
}

/// Computed pixel sizes based on bar height.
#[derive(Debug, Clone)]
pub struct ThemeSizes {
    pub bar_height: u32,
    pub widget_padding_x: u32,
    pub font_size: u32,
    pub icon_size: u32,
}

impl Default for ThemeSizes {
    fn default() -> Self {
        Self {
            bar_height: 28,
            widget_padding_x: 7,
            font_size: 13,
            icon_size: 15,
        }
    }
}

/// Styles for tooltip surfaces, derived from the palette.
#[derive(Debug, Clone)]
pub struct SurfaceStyles {
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub border_color: String,
    pub is_dark_mode: bool,
}

/// Where the accent color comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum AccentSource {
    /// Monochrome mode, no colored accents.
    None,
    /// A specific user-supplied color.
    Custom(String),
}

/// Resolved theme values for the whole bar.
///
/// Constructed via `ThemePalette::from_config(&config)`.
#[derive(Debug, Clone)]
pub struct ThemePalette {
    pub is_dark_mode: bool,

    pub bar_background: String,
    pub widget_background: String,

    pub foreground_primary: String,
    pub foreground_muted: String,

    pub accent_source: AccentSource,
    pub accent_primary: String,

    pub state_warning: String,
    pub state_urgent: String,

    pub widget_overlay_hover: String,
    pub border_subtle: String,

    pub font_family: String,

    pub sizes: ThemeSizes,
}

impl ThemePalette {
    /// Create a palette from configuration.
    pub fn from_config(config: &Config) -> Self {
        // Resolve mode first; "auto" follows the widget background luminance.
        let (default_bar_bg, default_widget_bg) = if config.theme.mode == "light" {
            (DEFAULT_BAR_BG_LIGHT, DEFAULT_WIDGET_BG_LIGHT)
        } else {
            (DEFAULT_BAR_BG_DARK, DEFAULT_WIDGET_BG_DARK)
        };

        let bar_background = config
            .theme
            .bar_background_color
            .clone()
            .unwrap_or_else(|| default_bar_bg.to_string());
        let widget_background = config
            .theme
            .widget_background_color
            .clone()
            .unwrap_or_else(|| default_widget_bg.to_string());

        let is_dark_mode = match config.theme.mode.as_str() {
            "dark" => true,
            "light" => false,
            _ => is_dark_color(&widget_background), // "auto"
        };

        let (foreground_primary, foreground_muted, overlay, border) = if is_dark_mode {
            (
                "#ffffff".to_string(),
                format!("rgba(255, 255, 255, {:.2})", FOREGROUND_MUTED_OPACITY),
                rgba_str(255, 255, 255, OVERLAY_OPACITY_DARK * HOVER_MULTIPLIER),
                format!("rgba(255, 255, 255, {:.2})", BORDER_OPACITY_DARK),
            )
        } else {
            (
                "#1a1a1a".to_string(),
                format!("rgba(0, 0, 0, {:.2})", FOREGROUND_MUTED_OPACITY),
                rgba_str(50, 50, 50, OVERLAY_OPACITY_LIGHT * HOVER_MULTIPLIER),
                format!("rgba(0, 0, 0, {:.2})", BORDER_OPACITY_LIGHT),
            )
        };

        let accent_source = match config.theme.accent.as_str() {
            "none" => AccentSource::None,
            color => AccentSource::Custom(color.to_string()),
        };

        let accent_primary = match &accent_source {
            AccentSource::Custom(color) => color.clone(),
            AccentSource::None if is_dark_mode => "rgba(255, 255, 255, 0.25)".to_string(),
            AccentSource::None => "rgba(0, 0, 0, 0.20)".to_string(),
        };

        let font_family = if config.theme.typography.font_family.is_empty() {
            "inherit".to_string()
        } else {
            config.theme.typography.font_family.clone()
        };

        Self {
            is_dark_mode,
            bar_background,
            widget_background,
            foreground_primary,
            foreground_muted,
            accent_source,
            accent_primary,
            state_warning: DEFAULT_STATE_WARNING.to_string(),
            state_urgent: DEFAULT_STATE_URGENT.to_string(),
            widget_overlay_hover: overlay,
            border_subtle: border,
            font_family,
            sizes: compute_sizes(config),
        }
    }

    /// Generate the `:root` CSS variable block.
    pub fn css_vars_block(&self) -> String {
        format!(
            r#"
:root {{
    --color-background-bar: {bar_bg};
    --color-background-widget: {widget_bg};

    --color-foreground-primary: {fg_primary};
    --color-foreground-muted: {fg_muted};

    --color-accent-primary: {accent};

    --color-state-warning: {state_warning};
    --color-state-urgent: {state_urgent};

    --color-widget-overlay-hover: {overlay_hover};
    --color-border-subtle: {border_subtle};

    --bar-height: {bar_height}px;
    --widget-padding-x: {widget_padding_x}px;

    --font-family: {font_family};
    --font-size: {font_size}px;
    --icon-size: {icon_size}px;
}}
"#,
            bar_bg = self.bar_background,
            widget_bg = self.widget_background,
            fg_primary = self.foreground_primary,
            fg_muted = self.foreground_muted,
            accent = self.accent_primary,
            state_warning = self.state_warning,
            state_urgent = self.state_urgent,
            overlay_hover = self.widget_overlay_hover,
            border_subtle = self.border_subtle,
            bar_height = self.sizes.bar_height,
            widget_padding_x = self.sizes.widget_padding_x,
            font_family = self.font_family,
            font_size = self.sizes.font_size,
            icon_size = self.sizes.icon_size,
        )
    }

    /// Surface styling for tooltip windows.
    pub fn surface_styles(&self) -> SurfaceStyles {
        SurfaceStyles {
            background_color: self.widget_background.clone(),
            text_color: self.foreground_primary.clone(),
            font_family: self.font_family.clone(),
            font_size: self.sizes.font_size,
            border_color: self.border_subtle.clone(),
            is_dark_mode: self.is_dark_mode,
        }
    }
}

/// Round up to the nearest even number for pixel-perfect centering.
fn round_to_even(value: u32) -> u32 {
    if value.is_multiple_of(2) { value } else { value + 1 }
}

fn compute_sizes(config: &Config) -> ThemeSizes {
    let bar_size = config.bar.size;

    // Font size comes from typography when set; scaled from bar height
    // otherwise is the fallback only for a zero value (validation rejects it).
    let font_size = if config.theme.typography.font_size > 0 {
        config.theme.typography.font_size
    } else {
        round_to_even((bar_size as f64 * FONT_SCALE) as u32)
    };

    ThemeSizes {
        bar_height: bar_size,
        widget_padding_x: (bar_size as f64 * PADDING_SCALE) as u32,
        font_size,
        icon_size: round_to_even((bar_size as f64 * ICON_SCALE) as u32).max(8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_valid() {
        assert_eq!(parse_hex_color("#ff0000"), Some((255, 0, 0)));
        assert_eq!(parse_hex_color("00ff00"), Some((0, 255, 0)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("000"), Some((0, 0, 0)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_hex_color("not a color"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("#ff"), None);
    }

    #[test]
    fn test_relative_luminance_extremes() {
        assert!((relative_luminance(0, 0, 0) - 0.0).abs() < 0.001);
        assert!((relative_luminance(255, 255, 255) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_is_dark_color() {
        assert!(is_dark_color("#000000"));
        assert!(is_dark_color("#16161e"));
        assert!(!is_dark_color("#ffffff"));
        assert!(!is_dark_color("#e8e8e8"));
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(255, 0, 0), "#ff0000");
        assert_eq!(rgb_to_hex(0, 0, 255), "#0000ff");
    }

    #[test]
    fn test_rgba_str() {
        assert_eq!(rgba_str(255, 0, 0, 0.5), "rgba(255, 0, 0, 0.50)");
    }

    #[test]
    fn test_palette_default_is_dark() {
        let config = Config::default();
        let palette = ThemePalette::from_config(&config);
        assert!(palette.is_dark_mode);
        assert_eq!(palette.foreground_primary, "#ffffff");
    }

    #[test]
    fn test_palette_light_mode() {
        let mut config = Config::default();
        config.theme.mode = "light".to_string();
        let palette = ThemePalette::from_config(&config);
        assert!(!palette.is_dark_mode);
        assert_eq!(palette.foreground_primary, "#1a1a1a");
    }

    #[test]
    fn test_palette_auto_mode_follows_background() {
        let mut config = Config::default();
        config.theme.mode = "auto".to_string();
        config.theme.widget_background_color = Some("#ffffff".to_string());
        let palette = ThemePalette::from_config(&config);
        assert!(!palette.is_dark_mode);
    }

    #[test]
    fn test_accent_custom_color() {
        let mut config = Config::default();
        config.theme.accent = "#ff0000".to_string();

        let palette = ThemePalette::from_config(&config);

        assert_eq!(
            palette.accent_source,
            AccentSource::Custom("#ff0000".to_string())
        );
        let css = palette.css_vars_block();
        assert!(css.contains("--color-accent-primary: #ff0000"));
    }

    #[test]
    fn test_accent_none_monochrome() {
        let mut config = Config::default();
        config.theme.accent = "none".to_string();

        let palette = ThemePalette::from_config(&config);

        assert_eq!(palette.accent_source, AccentSource::None);
        assert!(palette.accent_primary.contains("rgba"));
    }

    #[test]
    fn test_css_vars_contains_expected_vars() {
        let palette = ThemePalette::from_config(&Config::default());
        let css = palette.css_vars_block();

        assert!(css.contains("--color-background-bar:"));
        assert!(css.contains("--color-foreground-primary:"));
        assert!(css.contains("--bar-height: 28px"));
        assert!(css.contains("--font-family:"));
    }

    #[test]
    fn test_sizes_follow_bar_size() {
        let mut config = Config::default();
        config.bar.size = 48;
        config.theme.typography.font_size = 16;
        let palette = ThemePalette::from_config(&config);

        assert_eq!(palette.sizes.bar_height, 48);
        assert_eq!(palette.sizes.font_size, 16);
        assert!(palette.sizes.icon_size >= 8);
        assert!(palette.sizes.icon_size.is_multiple_of(2));
    }

    #[test]
    fn test_surface_styles_from_palette() {
        let palette = ThemePalette::from_config(&Config::default());
        let styles = palette.surface_styles();

        assert_eq!(styles.background_color, palette.widget_background);
        assert_eq!(styles.is_dark_mode, palette.is_dark_mode);
    }
}
