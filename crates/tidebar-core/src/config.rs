//! Configuration types and parsing.
//!
//! The root [`Config`] is a stable, serialization-friendly schema. User
//! config is deep-merged over the embedded default TOML so a partial file
//! inherits sensible widget definitions. Widget-specific options stay as raw
//! TOML values here; each widget validates its own table through the
//! descriptor schema in [`crate::schema`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use toml::Table;

use crate::error::{Error, Result};

/// Known valid values for theme.mode.
const VALID_THEME_MODES: &[&str] = &["auto", "dark", "light"];

/// Embedded default configuration TOML, compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config.toml");

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path where config was found, if any.
    pub source: Option<PathBuf>,
    /// Whether defaults were used (no config file found).
    pub used_defaults: bool,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Bar-level configuration.
    pub bar: BarConfig,

    /// Widget placement and per-widget option tables.
    pub widgets: WidgetsConfig,

    /// Theme configuration (colors, typography).
    pub theme: ThemeConfig,
}

impl Config {
    /// Load configuration from the embedded default TOML string.
    pub fn from_default_toml() -> Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, merging with embedded defaults.
    ///
    /// Returns an error if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_with_defaults(&content)
    }

    /// Load configuration from a TOML string, merging with embedded defaults.
    ///
    /// Both the default config and the user config are parsed as TOML
    /// tables, deep-merged (user values win), then deserialized.
    pub fn load_with_defaults(user_toml: &str) -> Result<Self> {
        // Embedded and covered by tests, so parsing cannot fail at runtime.
        let mut base: Table = toml::from_str(DEFAULT_CONFIG_TOML)
            .expect("embedded DEFAULT_CONFIG_TOML should always be valid");

        let user: Table = toml::from_str(user_toml)?;

        deep_merge_toml(&mut base, user);

        let config: Config = base.try_into()?;
        Ok(config)
    }

    /// Find and load configuration using the XDG lookup chain.
    ///
    /// If `explicit_path` is `Some`, that path is used directly and an error
    /// is returned if it doesn't exist or can't be parsed (no fallback).
    ///
    /// Otherwise, searches in order:
    /// 1. `$XDG_CONFIG_HOME/tidebar/config.toml`
    /// 2. `~/.config/tidebar/config.toml`
    /// 3. `./config.toml` (current working directory)
    ///
    /// A config file that exists but fails to load is an error rather than a
    /// silent fallback; embedded defaults are used only when no file exists.
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult> {
        if let Some(path) = explicit_path {
            let config = Self::load(path)?;
            return Ok(ConfigLoadResult {
                config,
                source: Some(path.to_path_buf()),
                used_defaults: false,
            });
        }

        let search_paths = Self::config_search_paths();

        for path in &search_paths {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(config) => {
                    return Ok(ConfigLoadResult {
                        config,
                        source: Some(path.clone()),
                        used_defaults: false,
                    });
                }
                Err(e) => {
                    tracing::error!("Config file {:?} exists but failed to load: {}", path, e);
                    return Err(e);
                }
            }
        }

        tracing::info!("No config file found, using built-in default config");
        tracing::debug!(
            "Searched: {}",
            search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let config = Self::from_default_toml()?;

        Ok(ConfigLoadResult {
            config,
            source: None,
            used_defaults: true,
        })
    }

    /// Get the list of paths to search for config files.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("tidebar/config.toml"));
        }

        if let Ok(home) = env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/tidebar/config.toml"));
        }

        paths.push(PathBuf::from("config.toml"));

        paths
    }

    /// Validate the configuration, returning errors for invalid values.
    ///
    /// Strict: any invalid value is an error. All errors are collected and
    /// returned together as [`Error::ConfigValidation`].
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !VALID_THEME_MODES.contains(&self.theme.mode.as_str()) {
            errors.push(format!(
                "theme.mode: invalid value '{}', expected one of: {}",
                self.theme.mode,
                VALID_THEME_MODES.join(", ")
            ));
        }

        // theme.accent: "none" or a hex color.
        let accent = self.theme.accent.as_str();
        if accent != "none" && crate::theme::parse_hex_color(accent).is_none() {
            errors.push(format!(
                "theme.accent: invalid value '{}', expected 'none' or a hex color like '#7aa2f7'",
                accent
            ));
        }

        for (key, value) in [
            ("theme.widget_background_color", &self.theme.widget_background_color),
            ("theme.bar_background_color", &self.theme.bar_background_color),
        ] {
            if let Some(color) = value
                && crate::theme::parse_hex_color(color).is_none()
            {
                errors.push(format!(
                    "{}: invalid value '{}', expected a hex color like '#16161e'",
                    key, color
                ));
            }
        }

        if self.bar.size == 0 {
            errors.push("bar.size: must be greater than 0".to_string());
        }

        if self.theme.typography.font_size == 0 {
            errors.push("theme.typography.font_size: must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(errors))
        }
    }

    /// Check for potential configuration issues and return warnings.
    ///
    /// Unlike `validate()`, these are non-fatal issues that usually indicate
    /// typos or unused configuration.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for name in self.widgets.unreferenced_configs() {
            warnings.push(format!(
                "widgets.{}: config defined but widget not placed in any section (possible typo?)",
                name
            ));
        }

        warnings
    }

    /// Print a human-readable summary of the configuration.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push("Bar:".to_string());
        lines.push(format!("  size: {}px", self.bar.size));
        lines.push(format!("  widget_spacing: {}px", self.bar.widget_spacing));
        lines.push(format!("  outer_margin: {}px", self.bar.outer_margin));
        if !self.bar.outputs.is_empty() {
            lines.push(format!("  outputs: {:?}", self.bar.outputs));
        }

        lines.push("Widgets:".to_string());
        for (section, names) in [
            ("left", &self.widgets.left),
            ("center", &self.widgets.center),
            ("right", &self.widgets.right),
        ] {
            lines.push(format!("  {}: {}", section, names.join(", ")));
        }

        lines.push("Theme:".to_string());
        lines.push(format!("  mode: {}", self.theme.mode));
        lines.push(format!("  accent: {}", self.theme.accent));
        lines.push(format!(
            "  font: {} {}px",
            self.theme.typography.font_family, self.theme.typography.font_size
        ));

        lines.join("\n")
    }
}

/// Deep merge two TOML tables, with `overlay` values taking precedence.
///
/// Nested tables are merged recursively; arrays and scalars are replaced
/// wholesale by the overlay value.
fn deep_merge_toml(base: &mut Table, overlay: Table) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(&key), overlay_value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge_toml(base_table, overlay_table);
            }
            (_, overlay_value) => {
                base.insert(key, overlay_value);
            }
        }
    }
}

/// Bar-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarConfig {
    /// Bar height in pixels.
    pub size: u32,

    /// Spacing between widgets in pixels.
    pub widget_spacing: u32,

    /// Distance from screen edge to bar window in pixels.
    pub outer_margin: u32,

    /// Output allow-list for bar windows.
    /// If empty, bars are created on all monitors.
    pub outputs: Vec<String>,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            size: 28,
            widget_spacing: 8,
            outer_margin: 0,
            outputs: Vec::new(),
        }
    }
}

/// Widget section configuration.
///
/// Placement arrays hold widget names; widget-specific options live in
/// separate `[widgets.<name>]` tables.
///
/// # Example
///
/// ```toml
/// [widgets]
/// right = ["memory", "battery"]
///
/// [widgets.battery]
/// battery = "BAT1"
///
/// [widgets.memory]
/// disabled = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetsConfig {
    /// Widget names in the left section.
    pub left: Vec<String>,

    /// Widget names in the center section.
    pub center: Vec<String>,

    /// Widget names in the right section.
    pub right: Vec<String>,

    /// Per-widget configuration tables, keyed by widget name.
    #[serde(flatten)]
    pub widget_configs: HashMap<String, WidgetOptions>,
}

impl WidgetsConfig {
    /// Check if a widget is disabled via its `[widgets.<name>]` table.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.widget_configs
            .get(name)
            .map(|opts| opts.disabled)
            .unwrap_or(false)
    }

    /// Resolve a widget name to a [`WidgetEntry`], applying its option
    /// table. Returns `None` for disabled widgets.
    pub fn resolve_widget(&self, name: &str) -> Option<WidgetEntry> {
        if self.is_disabled(name) {
            return None;
        }

        let options = self
            .widget_configs
            .get(name)
            .map(|opts| opts.options.clone())
            .unwrap_or_default();

        Some(WidgetEntry {
            name: name.to_string(),
            options,
        })
    }

    /// Resolve every enabled widget in a section, in placement order.
    pub fn resolve_section(&self, names: &[String]) -> Vec<WidgetEntry> {
        names
            .iter()
            .filter_map(|name| self.resolve_widget(name))
            .collect()
    }

    /// Get all widget names referenced in any placement array.
    pub fn all_referenced_widgets(&self) -> std::collections::HashSet<String> {
        let mut names = std::collections::HashSet::new();
        for section in [&self.left, &self.center, &self.right] {
            for name in section {
                names.insert(name.clone());
            }
        }
        names
    }

    /// Widget config tables not referenced by any placement array.
    pub fn unreferenced_configs(&self) -> Vec<String> {
        let referenced = self.all_referenced_widgets();
        let mut names: Vec<String> = self
            .widget_configs
            .keys()
            .filter(|name| !referenced.contains(*name))
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// Per-widget configuration options.
///
/// The `disabled` field is common to all widgets; everything else is kept as
/// raw TOML values for the widget's descriptor schema to validate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetOptions {
    /// If true, this widget is hidden from all sections where it would appear.
    #[serde(default)]
    pub disabled: bool,

    /// Widget-specific options (format, update_interval, etc.).
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

/// A resolved widget entry with name and raw options, ready for the widget
/// factory.
#[derive(Debug, Clone)]
pub struct WidgetEntry {
    /// Widget type name (e.g., "clock", "battery", "memory").
    pub name: String,

    /// Raw widget options from `[widgets.<name>]`.
    pub options: HashMap<String, toml::Value>,
}

impl WidgetEntry {
    /// Create a new widget entry with the given name and empty options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: HashMap::new(),
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Theme mode: "auto", "dark", "light".
    /// "auto" detects from the widget background luminance.
    pub mode: String,

    /// Accent color: "none" for monochrome, or a hex color like "#7aa2f7".
    pub accent: String,

    /// Widget background color override (hex). Derived from mode when unset.
    pub widget_background_color: Option<String>,

    /// Bar background color override (hex). Derived from mode when unset.
    pub bar_background_color: Option<String>,

    /// Typography settings.
    pub typography: ThemeTypography,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: "auto".to_string(),
            accent: "#7aa2f7".to_string(),
            widget_background_color: None,
            bar_background_color: None,
            typography: ThemeTypography::default(),
        }
    }
}

/// Theme typography settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeTypography {
    /// Base font family.
    pub font_family: String,

    /// Base font size in pixels.
    pub font_size: u32,
}

impl Default for ThemeTypography {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bar.size, 28);
        assert_eq!(config.bar.widget_spacing, 8);
        assert_eq!(config.theme.mode, "auto");
        assert_eq!(config.theme.accent, "#7aa2f7");
        assert_eq!(config.theme.typography.font_family, "monospace");
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_embedded_default_config_parses_and_validates() {
        let config = Config::from_default_toml().expect("embedded default config should parse");
        assert!(config.validate().is_ok());
        // The embedded config is the user-facing example; it should place
        // the three shipped widgets.
        assert!(config.widgets.center.contains(&"clock".to_string()));
        assert!(config.widgets.right.contains(&"battery".to_string()));
        assert!(config.widgets.right.contains(&"memory".to_string()));
    }

    #[test]
    fn test_parse_minimal_toml() {
        // Direct TOML parsing (without merge) uses struct defaults.
        let toml = r#"
            [bar]
            size = 40
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bar.size, 40);
        assert_eq!(config.bar.widget_spacing, 8);
        assert!(config.widgets.left.is_empty());
    }

    #[test]
    fn test_load_with_defaults_minimal_config() {
        // A minimal config inherits widgets from the embedded defaults.
        let user_toml = r#"
            [bar]
            size = 40
        "#;

        let config = Config::load_with_defaults(user_toml).unwrap();

        assert_eq!(config.bar.size, 40);
        assert!(
            !config.widgets.right.is_empty(),
            "right widgets should inherit from defaults"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_with_defaults_override_widgets() {
        let user_toml = r#"
            [widgets]
            center = []
            right = ["clock"]
        "#;

        let config = Config::load_with_defaults(user_toml).unwrap();

        assert!(config.widgets.center.is_empty());
        assert_eq!(config.widgets.right, vec!["clock".to_string()]);
    }

    #[test]
    fn test_load_with_defaults_nested_override() {
        let user_toml = r#"
            [theme]
            mode = "light"
        "#;

        let config = Config::load_with_defaults(user_toml).unwrap();

        assert_eq!(config.theme.mode, "light");
        // Other theme values come from the embedded defaults.
        assert_eq!(config.theme.accent, "#7aa2f7");
    }

    #[test]
    fn test_load_with_defaults_rejects_unknown_fields() {
        let user_toml = r#"
            [bar]
            sizee = 40
        "#;

        let result = Config::load_with_defaults(user_toml);
        assert!(result.is_err());

        let err = result.unwrap_err().to_string();
        assert!(err.contains("sizee"), "error should mention the unknown field");
    }

    #[test]
    fn test_deep_merge_toml_tables() {
        let mut base: Table = toml::from_str(
            r#"
            [section]
            a = 1
            b = 2
        "#,
        )
        .unwrap();

        let overlay: Table = toml::from_str(
            r#"
            [section]
            b = 99
            c = 3
        "#,
        )
        .unwrap();

        deep_merge_toml(&mut base, overlay);

        let section = base.get("section").unwrap().as_table().unwrap();
        assert_eq!(section.get("a").unwrap().as_integer(), Some(1));
        assert_eq!(section.get("b").unwrap().as_integer(), Some(99));
        assert_eq!(section.get("c").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn test_deep_merge_toml_arrays_replace() {
        let mut base: Table = toml::from_str("items = [1, 2, 3]").unwrap();
        let overlay: Table = toml::from_str("items = [99]").unwrap();

        deep_merge_toml(&mut base, overlay);

        let items = base.get("items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_integer(), Some(99));
    }

    #[test]
    fn test_validate_invalid_theme_mode() {
        let mut config = Config::default();
        config.theme.mode = "night".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("theme.mode"));
    }

    #[test]
    fn test_validate_invalid_accent() {
        let mut config = Config::default();
        config.theme.accent = "blue".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("theme.accent"));
    }

    #[test]
    fn test_validate_accent_none_ok() {
        let mut config = Config::default();
        config.theme.accent = "none".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_multiple_errors_collected() {
        let mut config = Config::default();
        config.theme.mode = "invalid".to_string();
        config.bar.size = 0;

        let err = config.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("theme.mode"));
        assert!(msg.contains("bar.size"));
    }

    #[test]
    fn test_widget_disabled() {
        let toml = r#"
            [widgets]
            right = ["clock", "battery"]

            [widgets.battery]
            disabled = true
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.widgets.is_disabled("battery"));
        assert!(!config.widgets.is_disabled("clock"));

        let resolved = config.widgets.resolve_section(&config.widgets.right);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "clock");
    }

    #[test]
    fn test_widget_resolve_with_options() {
        let toml = r#"
            [widgets]
            right = ["battery"]

            [widgets.battery]
            battery = "BAT1"
            update_interval = 10
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        let resolved = config.widgets.resolve_section(&config.widgets.right);

        assert_eq!(resolved.len(), 1);
        let entry = &resolved[0];
        assert_eq!(entry.name, "battery");
        assert_eq!(
            entry.options.get("battery").and_then(|v| v.as_str()),
            Some("BAT1")
        );
        assert_eq!(
            entry.options.get("update_interval").and_then(|v| v.as_integer()),
            Some(10)
        );
    }

    #[test]
    fn test_unreferenced_config_warning() {
        let toml = r#"
            [widgets]
            right = ["clock"]

            [widgets.clokc]
            format = "%H:%M"
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        let unreferenced = config.widgets.unreferenced_configs();
        assert_eq!(unreferenced, vec!["clokc".to_string()]);

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("clokc"));
    }

    #[test]
    fn test_config_search_paths() {
        let paths = Config::config_search_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().any(|p| p.ends_with("config.toml")));
    }
}
