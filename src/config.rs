//! Configuration: built-in defaults, the user file, and typed settings.
//!
//! The user file at `~/.config/upnext/config.toml` is optional and partial:
//! whatever it contains is deep-merged over [`default_config`], so a user
//! can override one label or append a palette color without restating the
//! rest of the tree.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use upnext_core::merge::{merge, Value};

/// Default calendar badge palette.
const DEFAULT_PALETTE: [&str; 17] = [
    "#ef5350", "#ec407a", "#ab47bc", "#7e57c2", "#5c6bc0", "#42a5f5", "#29b6f6", "#26c6da",
    "#26a69a", "#66bb6a", "#9ccc65", "#d4e157", "#ffee58", "#ffca28", "#ffa726", "#ff7043",
    "#8d6e63",
];

const DEFAULT_DAYS_AHEAD: u32 = 6;
const DEFAULT_MAX_DAY_GROUPS: usize = 2;

/// Get the config file path (~/.config/upnext/config.toml)
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("upnext");
    Ok(config_dir.join("config.toml"))
}

/// Built-in display defaults, as a merge tree.
pub fn default_config() -> Value {
    Value::mapping([
        ("days_ahead", Value::from(DEFAULT_DAYS_AHEAD as i64)),
        ("max_day_groups", Value::from(DEFAULT_MAX_DAY_GROUPS as i64)),
        (
            "display",
            Value::mapping([
                ("show_location", Value::from(true)),
                ("show_attendees", Value::from(true)),
                ("show_notes", Value::from(true)),
                (
                    "labels",
                    Value::mapping([
                        ("today", Value::from("Today")),
                        ("tomorrow", Value::from("Tomorrow")),
                    ]),
                ),
            ]),
        ),
        (
            "palette",
            Value::mapping([(
                "colors",
                Value::sequence(DEFAULT_PALETTE.iter().copied().map(Value::from)),
            )]),
        ),
    ])
}

/// Load the merged configuration tree: the user file over the defaults.
/// A missing file just means defaults.
pub fn load() -> Result<Value> {
    let defaults = default_config();
    let path = config_path()?;

    if !path.exists() {
        return Ok(defaults);
    }

    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let user: toml::Value =
        toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(merge(&defaults, &Value::from(user)))
}

/// Typed view over the merged tree.
///
/// A value of an unexpected shape falls back to its default instead of
/// failing the whole display.
#[derive(Debug, Clone)]
pub struct Settings {
    pub days_ahead: u32,
    pub max_day_groups: usize,
    pub show_location: bool,
    pub show_attendees: bool,
    pub show_notes: bool,
    pub label_today: String,
    pub label_tomorrow: String,
    pub palette: Vec<String>,
}

impl Settings {
    pub fn from_tree(tree: &Value) -> Self {
        let flag = |path: &str| tree.lookup(path).and_then(Value::as_bool).unwrap_or(true);
        let label = |path: &str, fallback: &str| {
            tree.lookup(path)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        let palette = tree
            .lookup("palette.colors")
            .and_then(Value::as_sequence)
            .map(|colors| {
                colors
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|colors| !colors.is_empty())
            .unwrap_or_else(|| DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect());

        Settings {
            days_ahead: tree
                .lookup("days_ahead")
                .and_then(Value::as_integer)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_DAYS_AHEAD),
            max_day_groups: tree
                .lookup("max_day_groups")
                .and_then(Value::as_integer)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(DEFAULT_MAX_DAY_GROUPS),
            show_location: flag("display.show_location"),
            show_attendees: flag("display.show_attendees"),
            show_notes: flag("display.show_notes"),
            label_today: label("display.labels.today", "Today"),
            label_tomorrow: label("display.labels.tomorrow", "Tomorrow"),
            palette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::from_tree(&default_config());

        assert_eq!(settings.days_ahead, 6);
        assert_eq!(settings.max_day_groups, 2);
        assert!(settings.show_location);
        assert_eq!(settings.label_today, "Today");
        assert_eq!(settings.palette.len(), 17);
        assert_eq!(settings.palette[0], "#ef5350");
    }

    #[test]
    fn test_user_overrides_merge_over_defaults() {
        let user: toml::Value = toml::from_str(
            r#"
            days_ahead = 14
            [display]
            show_notes = false
            [display.labels]
            today = "Heute"
            "#,
        )
        .unwrap();

        let merged = merge(&default_config(), &Value::from(user));
        let settings = Settings::from_tree(&merged);

        assert_eq!(settings.days_ahead, 14);
        assert!(!settings.show_notes);
        assert_eq!(settings.label_today, "Heute");
        // Untouched branches keep their defaults.
        assert_eq!(settings.label_tomorrow, "Tomorrow");
        assert!(settings.show_location);
        assert_eq!(settings.palette.len(), 17);
    }

    #[test]
    fn test_user_palette_colors_union_with_defaults() {
        let user: toml::Value = toml::from_str(
            r##"
            [palette]
            colors = ["#ef5350", "#000000"]
            "##,
        )
        .unwrap();

        let merged = merge(&default_config(), &Value::from(user));
        let settings = Settings::from_tree(&merged);

        // "#ef5350" already sits at index 0; "#000000" is new and lands at
        // the end of the default palette.
        assert_eq!(settings.palette.len(), 18);
        assert_eq!(settings.palette[17], "#000000");
    }

    #[test]
    fn test_badly_typed_values_fall_back() {
        let user: toml::Value = toml::from_str(r#"days_ahead = "soon""#).unwrap();

        let merged = merge(&default_config(), &Value::from(user));
        let settings = Settings::from_tree(&merged);

        assert_eq!(settings.days_ahead, 6);
    }
}
