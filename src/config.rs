// src/config.rs

//! Runtime configuration for the demo binary.
//!
//! Everything has a default, so an empty JSON object (or no file at all) gives
//! the stock 640×480 window. A file is picked up from the path in
//! `SOFTFRAME_CONFIG` when that variable is set.
//!
//! Colors may be written as `"#RRGGBB"`, `"#AARRGGBB"` or a plain integer.

use crate::color;
use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "SOFTFRAME_CONFIG";

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;
pub const DEFAULT_TITLE: &str = "X11 Engine Split";

/// Largest per-frame step accepted on either axis.
pub const MAX_VELOCITY: i32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub frame: FrameConfig,
}

/// The one window the process opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// What the demo loop draws each frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    #[serde(with = "hex_color")]
    pub background: u32,
    #[serde(with = "hex_color")]
    pub border_color: u32,
    /// Border thickness in pixels; 0 disables it.
    pub border_width: i32,
    #[serde(with = "hex_color")]
    pub rect_color: u32,
    pub rect_width: i32,
    pub rect_height: i32,
    /// Pixels per frame along each axis.
    pub velocity_x: i32,
    pub velocity_y: i32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            background: color::rgb(0x18, 0x18, 0x20),
            border_color: color::rgb(0x40, 0x40, 0x58),
            border_width: 8,
            rect_color: color::rgb(0xE0, 0x60, 0x30),
            rect_width: 64,
            rect_height: 48,
            velocity_x: 3,
            velocity_y: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Sleep between frames; 0 runs as fast as the blit allows.
    pub min_frame_interval_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            min_frame_interval_ms: 16,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("Failed to parse configuration JSON")?;
        config.validate().context("Configuration rejected")?;
        Ok(config)
    }

    /// Rejects scene values the demo loop cannot animate.
    pub fn validate(&self) -> Result<()> {
        let scene = &self.scene;
        for (name, value) in [
            ("border_width", scene.border_width),
            ("rect_width", scene.rect_width),
            ("rect_height", scene.rect_height),
        ] {
            if value < 0 {
                bail!("scene.{} must not be negative (got {})", name, value);
            }
        }
        for (name, value) in [
            ("velocity_x", scene.velocity_x),
            ("velocity_y", scene.velocity_y),
        ] {
            if !(-MAX_VELOCITY..=MAX_VELOCITY).contains(&value) {
                bail!(
                    "scene.{} must be within ±{} (got {})",
                    name,
                    MAX_VELOCITY,
                    value
                );
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or returns defaults if it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                info!("{} not set; using default configuration.", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }
}

mod hex_color {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u32),
        Hex(String),
    }

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:08X}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(v),
            Repr::Hex(s) => color::parse_hex(&s).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "invalid color '{}', expected #RRGGBB or #AARRGGBB",
                    s
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn empty_object_gives_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.window.title, "X11 Engine Split");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_json_str(
            r##"{ "window": { "title": "demo" }, "scene": { "rect_color": "#00FF00" } }"##,
        )
        .unwrap();
        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, DEFAULT_WIDTH);
        assert_eq!(config.scene.rect_color, 0xFF00_FF00);
        assert_eq!(config.scene.background, SceneConfig::default().background);
    }

    #[test]
    fn colors_accept_integers_and_argb_hex() {
        let config = Config::from_json_str(
            r##"{ "scene": { "background": 255, "border_color": "#80FFFFFF" } }"##,
        )
        .unwrap();
        assert_eq!(config.scene.background, 255);
        assert_eq!(config.scene.border_color, 0x80FF_FFFF);
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = Config::from_json_str(r#"{ "scene": { "background": "teal" } }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid color"));
    }

    #[test]
    fn out_of_range_velocity_is_rejected() {
        let err = Config::from_json_str(r#"{ "scene": { "velocity_x": -2147483648 } }"#)
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("velocity_x"), "{}", message);

        assert!(Config::from_json_str(r#"{ "scene": { "velocity_y": 4097 } }"#).is_err());
        assert!(Config::from_json_str(r#"{ "scene": { "velocity_y": -4096 } }"#).is_ok());
    }

    #[test]
    fn negative_sizes_are_rejected() {
        for field in ["border_width", "rect_width", "rect_height"] {
            let json = format!(r#"{{ "scene": {{ "{}": -2147483648 }} }}"#, field);
            let err = Config::from_json_str(&json).unwrap_err();
            assert!(format!("{:#}", err).contains(field));
        }
        assert!(Config::from_json_str(r#"{ "scene": { "border_width": 0 } }"#).is_ok());
    }

    #[test]
    fn load_reports_the_file_and_the_rejected_field() {
        let path = std::env::temp_dir().join(format!(
            "softframe-config-{}-rejected.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "scene": { "velocity_x": -2147483648 } }"#).unwrap();
        let result = Config::load(&path);
        std::fs::remove_file(&path).unwrap();

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Invalid config file"), "{}", message);
        assert!(message.contains("velocity_x"), "{}", message);
    }

    #[test]
    fn serializes_back_to_equivalent_config() {
        let original = Config::default();
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"#FF181820\""));
        assert_eq!(Config::from_json_str(&json).unwrap(), original);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/softframe.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("softframe-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "frame": { "min_frame_interval_ms": 0 } }"#).unwrap();
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.frame.min_frame_interval_ms, 0);
    }
}
