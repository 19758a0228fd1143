//! Configuration file support for the downstyle CLI
//!
//! Loads settings from a `downstyle.toml` configuration file.

use anyhow::{Context, Result};
use downstyle_core::{Appearance, StyleConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "downstyle.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/downstyle/downstyle/main/crates/downstyle-cli/schema/downstyle.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Output configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Named style presets. Keys missing from a preset take the built-in
    /// light defaults; a preset named "light" or "dark" replaces the built-in one.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub presets: BTreeMap<String, StyleConfig>,
}

/// Output configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Style preset: "light", "dark", or the name of a `[presets.<name>]` table (default: "light")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Include the calls a rendering surface receives for embedded objects and decorations (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<bool>,
    /// Pretty-print the JSON output (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.preset.is_none() && self.layout.is_none() && self.pretty.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `downstyle.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Style configuration for a preset name.
    ///
    /// Presets defined in the file win over the built-in ones of the same name.
    pub fn style(&self, name: &str) -> Result<StyleConfig> {
        if let Some(style) = self.presets.get(name) {
            return Ok(style.clone());
        }
        let appearance: Appearance = name.parse().with_context(|| {
            let mut known: Vec<&str> = vec![Appearance::Light.as_str(), Appearance::Dark.as_str()];
            known.extend(self.presets.keys().map(String::as_str));
            format!("Unknown preset (available: {})", known.join(", "))
        })?;
        Ok(StyleConfig::for_appearance(appearance))
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration for the init command
    ///
    /// The sample spells out every key of the light preset under
    /// `[presets.custom]` so it can be edited in place.
    pub fn sample() -> Self {
        Config {
            output: OutputConfig {
                preset: Some(Appearance::Light.as_str().to_string()),
                layout: Some(false),
                pretty: Some(true),
            },
            presets: BTreeMap::from([("custom".to_string(), StyleConfig::light())]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downstyle_core::Color;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.preset.is_none());
        assert!(config.output.layout.is_none());
        assert!(config.presets.is_empty());
    }

    #[test]
    fn test_parse_output_section() {
        let config: Config = toml::from_str(
            r#"
            [output]
            preset = "dark"
            layout = true
            pretty = false
            "#,
        )
        .unwrap();

        assert_eq!(config.output.preset, Some("dark".to_string()));
        assert_eq!(config.output.layout, Some(true));
        assert_eq!(config.output.pretty, Some(false));
    }

    #[test]
    fn test_partial_preset_falls_back_to_light() {
        let config: Config = toml::from_str(
            r##"
            [presets.sepia.body]
            foreground = "#5B4636"

            [presets.sepia.body.font]
            family = "Georgia"

            [presets.sepia.quote]
            indent = 12.0
            "##,
        )
        .unwrap();

        let sepia = config.style("sepia").unwrap();
        let light = StyleConfig::light();
        assert_eq!(sepia.body.foreground, Color::rgb(0x5B, 0x46, 0x36));
        assert_eq!(sepia.body.font.family, "Georgia");
        assert_eq!(sepia.body.font.size, light.body.font.size);
        assert_eq!(sepia.quote.indent, 12.0);
        assert_eq!(sepia.quote.foreground, light.quote.foreground);
        assert_eq!(sepia.headings, light.headings);
        assert_eq!(sepia.link, light.link);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [presets.broken.link]
            foreground = "blue"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_presets() {
        let config = Config::default();
        assert_eq!(config.style("light").unwrap(), StyleConfig::light());
        assert_eq!(config.style("Dark").unwrap(), StyleConfig::dark());
        let err = config.style("solarized").unwrap_err();
        assert!(format!("{err:#}").contains("available: light, dark"));
    }

    #[test]
    fn test_file_preset_overrides_builtin() {
        let config: Config = toml::from_str(
            r#"
            [presets.dark.image]
            width = 200.0
            "#,
        )
        .unwrap();
        let dark = config.style("dark").unwrap();
        assert_eq!(dark.image.width, Some(200.0));
        // Overrides start from the light defaults, not the built-in dark preset
        assert_eq!(dark.body.foreground, StyleConfig::light().body.foreground);
    }

    #[test]
    fn test_serialize_empty_config() {
        let config = Config::default();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        // Empty config should have minimal content
        assert!(!toml.contains("[output]"));
        assert!(!toml.contains("[presets"));
    }

    #[test]
    fn test_serialize_sample_config() {
        let config = Config::sample();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("preset = \"light\""));
        assert!(toml.contains("[presets.custom.body]"));
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("OutputConfig"));
        assert!(schema.contains("StyleConfig"));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::sample();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.output.preset, parsed.output.preset);
        assert_eq!(parsed.presets["custom"], StyleConfig::light());
    }
}
