//! Configuration loading and parsing

use anyhow::{Context, Result};
use larva_analyzer::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub analysis: AnalyzerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Directory searched for the most recent replay when no path is given
    pub replay_dir: Option<PathBuf>,
    /// File extension of replay dumps
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_true")]
    pub show_timeline: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            replay_dir: None,
            extension: default_extension(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_timeline: true,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .analysis
        .validate()
        .with_context(|| format!("Invalid analysis settings in {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            replay_dir = "replays"

            [analysis]
            speed_multiplier = 1.0
            spawn_offset = { x = 0.0, y = -2.5 }

            [analysis.rules]
            token_cap = 3
            seconds_per_token = 11

            [output]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.replay_dir, Some(PathBuf::from("replays")));
        assert_eq!(config.input.extension, "json");
        assert_eq!(config.analysis.speed_multiplier, 1.0);
        assert_eq!(config.analysis.spawn_offset.y, -2.5);
        assert_eq!(config.analysis.token_type, "Larva");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.show_timeline);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.replay_dir.is_none());
        assert_eq!(config.output.format, OutputFormat::Txt);
        assert_eq!(config.analysis.timeline_bucket_seconds, 5);
    }

    #[test]
    fn test_invalid_analysis_settings_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis.rules]\ntoken_cap = 0").unwrap();

        let error = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", error).contains("token_cap"));
    }
}
