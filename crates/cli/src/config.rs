use anyhow::Context;
use outlay_import::ParseOptions;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Contents of the optional TOML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub import: ParseOptions,
    pub output: OutputConfig,
}

impl Config {
    pub fn from_toml(toml_content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_content)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Command-line flags win over the file.
    pub fn with_overrides(mut self, format: Option<OutputFormat>, lenient: bool) -> Self {
        if let Some(format) = format {
            self.output.format = format;
        }
        if lenient {
            self.import.sgml_mode = outlay_import::SgmlMode::Lenient;
        }
        self
    }
}
