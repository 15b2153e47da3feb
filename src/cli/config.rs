//! TOML configuration file support.
//!
//! Instead of passing the same flags on every run, settings can live in a
//! config file:
//!
//! ```toml
//! # offtarget.toml
//! [models]
//! directory = "models"
//! extension = "safetensors"
//!
//! [bridge]
//! command = "java"
//! args = ["-jar", "ecfp4-bridge.jar"]
//!
//! [scoring]
//! smiles_column = "SMILES"
//! on_model_error = "skip"
//! compression_level = 9
//! ```
//!
//! Command-line flags always win over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use offtarget::fingerprint::BridgeConfig;
use offtarget::pipeline::ModelFailurePolicy;

/// Root configuration structure for offtarget.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model discovery settings.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Chemistry bridge settings.
    #[serde(default)]
    pub bridge: BridgeSection,

    /// Scoring settings.
    #[serde(default)]
    pub scoring: ScoringSection,
}

/// Where to find model artifacts.
#[derive(Debug, Default, Deserialize)]
pub struct ModelsConfig {
    /// Directory scanned for artifacts.
    pub directory: Option<PathBuf>,

    /// Artifact file extension.
    pub extension: Option<String>,
}

/// How to launch the chemistry bridge.
#[derive(Debug, Default, Deserialize)]
pub struct BridgeSection {
    /// Executable to run.
    pub command: Option<String>,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory of the bridge process.
    pub working_dir: Option<PathBuf>,
}

/// Scoring behaviour.
#[derive(Debug, Default, Deserialize)]
pub struct ScoringSection {
    /// Descriptor column; guessed when absent.
    pub smiles_column: Option<String>,

    /// `abort` (default) or `skip` on model failures.
    pub on_model_error: Option<ModelFailurePolicy>,

    /// ZSTD level for Parquet output.
    pub compression_level: Option<i32>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Bridge launch settings, with `command`/`args` from the command line
    /// taking precedence over the file.
    pub fn bridge_config(&self, command: Option<&str>, args: &[String]) -> Option<BridgeConfig> {
        let (command, args) = match command {
            Some(command) => (command.to_string(), args.to_vec()),
            None => (self.bridge.command.clone()?, self.bridge.args.clone()),
        };

        Some(BridgeConfig {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: self.bridge.working_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [models]
            directory = "/opt/offtarget/models"
            extension = "safetensors"

            [bridge]
            command = "java"
            args = ["-jar", "bridge.jar"]

            [scoring]
            smiles_column = "canonical_smiles"
            on_model_error = "skip"
            compression_level = 9
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(
            config.models.directory,
            Some(PathBuf::from("/opt/offtarget/models"))
        );
        assert_eq!(config.models.extension.as_deref(), Some("safetensors"));
        assert_eq!(config.bridge.command.as_deref(), Some("java"));
        assert_eq!(config.bridge.args, vec!["-jar", "bridge.jar"]);
        assert_eq!(
            config.scoring.smiles_column.as_deref(),
            Some("canonical_smiles")
        );
        assert_eq!(config.scoring.on_model_error, Some(ModelFailurePolicy::Skip));
        assert_eq!(config.scoring.compression_level, Some(9));
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.models.directory, None);
        assert!(config.bridge.args.is_empty());
        assert_eq!(config.scoring.on_model_error, None);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(Config::from_str("[scoring]\non_model_error = \"retry\"\n").is_err());
    }

    #[test]
    fn test_bridge_precedence() {
        let config = Config::from_str("[bridge]\ncommand = \"java\"\nargs = [\"-jar\", \"b.jar\"]\n").unwrap();

        let from_file = config.bridge_config(None, &[]).unwrap();
        assert_eq!(from_file.command, "java");
        assert_eq!(from_file.args.len(), 2);

        let from_cli = config
            .bridge_config(Some("rdkit-bridge"), &["--radius".to_string(), "2".to_string()])
            .unwrap();
        assert_eq!(from_cli.command, "rdkit-bridge");
        assert_eq!(from_cli.args, vec!["--radius", "2"]);

        assert!(Config::default().bridge_config(None, &[]).is_none());
    }
}
