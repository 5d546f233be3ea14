//! Configuration management for `refgen.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `[generate]` | Output location, mode, format, workers, tag file  |
//!
//! # Example
//!
//! ```toml
//! [generate]
//! output = "reference"
//! multipage = true
//! format = "adoc"
//! concurrency = 0
//! tagfile = true
//! ```
//!
//! Values given on the command line override the file.

pub mod defaults;
mod error;
mod generate;

pub use error::ConfigError;
pub use generate::{GenerateConfig, TAGFILE_EXTENSION, TAGFILE_NAME};

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing refgen.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RefgenConfig {
    /// Project root all relative paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Path to the serialized catalog (set from the command line)
    #[serde(skip)]
    pub catalog: PathBuf,

    /// Generation settings
    #[serde(default)]
    pub generate: GenerateConfig,
}

impl RefgenConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: RefgenConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = Self::normalize_path(cli.root.as_deref().unwrap_or(Path::new("./")));

        Self::update_option(&mut self.generate.output, cli.output.as_ref());
        Self::update_option(&mut self.generate.multipage, cli.multipage.as_ref());
        Self::update_option(&mut self.generate.format, cli.format.as_ref());
        Self::update_option(&mut self.generate.concurrency, cli.jobs.as_ref());
        Self::update_option(&mut self.generate.tagfile, cli.tagfile.as_ref());
        if cli.addons.is_some() {
            self.generate.addons = cli.addons.clone();
        }

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.catalog = Self::normalize_path(&root.join(&cli.catalog));
        self.generate.output = Self::normalize_path(&root.join(&self.generate.output));
        if let Some(addons) = &self.generate.addons {
            self.generate.addons = Some(Self::normalize_path(&root.join(addons)));
        }
        self.root = root;
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before generating
    pub fn validate(&self) -> Result<()> {
        if !self.catalog.is_file() {
            bail!(ConfigError::Validation(format!(
                "catalog `{}` not found",
                self.catalog.display()
            )));
        }

        if let Some(addons) = &self.generate.addons
            && !addons.is_dir()
        {
            bail!(ConfigError::Validation(
                "[generate.addons] not found".into()
            ));
        }

        let generate = &self.generate;
        if generate.multipage && generate.output.is_file() {
            bail!(ConfigError::Validation(
                "[generate.output] must be a directory when [generate.multipage] = true".into()
            ));
        }
        if !generate.multipage && generate.single_page_file().is_dir() {
            bail!(ConfigError::Validation(
                "[generate.output] must be a file when [generate.multipage] = false".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Format;
    use clap::Parser;
    use std::fs;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("refgen").chain(args.iter().copied()))
    }

    #[test]
    fn test_from_str() {
        let config = RefgenConfig::from_str(
            r#"
            [generate]
            output = "api"
            format = "html"
        "#,
        )
        .unwrap();

        assert_eq!(config.generate.output, PathBuf::from("api"));
        assert_eq!(config.generate.format, Format::Html);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = RefgenConfig::from_str("[generate\noutput = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_from_path_missing() {
        let result = RefgenConfig::from_path(Path::new("/nonexistent/refgen.toml"));
        assert!(matches!(result, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = RefgenConfig::from_str("[serve]\nport = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let mut config = RefgenConfig::from_str(
            r#"
            [generate]
            output = "from-file"
            multipage = true
            concurrency = 2
        "#,
        )
        .unwrap();

        config.update_with_cli(&cli(&[
            "--root",
            root,
            "catalog.json",
            "-o",
            "from-cli",
            "--multipage=false",
            "-j",
            "5",
            "--format",
            "html",
        ]));

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.generate.output, root.join("from-cli"));
        assert!(!config.generate.multipage);
        assert_eq!(config.generate.concurrency, 5);
        assert_eq!(config.generate.format, Format::Html);
        assert!(config.generate.tagfile);
        assert_eq!(config.catalog, root.join("catalog.json"));
        assert_eq!(config.config_path, root.join("refgen.toml"));
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        fs::write(dir.path().join("catalog.json"), "{}").unwrap();

        let mut config = RefgenConfig::default();
        config.update_with_cli(&cli(&["--root", root, "catalog.json"]));
        assert!(config.validate().is_ok());

        let mut missing = RefgenConfig::default();
        missing.update_with_cli(&cli(&["--root", root, "other.json"]));
        assert!(missing.validate().unwrap_err().to_string().contains("not found"));

        let mut addons = RefgenConfig::default();
        addons.update_with_cli(&cli(&["--root", root, "catalog.json", "--addons", "nope"]));
        assert!(
            addons
                .validate()
                .unwrap_err()
                .to_string()
                .contains("[generate.addons]")
        );
    }

    #[test]
    fn test_validate_single_page_output_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        fs::write(dir.path().join("catalog.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("api.adoc")).unwrap();

        let mut config = RefgenConfig::default();
        config.update_with_cli(&cli(&[
            "--root",
            root,
            "catalog.json",
            "-o",
            "api",
            "--multipage=false",
        ]));
        assert!(config.validate().is_err());
    }
}
