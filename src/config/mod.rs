//! Configuration management for `thumbex.toml`.
//!
//! The config file is optional: every field has a default and the CLI
//! can override any of them per invocation.
//!
//! # Example
//!
//! ```toml
//! [export]
//! output_dir = "thumbs"       # Where exported SVGs land
//! command = "inkscape"        # Renderer executable
//!
//! [serve]
//! root = "moc-data"           # Directory to serve
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8000                 # HTTP port number
//! ```

use crate::cli::Cli;
use crate::log;
use crate::utils::path::absolutize;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing thumbex.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, when one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory configured relative paths resolve against: the config
    /// file's parent, or the current directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Export settings
    pub export: ExportConfig,

    /// File server settings
    pub serve: ServeConfig,
}

/// `[export]` section settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported thumbnails are written into.
    /// Required here or via `--output-directory`.
    pub output_dir: Option<PathBuf>,

    /// Renderer executable to invoke.
    pub command: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            command: "inkscape".into(),
        }
    }
}

/// `[serve]` section settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Directory to serve. Defaults to the current directory.
    pub root: Option<PathBuf>,

    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: None,
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let path = &cli.config;

        let mut config = if path.exists() {
            Self::from_path(path)?
        } else {
            Self::default()
        };

        if path.exists() {
            let config_path = absolutize(path);
            config.root = config_path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            config.config_path = Some(config_path);
        } else {
            config.root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        }

        config.finalize();
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Anchor configured paths: tilde expansion, then root-relative to
    /// absolute.
    fn finalize(&mut self) {
        if let Some(dir) = self.export.output_dir.take() {
            self.export.output_dir = Some(self.resolve(&dir));
        }
        if let Some(dir) = self.serve.root.take() {
            self.serve.root = Some(self.resolve(&dir));
        }
    }

    /// Resolve one configured path with tilde expansion.
    fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
        let path = PathBuf::from(expanded);
        if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.export.command, "inkscape");
        assert!(config.export.output_dir.is_none());
        assert!(config.serve.root.is_none());
        assert_eq!(config.serve.port, 8000);
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
    }

    #[test]
    fn test_export_section() {
        let config =
            Config::from_str("[export]\noutput_dir = \"thumbs\"\ncommand = \"inkscape-1.3\"")
                .unwrap();
        assert_eq!(config.export.output_dir, Some(PathBuf::from("thumbs")));
        assert_eq!(config.export.command, "inkscape-1.3");
    }

    #[test]
    fn test_serve_section() {
        let config =
            Config::from_str("[serve]\nroot = \"moc-data\"\ninterface = \"0.0.0.0\"\nport = 8080")
                .unwrap();
        assert_eq!(config.serve.root, Some(PathBuf::from("moc-data")));
        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = Config::from_str("[serve]\nport = 3000").unwrap();
        assert_eq!(config.serve.port, 3000);
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            Config::parse_with_ignored("[export]\ncommand = \"inkscape\"\nformat = \"png\"")
                .unwrap();
        assert_eq!(config.export.command, "inkscape");
        assert_eq!(ignored, ["export.format"]);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_str("[export\noutput_dir = 1").is_err());
    }

    #[test]
    fn test_resolve_anchors_relative_paths() {
        let mut config = Config::from_str("[export]\noutput_dir = \"thumbs\"").unwrap();
        config.root = PathBuf::from("/project");
        config.finalize();
        assert_eq!(
            config.export.output_dir,
            Some(PathBuf::from("/project/thumbs"))
        );
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let mut config = Config::from_str("[export]\noutput_dir = \"/abs/thumbs\"").unwrap();
        config.root = PathBuf::from("/project");
        config.finalize();
        assert_eq!(config.export.output_dir, Some(PathBuf::from("/abs/thumbs")));
    }
}
