//! Dashboard configuration: command line, optional JSON file and environment.
//!
//! Precedence: command line > environment > config file > defaults.

use crate::data::{YEAR_MAX, YEAR_MIN};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Command line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "gunviz", version, about = "US gun violence casualties dashboard (2013-2018)")]
pub struct Cli {
    /// Incident CSV to load at startup
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initially selected year
    #[arg(short, long)]
    pub year: Option<i32>,
}

/// Resolved dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV loaded automatically at startup.
    pub data_path: Option<PathBuf>,
    pub default_year: i32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            default_year: YEAR_MIN,
            window_width: 1400.0,
            window_height: 900.0,
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from all sources.
    ///
    /// Environment variables:
    /// - `GUNVIZ_DATA` - incident CSV path
    /// - `GUNVIZ_DEFAULT_YEAR` - initially selected year
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env();

        if let Some(data) = &cli.data {
            config.data_path = Some(data.clone());
        }
        if let Some(year) = cli.year {
            config.default_year = year;
        }

        Ok(config.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn apply_env(&mut self) {
        if let Some(path) = read_env::<PathBuf>("GUNVIZ_DATA") {
            self.data_path = Some(path);
        }
        if let Some(year) = read_env::<i32>("GUNVIZ_DEFAULT_YEAR") {
            self.default_year = year;
        }
    }

    fn normalized(mut self) -> Self {
        self.default_year = self.default_year.clamp(YEAR_MIN, YEAR_MAX);
        self.window_width = self.window_width.max(1000.0);
        self.window_height = self.window_height.max(700.0);
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "default_year": 2016 }"#).unwrap();

        assert_eq!(config.default_year, 2016);
        assert_eq!(config.data_path, None);
        assert_eq!(config.window_width, 1400.0);
    }

    #[test]
    fn command_line_overrides_file_and_is_clamped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "data_path": "from_file.csv", "default_year": 2015, "window_width": 200 }}"#
        )
        .unwrap();

        let cli = Cli {
            data: Some(PathBuf::from("from_cli.csv")),
            config: Some(file.path().to_path_buf()),
            year: Some(2040),
        };

        let config = DashboardConfig::resolve(&cli).unwrap();

        assert_eq!(config.data_path, Some(PathBuf::from("from_cli.csv")));
        assert_eq!(config.default_year, YEAR_MAX);
        assert_eq!(config.window_width, 1000.0);
    }

    #[test]
    fn bad_config_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = DashboardConfig::from_file(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from(["gunviz", "--data", "incidents.csv", "-y", "2017"]);

        assert_eq!(cli.data, Some(PathBuf::from("incidents.csv")));
        assert_eq!(cli.year, Some(2017));
        assert!(cli.config.is_none());
    }
}
