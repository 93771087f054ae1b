use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};
use crossterm::tty::IsTty;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_TASK_FILE: &str = "tasks.txt";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "taskers", version, about = "Console task tracker backed by a flat text file")]
pub struct Cli {
    /// Task file to load on start and overwrite on quit
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// JSON config file; command line flags take precedence
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `taskers=debug`
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write rotating log files here instead of stderr
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,

    /// Exit with status 1 when the final save fails
    #[arg(long)]
    pub strict_save: bool,

    /// Seed sample tasks when the task file is empty
    #[arg(long)]
    pub demo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub file: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub color: ColorMode,
    pub strict_save: bool,
    pub demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_TASK_FILE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            color: ColorMode::Auto,
            strict_save: false,
            demo: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the config file named on the command line, if any, then applies
    /// the remaining flags on top.
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(file) = cli.file {
            config.file = file;
        }
        if let Some(level) = cli.log_level {
            config.log_level = level;
        }
        if let Some(dir) = cli.log_dir {
            config.log_dir = Some(dir);
        }
        if let Some(color) = cli.color {
            config.color = color;
        }
        config.strict_save |= cli.strict_save;
        config.demo |= cli.demo;
        Ok(config)
    }

    pub fn use_color(&self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_tty(),
        }
    }
}
