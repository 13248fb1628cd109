// Settings: command line and environment first, then an optional TOML file,
// then built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MENU_FILE: &str = "Menus.txt";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3001";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Menu-driven console for the data gateway
#[derive(Parser, Debug, Default)]
#[command(name = "menuwalk", version)]
pub struct Cli {
    /// Menu hierarchy file
    #[arg(short, long, env = "MENUWALK_MENUS")]
    pub menus: Option<PathBuf>,

    /// Data gateway base URL
    #[arg(short, long, env = "API_GATEWAY_URL")]
    pub gateway: Option<String>,

    /// Data-store user (prompted for when unset)
    #[arg(short, long, env = "MENUWALK_USER")]
    pub user: Option<String>,

    /// Data-store password (prompted for when unset)
    #[arg(long, env = "MENUWALK_PASSWORD", hide_env_values = true, hide = true)]
    pub password: Option<String>,

    /// Settings file (defaults to <config dir>/menuwalk/config.toml)
    #[arg(short, long, env = "MENUWALK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `menuwalk_cli=trace`
    #[arg(long)]
    pub log_level: Option<String>,
}

/// On-disk settings. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub menus: Option<PathBuf>,
    pub gateway_url: Option<String>,
    pub user: Option<String>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Parsing settings file")
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::parse(&text)
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub menu_file: PathBuf,
    pub gateway_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub log_level: String,
}

/// `<config dir>/menuwalk/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("menuwalk").join("config.toml"))
}

impl Settings {
    /// Load the settings file (an explicit path must exist, the default one
    /// may be absent) and merge it under the command line.
    pub fn resolve(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };
        Ok(Self::merge(cli, file))
    }

    pub fn merge(cli: Cli, file: FileConfig) -> Self {
        Settings {
            menu_file: cli
                .menus
                .or(file.menus)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MENU_FILE)),
            gateway_url: cli
                .gateway
                .or(file.gateway_url)
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.into()),
            user: cli.user.or(file.user).filter(|u| !u.is_empty()),
            password: cli.password.filter(|p| !p.is_empty()),
            log_level: cli
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
        }
    }
}
