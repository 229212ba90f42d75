use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::Args;

const APP_DIR: &str = "geckodriver-install";
const CONFIG_FILE: &str = "config.toml";

/// Optional on-disk defaults, overridden by command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub output_directory: Option<PathBuf>,
    pub proxy: Option<String>,
    pub ssl_verify: Option<bool>,
}

impl InstallerConfig {
    /// Load config from an explicit path, or from the user config directory
    /// if a file exists there.
    ///
    /// A missing explicit path is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(cfg)
    }
}

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Explicit release tag; `None` means "discover the latest".
    pub version: Option<String>,
    /// Install every bucket instead of only the host's.
    pub install_all: bool,
    /// Proxy URL with `tcp://` already rewritten to `http://`.
    pub proxy: Option<String>,
    pub ssl_verify: bool,
    pub output_directory: PathBuf,
}

impl RunOptions {
    /// Merge parsed arguments over file config. Flags win.
    pub fn from_args(args: &Args, config: &InstallerConfig) -> Self {
        let proxy = args
            .proxy
            .clone()
            .or_else(|| config.proxy.clone())
            .filter(|p| !p.trim().is_empty())
            .map(|p| normalize_proxy_url(&p));

        let ssl_verify = !args.ssl_no_verify && config.ssl_verify.unwrap_or(true);

        let output_directory = args
            .output
            .clone()
            .or_else(|| config.output_directory.clone())
            .unwrap_or_else(default_output_directory);

        Self {
            version: args.version.clone().filter(|v| !v.is_empty()),
            install_all: args.all,
            proxy,
            ssl_verify,
            output_directory,
        }
    }
}

/// `tcp://host:port` names a plain HTTP proxy reached over TCP; reqwest only
/// understands the `http` spelling.
pub fn normalize_proxy_url(url: &str) -> String {
    match url.strip_prefix("tcp://") {
        Some(rest) => format!("http://{rest}"),
        None => url.to_string(),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<data dir>/geckodriver-install/bin`, or `./bin` when no data dir exists.
pub fn default_output_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join("bin"))
        .unwrap_or_else(|| PathBuf::from("bin"))
}
