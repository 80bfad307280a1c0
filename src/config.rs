use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

// base_dirs = ["./static", "./assets"]
//
// [http]
// user_agent = "prefetch/0.1"
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directories searched, in order, for resources given as relative paths.
    pub base_dirs: Vec<PathBuf>,

    pub http: HttpConfig,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: Option<String>,
}

impl Config {
    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        toml::from_str::<Config>(contents).context("Failed to parse config.")
    }

    /// A missing file gives the default config. Any other failure to read or parse is an error.
    pub async fn read(path: &Path) -> anyhow::Result<Config> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => {
                return Err(err).context(format!("Bad config file {}.", path.display()));
            }
        };

        Config::parse(&contents).context(format!("Bad config file {}.", path.display()))
    }

    /// Overlay wins wherever it sets something. Base directories from the overlay are
    /// searched before the ones already present.
    pub fn merge(self: Self, overlay: Config) -> Config {
        let Config {
            mut base_dirs,
            http,
        } = self;

        let mut dirs = overlay.base_dirs;
        dirs.append(&mut base_dirs);

        Config {
            base_dirs: dirs,
            http: HttpConfig {
                user_agent: overlay.http.user_agent.or(http.user_agent),
            },
        }
    }
}
