use std::{fmt::Display, path::PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum ResourcePath {
    Local(PathBuf),
    URL(String),
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ResourcePath::*;
        match self {
            Local(path) => f.write_fmt(format_args!("[Local resource: {}]", path.display())),
            URL(url) => f.write_fmt(format_args!("[URL: {url}]")),
        }
    }
}

const URL_REGEX_SPEC: &str = r"^(http|https)://(.+)$";

impl From<String> for ResourcePath {
    fn from(value: String) -> Self {
        static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(URL_REGEX_SPEC).unwrap());

        use ResourcePath::*;

        if URL_REGEX.is_match(&value) {
            URL(value)
        } else {
            Local(value.into())
        }
    }
}

impl From<&str> for ResourcePath {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl ResourcePath {
    // Pin a relative local path to one of the configured base directories: the first one
    // that actually holds the file, else the first one listed.
    pub async fn resolve(self: Self, config: &Config) -> ResourcePath {
        use ResourcePath::*;

        let path = match self {
            Local(path) if path.is_relative() => path,
            other => return other,
        };

        for base in &config.base_dirs {
            let candidate = base.join(&path);
            if let Ok(true) = tokio::fs::try_exists(&candidate).await {
                return Local(candidate);
            }
        }

        match config.base_dirs.first() {
            Some(base) => Local(base.join(path)),
            None => Local(path),
        }
    }
}
