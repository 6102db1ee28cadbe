use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bitcoin::Network;

use crate::error::{Error, Result};

pub const DEFAULT_FILE_PATTERN: &str = "blk*.dat";
pub const DEFAULT_WORKERS: usize = 4;

/// File-name filter with at most one `*` wildcard, e.g. `blk*.dat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    prefix: String,
    suffix: Option<String>,
}

impl FilePattern {
    pub fn matches(&self, file_name: &str) -> bool {
        match &self.suffix {
            None => file_name == self.prefix,
            Some(suffix) => {
                file_name.len() >= self.prefix.len() + suffix.len()
                    && file_name.starts_with(&self.prefix)
                    && file_name.ends_with(suffix.as_str())
            }
        }
    }
}

impl Default for FilePattern {
    fn default() -> Self {
        Self {
            prefix: "blk".to_string(),
            suffix: Some(".dat".to_string()),
        }
    }
}

impl FromStr for FilePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::Config("file pattern must not be empty".to_string()));
        }
        match s.split_once('*') {
            None => Ok(Self {
                prefix: s.to_string(),
                suffix: None,
            }),
            Some((_, suffix)) if suffix.contains('*') => Err(Error::Config(format!(
                "file pattern `{s}` may contain at most one `*`"
            ))),
            Some((prefix, suffix)) => Ok(Self {
                prefix: prefix.to_string(),
                suffix: Some(suffix.to_string()),
            }),
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            None => f.write_str(&self.prefix),
            Some(suffix) => write!(f, "{}*{}", self.prefix, suffix),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub file_pattern: FilePattern,
    /// Only affects how output scripts are rendered as addresses.
    pub network: Network,
    pub workers: usize,
}

impl Config {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            file_pattern: FilePattern::default(),
            network: Network::Bitcoin,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Reads `BLOCKS_PATH`, `OUTPUT_PATH`, `FILE_PATTERN`, `NETWORK` and `WORKERS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let source_dir = lookup("BLOCKS_PATH")
            .ok_or_else(|| Error::Config("BLOCKS_PATH must be set in .env file".to_string()))?;
        let dest_dir = lookup("OUTPUT_PATH")
            .ok_or_else(|| Error::Config("OUTPUT_PATH must be set in .env file".to_string()))?;

        let mut config = Self::new(source_dir, dest_dir);

        if let Some(pattern) = lookup("FILE_PATTERN") {
            config.file_pattern = pattern.parse()?;
        }
        if let Some(network) = lookup("NETWORK") {
            config.network = network
                .parse()
                .map_err(|_| Error::Config(format!("unknown network `{network}`")))?;
        }
        if let Some(workers) = lookup("WORKERS") {
            config.workers = workers
                .parse()
                .ok()
                .filter(|&w: &usize| w > 0)
                .ok_or_else(|| Error::Config(format!("invalid WORKERS value `{workers}`")))?;
        }

        Ok(config)
    }
}
