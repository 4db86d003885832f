// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that tumblog uses to simplify
//! the process of serialization and deserialization. File I/O is left to the
//! caller to figure out.
//!
//! # General Layout
//!
//! ```toml
//! [store]
//! root = "$HOME/blog"
//! max_parts = 999
//!
//! [entry]
//! author = "Jane Doe"
//! class = "misc"
//! status = ""
//!
//! [display]
//! count = 15
//! ```
//!
//! Every section and every key is optional.

use crate::address::DateAddress;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Tumblog configuration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where and how entries are stored.
    pub store: StoreSettings,

    /// Defaults for new entries.
    pub entry: EntryDefaults,

    /// Listing behaviour.
    pub display: DisplaySettings,
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on storage root field.
        if let Some(root) = &config.store.root {
            config.store.root = Some(StoreRoot::new(
                shellexpand::full(root.to_string().as_str())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        if !(1..=DateAddress::MAX_PART).contains(&config.store.max_parts) {
            return Err(ConfigError::MaxParts(config.store.max_parts));
        }

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Storage settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Storage root. Falls back to the default store directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<StoreRoot>,

    /// Largest number of entries a single day may hold.
    pub max_parts: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            root: None,
            max_parts: DateAddress::MAX_PART,
        }
    }
}

/// Metadata given to new entries unless overridden.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EntryDefaults {
    pub author: String,
    pub class: String,
    pub status: String,
}

/// Listing settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Number of entries listed when no address is given.
    pub count: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { count: 15 }
    }
}

/// Path acting as storage root.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct StoreRoot(PathBuf);

impl StoreRoot {
    /// Construct new storage root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat storage root as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }
}

impl Display for StoreRoot {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Per-day entry limit outside of legal part range.
    #[error("max_parts must be within 1..=999, got {0}")]
    MaxParts(u32),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("BLAH", "/home/blah")])]
    fn deserialize_config() -> anyhow::Result<()> {
        let result: Config = r#"
            [store]
            root = "$BLAH/blog"
            max_parts = 50

            [entry]
            author = "Jane Doe"
            class = "misc"

            [display]
            count = 5
        "#
        .parse()?;

        let expect = Config {
            store: StoreSettings {
                root: Some(StoreRoot::new("/home/blah/blog")),
                max_parts: 50,
            },
            entry: EntryDefaults {
                author: "Jane Doe".into(),
                class: "misc".into(),
                status: String::new(),
            },
            display: DisplaySettings { count: 5 },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_empty_config() -> anyhow::Result<()> {
        let result: Config = "".parse()?;
        assert_eq!(result, Config::default());
        assert_eq!(result.store.max_parts, DateAddress::MAX_PART);
        assert_eq!(result.display.count, 15);

        Ok(())
    }

    #[test]
    fn reject_zero_max_parts() {
        let result = "[store]\nmax_parts = 0\n".parse::<Config>();
        assert!(matches!(result, Err(ConfigError::MaxParts(0))));
    }

    #[test]
    fn serialize_config() {
        let result = Config {
            store: StoreSettings {
                root: Some(StoreRoot::new("/home/blah/blog")),
                max_parts: 50,
            },
            entry: EntryDefaults {
                author: "Jane Doe".into(),
                class: "misc".into(),
                status: "draft".into(),
            },
            display: DisplaySettings { count: 5 },
        }
        .to_string();

        let expect = indoc! {r#"
            [store]
            root = "/home/blah/blog"
            max_parts = 50

            [entry]
            author = "Jane Doe"
            class = "misc"
            status = "draft"

            [display]
            count = 5
        "#};

        assert_eq!(result, expect);
    }
}
