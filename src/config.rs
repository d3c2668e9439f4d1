// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pitch::{OCTAVE_MAX, OCTAVE_MIN};

pub mod catalog;
pub mod error;
pub mod keymap;

use self::catalog::CatalogConfig;
use self::error::ConfigError;
use self::keymap::KeymapConfig;

/// The base octave used when none is configured.
pub const DEFAULT_OCTAVE: i8 = 4;

/// Top-level piano configuration. Every field has a default, so an absent or
/// empty config file yields the built-in instrument.
#[derive(Deserialize, Clone, Serialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Directory the catalog's sample files are resolved against.
    sample_dir: PathBuf,

    /// Output device selector. "mock" runs without audio output.
    device: Option<String>,

    /// The base octave keys play at before per-key offsets.
    octave: i8,

    /// The sample catalog and tuning constants.
    catalog: CatalogConfig,

    /// The input key bindings.
    keymap: KeymapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_dir: PathBuf::from("samples"),
            device: None,
            octave: DEFAULT_OCTAVE,
            catalog: CatalogConfig::default(),
            keymap: KeymapConfig::default(),
        }
    }
}

impl Config {
    /// Parses a piano configuration from a YAML file.
    pub fn load(file: &Path) -> Result<Config, ConfigError> {
        Ok(serde_yml::from_str(&fs::read_to_string(file)?)?)
    }

    /// Gets the sample directory.
    pub fn sample_dir(&self) -> &Path {
        &self.sample_dir
    }

    /// Gets the output device selector.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Gets the base octave, clamped to the playable range.
    pub fn octave(&self) -> i8 {
        self.octave.clamp(OCTAVE_MIN, OCTAVE_MAX)
    }

    /// Gets the catalog configuration.
    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    /// Gets the key map configuration.
    pub fn keymap(&self) -> &KeymapConfig {
        &self.keymap
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(PathBuf::from("samples"), config.sample_dir);
        assert_eq!(4, config.octave());
        assert!(config.device().is_none());
        assert!(config.catalog().to_catalog().is_ok());
        assert!(config.keymap().to_keymap().is_ok());
    }

    #[test]
    fn test_octave_clamped() {
        let config: Config = serde_yml::from_str("octave: 12").expect("parseable config");
        assert_eq!(8, config.octave());

        let config: Config = serde_yml::from_str("octave: -3").expect("parseable config");
        assert_eq!(0, config.octave());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
sample_dir: /srv/piano/samples
device: mock
octave: 3
"#
        )
        .expect("config written");

        let config = Config::load(file.path()).expect("loadable config");
        assert_eq!(PathBuf::from("/srv/piano/samples"), config.sample_dir);
        assert_eq!(Some("mock"), config.device());
        assert_eq!(3, config.octave());
        // Catalog and key map fall back to the built-in defaults.
        assert_eq!(
            30,
            config.catalog().to_catalog().expect("valid catalog").len()
        );
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/piano.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
