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

//! Input key bindings.
//!
//! The white and black key tables are merged into a single lookup map once,
//! at startup, with a collision check. Keys that represent the start of the
//! next octave on the compact layout carry an octave offset of +1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pitch::PitchName;

use super::error::ConfigError;

/// A single input key bound to a pitch name.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct KeyBinding {
    /// The input key identity. Normalized to lowercase when the map is built.
    key: String,

    /// The pitch name this key plays.
    note: PitchName,

    /// Octaves above the current base octave this key is transposed by.
    #[serde(default)]
    octave_offset: i8,
}

impl KeyBinding {
    fn new(key: &str, note: PitchName, octave_offset: i8) -> KeyBinding {
        KeyBinding {
            key: key.to_string(),
            note,
            octave_offset,
        }
    }

    /// Gets the input key identity.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the pitch name this key plays.
    pub fn note(&self) -> PitchName {
        self.note
    }

    /// Gets the octave offset.
    pub fn octave_offset(&self) -> i8 {
        self.octave_offset
    }
}

/// A YAML representation of the input key layout.
#[derive(Deserialize, Clone, Serialize, Debug)]
#[serde(default)]
pub struct KeymapConfig {
    /// The diatonic (white) keys.
    white_keys: Vec<KeyBinding>,

    /// The chromatic (black) keys.
    black_keys: Vec<KeyBinding>,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            white_keys: vec![
                KeyBinding::new("a", PitchName::C, 0),
                KeyBinding::new("s", PitchName::D, 0),
                KeyBinding::new("d", PitchName::E, 0),
                KeyBinding::new("f", PitchName::F, 0),
                KeyBinding::new("g", PitchName::G, 0),
                KeyBinding::new("h", PitchName::A, 0),
                KeyBinding::new("j", PitchName::B, 0),
                KeyBinding::new("k", PitchName::C, 1),
                KeyBinding::new("l", PitchName::D, 1),
                KeyBinding::new("ñ", PitchName::E, 1),
            ],
            black_keys: vec![
                KeyBinding::new("w", PitchName::CSharp, 0),
                KeyBinding::new("e", PitchName::DSharp, 0),
                KeyBinding::new("t", PitchName::FSharp, 0),
                KeyBinding::new("y", PitchName::GSharp, 0),
                KeyBinding::new("u", PitchName::ASharp, 0),
                KeyBinding::new("o", PitchName::CSharp, 1),
                KeyBinding::new("p", PitchName::DSharp, 1),
            ],
        }
    }
}

impl KeymapConfig {
    /// Gets the white key bindings.
    pub fn white_keys(&self) -> &[KeyBinding] {
        &self.white_keys
    }

    /// Gets the black key bindings.
    pub fn black_keys(&self) -> &[KeyBinding] {
        &self.black_keys
    }

    /// Merges the two tables into the runtime key map, rejecting duplicate
    /// and empty key identities.
    pub fn to_keymap(&self) -> Result<KeyMap, ConfigError> {
        let mut map = HashMap::new();
        for binding in self.white_keys.iter().chain(self.black_keys.iter()) {
            let key = binding.key.to_lowercase();
            if key.is_empty() {
                return Err(ConfigError::EmptyKey);
            }
            let target = KeyTarget {
                note: binding.note,
                octave_offset: binding.octave_offset,
            };
            if map.insert(key, target).is_some() {
                return Err(ConfigError::DuplicateKey(binding.key.clone()));
            }
        }
        Ok(KeyMap { map })
    }
}

/// The pitch a key plays, relative to the current base octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTarget {
    note: PitchName,
    octave_offset: i8,
}

impl KeyTarget {
    /// Gets the pitch name.
    pub fn note(&self) -> PitchName {
        self.note
    }

    /// Gets the octave offset.
    pub fn octave_offset(&self) -> i8 {
        self.octave_offset
    }
}

/// The merged, validated key lookup map. Immutable after construction.
#[derive(Clone, Debug)]
pub struct KeyMap {
    map: HashMap<String, KeyTarget>,
}

impl KeyMap {
    /// Looks up a key identity. The key must already be normalized to
    /// lowercase; the controller normalizes raw input before calling this.
    pub fn get(&self, key: &str) -> Option<KeyTarget> {
        self.map.get(key).copied()
    }

    /// The number of bound keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no keys are bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_keymap() {
        let keymap = KeymapConfig::default().to_keymap().expect("valid default");
        assert_eq!(17, keymap.len());

        let target = keymap.get("a").expect("bound key");
        assert_eq!(PitchName::C, target.note());
        assert_eq!(0, target.octave_offset());

        // The keys that wrap into the next octave carry an offset of one.
        let target = keymap.get("k").expect("bound key");
        assert_eq!(PitchName::C, target.note());
        assert_eq!(1, target.octave_offset());

        let target = keymap.get("p").expect("bound key");
        assert_eq!(PitchName::DSharp, target.note());
        assert_eq!(1, target.octave_offset());

        assert!(keymap.get("z").is_none());
    }

    #[test]
    fn test_mixed_case_bindings_normalized() {
        let mut config = KeymapConfig::default();
        config.white_keys[0] = KeyBinding::new("A", PitchName::C, 0);
        let keymap = config.to_keymap().expect("valid keymap");
        assert!(keymap.get("a").is_some());
        assert!(keymap.get("A").is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut config = KeymapConfig::default();
        config.black_keys.push(KeyBinding::new("a", PitchName::GSharp, 0));
        assert!(matches!(
            config.to_keymap(),
            Err(ConfigError::DuplicateKey(_))
        ));

        // Duplicates that only differ by case collide too.
        let mut config = KeymapConfig::default();
        config.black_keys.push(KeyBinding::new("A", PitchName::GSharp, 0));
        assert!(matches!(
            config.to_keymap(),
            Err(ConfigError::DuplicateKey(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut config = KeymapConfig::default();
        config.white_keys.push(KeyBinding::new("", PitchName::C, 0));
        assert!(matches!(config.to_keymap(), Err(ConfigError::EmptyKey)));
    }

    #[test]
    fn test_keymap_from_yaml() {
        let config: KeymapConfig = serde_yml::from_str(
            r#"
white_keys:
  - key: q
    note: C
black_keys:
  - key: "2"
    note: "C#"
    octave_offset: 1
"#,
        )
        .expect("parseable keymap");
        let keymap = config.to_keymap().expect("valid keymap");

        assert_eq!(2, keymap.len());
        let target = keymap.get("2").expect("bound key");
        assert_eq!(PitchName::CSharp, target.note());
        assert_eq!(1, target.octave_offset());
    }
}
