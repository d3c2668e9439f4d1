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

//! The sample catalog: which pitches have recordings, and the tuning
//! constants the engine plays them with.
//!
//! The built-in default is a sparse piano set: recordings every three
//! semitones (`C`, `D#`, `F#`, `A`) across octaves 1-7, plus `A0` and `C8`.
//! Pitches without a recording are resolved to a nearby one at play time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pitch::{FullPitch, PitchName, OCTAVE_MAX, OCTAVE_MIN};

use super::error::ConfigError;

/// The pitch every failed resolution falls back to. Catalog validation
/// guarantees it is present.
pub const FALLBACK_PITCH: FullPitch = FullPitch::new(PitchName::C, 4);

/// Default catalog volume in dB.
const DEFAULT_VOLUME_DB: f32 = -12.0;

/// Default linear output gain applied after the volume stage.
const DEFAULT_GAIN: f32 = 0.8;

/// Default envelope attack in seconds.
const DEFAULT_ATTACK_SECONDS: f32 = 0.002;

/// Default envelope release in seconds.
const DEFAULT_RELEASE_SECONDS: f32 = 1.2;

/// Default maximum number of simultaneous voices.
const DEFAULT_MAX_POLYPHONY: usize = 32;

/// A YAML representation of the sample catalog.
#[derive(Deserialize, Clone, Serialize, Debug)]
#[serde(default)]
pub struct CatalogConfig {
    /// Sample files by pitch, relative to the sample directory.
    samples: HashMap<FullPitch, String>,

    /// Overall volume in dB.
    volume_db: f32,

    /// Linear output gain applied after the volume stage.
    gain: f32,

    /// Envelope attack in seconds.
    attack_seconds: f32,

    /// Envelope release in seconds.
    release_seconds: f32,

    /// Maximum number of simultaneous voices.
    max_polyphony: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            volume_db: DEFAULT_VOLUME_DB,
            gain: DEFAULT_GAIN,
            attack_seconds: DEFAULT_ATTACK_SECONDS,
            release_seconds: DEFAULT_RELEASE_SECONDS,
            max_polyphony: DEFAULT_MAX_POLYPHONY,
        }
    }
}

/// The built-in sparse recording set. File names follow the common piano
/// sample convention of spelling sharps with a trailing "s" (e.g. Ds4.mp3).
fn default_samples() -> HashMap<FullPitch, String> {
    let mut samples = HashMap::new();
    samples.insert(PitchName::A.at(0), "A0.mp3".to_string());
    for octave in 1..=7 {
        for name in [PitchName::C, PitchName::DSharp, PitchName::FSharp, PitchName::A] {
            let file = format!("{}{}.mp3", name.as_str().replace('#', "s"), octave);
            samples.insert(name.at(octave), file);
        }
    }
    samples.insert(PitchName::C.at(8), "C8.mp3".to_string());
    samples
}

impl CatalogConfig {
    /// Validates this config and produces the immutable runtime catalog.
    pub fn to_catalog(&self) -> Result<Catalog, ConfigError> {
        if self.samples.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for pitch in self.samples.keys() {
            if pitch.octave() < OCTAVE_MIN || pitch.octave() > OCTAVE_MAX {
                return Err(ConfigError::OctaveOutOfRange(*pitch));
            }
        }
        if !self.samples.contains_key(&FALLBACK_PITCH) {
            return Err(ConfigError::MissingFallback(FALLBACK_PITCH));
        }
        for (field, value) in [
            ("attack_seconds", self.attack_seconds),
            ("release_seconds", self.release_seconds),
            ("gain", self.gain),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }
        if self.max_polyphony == 0 {
            return Err(ConfigError::InvalidTuning {
                field: "max_polyphony",
                value: 0.0,
            });
        }

        Ok(Catalog {
            samples: self
                .samples
                .iter()
                .map(|(pitch, file)| (*pitch, PathBuf::from(file)))
                .collect(),
            volume_db: self.volume_db,
            gain: self.gain,
            attack_seconds: self.attack_seconds,
            release_seconds: self.release_seconds,
            max_polyphony: self.max_polyphony,
        })
    }
}

/// The validated sample catalog. Immutable after construction; lookup only.
#[derive(Clone, Debug)]
pub struct Catalog {
    samples: HashMap<FullPitch, PathBuf>,
    volume_db: f32,
    gain: f32,
    attack_seconds: f32,
    release_seconds: f32,
    max_polyphony: usize,
}

impl Catalog {
    /// Returns true if the pitch has a recording.
    pub fn contains(&self, pitch: &FullPitch) -> bool {
        self.samples.contains_key(pitch)
    }

    /// Iterates over the cataloged pitches and their sample files.
    pub fn iter(&self) -> impl Iterator<Item = (&FullPitch, &Path)> {
        self.samples.iter().map(|(pitch, file)| (pitch, file.as_path()))
    }

    /// The number of cataloged recordings.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if nothing is cataloged. Validation rejects this, so a
    /// catalog obtained from [CatalogConfig::to_catalog] is never empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Gets the overall volume in dB.
    pub fn volume_db(&self) -> f32 {
        self.volume_db
    }

    /// Gets the linear output gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Gets the envelope attack in seconds.
    pub fn attack_seconds(&self) -> f32 {
        self.attack_seconds
    }

    /// Gets the envelope release in seconds.
    pub fn release_seconds(&self) -> f32 {
        self.release_seconds
    }

    /// Gets the maximum number of simultaneous voices.
    pub fn max_polyphony(&self) -> usize {
        self.max_polyphony
    }
}

#[cfg(test)]
impl Catalog {
    /// Creates a catalog containing only the given pitches (test only).
    pub fn for_test(pitches: &[&str]) -> Catalog {
        Catalog {
            samples: pitches
                .iter()
                .map(|s| {
                    let pitch: FullPitch = s.parse().expect("test pitch");
                    (pitch, PathBuf::from(format!("{}.wav", s.replace('#', "s"))))
                })
                .collect(),
            volume_db: DEFAULT_VOLUME_DB,
            gain: DEFAULT_GAIN,
            attack_seconds: DEFAULT_ATTACK_SECONDS,
            release_seconds: DEFAULT_RELEASE_SECONDS,
            max_polyphony: DEFAULT_MAX_POLYPHONY,
        }
    }
}
