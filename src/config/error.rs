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

use crate::pitch::FullPitch;

/// Typed error for config load/parse/validation failures so callers can
/// distinguish e.g. file-not-found from a bad catalog without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing config file: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("the sample catalog is empty")]
    EmptyCatalog,

    #[error("the sample catalog is missing the fallback pitch {0}")]
    MissingFallback(FullPitch),

    #[error("catalog pitch {0} is outside the playable octave range")]
    OctaveOutOfRange(FullPitch),

    #[error("invalid value {value} for catalog tuning field {field}")]
    InvalidTuning { field: &'static str, value: f32 },

    #[error("input key {0:?} is bound more than once")]
    DuplicateKey(String),

    #[error("input key bindings must not be empty")]
    EmptyKey,
}
