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

//! Pitch value types shared by the catalog, the key map, and the engine.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The lowest octave the catalog can reference.
pub const OCTAVE_MIN: i8 = 0;

/// The highest octave the catalog can reference.
pub const OCTAVE_MAX: i8 = 8;

/// Error returned when a pitch string cannot be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid pitch {0:?}")]
pub struct PitchParseError(pub String);

/// One of the twelve chromatic pitch names. Sharps only; the catalog and key
/// map never use flat spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PitchName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchName {
    /// All twelve names in chromatic order.
    pub const ALL: [PitchName; 12] = [
        PitchName::C,
        PitchName::CSharp,
        PitchName::D,
        PitchName::DSharp,
        PitchName::E,
        PitchName::F,
        PitchName::FSharp,
        PitchName::G,
        PitchName::GSharp,
        PitchName::A,
        PitchName::ASharp,
        PitchName::B,
    ];

    /// The written form of this pitch name, e.g. `D#`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PitchName::C => "C",
            PitchName::CSharp => "C#",
            PitchName::D => "D",
            PitchName::DSharp => "D#",
            PitchName::E => "E",
            PitchName::F => "F",
            PitchName::FSharp => "F#",
            PitchName::G => "G",
            PitchName::GSharp => "G#",
            PitchName::A => "A",
            PitchName::ASharp => "A#",
            PitchName::B => "B",
        }
    }

    /// The chromatic index of this name within an octave (C = 0, B = 11).
    pub fn semitone(&self) -> u8 {
        *self as u8
    }

    /// Places this name at the given octave.
    pub fn at(self, octave: i8) -> FullPitch {
        FullPitch::new(self, octave)
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PitchName {
    type Err = PitchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| PitchParseError(s.to_string()))
    }
}

/// A pitch name plus an octave number, e.g. `C4`. This is the key type of the
/// sample catalog and the unit the playback engine is commanded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FullPitch {
    name: PitchName,
    octave: i8,
}

impl FullPitch {
    /// Creates a full pitch. The octave is not range checked here; the catalog
    /// validates its own entries against [OCTAVE_MIN]..=[OCTAVE_MAX].
    pub const fn new(name: PitchName, octave: i8) -> FullPitch {
        FullPitch { name, octave }
    }

    /// Gets the pitch name.
    pub fn name(&self) -> PitchName {
        self.name
    }

    /// Gets the octave.
    pub fn octave(&self) -> i8 {
        self.octave
    }
}

impl fmt::Display for FullPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

impl FromStr for FullPitch {
    type Err = PitchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.find(|c: char| c.is_ascii_digit());
        let (name, octave) = match digits {
            Some(at) if at > 0 => s.split_at(at),
            _ => return Err(PitchParseError(s.to_string())),
        };
        let name: PitchName = name.parse()?;
        let octave: i8 = octave.parse().map_err(|_| PitchParseError(s.to_string()))?;
        Ok(FullPitch { name, octave })
    }
}

// The string form (e.g. "D#4") is the config and log representation, so serde
// goes through Display/FromStr rather than deriving over the fields.
impl Serialize for FullPitch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FullPitch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for PitchName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PitchName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pitch_name_round_trip() {
        for name in PitchName::ALL {
            assert_eq!(Ok(name), name.as_str().parse());
        }
    }

    #[test]
    fn test_full_pitch_display() {
        assert_eq!("C4", PitchName::C.at(4).to_string());
        assert_eq!("D#5", PitchName::DSharp.at(5).to_string());
        assert_eq!("A0", PitchName::A.at(0).to_string());
    }

    #[test]
    fn test_full_pitch_parse() {
        assert_eq!(Ok(PitchName::C.at(4)), "C4".parse());
        assert_eq!(Ok(PitchName::FSharp.at(2)), "F#2".parse());
        assert_eq!(Ok(PitchName::A.at(0)), "A0".parse());

        assert!("".parse::<FullPitch>().is_err());
        assert!("4".parse::<FullPitch>().is_err());
        assert!("C".parse::<FullPitch>().is_err());
        assert!("H4".parse::<FullPitch>().is_err());
        assert!("Db4".parse::<FullPitch>().is_err());
        assert!("C4x".parse::<FullPitch>().is_err());
    }

    #[test]
    fn test_serde_string_form() {
        let pitch: FullPitch = serde_yml::from_str("\"D#4\"").expect("parseable pitch");
        assert_eq!(PitchName::DSharp.at(4), pitch);

        // Round trip through the string form.
        let serialized = serde_yml::to_string(&pitch).expect("serializable");
        let parsed: FullPitch = serde_yml::from_str(&serialized).expect("round trip");
        assert_eq!(pitch, parsed);
    }
}
