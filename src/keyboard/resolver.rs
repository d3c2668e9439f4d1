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

//! Nearest-sample pitch resolution.
//!
//! The catalog only records every few semitones, so most requested pitches
//! have no recording of their own and get substituted with a nearby one.

use crate::config::catalog::{Catalog, FALLBACK_PITCH};
use crate::pitch::{FullPitch, PitchName};

/// Pitch names scanned when the requested pitch has no recording. Spaced a
/// minor third apart so no semitone is more than three steps from an anchor.
const ANCHOR_NAMES: [PitchName; 4] = [
    PitchName::C,
    PitchName::DSharp,
    PitchName::FSharp,
    PitchName::A,
];

/// Octave scan order, radiating out from the center octave. Same-octave
/// matches are preferred first (see [resolve]), so this only decides which
/// neighboring octave's timbre substitutes when the requested octave has no
/// recording at all.
const OCTAVE_PRIORITY: [i8; 7] = [4, 3, 5, 2, 6, 1, 7];

/// Resolves a requested pitch to the closest cataloged one.
///
/// Total over any non-empty catalog containing [FALLBACK_PITCH]: an exact
/// hit is returned as-is, then the anchor names are scanned within the same
/// octave, then every octave in priority order, and finally the fallback.
pub fn resolve(catalog: &Catalog, name: PitchName, octave: i8) -> FullPitch {
    let exact = name.at(octave);
    if catalog.contains(&exact) {
        return exact;
    }

    for anchor in ANCHOR_NAMES {
        let candidate = anchor.at(octave);
        if catalog.contains(&candidate) {
            return candidate;
        }
    }

    for octave in OCTAVE_PRIORITY {
        for anchor in ANCHOR_NAMES {
            let candidate = anchor.at(octave);
            if catalog.contains(&candidate) {
                return candidate;
            }
        }
    }

    FALLBACK_PITCH
}

#[cfg(test)]
mod test {
    use crate::config::catalog::CatalogConfig;
    use crate::pitch::{OCTAVE_MAX, OCTAVE_MIN};

    use super::*;

    #[test]
    fn test_exact_hit() {
        let catalog = CatalogConfig::default().to_catalog().expect("valid catalog");
        for (pitch, _) in catalog.iter() {
            assert_eq!(*pitch, resolve(&catalog, pitch.name(), pitch.octave()));
        }
    }

    #[test]
    fn test_total_over_default_catalog() {
        let catalog = CatalogConfig::default().to_catalog().expect("valid catalog");
        for octave in OCTAVE_MIN..=OCTAVE_MAX {
            for name in PitchName::ALL {
                let resolved = resolve(&catalog, name, octave);
                assert!(
                    catalog.contains(&resolved),
                    "{name}{octave} resolved to uncataloged {resolved}"
                );
            }
        }
    }

    #[test]
    fn test_same_octave_anchor_preferred() {
        let catalog = CatalogConfig::default().to_catalog().expect("valid catalog");

        // G4 has no recording; the first same-octave anchor wins.
        assert_eq!(PitchName::C.at(4), resolve(&catalog, PitchName::G, 4));
        assert_eq!(PitchName::C.at(2), resolve(&catalog, PitchName::E, 2));
    }

    #[test]
    fn test_octave_scan_when_octave_has_no_anchor() {
        let catalog = CatalogConfig::default().to_catalog().expect("valid catalog");

        // Octave 0 only has A0 cataloged, which is itself an anchor name.
        assert_eq!(PitchName::A.at(0), resolve(&catalog, PitchName::C, 0));

        // Octave 8 only has C8.
        assert_eq!(PitchName::C.at(8), resolve(&catalog, PitchName::D, 8));

        // An out-of-range request walks the octave priority order.
        assert_eq!(PitchName::C.at(4), resolve(&catalog, PitchName::D, 9));
    }

    #[test]
    fn test_minimal_catalog_falls_through_to_only_entry() {
        let catalog = Catalog::for_test(&["C4"]);

        // D#4 misses the exact lookup and every same-octave anchor except C4.
        assert_eq!(PitchName::C.at(4), resolve(&catalog, PitchName::DSharp, 4));
        assert_eq!(PitchName::C.at(4), resolve(&catalog, PitchName::B, 7));
    }

    #[test]
    fn test_deterministic() {
        let catalog = CatalogConfig::default().to_catalog().expect("valid catalog");
        for _ in 0..3 {
            assert_eq!(
                resolve(&catalog, PitchName::G, 5),
                resolve(&catalog, PitchName::G, 5)
            );
        }
    }
}
