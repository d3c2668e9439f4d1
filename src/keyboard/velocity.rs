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

//! Per-note strike velocity.

use rand::Rng;

/// Base strike intensity before octave weighting and variance.
const BASE_VELOCITY: f32 = 0.7;

/// Velocity lost per octave of distance from the center octave.
const OCTAVE_FALLOFF: f32 = 0.1;

/// Upper bound of the random variance added to each strike.
const VARIANCE: f32 = 0.2;

/// The octave played at full weight.
const CENTER_OCTAVE: i8 = 4;

/// Computes the strike velocity for a note at the given octave, in [0, 1].
///
/// Notes far from the center octave play slightly softer, and a random
/// component drawn fresh on every call models natural strike variance.
/// (An earlier revision used a flat `0.7 + random(0, 0.3)` without the
/// octave weighting; the octave-aware curve is the one that stuck.)
pub fn strike_velocity(octave: i8) -> f32 {
    let distance = (i32::from(octave) - i32::from(CENTER_OCTAVE)).abs() as f32;
    let octave_adjustment = (1.0 - distance * OCTAVE_FALLOFF).max(0.0);
    let variance = rand::thread_rng().gen_range(0.0..VARIANCE);
    (BASE_VELOCITY * octave_adjustment + variance).min(1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_velocity_bounds() {
        for octave in -2..=12 {
            for _ in 0..50 {
                let velocity = strike_velocity(octave);
                assert!(
                    (0.0..=1.0).contains(&velocity),
                    "velocity {velocity} out of bounds at octave {octave}"
                );
            }
        }
    }

    #[test]
    fn test_center_octave_range() {
        for _ in 0..50 {
            let velocity = strike_velocity(4);
            assert!((0.7..0.9).contains(&velocity));
        }
    }

    #[test]
    fn test_distant_octaves_softer() {
        // At octave 0 the adjustment is 0.6, so even the loudest strike
        // stays below the quietest center-octave strike.
        for _ in 0..50 {
            let velocity = strike_velocity(0);
            assert!((0.42..0.62).contains(&velocity));
        }

        // Ten or more octaves out the base term bottoms out at zero and
        // only the variance remains.
        for _ in 0..50 {
            let velocity = strike_velocity(-6);
            assert!((0.0..0.2).contains(&velocity));
        }
    }

    #[test]
    fn test_variance_redrawn_per_call() {
        let draws: Vec<f32> = (0..64).map(|_| strike_velocity(4)).collect();
        let first = draws[0];
        assert!(
            draws.iter().any(|v| (v - first).abs() > f32::EPSILON),
            "64 strikes produced identical velocities"
        );
    }
}
