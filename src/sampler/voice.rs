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

//! A single sounding voice: one playback of a catalog recording with an
//! attack/sustain/release envelope.

use std::sync::Arc;

use crate::pitch::FullPitch;

use super::loader::LoadedSample;

/// Envelope stage. Voices move strictly forward through these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Attack,
    Sustain,
    Release,
}

/// One sounding playback of a catalog recording.
pub struct Voice {
    pitch: FullPitch,
    sample: Arc<LoadedSample>,
    /// Fractional read position, in frames of the recording.
    position: f64,
    /// Read step per output frame (native rate over device rate).
    step: f64,
    /// Strike velocity applied as a linear amplitude.
    amplitude: f32,
    stage: Stage,
    /// Current envelope level.
    level: f32,
    /// Envelope level gained per output frame during attack.
    attack_step: f32,
    /// Envelope level lost per output frame during release.
    release_step: f32,
    finished: bool,
}

impl Voice {
    /// Creates a voice at the start of the recording.
    pub fn new(
        pitch: FullPitch,
        sample: Arc<LoadedSample>,
        amplitude: f32,
        device_rate: u32,
        attack_seconds: f32,
        release_seconds: f32,
    ) -> Voice {
        let step = f64::from(sample.sample_rate()) / f64::from(device_rate);
        Voice {
            pitch,
            sample,
            position: 0.0,
            step,
            amplitude,
            stage: Stage::Attack,
            level: 0.0,
            attack_step: envelope_step(attack_seconds, device_rate),
            release_step: envelope_step(release_seconds, device_rate),
            finished: false,
        }
    }

    /// Gets the pitch this voice is sounding.
    pub fn pitch(&self) -> FullPitch {
        self.pitch
    }

    /// Returns true if the voice has been released.
    pub fn is_releasing(&self) -> bool {
        self.stage == Stage::Release
    }

    /// Begins the release stage from the current envelope level.
    pub fn release(&mut self) {
        self.stage = Stage::Release;
    }

    /// Returns true once the voice has fully faded or run out of audio.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produces the next stereo output frame and advances the envelope.
    pub fn next_frame(&mut self) -> (f32, f32) {
        if self.finished {
            return (0.0, 0.0);
        }
        let Some((left, right)) = self.sample.frame_at(self.position) else {
            self.finished = true;
            return (0.0, 0.0);
        };

        match self.stage {
            Stage::Attack => {
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {}
            Stage::Release => {
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.finished = true;
                }
            }
        }

        let gain = self.level * self.amplitude;
        self.position += self.step;
        (left * gain, right * gain)
    }
}

/// Envelope change per output frame for a stage of the given length. A
/// zero-length stage completes in a single frame.
fn envelope_step(seconds: f32, device_rate: u32) -> f32 {
    let frames = seconds * device_rate as f32;
    if frames <= 1.0 {
        1.0
    } else {
        1.0 / frames
    }
}

#[cfg(test)]
mod test {
    use crate::pitch::PitchName;

    use super::*;

    fn test_sample(frames: usize) -> Arc<LoadedSample> {
        Arc::new(LoadedSample::from_frames(vec![0.5; frames], 1, 100))
    }

    #[test]
    fn test_attack_ramps_to_sustain() {
        // 0.1s attack at 100Hz device rate is 10 frames.
        let mut voice = Voice::new(PitchName::C.at(4), test_sample(1000), 1.0, 100, 0.1, 0.1);

        let (first, _) = voice.next_frame();
        let (second, _) = voice.next_frame();
        assert!(first < second, "attack should ramp up");

        for _ in 0..20 {
            voice.next_frame();
        }
        assert!(!voice.is_releasing());
        let (sustained, _) = voice.next_frame();
        assert!((sustained - 0.5).abs() < 1e-3, "sustain should hit full level");
    }

    #[test]
    fn test_release_fades_to_finished() {
        let mut voice = Voice::new(PitchName::C.at(4), test_sample(1000), 1.0, 100, 0.0, 0.1);
        voice.next_frame();

        voice.release();
        assert!(voice.is_releasing());

        // 0.1s release at 100Hz is 10 frames; allow a couple extra.
        for _ in 0..15 {
            voice.next_frame();
        }
        assert!(voice.is_finished());
        assert_eq!((0.0, 0.0), voice.next_frame());
    }

    #[test]
    fn test_finishes_at_end_of_recording() {
        let mut voice = Voice::new(PitchName::C.at(4), test_sample(5), 1.0, 100, 0.0, 1.0);
        for _ in 0..6 {
            voice.next_frame();
        }
        assert!(voice.is_finished());
    }

    #[test]
    fn test_step_follows_rate_ratio() {
        // A 200Hz recording on a 100Hz device reads two frames per output
        // frame and runs out in half the frames.
        let sample = Arc::new(LoadedSample::from_frames(vec![0.5; 10], 1, 200));
        let mut voice = Voice::new(PitchName::C.at(4), sample, 1.0, 100, 0.0, 1.0);
        for _ in 0..5 {
            voice.next_frame();
        }
        assert!(!voice.is_finished());
        voice.next_frame();
        assert!(voice.is_finished());
    }

    #[test]
    fn test_velocity_scales_amplitude() {
        let mut full = Voice::new(PitchName::C.at(4), test_sample(10), 1.0, 100, 0.0, 1.0);
        let mut half = Voice::new(PitchName::C.at(4), test_sample(10), 0.5, 100, 0.0, 1.0);

        let (loud, _) = full.next_frame();
        let (soft, _) = half.next_frame();
        assert!((loud - 2.0 * soft).abs() < f32::EPSILON);
    }
}
