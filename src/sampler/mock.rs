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

//! A playback engine that records commands instead of producing audio.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::catalog::Catalog;
use crate::pitch::FullPitch;

use super::{LoadResult, Sampler, SamplerError};

/// A command received by the mock engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Start { pitch: FullPitch, velocity: f32 },
    Stop { pitch: FullPitch },
    StopAll,
}

/// Mock playback engine. Clones share the recorded command list, so a test
/// can keep a handle to a mock that was boxed into a lifecycle.
#[derive(Clone, Default)]
pub struct MockSampler {
    commands: Arc<Mutex<Vec<Command>>>,
    active: Arc<Mutex<Vec<FullPitch>>>,
    fail_starts: Arc<AtomicBool>,
    fail_stops: Arc<AtomicBool>,
}

impl MockSampler {
    /// Creates a mock engine.
    pub fn new() -> MockSampler {
        MockSampler::default()
    }

    /// Pretends to load the catalog. Nothing is decoded.
    pub fn load(catalog: &Catalog) -> LoadResult {
        info!(recordings = catalog.len(), "Mock engine loaded");
        Ok(Box::new(MockSampler::new()))
    }

    /// The commands received so far.
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }
}

#[cfg(test)]
impl MockSampler {
    /// Makes subsequent start commands fail (test only).
    pub fn fail_starts(&self, fail: bool) {
        self.fail_starts.store(fail, Ordering::Relaxed);
    }

    /// Makes subsequent stop commands fail (test only).
    pub fn fail_stops(&self, fail: bool) {
        self.fail_stops.store(fail, Ordering::Relaxed);
    }

    /// The start commands received so far (test only).
    pub fn starts(&self) -> Vec<(FullPitch, f32)> {
        self.commands
            .lock()
            .iter()
            .filter_map(|command| match command {
                Command::Start { pitch, velocity } => Some((*pitch, *velocity)),
                _ => None,
            })
            .collect()
    }

    /// The stop commands received so far (test only).
    pub fn stops(&self) -> Vec<FullPitch> {
        self.commands
            .lock()
            .iter()
            .filter_map(|command| match command {
                Command::Stop { pitch } => Some(*pitch),
                _ => None,
            })
            .collect()
    }
}

impl Sampler for MockSampler {
    fn trigger_start(&self, pitch: FullPitch, velocity: f32) -> Result<(), SamplerError> {
        if self.fail_starts.load(Ordering::Relaxed) {
            return Err(SamplerError::Stream("mock start failure".to_string()));
        }
        self.commands.lock().push(Command::Start { pitch, velocity });
        self.active.lock().push(pitch);
        Ok(())
    }

    fn trigger_stop(&self, pitch: FullPitch) -> Result<(), SamplerError> {
        if self.fail_stops.load(Ordering::Relaxed) {
            return Err(SamplerError::Stream("mock stop failure".to_string()));
        }
        self.commands.lock().push(Command::Stop { pitch });
        self.active.lock().retain(|active| *active != pitch);
        Ok(())
    }

    fn stop_all(&self) {
        self.commands.lock().push(Command::StopAll);
        self.active.lock().clear();
    }

    fn active_voices(&self) -> usize {
        self.active.lock().len()
    }
}

#[cfg(test)]
mod test {
    use crate::pitch::PitchName;

    use super::*;

    #[test]
    fn test_mock_records_commands() {
        let mock = MockSampler::new();
        let shared = mock.clone();

        mock.trigger_start(PitchName::C.at(4), 0.8).expect("start");
        assert_eq!(1, shared.active_voices());

        mock.trigger_stop(PitchName::C.at(4)).expect("stop");
        assert_eq!(0, shared.active_voices());

        assert_eq!(
            vec![
                Command::Start {
                    pitch: PitchName::C.at(4),
                    velocity: 0.8
                },
                Command::Stop {
                    pitch: PitchName::C.at(4)
                },
            ],
            shared.commands()
        );
    }

    #[test]
    fn test_mock_failure_injection() {
        let mock = MockSampler::new();
        mock.fail_starts(true);
        assert!(mock.trigger_start(PitchName::C.at(4), 0.8).is_err());
        assert!(mock.commands().is_empty());

        mock.fail_starts(false);
        mock.fail_stops(true);
        mock.trigger_start(PitchName::C.at(4), 0.8).expect("start");
        assert!(mock.trigger_stop(PitchName::C.at(4)).is_err());
        assert_eq!(1, mock.active_voices());
    }
}
