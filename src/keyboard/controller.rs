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

//! Press/release orchestration against the playback engine.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::catalog::Catalog;
use crate::config::keymap::KeyMap;
use crate::sampler::lifecycle::{EngineState, Lifecycle};

use super::ledger::NoteLedger;
use super::{resolver, velocity};

/// Drives the playback engine from key press/release events, tracking what
/// each input key is sounding.
///
/// Every entry point is total: a press or release that cannot proceed (engine
/// not ready, unmapped key, engine command failure) is a logged no-op, never
/// an error the caller has to handle.
pub struct Controller {
    catalog: Arc<Catalog>,
    keymap: KeyMap,
    lifecycle: Lifecycle,
    ledger: NoteLedger,
    /// The base octave. Externally owned; callers keep it within 0..=8.
    octave: i8,
}

impl Controller {
    /// Creates a controller bound to the given lifecycle.
    pub fn new(
        catalog: Arc<Catalog>,
        keymap: KeyMap,
        lifecycle: Lifecycle,
        octave: i8,
    ) -> Controller {
        Controller {
            catalog,
            keymap,
            lifecycle,
            ledger: NoteLedger::new(),
            octave,
        }
    }

    /// Signals a user interaction; the first one starts engine
    /// initialization.
    pub fn notify_interaction(&mut self) {
        self.lifecycle.notify_interaction();
    }

    /// Gets the engine state, folding in any pending load completion.
    pub fn state(&mut self) -> EngineState {
        self.lifecycle.state()
    }

    /// Gets the base octave.
    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Sets the base octave for subsequent presses. Notes already sounding
    /// keep the pitch they started with.
    pub fn set_octave(&mut self, octave: i8) {
        self.octave = octave;
    }

    /// Handles a key going down.
    ///
    /// A key that is already down is ignored until released, which also
    /// swallows keyboard autorepeat. On success exactly one start command
    /// reaches the engine and the note is recorded in the ledger.
    pub fn press(&mut self, key: &str) {
        if self.lifecycle.state() != EngineState::Ready {
            debug!(key, "Ignoring press, engine not ready");
            return;
        }
        let key = key.to_lowercase();
        let Some(target) = self.keymap.get(&key) else {
            debug!(key, "Ignoring press, unmapped key");
            return;
        };
        if self.ledger.is_active(&key) {
            return;
        }

        let target_octave = self.octave + target.octave_offset();
        let pitch = resolver::resolve(&self.catalog, target.note(), target_octave);
        let velocity = velocity::strike_velocity(target_octave);

        let Some(engine) = self.lifecycle.engine() else {
            return;
        };
        if let Err(e) = engine.trigger_start(pitch, velocity) {
            // Nothing was recorded, so the failed note cannot get stuck.
            warn!(key, pitch = %pitch, err = %e, "Failed to start note");
            return;
        }
        self.ledger.start(&key, pitch);
        debug!(key, pitch = %pitch, velocity, "Note started");
    }

    /// Handles a key going up.
    ///
    /// This is also the entry point for a pointer leaving a key while held;
    /// both paths must release or the note would sound until teardown.
    pub fn release(&mut self, key: &str) {
        if self.lifecycle.state() != EngineState::Ready {
            return;
        }
        let key = key.to_lowercase();
        let Some(pitch) = self.ledger.finish(&key) else {
            return;
        };

        let Some(engine) = self.lifecycle.engine() else {
            return;
        };
        if let Err(e) = engine.trigger_stop(pitch) {
            // The ledger entry is already gone; a failed stop cannot leave
            // a stuck note behind.
            warn!(key, pitch = %pitch, err = %e, "Failed to stop note");
            return;
        }
        debug!(key, pitch = %pitch, "Note stopped");
    }

    /// Returns true if the key currently has a note sounding.
    pub fn is_active(&self, key: &str) -> bool {
        self.ledger.is_active(&key.to_lowercase())
    }

    /// The number of notes currently sounding.
    pub fn active_notes(&self) -> usize {
        self.ledger.len()
    }

    /// Force-releases every sounding note.
    pub fn release_all(&mut self) {
        for note in self.ledger.drain() {
            let Some(engine) = self.lifecycle.engine() else {
                continue;
            };
            if let Err(e) = engine.trigger_stop(note.pitch()) {
                warn!(key = note.key(), pitch = %note.pitch(), err = %e, "Failed to stop note");
            }
        }
    }

    /// Applies a new volume offset in dB. The engine has to be rebuilt for
    /// this, so every sounding note is force-released first; otherwise they
    /// would be tied to a disposed engine with no way to stop them.
    pub fn set_volume(&mut self, volume_offset_db: f32) {
        self.release_all();
        self.lifecycle.reconfigure(volume_offset_db);
    }
}
