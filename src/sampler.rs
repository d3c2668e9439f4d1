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

//! Sample playback engines.
//!
//! The playback engine is a narrow boundary: load a catalog of recordings,
//! start a pitch at a velocity, stop a pitch. Everything above it (key
//! mapping, resolution, the note ledger) is engine-agnostic, and everything
//! below it (decoding, mixing, the output stream) is replaceable - the mock
//! engine substitutes for the cpal one in tests and on machines without an
//! audio device.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::config::catalog::Catalog;
use crate::pitch::FullPitch;

pub mod lifecycle;
mod loader;
pub mod mock;
mod output;
mod voice;

/// Error produced by a playback engine.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("no recording for pitch {0}")]
    UnknownPitch(FullPitch),

    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// The contract between the playback controller and a playback engine.
/// Engines are fully loaded by the time they exist; loading happens behind
/// [lifecycle::Lifecycle]. Commands take effect immediately.
pub trait Sampler: Send {
    /// Starts the recording for the pitch at the given velocity (0 to 1).
    fn trigger_start(&self, pitch: FullPitch, velocity: f32) -> Result<(), SamplerError>;

    /// Releases every sounding voice for the pitch.
    fn trigger_stop(&self, pitch: FullPitch) -> Result<(), SamplerError>;

    /// Releases everything that is sounding.
    fn stop_all(&self);

    /// The number of voices currently sounding.
    fn active_voices(&self) -> usize;
}

/// Completion notification for an engine load.
pub type LoadResult = Result<Box<dyn Sampler>, SamplerError>;

/// Begins loading an engine for the catalog on a background thread. The
/// result is delivered exactly once on the returned channel; dropping the
/// receiver discards a load that finishes after its lifecycle was torn down.
pub fn load(
    catalog: Arc<Catalog>,
    sample_dir: PathBuf,
    device: Option<String>,
    volume_offset_db: f32,
) -> Receiver<LoadResult> {
    let (load_tx, load_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let result = match device.as_deref() {
            Some(device) if device.starts_with("mock") => mock::MockSampler::load(&catalog),
            _ => output::CpalSampler::load(&catalog, &sample_dir, volume_offset_db),
        };
        if load_tx.send(result).is_err() {
            debug!("Engine load finished after its lifecycle was disposed");
        }
    });
    load_rx
}
