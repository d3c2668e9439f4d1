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

//! cpal-backed playback engine.
//!
//! The output stream lives on a dedicated thread (cpal streams are not Send)
//! that parks until shutdown; the engine handle and the audio callback share
//! the voice list behind a mutex held only for the length of one buffer mix.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::catalog::Catalog;
use crate::pitch::FullPitch;

use super::loader::{decode_file, LoadedSample};
use super::voice::Voice;
use super::{LoadResult, Sampler, SamplerError};

/// Sounding voices, shared between trigger calls and the audio callback.
type VoiceList = Arc<Mutex<Vec<Voice>>>;

/// Playback engine mixing decoded catalog recordings into a cpal stream.
pub struct CpalSampler {
    /// Decoded recordings by pitch.
    samples: HashMap<FullPitch, Arc<LoadedSample>>,
    voices: VoiceList,
    /// Sample rate of the output device.
    device_rate: u32,
    attack_seconds: f32,
    release_seconds: f32,
    max_polyphony: usize,
    /// Dropping this tells the stream thread to shut down.
    shutdown: Option<Sender<()>>,
    stream_thread: Option<thread::JoinHandle<()>>,
}

impl CpalSampler {
    /// Decodes the catalog and starts the output stream. Blocks until the
    /// stream is live, so this is intended to run on the loader thread.
    pub fn load(catalog: &Catalog, sample_dir: &Path, volume_offset_db: f32) -> LoadResult {
        let mut samples = HashMap::new();
        for (pitch, file) in catalog.iter() {
            let path = sample_dir.join(file);
            let loaded = decode_file(&path)?;
            debug!(
                pitch = %pitch,
                path = %path.display(),
                frames = loaded.frames(),
                "Recording decoded"
            );
            samples.insert(*pitch, Arc::new(loaded));
        }
        info!(recordings = samples.len(), "Catalog decoded");

        let master_gain = catalog.gain() * db_to_linear(catalog.volume_db() + volume_offset_db);
        let voices: VoiceList = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let (stream_tx, stream_rx) = bounded::<Result<u32, SamplerError>>(1);

        let stream_thread = {
            let voices = voices.clone();
            thread::spawn(move || {
                let (stream, device_rate) = match build_stream(voices, master_gain) {
                    Ok(built) => built,
                    Err(e) => {
                        let _ = stream_tx.send(Err(e));
                        return;
                    }
                };
                let _ = stream_tx.send(Ok(device_rate));

                // Park until the engine is disposed. Dropping the stream
                // stops output.
                let _ = shutdown_rx.recv();
                drop(stream);
            })
        };

        let device_rate = match stream_rx.recv() {
            Ok(Ok(device_rate)) => device_rate,
            Ok(Err(e)) => {
                let _ = stream_thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = stream_thread.join();
                return Err(SamplerError::Stream(
                    "output thread exited before the stream started".to_string(),
                ));
            }
        };
        info!(device_rate, volume_offset_db, "Output stream started");

        Ok(Box::new(CpalSampler {
            samples,
            voices,
            device_rate,
            attack_seconds: catalog.attack_seconds(),
            release_seconds: catalog.release_seconds(),
            max_polyphony: catalog.max_polyphony(),
            shutdown: Some(shutdown_tx),
            stream_thread: Some(stream_thread),
        }))
    }
}

impl Sampler for CpalSampler {
    fn trigger_start(&self, pitch: FullPitch, velocity: f32) -> Result<(), SamplerError> {
        let sample = self
            .samples
            .get(&pitch)
            .ok_or(SamplerError::UnknownPitch(pitch))?;
        let voice = Voice::new(
            pitch,
            sample.clone(),
            velocity.clamp(0.0, 1.0),
            self.device_rate,
            self.attack_seconds,
            self.release_seconds,
        );

        let mut voices = self.voices.lock();
        if voices.len() >= self.max_polyphony {
            // Steal the oldest voice to stay under the cap.
            voices.remove(0);
            debug!(max_polyphony = self.max_polyphony, "Voice cap reached, stealing oldest");
        }
        voices.push(voice);
        Ok(())
    }

    fn trigger_stop(&self, pitch: FullPitch) -> Result<(), SamplerError> {
        let mut voices = self.voices.lock();
        for voice in voices
            .iter_mut()
            .filter(|voice| voice.pitch() == pitch && !voice.is_releasing())
        {
            voice.release();
        }
        Ok(())
    }

    fn stop_all(&self) {
        let mut voices = self.voices.lock();
        for voice in voices.iter_mut() {
            voice.release();
        }
    }

    fn active_voices(&self) -> usize {
        self.voices.lock().len()
    }
}

impl Drop for CpalSampler {
    fn drop(&mut self) {
        self.voices.lock().clear();
        // Dropping the sender unparks the stream thread.
        drop(self.shutdown.take());
        if let Some(stream_thread) = self.stream_thread.take() {
            if stream_thread.join().is_err() {
                warn!("Output stream thread panicked during shutdown");
            }
        }
    }
}

/// Converts a dB value to a linear gain factor.
fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Builds and starts the output stream on the default device. Returns the
/// stream together with its sample rate.
fn build_stream(voices: VoiceList, master_gain: f32) -> Result<(cpal::Stream, u32), SamplerError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(SamplerError::NoOutputDevice)?;
    let supported = device
        .default_output_config()
        .map_err(|e| SamplerError::Stream(e.to_string()))?;
    let device_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.into();

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                mix_into(&voices, data, channels, master_gain);
            },
            |e| warn!(err = %e, "Output stream error"),
            None,
        )
        .map_err(|e| SamplerError::Stream(e.to_string()))?;
    stream
        .play()
        .map_err(|e| SamplerError::Stream(e.to_string()))?;

    Ok((stream, device_rate))
}

/// Mixes every sounding voice into the interleaved output buffer and drops
/// the voices that finished.
fn mix_into(voices: &VoiceList, data: &mut [f32], channels: usize, master_gain: f32) {
    data.fill(0.0);
    if channels == 0 {
        return;
    }

    let mut voices = voices.lock();
    if voices.is_empty() {
        return;
    }

    for frame in data.chunks_mut(channels) {
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        for voice in voices.iter_mut() {
            let (voice_left, voice_right) = voice.next_frame();
            left += voice_left;
            right += voice_right;
        }
        frame[0] = left * master_gain;
        if channels > 1 {
            frame[1] = right * master_gain;
        }
    }

    voices.retain(|voice| !voice.is_finished());
}
