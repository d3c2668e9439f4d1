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

//! Sample decoding.
//!
//! Catalog recordings are decoded fully into memory before the engine
//! reports ready, so triggering a note never touches the filesystem.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::SamplerError;

/// A decoded recording, shared by every voice that plays it.
pub struct LoadedSample {
    /// Interleaved f32 frames.
    data: Vec<f32>,
    /// Channel count of the decoded audio.
    channels: usize,
    /// Native sample rate of the decoded audio.
    sample_rate: u32,
}

impl LoadedSample {
    /// Gets the native sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The number of frames in the recording.
    pub fn frames(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Reads one stereo frame at a fractional frame position with linear
    /// interpolation. Mono recordings fan out to both sides; recordings with
    /// more than two channels contribute their first two. Returns None past
    /// the end of the recording.
    pub fn frame_at(&self, position: f64) -> Option<(f32, f32)> {
        let frames = self.frames();
        let index = position as usize;
        if position < 0.0 || index >= frames {
            return None;
        }

        let fraction = (position - index as f64) as f32;
        let left = self.channel_at(index, frames, fraction, 0);
        let right = if self.channels > 1 {
            self.channel_at(index, frames, fraction, 1)
        } else {
            left
        };
        Some((left, right))
    }

    fn channel_at(&self, index: usize, frames: usize, fraction: f32, channel: usize) -> f32 {
        let current = self.data[index * self.channels + channel];
        if index + 1 >= frames {
            return current;
        }
        let next = self.data[(index + 1) * self.channels + channel];
        current + (next - current) * fraction
    }
}

#[cfg(test)]
impl LoadedSample {
    /// Creates a sample from raw interleaved frames (test only).
    pub fn from_frames(data: Vec<f32>, channels: usize, sample_rate: u32) -> LoadedSample {
        LoadedSample {
            data,
            channels,
            sample_rate,
        }
    }
}

fn decode_error(path: &Path, message: impl ToString) -> SamplerError {
    SamplerError::Decode {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Decodes an audio file fully into memory.
pub fn decode_file(path: &Path) -> Result<LoadedSample, SamplerError> {
    let file = File::open(path).map_err(|e| decode_error(path, e))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error(path, "no decodable audio track"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(path, e))?;

    let mut data: Vec<f32> = Vec::new();
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_error(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channels = spec.channels.count();
                sample_rate = spec.rate;

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                data.extend_from_slice(buffer.samples());
            }
            // A corrupt packet is recoverable; skip it.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(decode_error(path, e)),
        }
    }

    if data.is_empty() || channels == 0 || sample_rate == 0 {
        return Err(decode_error(path, "recording contains no audio"));
    }

    Ok(LoadedSample {
        data,
        channels,
        sample_rate,
    })
}
