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
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{crate_version, Parser, Subcommand};

use clavier::config::keymap::KeyBinding;
use clavier::config::Config;
use clavier::keyboard::Controller;
use clavier::pitch::{FullPitch, OCTAVE_MAX, OCTAVE_MIN};
use clavier::sampler::lifecycle::{EngineState, Lifecycle};

/// How long to wait for the sample engine before giving up.
const LOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A sample-based piano."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validates and lists the sample catalog.
    Catalog {
        /// The path to the piano config.
        config_path: Option<String>,
    },
    /// Lists the input key bindings.
    Keys {
        /// The path to the piano config.
        config_path: Option<String>,
    },
    /// Plays a sequence of input keys through the engine.
    Play {
        /// The keys to play, e.g. "asdfg". A space inserts a rest.
        keys: String,
        /// The base octave, clamped to 0..=8.
        #[arg(short, long)]
        octave: Option<i8>,
        /// How long each key is held, in milliseconds.
        #[arg(long, default_value_t = 300)]
        hold_ms: u64,
        /// The output device. "mock" runs without audio output.
        #[arg(short, long)]
        device: Option<String>,
        /// The path to the piano config.
        config_path: Option<String>,
    },
}

fn load_config(config_path: Option<String>) -> Result<Config, Box<dyn Error>> {
    Ok(match config_path {
        Some(config_path) => Config::load(&PathBuf::from(config_path))?,
        None => Config::default(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { config_path } => {
            let config = load_config(config_path)?;
            let catalog = config.catalog().to_catalog()?;

            let mut entries: Vec<(&FullPitch, &Path)> = catalog.iter().collect();
            entries.sort_by_key(|(pitch, _)| (pitch.octave(), pitch.name().semitone()));

            println!("Recordings (count: {}):", catalog.len());
            for (pitch, file) in entries {
                println!("- {}: {}", pitch, file.display());
            }
            println!(
                "\nTuning: volume {} dB, gain {}, attack {}s, release {}s, polyphony {}",
                catalog.volume_db(),
                catalog.gain(),
                catalog.attack_seconds(),
                catalog.release_seconds(),
                catalog.max_polyphony()
            );
        }
        Commands::Keys { config_path } => {
            let config = load_config(config_path)?;
            // Building the map validates the tables against collisions.
            let keymap = config.keymap().to_keymap()?;

            println!("Keys (count: {}):", keymap.len());
            println!("White:");
            for binding in config.keymap().white_keys() {
                println!("- {}: {}", binding.key(), describe(binding));
            }
            println!("Black:");
            for binding in config.keymap().black_keys() {
                println!("- {}: {}", binding.key(), describe(binding));
            }
        }
        Commands::Play {
            keys,
            octave,
            hold_ms,
            device,
            config_path,
        } => {
            let config = load_config(config_path)?;
            let catalog = Arc::new(config.catalog().to_catalog()?);
            let keymap = config.keymap().to_keymap()?;
            let octave = octave
                .unwrap_or(config.octave())
                .clamp(OCTAVE_MIN, OCTAVE_MAX);
            let device = device.or_else(|| config.device().map(String::from));

            let lifecycle =
                Lifecycle::new(catalog.clone(), config.sample_dir().to_path_buf(), device);
            let mut controller = Controller::new(catalog.clone(), keymap, lifecycle, octave);

            // The play request is the user interaction that unlocks audio.
            controller.notify_interaction();
            wait_until_ready(&mut controller)?;

            let hold = Duration::from_millis(hold_ms);
            for key in keys.chars() {
                if key == ' ' {
                    thread::sleep(hold);
                    continue;
                }
                let key = key.to_string();
                controller.press(&key);
                thread::sleep(hold);
                controller.release(&key);
            }

            // Let the release tails ring out before tearing down the engine.
            thread::sleep(Duration::from_secs_f32(catalog.release_seconds()));
            controller.release_all();
        }
    }

    Ok(())
}

/// Renders a key binding for listing.
fn describe(binding: &KeyBinding) -> String {
    if binding.octave_offset() == 0 {
        binding.note().to_string()
    } else {
        format!("{} ({:+} octave)", binding.note(), binding.octave_offset())
    }
}

/// Blocks until the engine reports ready, or fails on load error/timeout.
fn wait_until_ready(controller: &mut Controller) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    loop {
        match controller.state() {
            EngineState::Ready => return Ok(()),
            EngineState::Failed => return Err("failed to load the piano samples".into()),
            _ => {}
        }
        if start.elapsed() > LOAD_TIMEOUT {
            return Err("timed out waiting for the piano samples to load".into());
        }
        thread::sleep(Duration::from_millis(25));
    }
}
