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

//! Engine lifecycle management.
//!
//! The engine cannot exist before the first genuine user interaction (the
//! environments this runs against refuse to open audio output earlier), so
//! the lifecycle starts empty and the first interaction begins an
//! asynchronous load. Completion arrives as a one-shot channel message that
//! is absorbed the next time somebody asks for the state. Tearing the
//! lifecycle down drops the channel receiver, which is what makes a late
//! completion for a disposed instance undeliverable rather than ignored by
//! convention.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{error, info};

use crate::config::catalog::Catalog;

use super::{LoadResult, Sampler};

/// Externally visible engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No engine exists and no load has begun.
    Uninitialized,
    /// The catalog is being decoded and the output stream brought up.
    Loading,
    /// The engine is live and accepting triggers.
    Ready,
    /// The load failed. Terminal for this engine instance; reconfiguration
    /// starts a fresh one.
    Failed,
    /// The engine was torn down.
    Disposed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Loading => "loading",
            EngineState::Ready => "ready",
            EngineState::Failed => "failed",
            EngineState::Disposed => "disposed",
        };
        f.write_str(state)
    }
}

/// What the lifecycle loads engines from.
struct LoadConfig {
    catalog: Arc<Catalog>,
    sample_dir: PathBuf,
    device: Option<String>,
    volume_offset_db: f32,
}

enum Phase {
    Uninitialized,
    Loading(Receiver<LoadResult>),
    Ready(Box<dyn Sampler>),
    Failed,
    Disposed,
}

/// Owns the playback engine and its construction/teardown. Exactly one
/// lifecycle exists per controller; nothing here is process-global.
pub struct Lifecycle {
    phase: Phase,
    /// Set by the first interaction; later interactions are no-ops.
    interacted: bool,
    config: LoadConfig,
}

impl Lifecycle {
    /// Creates a lifecycle that will load an engine for the given catalog
    /// once the first interaction arrives.
    pub fn new(catalog: Arc<Catalog>, sample_dir: PathBuf, device: Option<String>) -> Lifecycle {
        Lifecycle {
            phase: Phase::Uninitialized,
            interacted: false,
            config: LoadConfig {
                catalog,
                sample_dir,
                device,
                volume_offset_db: 0.0,
            },
        }
    }

    /// Signals a user interaction. The first one begins engine
    /// initialization; the rest do nothing.
    pub fn notify_interaction(&mut self) {
        if self.interacted {
            return;
        }
        self.interacted = true;
        self.begin_load();
    }

    /// Gets the current state, absorbing a pending load completion first.
    pub fn state(&mut self) -> EngineState {
        self.absorb_completion();
        match &self.phase {
            Phase::Uninitialized => EngineState::Uninitialized,
            Phase::Loading(_) => EngineState::Loading,
            Phase::Ready(_) => EngineState::Ready,
            Phase::Failed => EngineState::Failed,
            Phase::Disposed => EngineState::Disposed,
        }
    }

    /// Gets the loaded engine, if the lifecycle is ready.
    pub fn engine(&self) -> Option<&dyn Sampler> {
        match &self.phase {
            Phase::Ready(engine) => Some(engine.as_ref()),
            _ => None,
        }
    }

    /// Tears the engine down. Any in-flight load is abandoned; its eventual
    /// completion has nowhere to land once the receiver is gone.
    pub fn dispose(&mut self) {
        if let Phase::Ready(engine) = &self.phase {
            engine.stop_all();
        }
        self.phase = Phase::Disposed;
        info!("Sample engine disposed");
    }

    /// Applies a new volume offset by tearing down the current engine and
    /// loading a fresh one. Before the first interaction this only stores
    /// the offset; the gated initial load picks it up.
    pub fn reconfigure(&mut self, volume_offset_db: f32) {
        self.config.volume_offset_db = volume_offset_db;
        if !self.interacted {
            return;
        }
        self.dispose();
        self.begin_load();
    }

    fn begin_load(&mut self) {
        info!(
            recordings = self.config.catalog.len(),
            volume_offset_db = self.config.volume_offset_db,
            "Loading sample engine"
        );
        let load_rx = super::load(
            self.config.catalog.clone(),
            self.config.sample_dir.clone(),
            self.config.device.clone(),
            self.config.volume_offset_db,
        );
        self.phase = Phase::Loading(load_rx);
    }

    fn absorb_completion(&mut self) {
        let Phase::Loading(load_rx) = &self.phase else {
            return;
        };
        match load_rx.try_recv() {
            Ok(Ok(engine)) => {
                info!("Sample engine ready");
                self.phase = Phase::Ready(engine);
            }
            Ok(Err(e)) => {
                error!(err = %e, "Sample engine failed to load");
                self.phase = Phase::Failed;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("Sample engine loader exited without reporting");
                self.phase = Phase::Failed;
            }
        }
    }
}

#[cfg(test)]
impl Lifecycle {
    /// Creates a lifecycle that is immediately ready with the given engine
    /// (test only). The interaction gate is treated as already passed.
    pub fn with_engine(engine: Box<dyn Sampler>) -> Lifecycle {
        Lifecycle {
            phase: Phase::Ready(engine),
            interacted: true,
            config: test_config(),
        }
    }

    /// Creates a lifecycle waiting on the given load channel (test only).
    pub fn with_pending(load_rx: Receiver<LoadResult>) -> Lifecycle {
        Lifecycle {
            phase: Phase::Loading(load_rx),
            interacted: true,
            config: test_config(),
        }
    }
}

#[cfg(test)]
fn test_config() -> LoadConfig {
    LoadConfig {
        catalog: Arc::new(Catalog::for_test(&["C4"])),
        sample_dir: PathBuf::from("."),
        device: Some("mock".to_string()),
        volume_offset_db: 0.0,
    }
}

#[cfg(test)]
mod test {
    use crossbeam_channel::bounded;

    use crate::sampler::mock::MockSampler;
    use crate::sampler::SamplerError;
    use crate::test::eventually;

    use super::*;

    fn mock_lifecycle() -> Lifecycle {
        Lifecycle::new(
            Arc::new(Catalog::for_test(&["C4"])),
            PathBuf::from("."),
            Some("mock".to_string()),
        )
    }

    #[test]
    fn test_gated_initialization() {
        let mut lifecycle = mock_lifecycle();
        assert_eq!(EngineState::Uninitialized, lifecycle.state());
        assert!(lifecycle.engine().is_none());

        lifecycle.notify_interaction();
        eventually(
            || lifecycle.state() == EngineState::Ready,
            "engine never became ready",
        );
        assert!(lifecycle.engine().is_some());

        // Later interactions do not restart the load.
        lifecycle.notify_interaction();
        assert_eq!(EngineState::Ready, lifecycle.state());
    }

    #[test]
    fn test_pending_load_completes() {
        let (load_tx, load_rx) = bounded(1);
        let mut lifecycle = Lifecycle::with_pending(load_rx);
        assert_eq!(EngineState::Loading, lifecycle.state());
        assert!(lifecycle.engine().is_none());

        load_tx
            .send(Ok(Box::new(MockSampler::new()) as Box<dyn Sampler>))
            .expect("send completion");
        assert_eq!(EngineState::Ready, lifecycle.state());
        assert!(lifecycle.engine().is_some());
    }

    #[test]
    fn test_failed_load() {
        let (load_tx, load_rx) = bounded(1);
        let mut lifecycle = Lifecycle::with_pending(load_rx);

        load_tx
            .send(Err(SamplerError::NoOutputDevice))
            .expect("send completion");
        assert_eq!(EngineState::Failed, lifecycle.state());
        assert!(lifecycle.engine().is_none());
    }

    #[test]
    fn test_late_completion_after_dispose() {
        let (load_tx, load_rx) = bounded(1);
        let mut lifecycle = Lifecycle::with_pending(load_rx);
        assert_eq!(EngineState::Loading, lifecycle.state());

        lifecycle.dispose();
        assert_eq!(EngineState::Disposed, lifecycle.state());

        // The load finishes after teardown; the notification has nowhere to
        // land and the lifecycle stays disposed.
        assert!(load_tx
            .send(Ok(Box::new(MockSampler::new()) as Box<dyn Sampler>))
            .is_err());
        assert_eq!(EngineState::Disposed, lifecycle.state());
        assert!(lifecycle.engine().is_none());
    }

    #[test]
    fn test_dispose_stops_engine() {
        let mock = MockSampler::new();
        let mut lifecycle = Lifecycle::with_engine(Box::new(mock.clone()));
        assert_eq!(EngineState::Ready, lifecycle.state());

        lifecycle.dispose();
        assert_eq!(EngineState::Disposed, lifecycle.state());
        assert_eq!(
            vec![crate::sampler::mock::Command::StopAll],
            mock.commands()
        );
    }

    #[test]
    fn test_reconfigure_reloads() {
        let mut lifecycle = mock_lifecycle();
        lifecycle.notify_interaction();
        eventually(
            || lifecycle.state() == EngineState::Ready,
            "engine never became ready",
        );

        lifecycle.reconfigure(-6.0);
        eventually(
            || lifecycle.state() == EngineState::Ready,
            "engine never reloaded",
        );
    }

    #[test]
    fn test_reconfigure_before_interaction_stays_gated() {
        let mut lifecycle = mock_lifecycle();
        lifecycle.reconfigure(-6.0);
        assert_eq!(EngineState::Uninitialized, lifecycle.state());
    }
}
