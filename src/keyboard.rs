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

//! Note playback from key input.
//!
//! This module provides:
//! - Nearest-sample pitch resolution over the sparse catalog
//! - Per-note strike velocity
//! - The active note ledger tracking what each input key is sounding
//! - The controller that drives the playback engine from press/release events

mod controller;
mod ledger;
mod resolver;
mod velocity;

pub use controller::Controller;

// These are exported for potential external use and testing
#[allow(unused_imports)]
pub use ledger::{ActiveNote, NoteLedger};
#[allow(unused_imports)]
pub use resolver::resolve;
#[allow(unused_imports)]
pub use velocity::strike_velocity;
