// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config persistence for Plinth tools.
//!
//! [`ConfigService`] serializes values as JSON and hands the bytes to a
//! [`ConfigStore`]. [`FsConfigStore`] keeps one file per key under the
//! platform config directory; [`MemoryConfigStore`] keeps them in a map.

pub mod config;
mod fs;
mod memory;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use fs::FsConfigStore;
pub use memory::MemoryConfigStore;
