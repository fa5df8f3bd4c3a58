//! Configuration system for the Tellus terrain engine.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! with validation at the boundary: a [`SphereConfig`] is checked before any
//! lookup table is derived from it, so bad values fail with a descriptive
//! [`ConfigError`] instead of NaN geometry.

mod config;
mod error;

pub use config::{
    Config, DebugConfig, MAX_LOD_CEILING, SphereConfig, ViewportConfig,
};
pub use error::ConfigError;
