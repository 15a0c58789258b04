//! Box Joint Settings Crate
//!
//! Machine, connection and pattern generator configuration, loaded from a
//! JSON or TOML file and overridden per invocation.

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, GeneratorSettings, MachineSettings};
pub use error::{SettingsError, SettingsResult};
