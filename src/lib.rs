//! # Box Joint Companion
//!
//! Drives a box joint cutting jig: a stepper-driven carriage that moves the
//! stock sideways under a fixed blade. The companion turns a finger pattern
//! into the incremental moves the jig executes and streams them to it over a
//! serial link (usually a Bluetooth RFCOMM port).
//!
//! ## Architecture
//!
//! The workspace is split into crates:
//!
//! 1. **boxjoint-core** - Error types and the comma-separated number codec
//! 2. **boxjoint-camtools** - Move calculator and random pattern generator
//! 3. **boxjoint-communication** - Serial port access and the line transport
//! 4. **boxjoint-settings** - Machine, connection and generator configuration
//! 5. **boxjoint** - Cut session and the command line binary

pub mod session;

pub use boxjoint_core::{
    encode_moves, format_number_list, parse_number_list, ConnectionError, Error, FormatError,
    Result,
};

pub use boxjoint_camtools::{
    validate_smoothness, CalculationError, CutOrder, MoveCalculator, MovePlan,
    PatternGeneratorParameters, RandomPatternGenerator,
};

pub use boxjoint_communication::{
    list_ports, ChannelListener, LineTransport, SerialPortInfo, SerialPortOpener,
    TransportEvent, TransportListener,
};

pub use boxjoint_settings::{Config, ConnectionSettings, GeneratorSettings, MachineSettings};

pub use session::{CutSession, FieldError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log lines go to stderr so stdout carries only command output (move
/// lists, patterns, jig replies). `RUST_LOG` overrides the level; `verbose`
/// raises the default from WARN to DEBUG.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
