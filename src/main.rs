//! boxjoint - command line companion for the box joint jig
//!
//! Computes move lists for a finger pattern, generates random patterns and
//! streams moves to the jig over a serial port.

use anyhow::{anyhow, Context, Result};
use boxjoint::{
    init_logging, list_ports, ChannelListener, Config, CutOrder, CutSession, LineTransport,
    MachineSettings, RandomPatternGenerator, SerialPortOpener, TransportEvent, BUILD_DATE,
    VERSION,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "boxjoint")]
#[command(about = "Compute and send box joint cutting moves", long_about = None)]
struct Cli {
    /// Config file (.toml or .json); defaults to the platform config dir
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the move list for a pattern
    Calc {
        /// Comma-separated gap,finger widths in thou, e.g. "300,300"
        #[arg(short, long)]
        pattern: String,
        /// Cut order; both orders are printed when omitted
        #[arg(short, long, value_enum)]
        order: Option<OrderArg>,
        #[command(flatten)]
        machine: MachineArgs,
    },
    /// Print a random pattern
    Random {
        /// Narrowest width
        #[arg(long)]
        min: Option<i32>,
        /// Widest width
        #[arg(long)]
        max: Option<i32>,
        /// Number of gap/finger pairs
        #[arg(long)]
        pairs: Option<usize>,
        /// Seed for a repeatable pattern
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Send a pattern's moves to the jig and print its replies
    Send {
        /// Comma-separated gap,finger widths in thou
        #[arg(short, long)]
        pattern: String,
        /// Cut order to send
        #[arg(short, long, value_enum)]
        order: OrderArg,
        /// Serial device, e.g. /dev/rfcomm0 or COM5
        #[arg(short, long)]
        device: Option<String>,
        /// Baud rate
        #[arg(short, long)]
        baud: Option<u32>,
        /// How long to wait for replies after sending, in milliseconds
        #[arg(long, default_value_t = 2000)]
        listen_ms: u64,
        #[command(flatten)]
        machine: MachineArgs,
    },
    /// List serial ports the jig may be attached to
    Ports,
    /// Print version and build date
    Version,
}

/// Machine parameter overrides, in thou
#[derive(Args)]
struct MachineArgs {
    /// Blade width
    #[arg(long)]
    kerf: Option<i32>,
    /// Slack taken off fingers and added to gaps
    #[arg(long, allow_negative_numbers = true)]
    tolerance: Option<i32>,
    /// Gap sub-cut step as a fraction of kerf, between 0 and 1
    #[arg(long, value_parser = parse_smoothness)]
    smoothness: Option<f64>,
    /// Width of the stock
    #[arg(long)]
    stock_width: Option<i32>,
}

impl MachineArgs {
    fn apply(&self, settings: &MachineSettings) -> MachineSettings {
        MachineSettings {
            kerf: self.kerf.or(settings.kerf),
            tolerance: self.tolerance.or(settings.tolerance),
            smoothness: self.smoothness.or(settings.smoothness),
            stock_width: self.stock_width.or(settings.stock_width),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Gap,
    Finger,
}

impl From<OrderArg> for CutOrder {
    fn from(order: OrderArg) -> Self {
        CutOrder::from_finger_first(matches!(order, OrderArg::Finger))
    }
}

fn parse_smoothness(text: &str) -> std::result::Result<f64, String> {
    let value: f64 = text.parse().map_err(|e| format!("{}", e))?;
    boxjoint::validate_smoothness(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::load_or_default(cli.config.as_deref()).context("Loading config")?;

    match cli.command {
        Commands::Calc {
            pattern,
            order,
            machine,
        } => {
            let session = session_for(&config, &machine, &pattern);
            calc(&session, order)?;
        }
        Commands::Random {
            min,
            max,
            pairs,
            seed,
        } => {
            random(&config, min, max, pairs, seed)?;
        }
        Commands::Send {
            pattern,
            order,
            device,
            baud,
            listen_ms,
            machine,
        } => {
            let session = session_for(&config, &machine, &pattern);
            let device = device
                .or_else(|| config.connection.device.clone())
                .ok_or_else(|| anyhow!("No device given; pass --device or set connection.device"))?;
            let opener = SerialPortOpener {
                baud_rate: baud.unwrap_or(config.connection.baud_rate),
                timeout: Duration::from_millis(config.connection.timeout_ms),
            };
            send(
                &session,
                opener,
                &device,
                order.into(),
                Duration::from_millis(listen_ms),
            )?;
        }
        Commands::Ports => {
            let ports = list_ports()?;
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{}\t{}", port.port_name, port.description);
            }
        }
        Commands::Version => {
            println!("boxjoint {} (built {})", VERSION, BUILD_DATE);
        }
    }

    Ok(())
}

fn session_for(config: &Config, machine: &MachineArgs, pattern: &str) -> CutSession {
    let settings = machine.apply(&config.machine);
    let mut session = CutSession::new(settings.to_calculator());
    session.set_pattern_text(pattern);
    session
}

fn calc(session: &CutSession, order: Option<OrderArg>) -> Result<()> {
    let orders = match order {
        Some(order) => vec![CutOrder::from(order)],
        None => vec![CutOrder::GapFirst, CutOrder::FingerFirst],
    };

    let mut failed = 0;
    for order in &orders {
        match session.moves(*order) {
            Ok(moves) => println!("{}: {}", order, boxjoint::format_number_list(moves)),
            Err(e) => {
                println!("{}: {}", order, e);
                failed += 1;
            }
        }
    }

    if failed == orders.len() {
        anyhow::bail!("No moves for pattern '{}'", session.pattern_text());
    }
    Ok(())
}

fn random(
    config: &Config,
    min: Option<i32>,
    max: Option<i32>,
    pairs: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let mut params = config.generator.to_parameters();
    params.min_width = min.unwrap_or(params.min_width);
    params.max_width = max.unwrap_or(params.max_width);
    params.pair_count = pairs.unwrap_or(params.pair_count);

    let generator = RandomPatternGenerator::new(params);
    let pattern = match seed {
        Some(seed) => generator.generate_with_rng(&mut StdRng::seed_from_u64(seed))?,
        None => generator.generate()?,
    };
    println!("{}", boxjoint::format_number_list(&pattern));
    Ok(())
}

fn send(
    session: &CutSession,
    opener: SerialPortOpener,
    device: &str,
    order: CutOrder,
    listen: Duration,
) -> Result<()> {
    let mut transport = LineTransport::new(opener);
    let (listener, events) = ChannelListener::new();
    transport.add_listener(Arc::new(listener));

    transport
        .connect(device)
        .with_context(|| format!("Connecting to {}", device))?;
    let count = session.send(&transport, order)?;
    eprintln!("Sent {} {} moves to {}", count, order, device);

    let deadline = Instant::now() + listen;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match events.recv_timeout(remaining) {
            Ok(TransportEvent::DataRead(line)) => println!("{}", line),
            Ok(TransportEvent::Connected(false)) => {
                tracing::warn!("Connection to {} lost", device);
                break;
            }
            Ok(TransportEvent::Connected(true)) => {}
            Err(_) => break,
        }
    }

    transport.disconnect()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_arguments() {
        let cli = Cli::try_parse_from([
            "boxjoint",
            "calc",
            "--pattern",
            "300,300",
            "--order",
            "finger",
            "--tolerance",
            "-3",
        ])
        .unwrap();
        match cli.command {
            Commands::Calc {
                pattern,
                order,
                machine,
            } => {
                assert_eq!(pattern, "300,300");
                assert!(matches!(order, Some(OrderArg::Finger)));
                assert_eq!(machine.tolerance, Some(-3));
            }
            _ => panic!("expected calc"),
        }
    }

    #[test]
    fn test_smoothness_range_checked_at_parse() {
        assert!(
            Cli::try_parse_from(["boxjoint", "calc", "-p", "300,300", "--smoothness", "1.5"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["boxjoint", "calc", "-p", "300,300", "--smoothness", "0.3"])
                .is_ok()
        );
    }

    #[test]
    fn test_overrides_take_precedence_over_config() {
        let config = Config::new();
        let machine = MachineArgs {
            kerf: None,
            tolerance: None,
            smoothness: None,
            stock_width: Some(600),
        };
        let session = session_for(&config, &machine, "300,300");
        assert_eq!(
            session.moves(CutOrder::GapFirst).as_deref(),
            Ok(&[50, 50, 50, 50, 2, 398][..])
        );
        assert_eq!(session.calculator().kerf(), Some(100));
    }
}
