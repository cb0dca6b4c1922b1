//! temper
//!
//! Reads every attached TEMPer sensor once and prints one CSV line per
//! sensor to stdout: `<calibrated celsius>,<location>`.

use anyhow::{Context, Result};
use clap::Parser;
use common::setup_logging;
use sensor::{RusbBus, SessionManager, TemperConfig, run_batch};
use std::io::Write;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "temper")]
#[command(
    author,
    version,
    about = "Read USB TEMPer temperature sensors and print calibrated CSV"
)]
#[command(long_about = "
Reads every supported USB temperature sensor once and prints one line per
sensor to stdout: the calibrated temperature in degrees Celsius, a comma,
and the sensor's location tag (its serial-number string index).

SUPPORTED DEVICES:
    1130:660c    control-transfer family
    0c45:7401    interrupt-endpoint family

EXAMPLES:
    # Read all sensors
    temper

    # Dump every USB transfer
    temper --debug

    # Show supported sensors without opening them
    temper --list-devices

CONFIGURATION:
    The driver looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/temper/temper.toml
    3. /etc/temper/temper.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// List supported sensors and exit
    #[arg(long)]
    list_devices: bool,

    /// Dump every transfer and enable libusb debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = TemperConfig::default();
        let path = TemperConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    // A config file that exists but is broken stops the run before any reading
    let config = TemperConfig::load(args.config.clone()).context("Failed to load configuration")?;

    let debug = args.debug || config.general.debug;

    // CLI log level wins, then --debug, then the config file
    let log_level = match args.log_level.as_deref() {
        Some(level) => level,
        None if debug => "debug",
        None => config.general.log_level.as_str(),
    };

    setup_logging(log_level).context("Failed to setup logging")?;
    info!("temper v{}", env!("CARGO_PKG_VERSION"));
    debug!("Log level: {}", log_level);

    let bus = RusbBus::new(debug).context("Failed to initialize libusb")?;

    if args.list_devices {
        return list_devices_mode(&bus);
    }

    let stdout = std::io::stdout();
    let summary = run_batch(&bus, &config, &mut stdout.lock())?;
    info!(
        "Wrote {} reading(s); {} read failure(s), {} open failure(s), {} over capacity",
        summary.lines_written, summary.read_failures, summary.open_failures, summary.overflow
    );

    Ok(())
}

/// List supported sensors without opening them
fn list_devices_mode(bus: &RusbBus) -> Result<()> {
    let sensors = SessionManager::new(bus)
        .discover()
        .context("Failed to enumerate USB devices")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if sensors.is_empty() {
        writeln!(out, "No supported sensors found.")?;
    } else {
        writeln!(out, "Found {} sensor(s):\n", sensors.len())?;
        for sensor in sensors {
            writeln!(
                out,
                "  Bus {:03} Device {:03}  {}  {}  location {}",
                sensor.bus_number, sensor.address, sensor.identity, sensor.variant, sensor.location
            )?;
        }
    }
    out.flush()?;

    Ok(())
}
