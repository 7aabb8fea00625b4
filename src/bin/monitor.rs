use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use s3km1110_lib::S3KM1110;
use s3km1110_lib::transport::{DEFAULT_BAUD, SerialTransport};
use std::thread::sleep;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// A simple monitor to stream presence and distance readings from an S3KM1110 radar.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial port the radar is attached to.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,
    /// Baud rate of the radar UART.
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: u32,
    /// Run continuously until Ctrl+C is pressed.
    #[arg(short, long)]
    continuous: bool,
    /// Number of readings to print if not running continuously.
    #[arg(short, long, default_value_t = 10)]
    samples: u32,
    /// Polling interval in milliseconds.
    #[arg(short, long, default_value_t = 200)]
    interval_ms: u64,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        error!("Application failed: {:?}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    info!("Opening {} at {} baud...", cli.port, cli.baud);
    let transport = SerialTransport::open(&cli.port, cli.baud)
        .with_context(|| format!("Failed to open serial port {}", cli.port))?;
    let mut radar = S3KM1110::new(transport);

    info!("Switching the radar into report mode...");
    radar.begin().context("Failed to initialize the radar")?;

    match radar.read_firmware_version() {
        Ok(version) => info!("Firmware: {}", version),
        Err(e) => warn!("Could not read firmware version: {}", e),
    }

    let mut printed = 0u32;
    loop {
        match radar.read() {
            Ok(Some(reading)) => {
                let (gate, energy) = reading.peak_gate();
                info!("{} (peak gate {} at energy {})", reading, gate, energy);
                printed += 1;
                if !cli.continuous && printed >= cli.samples {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Read failed: {}", e),
        }
        sleep(Duration::from_millis(cli.interval_ms));
    }

    info!("Done.");
    Ok(())
}
