use anyhow::{Context, Result};
use clap::Parser;
use s3km1110_lib::S3KM1110;
use s3km1110_lib::transport::{DEFAULT_BAUD, SerialTransport};
use std::fmt::Display;
use tracing::{error, info, warn};
use tracing_subscriber;

/// Inspect and update the detection configuration of an S3KM1110 radar.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial port the radar is attached to.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,
    /// Baud rate of the radar UART.
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: u32,
    /// Set the closest detection gate (0-15).
    #[arg(long)]
    min_gates: Option<u8>,
    /// Set the farthest detection gate (0-15).
    #[arg(long)]
    max_gates: Option<u8>,
    /// Set how many frames a target must be present to count as detected.
    #[arg(long)]
    active_frames: Option<u8>,
    /// Set how many frames a target must be absent to count as gone.
    #[arg(long)]
    inactive_frames: Option<u8>,
    /// Set the target disappearance delay in seconds.
    #[arg(long)]
    delay: Option<u16>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_target(false).init();

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

    match radar.read_firmware_version() {
        Ok(version) => info!("Firmware version: {}", version),
        Err(e) => warn!("Could not read firmware version: {}", e),
    }
    match radar.read_serial_number() {
        Ok(serial) => info!("Serial number: {}", serial),
        Err(e) => warn!("Could not read serial number: {}", e),
    }

    if let Some(gates) = cli.min_gates {
        radar
            .set_minimum_gates(gates)
            .context("Failed to set the minimum detection gate")?;
        info!("Minimum detection gate updated");
    }
    if let Some(gates) = cli.max_gates {
        radar
            .set_maximum_gates(gates)
            .context("Failed to set the maximum detection gate")?;
        info!("Maximum detection gate updated");
    }
    if let Some(frames) = cli.active_frames {
        radar
            .set_active_frames(frames)
            .context("Failed to set the active frame count")?;
        info!("Active frame count updated");
    }
    if let Some(frames) = cli.inactive_frames {
        radar
            .set_inactive_frames(frames)
            .context("Failed to set the inactive frame count")?;
        info!("Inactive frame count updated");
    }
    if let Some(seconds) = cli.delay {
        radar
            .set_disappearance_delay(seconds)
            .context("Failed to set the disappearance delay")?;
        info!("Disappearance delay updated");
    }

    radar
        .read_all_radar_configs()
        .context("Failed to read the radar configuration")?;
    let config = radar.configuration();
    info!("Current configuration:");
    info!(
        "  Detection gates: {} to {}",
        display_or_na(config.detection_gates_min),
        display_or_na(config.detection_gates_max)
    );
    info!("  Active frames: {}", display_or_na(config.active_frames));
    info!("  Inactive frames: {}", display_or_na(config.inactive_frames));
    info!(
        "  Disappearance delay: {} s",
        display_or_na(config.disappearance_delay_s)
    );

    Ok(())
}

fn display_or_na<T: Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<Not available>".to_string(),
    }
}
