//! Virtual DAQ Board Serial Emulator
//!
//! Exposes a simulated multi-channel acquisition board on a host serial
//! port. The host sends `s…` settings updates and `i` info requests; the
//! board answers with `OK`, capability reports, and paced sample lines.
//!
//! Usage: `daq-board [port]`; the positional port overrides the one in
//! `daq-board.json`; every other setting falls back to a default (115200
//! baud, six channels `A0`..`A5`, no board name).

mod settings;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use daq_sim::{run_board_task, BoardConfig, BoardTaskCommand, VirtualBoard};
use settings::{Settings, SETTINGS_FILE};
use tokio::sync::mpsc;
use tokio_serial::SerialPortBuilderExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daq_board=info,daq_protocol=info,daq_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings_path = Path::new(SETTINGS_FILE);
    let mut settings = Settings::load(settings_path);
    if !settings_path.exists() {
        // First run: leave an editable settings file behind
        if let Err(e) = settings.save(settings_path) {
            warn!("could not write default settings file: {e}");
        }
    }

    if let Some(port) = std::env::args().nth(1) {
        settings.port = port;
    }
    if settings.port.is_empty() {
        list_ports();
        anyhow::bail!(
            "no serial port configured; pass one as an argument or set \"port\" in {SETTINGS_FILE}"
        );
    }

    info!("opening {} at {} baud", settings.port, settings.baud_rate);
    let stream = tokio_serial::new(&settings.port, settings.baud_rate)
        .timeout(Duration::from_millis(100))
        .open_native_async()
        .with_context(|| format!("failed to open serial port {}", settings.port))?;

    let board = VirtualBoard::with_synthetic_source(BoardConfig {
        board_name: settings.board_name.clone(),
        labels: settings.labels.clone(),
    });

    // Give the host's port handling a moment to settle before READY
    tokio::time::sleep(Duration::from_millis(settings.settle_ms)).await;

    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let mut task = tokio::spawn(run_board_task(stream, board, cmd_rx));

    tokio::select! {
        result = &mut task => {
            result.context("board task failed")?.context("transport failure")?;
            return Ok(());
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            let _ = cmd_tx.send(BoardTaskCommand::Shutdown).await;
        }
    }
    task.await.context("board task failed")?.context("transport failure")?;

    Ok(())
}

/// Log the serial ports present on this machine
fn list_ports() {
    match serialport::available_ports() {
        Ok(ports) if ports.is_empty() => info!("no serial ports found"),
        Ok(ports) => {
            for port in ports {
                info!("available port: {}", port.port_name);
            }
        }
        Err(e) => error!("could not enumerate serial ports: {e}"),
    }
}
