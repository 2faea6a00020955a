//! Voice Memo: record, name, and replay short audio clips from the terminal.

mod app;
mod app_command;
mod config;
mod error;
mod microphone;
mod renderer;
mod system_player;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    microphone::CpalMicrophone,
    system_player::SystemPlayer,
};

use crate::config::{Config, LoggingConfig};

use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use voice_memo_core::{FileStore, MemoScreen};

/// How long shutdown waits for the stdin reader before abandoning it.
const STDIN_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    info!(
        data_dir = ?config.storage.data_dir,
        recordings_dir = ?config.recording.recordings_dir,
        "Configuration ready"
    );

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let (command_tx, command_rx) = mpsc::channel(32);

        // Stdin is read on its own task so the app loop keeps rendering
        // while a line is being typed.
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match AppCommand::parse(&line) {
                        Ok(cmd) => {
                            if command_tx.send(cmd).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = ?e, "Ignoring input");
                            eprintln!("{e}\n{}", AppCommand::USAGE);
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = ?e, "Failed to read stdin");
                        break;
                    }
                }
            }
        });

        let screen = MemoScreen::new(
            CpalMicrophone::new(
                &config.recording.recordings_dir,
                config.recording.selected_device.clone(),
            ),
            SystemPlayer,
            FileStore::new(&config.storage.data_dir),
            config.storage.catalog_key.clone(),
        );

        if let Err(e) = App::new(screen, command_rx).run().await {
            error!(error = ?e, "App error");
        }
    });

    // The stdin task can be parked in a blocking read; don't wait on it.
    rt.shutdown_timeout(STDIN_SHUTDOWN_TIMEOUT);
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the configured filter.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
