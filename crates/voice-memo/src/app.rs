use crate::{AppCommand, AppResult, renderer};

use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};
use voice_memo_core::{CaptureDevice, KeyValueStore, MemoScreen, Playback, ScreenWatcher};

/// Main application state.
///
/// Owns the screen and applies one intent at a time, so every state
/// transition finishes before the next command is read. Rendering is
/// driven by screen change notifications, not by the commands themselves.
pub struct App<D: CaptureDevice, P: Playback, S: KeyValueStore> {
    pub(crate) screen: MemoScreen<D, P, S>,
    pub(crate) watcher: ScreenWatcher,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
}

impl<D: CaptureDevice, P: Playback, S: KeyValueStore> App<D, P, S> {
    /// Wraps a screen and the channel commands arrive on.
    pub fn new(screen: MemoScreen<D, P, S>, command_rx: mpsc::Receiver<AppCommand>) -> Self {
        let watcher = screen.subscribe();
        Self {
            screen,
            watcher,
            command_rx,
        }
    }

    /// Run the main application event loop until `quit` or end of input.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!("Voice Memo starting");

        self.screen.load().await;
        print!("{}", renderer::render(&self.watcher.snapshot()));

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("Command channel closed, shutting down");
                        break;
                    };
                    match self.handle_command(cmd).await {
                        Ok(true) => {}
                        Ok(false) => {
                            info!("Quit requested");
                            break;
                        }
                        Err(e) => {
                            error!(error = ?e, "Command rejected");
                            eprintln!("error: {e}");
                        }
                    }
                }

                changed = self.watcher.changed() => {
                    if let Err(e) = changed {
                        warn!(error = ?e, "Screen state closed");
                        break;
                    }
                    print!("{}", renderer::render(&self.watcher.snapshot()));
                }
            }
        }

        info!("Voice Memo shut down successfully");

        Ok(())
    }

    /// Applies one command. Returns `false` when the app should exit.
    ///
    /// # Errors
    ///
    /// Returns the screen's fault when a command breaks its contract, such
    /// as stopping while idle or naming a clip that does not exist.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) -> AppResult<bool> {
        match cmd {
            AppCommand::Start => self.screen.start_capture().await?,
            AppCommand::Stop => self.screen.stop_capture().await?,
            AppCommand::Name(name) => self.screen.set_name(name),
            AppCommand::Edit(index) => self.screen.begin_edit(index)?,
            AppCommand::Save(name) => self.screen.save_edit(name).await?,
            AppCommand::Cancel => self.screen.cancel_edit(),
            AppCommand::Delete(index) => self.screen.delete(index).await?,
            AppCommand::Play(index) => self.screen.play(index)?,
            AppCommand::List => print!("{}", renderer::render(&self.screen.snapshot())),
            AppCommand::Help => println!("{}", AppCommand::USAGE),
            AppCommand::Quit => return Ok(false),
        }

        Ok(true)
    }
}
