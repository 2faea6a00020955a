use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// Intents typed at the prompt. Positions are already converted to 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start recording.
    Start,
    /// Stop recording and save the clip.
    Stop,
    /// Set the name used for the next clip.
    Name(String),
    /// Put a clip in edit.
    Edit(usize),
    /// Rename the clip in edit.
    Save(String),
    /// Leave edit mode.
    Cancel,
    /// Delete a clip.
    Delete(usize),
    /// Play a clip.
    Play(usize),
    /// Redraw the screen.
    List,
    /// Show the command list.
    Help,
    /// Exit the application.
    Quit,
}

impl AppCommand {
    /// Usage text shown by `help`.
    pub const USAGE: &'static str = "\
commands:
  start            start recording
  stop             stop recording and save the clip
  name <text>      name for the next clip
  edit <n>         rename clip n
  save <text>      save the new name of the clip in edit
  cancel           leave edit mode
  delete <n>       delete clip n
  play <n>         play clip n
  list             redraw
  help             this text
  quit             exit";

    /// Parses one prompt line.
    #[track_caller]
    pub fn parse(line: &str) -> AppResult<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => AppCommand::Start,
            "stop" => AppCommand::Stop,
            "name" => AppCommand::Name(rest.to_string()),
            "edit" => AppCommand::Edit(parse_position(rest)?),
            "save" => AppCommand::Save(required_text(verb, rest)?),
            "cancel" => AppCommand::Cancel,
            "delete" => AppCommand::Delete(parse_position(rest)?),
            "play" => AppCommand::Play(parse_position(rest)?),
            "list" | "" => AppCommand::List,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" => AppCommand::Quit,
            other => {
                return Err(AppError::InvalidCommand {
                    reason: format!("Unknown command '{}'", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(command)
    }
}

/// Converts a 1-based position typed by the user into an index.
#[track_caller]
fn parse_position(text: &str) -> AppResult<usize> {
    match text.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(AppError::InvalidCommand {
            reason: format!("Expected a clip number starting at 1, got '{}'", text),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

#[track_caller]
fn required_text(verb: &str, text: &str) -> AppResult<String> {
    if text.is_empty() {
        return Err(AppError::InvalidCommand {
            reason: format!("'{}' needs a name", verb),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(text.to_string())
}
