//! Default line handler
//!
//! Saves plain lines as messages and runs `/` commands. Modal handlers
//! (title entry, clear confirmation, notices) sit on the stack above it.

use super::commands::{parse_command, Command, HELP};
use super::{HandlerAction, LineHandler};
use crate::gesture::{Gesture, GestureDetector};
use crate::state::App;
use crate::Result;
use log::{debug, trace};
use std::time::Instant;

/// Default handler for message input and commands
pub struct DefaultHandler {
    /// Empty-line presses, for the double-Enter title shortcut
    gestures: GestureDetector,
}

impl Default for DefaultHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultHandler {
    pub fn new() -> Self {
        Self {
            gestures: GestureDetector::new(),
        }
    }

    /// Process a line received at `at`
    pub fn process_line_at(&mut self, line: &str, app: &mut App, at: Instant) -> Result<HandlerAction> {
        let command = parse_command(line);
        trace!("Command: {:?}", command);

        if command != Command::Empty {
            self.gestures.reset();
        }

        match command {
            Command::Empty => {
                if self.gestures.tap(at) == Some(Gesture::DoubleTap) {
                    debug!("Double Enter: editing title");
                    app.begin_title_edit();
                }
            }
            Command::Send(text) => app.send(&text)?,
            Command::Speak(position) => app.speak(position)?,
            Command::Stop => app.stop(),
            Command::List => app.request_render(),
            Command::Clear => app.request_clear(),
            Command::Title(Some(title)) => app.set_title(&title)?,
            Command::Title(None) => app.begin_title_edit(),
            Command::Paste => app.paste()?,
            Command::Help => {
                app.print("Commands:");
                for (usage, what) in HELP {
                    app.print(format!("  {:<14} {}", usage, what));
                }
            }
            Command::Quit => return Ok(HandlerAction::Quit),
            Command::Invalid(reason) => app.print(reason),
        }

        Ok(HandlerAction::Handled)
    }
}

impl LineHandler for DefaultHandler {
    fn process_line(&mut self, line: &str, app: &mut App) -> Result<HandlerAction> {
        self.process_line_at(line, app, Instant::now())
    }
}
