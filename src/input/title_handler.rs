//! Title entry handler
//!
//! Collects the next line as the new app title. An invalid title leaves the
//! old one in place.

use super::{HandlerAction, LineHandler};
use crate::state::App;
use crate::Result;
use log::debug;

/// Handler that takes the next line as the new title
pub struct TitleHandler {
    /// Title at the time editing started
    current: String,
}

impl TitleHandler {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

impl LineHandler for TitleHandler {
    fn process_line(&mut self, line: &str, app: &mut App) -> Result<HandlerAction> {
        if line.trim().is_empty() {
            debug!("Title edit cancelled");
            app.print(format!("Title unchanged: {}", self.current));
            return Ok(HandlerAction::Remove);
        }

        app.set_title(line)?;
        Ok(HandlerAction::Remove)
    }

    fn prompt(&self) -> Option<String> {
        Some(format!(
            "New title (max {} characters, Enter to keep \"{}\"): ",
            crate::store::MAX_TITLE_LEN,
            self.current
        ))
    }
}
