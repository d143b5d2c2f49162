//! Blocking notice
//!
//! Holds input until the user acknowledges a message with Enter.

use super::{HandlerAction, LineHandler};
use crate::state::App;
use crate::Result;

pub struct NoticeHandler {
    text: String,
}

impl NoticeHandler {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl LineHandler for NoticeHandler {
    fn process_line(&mut self, _line: &str, _app: &mut App) -> Result<HandlerAction> {
        Ok(HandlerAction::Remove)
    }

    fn prompt(&self) -> Option<String> {
        Some(format!("{} [press Enter] ", self.text))
    }
}
