//! Clear-all confirmation

use super::{HandlerAction, LineHandler};
use crate::state::App;
use crate::Result;
use log::debug;

/// Asks before deleting every message
pub struct ConfirmClearHandler {
    count: usize,
}

impl ConfirmClearHandler {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

/// "1 message" / "3 messages"
pub fn message_count(count: usize) -> String {
    format!("{} message{}", count, if count == 1 { "" } else { "s" })
}

impl LineHandler for ConfirmClearHandler {
    fn process_line(&mut self, line: &str, app: &mut App) -> Result<HandlerAction> {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => {
                debug!("Clear confirmed");
                app.clear()?;
            }
            _ => {
                debug!("Clear cancelled");
                app.print("Nothing deleted.");
            }
        }
        Ok(HandlerAction::Remove)
    }

    fn prompt(&self) -> Option<String> {
        let count = message_count(self.count);
        Some(format!(
            "Clear all messages? This will permanently delete all {} from your device. \
             This action cannot be undone. [y/N] ",
            count
        ))
    }
}
