//! Input handling
//!
//! The input system uses a stack-based handler architecture where handlers
//! can be pushed/popped to create modal interfaces (title entry, clear
//! confirmation, notices). Lines go to the top handler; with an empty stack
//! they go to the default handler.

pub mod commands;
pub mod confirm_handler;
pub mod default_handler;
pub mod handler;
pub mod notice_handler;
pub mod title_handler;

pub use commands::{parse_command, Command};
pub use confirm_handler::ConfirmClearHandler;
pub use default_handler::DefaultHandler;
pub use handler::{HandlerAction, HandlerStack, LineHandler};
pub use notice_handler::NoticeHandler;
pub use title_handler::TitleHandler;

use crate::state::App;
use crate::Result;

/// Route one line of input
///
/// The top modal handler is popped while it runs so it can use the app
/// freely, then put back at its old depth unless it asked to be removed.
/// Handlers it pushed meanwhile stay above it.
pub fn dispatch_line(line: &str, app: &mut App, default: &mut DefaultHandler) -> Result<HandlerAction> {
    if let Some(mut handler) = app.handlers.pop() {
        let depth = app.handlers.len();
        let action = handler.process_line(line, app)?;
        if action == HandlerAction::Handled {
            app.handlers.insert(depth, handler);
        }
        return Ok(action);
    }

    default.process_line(line, app)
}
