//! Line handler system with modal input support

use crate::state::App;
use crate::Result;

/// Action to take after processing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    /// Line was handled, keep the handler
    Handled,
    /// Remove this handler from the stack
    Remove,
    /// Exit the application
    Quit,
}

/// A line handler processes one line of user input
pub trait LineHandler {
    /// Process a line (without its trailing newline)
    fn process_line(&mut self, line: &str, app: &mut App) -> Result<HandlerAction>;

    /// Prompt shown while this handler is waiting for input
    fn prompt(&self) -> Option<String> {
        None
    }
}

/// Stack of modal handlers (last one processes input first)
pub struct HandlerStack {
    handlers: Vec<Box<dyn LineHandler>>,
}

impl HandlerStack {
    /// Create a new handler stack
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Push a handler onto the stack
    pub fn push(&mut self, handler: Box<dyn LineHandler>) {
        self.handlers.push(handler);
    }

    /// Pop the top handler from the stack
    pub fn pop(&mut self) -> Option<Box<dyn LineHandler>> {
        self.handlers.pop()
    }

    /// Put a handler back at a depth, below anything pushed since
    pub fn insert(&mut self, depth: usize, handler: Box<dyn LineHandler>) {
        let depth = depth.min(self.handlers.len());
        self.handlers.insert(depth, handler);
    }

    /// Prompt of the top handler
    pub fn prompt(&self) -> Option<String> {
        self.handlers.last().and_then(|h| h.prompt())
    }

    /// Get the number of handlers in the stack
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerStack {
    fn default() -> Self {
        Self::new()
    }
}
