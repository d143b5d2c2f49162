//! Application state
//!
//! `App` owns the message store, the playback coordinator and the modal
//! handler stack. Handlers act on it; the event loop prints what it queues
//! and re-renders the list when asked to.

pub mod config;

use crate::clipboard::get_from_clipboard;
use crate::input::{ConfirmClearHandler, HandlerStack, NoticeHandler, TitleHandler};
use crate::platform::has_display;
use crate::speech::PlaybackCoordinator;
use crate::store::{LocalStorage, MessageStore};
use crate::terminal::render::render_messages;
use crate::{ReaderError, Result};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Main application state
pub struct App {
    /// Messages and title
    pub store: MessageStore<Box<dyn LocalStorage>>,

    /// Speech playback
    pub coordinator: PlaybackCoordinator,

    /// Modal handlers above the default handler
    pub handlers: HandlerStack,

    /// Lines waiting to be printed
    output: Vec<String>,

    /// Whether the message list should be redrawn
    render_requested: bool,
}

impl App {
    pub fn new(store: MessageStore<Box<dyn LocalStorage>>, coordinator: PlaybackCoordinator) -> Self {
        info!(
            "App ready: {} messages, speech {}",
            store.len(),
            if coordinator.is_available() { "available" } else { "unavailable" }
        );
        Self {
            store,
            coordinator,
            handlers: HandlerStack::new(),
            output: Vec::new(),
            render_requested: true,
        }
    }

    /// Queue a line for the user
    pub fn print(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Take the queued lines
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Whether a redraw was requested since the last call
    pub fn take_render_request(&mut self) -> bool {
        std::mem::replace(&mut self.render_requested, false)
    }

    /// Message list as display lines
    pub fn render(&self, today: NaiveDate, width: usize) -> Vec<String> {
        render_messages(&self.store, &self.coordinator, today, width)
    }

    /// Prompt of the active modal handler
    pub fn prompt(&self) -> Option<String> {
        self.handlers.prompt()
    }

    /// Save a new message; blank text is ignored
    pub fn send(&mut self, text: &str) -> Result<()> {
        if self.store.append(text)?.is_some() {
            self.request_render();
        }
        Ok(())
    }

    /// Save the clipboard text as a message
    pub fn paste(&mut self) -> Result<()> {
        if !has_display() {
            self.print("No clipboard here (no graphical session). Paste into the terminal instead.");
            return Ok(());
        }

        match get_from_clipboard() {
            Ok(text) if text.trim().is_empty() => {
                self.print("Clipboard is empty.");
                Ok(())
            }
            Ok(text) => self.send(&text),
            Err(e) => {
                warn!("Paste failed: {}", e);
                self.print(format!("Could not read the clipboard: {}", e));
                Ok(())
            }
        }
    }

    /// Speak the message at a 1-based position, or the newest one
    pub fn speak(&mut self, position: Option<usize>) -> Result<()> {
        let message = match position {
            Some(n) => self.store.get_by_position(n),
            None => self.store.last(),
        };
        let Some(message) = message.cloned() else {
            match position {
                Some(n) => self.print(format!("No message {}.", n)),
                None => self.print("No messages yet."),
            }
            return Ok(());
        };

        match self.coordinator.speak(&message) {
            Ok(()) => {
                debug!("Requested speech for message {}", message.id());
                self.request_render();
                Ok(())
            }
            Err(ReaderError::CapabilityUnavailable(reason)) => {
                warn!("Speech unavailable: {}", reason);
                self.handlers.push(Box::new(NoticeHandler::new(
                    "Speech synthesis not supported on this system.",
                )));
                self.request_render();
                Ok(())
            }
            Err(e) => {
                self.print(format!("Could not speak: {}", e));
                self.request_render();
                Ok(())
            }
        }
    }

    /// Stop speaking
    pub fn stop(&mut self) {
        let was_speaking = self.coordinator.speaking_id().is_some();
        self.coordinator.stop();
        if was_speaking {
            self.request_render();
        }
    }

    /// Apply speech engine events; redraws when playback state changed
    pub fn pump_speech(&mut self) -> bool {
        let changed = self.coordinator.pump();
        if changed {
            self.request_render();
        }
        changed
    }

    /// Ask for confirmation before clearing
    pub fn request_clear(&mut self) {
        if self.store.is_empty() {
            self.print("No messages to clear.");
            return;
        }
        self.handlers
            .push(Box::new(ConfirmClearHandler::new(self.store.len())));
    }

    /// Delete every message (after confirmation)
    pub fn clear(&mut self) -> Result<()> {
        let count = self.store.len();
        self.store.clear()?;
        self.print(format!("Deleted {}.", crate::input::confirm_handler::message_count(count)));
        self.request_render();
        Ok(())
    }

    /// Start interactive title editing
    pub fn begin_title_edit(&mut self) {
        let current = self.store.title().to_string();
        self.handlers.push(Box::new(TitleHandler::new(current)));
    }

    /// Change the title; invalid titles are reported and ignored
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        match self.store.set_title(title) {
            Ok(_) => {
                self.request_render();
                Ok(())
            }
            Err(ReaderError::InvalidTitle(reason)) => {
                self.print(format!("Title not changed: {}", reason));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
