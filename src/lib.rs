//! msgreader - keep short messages on your device and hear them in Hindi
//!
//! Messages are typed or pasted into a terminal, stored locally, and read
//! aloud by the system's speech synthesizer in a fixed Hindi locale.

pub mod clipboard;
pub mod error;
pub mod gesture;
pub mod input;
pub mod install;
pub mod platform;
pub mod speech;
pub mod state;
pub mod store;
pub mod terminal;

pub use error::{InvalidTitle, ReaderError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "msgreader";

/// Locale every utterance is spoken in
pub const LOCALE: &str = "hi-IN";
