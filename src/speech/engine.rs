//! Speech engine abstraction
//!
//! An engine speaks one utterance at a time and reports what happened to it
//! through [`EngineEvent`]s sent over a channel. Events may come from any
//! thread; the playback coordinator drains them on the event loop.

use crate::platform::is_wsl;
use crate::{ReaderError, Result};
use log::info;
use std::sync::mpsc::Sender;

/// Coordinator-issued identifier of one submitted utterance
pub type UtteranceToken = u64;

/// One request to vocalize a text in a locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub token: UtteranceToken,
    pub text: String,
    /// BCP 47 tag such as `hi-IN`
    pub locale: String,
}

/// What an engine reports about an utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    Started,
    Ended,
    Failed(String),
}

/// Signal from an engine, tagged with the utterance it refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub token: UtteranceToken,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn started(token: UtteranceToken) -> Self {
        Self {
            token,
            kind: EngineEventKind::Started,
        }
    }

    pub fn ended(token: UtteranceToken) -> Self {
        Self {
            token,
            kind: EngineEventKind::Ended,
        }
    }

    pub fn failed(token: UtteranceToken, reason: impl Into<String>) -> Self {
        Self {
            token,
            kind: EngineEventKind::Failed(reason.into()),
        }
    }
}

/// Text-to-speech engine
///
/// Implementations send [`EngineEvent`]s for submitted utterances to the
/// channel they were created with.
pub trait SpeechEngine: Send {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Start speaking an utterance
    fn submit(&mut self, utterance: Utterance) -> Result<()>;

    /// Silence whatever is playing. Must be harmless when nothing is.
    fn cancel(&mut self) -> Result<()>;

    /// Let polling backends check on the current utterance
    fn poll(&mut self) {}
}

/// Which backend to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    /// Try every backend, best first
    Auto,
    /// tts crate (Speech Dispatcher, AVFoundation, ...)
    Native,
    /// espeak-ng subprocess
    Espeak,
}

impl std::str::FromStr for BackendChoice {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "native" | "tts" => Ok(Self::Native),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            other => Err(ReaderError::Config(format!("Unknown speech backend '{}'", other))),
        }
    }
}

/// Settings applied when an engine is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub backend: BackendChoice,
    pub locale: String,
    /// 0-100, `None` keeps the engine default
    pub rate: Option<u8>,
    /// 0-100, `None` keeps the engine default
    pub volume: Option<u8>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Auto,
            locale: crate::LOCALE.to_string(),
            rate: None,
            volume: None,
        }
    }
}

/// Create a speech engine for this system
///
/// With [`BackendChoice::Auto`] the native backend is tried first and
/// espeak-ng second, reversed on WSL. When nothing can be started the error is
/// [`ReaderError::CapabilityUnavailable`].
pub fn create_engine(
    options: &EngineOptions,
    events: Sender<EngineEvent>,
) -> Result<Box<dyn SpeechEngine>> {
    use super::backends::espeak::EspeakEngine;
    use super::backends::native::NativeEngine;

    let order: &[BackendChoice] = match options.backend {
        BackendChoice::Native => &[BackendChoice::Native],
        BackendChoice::Espeak => &[BackendChoice::Espeak],
        BackendChoice::Auto if is_wsl() => {
            info!("Detected WSL environment");
            &[BackendChoice::Espeak, BackendChoice::Native]
        }
        BackendChoice::Auto => &[BackendChoice::Native, BackendChoice::Espeak],
    };

    let mut failures = Vec::new();
    for choice in order {
        let created: Result<Box<dyn SpeechEngine>> = match choice {
            BackendChoice::Native => {
                info!("Trying native TTS backend...");
                NativeEngine::new(options, events.clone()).map(|e| Box::new(e) as Box<dyn SpeechEngine>)
            }
            BackendChoice::Espeak => {
                info!("Trying espeak-ng backend...");
                EspeakEngine::new(options, events.clone()).map(|e| Box::new(e) as Box<dyn SpeechEngine>)
            }
            BackendChoice::Auto => continue,
        };

        match created {
            Ok(engine) => {
                info!("✓ Successfully initialized {} backend", engine.name());
                return Ok(engine);
            }
            Err(e) => {
                info!("✗ {:?} backend unavailable: {}", choice, e);
                failures.push(format!("{:?}: {}", choice, e));
            }
        }
    }

    Err(ReaderError::CapabilityUnavailable(format!(
        "no speech backend could be started ({}). \
         Install speech-dispatcher or espeak-ng with a Hindi voice.",
        failures.join("; ")
    )))
}
