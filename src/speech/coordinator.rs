//! Playback coordinator
//!
//! Tracks which message, if any, is being spoken. At most one utterance is
//! live at a time: every `speak` cancels what came before, and each submitted
//! utterance gets a fresh token. Engine events carrying any other token are
//! stale and dropped.
//!
//! State only moves to `Speaking` when the engine reports the start of the
//! current utterance, never at submission time.

use super::engine::{
    create_engine, EngineEvent, EngineEventKind, EngineOptions, SpeechEngine, Utterance,
    UtteranceToken,
};
use crate::store::Message;
use crate::{ReaderError, Result};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// What the coordinator is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// Speaking the message with this id
    Speaking(u64),
}

/// Drives a speech engine for one message at a time
pub struct PlaybackCoordinator {
    /// `None` when no engine could be started on this system
    engine: Option<Box<dyn SpeechEngine>>,

    /// Why there is no engine, shown to the user on `speak`
    unavailable: Option<String>,

    events: Receiver<EngineEvent>,

    locale: String,

    next_token: UtteranceToken,

    /// Token and message id of the utterance we care about
    current: Option<(UtteranceToken, u64)>,

    state: PlaybackState,
}

impl PlaybackCoordinator {
    /// Coordinator around an engine that reports into `events`
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        events: Receiver<EngineEvent>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            engine: Some(engine),
            unavailable: None,
            events,
            locale: locale.into(),
            next_token: 1,
            current: None,
            state: PlaybackState::Idle,
        }
    }

    /// Coordinator for a system without speech synthesis
    ///
    /// Every `speak` fails with [`ReaderError::CapabilityUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        // Sender dropped right away: the channel stays empty forever
        let (_, events) = mpsc::channel();
        Self {
            engine: None,
            unavailable: Some(reason.into()),
            events,
            locale: crate::LOCALE.to_string(),
            next_token: 1,
            current: None,
            state: PlaybackState::Idle,
        }
    }

    /// Start the best engine available, or an unavailable coordinator
    pub fn from_options(options: &EngineOptions) -> Self {
        let (tx, rx) = mpsc::channel();
        match create_engine(options, tx) {
            Ok(engine) => {
                info!("Speech engine ready: {}", engine.name());
                Self::new(engine, rx, options.locale.clone())
            }
            Err(e) => {
                warn!("Speech unavailable: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Speak a message, cancelling anything already playing
    ///
    /// Returns once the utterance is submitted; the switch to `Speaking`
    /// happens later, when the engine reports the start.
    pub fn speak(&mut self, message: &Message) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(ReaderError::CapabilityUnavailable(
                self.unavailable
                    .clone()
                    .unwrap_or_else(|| "no speech engine".to_string()),
            ));
        };

        if let Err(e) = engine.cancel() {
            warn!("Cancel before speak failed: {}", e);
        }
        self.current = None;
        self.state = PlaybackState::Idle;

        let token = self.next_token;
        self.next_token += 1;
        self.current = Some((token, message.id()));

        debug!("Submitting message {} as utterance {}", message.id(), token);
        let submitted = engine.submit(Utterance {
            token,
            text: message.text().to_string(),
            locale: self.locale.clone(),
        });

        if let Err(e) = submitted {
            self.current = None;
            return Err(e);
        }
        Ok(())
    }

    /// Stop speaking. Always leaves the coordinator `Idle`.
    pub fn stop(&mut self) {
        self.current = None;
        self.state = PlaybackState::Idle;

        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.cancel() {
                warn!("Cancel failed: {}", e);
            }
        }
    }

    /// Apply one engine event; returns whether the state changed
    pub fn handle_event(&mut self, event: EngineEvent) -> bool {
        let Some((token, message_id)) = self.current else {
            debug!("Dropping stale event {:?} (idle)", event);
            return false;
        };
        if event.token != token {
            debug!("Dropping stale event {:?} (current {})", event, token);
            return false;
        }

        let before = self.state;
        match event.kind {
            EngineEventKind::Started => {
                self.state = PlaybackState::Speaking(message_id);
            }
            EngineEventKind::Ended => {
                self.current = None;
                self.state = PlaybackState::Idle;
            }
            EngineEventKind::Failed(reason) => {
                warn!("Utterance {} failed: {}", token, reason);
                self.current = None;
                self.state = PlaybackState::Idle;
            }
        }

        self.state != before
    }

    /// Poll the engine and apply every queued event
    pub fn pump(&mut self) -> bool {
        if let Some(engine) = self.engine.as_mut() {
            engine.poll();
        }

        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => changed |= self.handle_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Id of the message being spoken
    pub fn speaking_id(&self) -> Option<u64> {
        match self.state {
            PlaybackState::Speaking(id) => Some(id),
            PlaybackState::Idle => None,
        }
    }

    pub fn is_speaking(&self, message_id: u64) -> bool {
        self.speaking_id() == Some(message_id)
    }

    /// Whether an engine is present
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Why speech is unavailable, if it is
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStorage, MessageStore};

    #[test]
    fn test_unavailable_speak_fails_and_stays_idle() {
        let mut store = MessageStore::initialize(MemoryStorage::new());
        let message = store.append("नमस्ते").unwrap().unwrap().clone();

        let mut coordinator = PlaybackCoordinator::unavailable("no engine");
        let err = coordinator.speak(&message).unwrap_err();

        assert!(matches!(err, ReaderError::CapabilityUnavailable(_)));
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(!coordinator.is_available());
        assert_eq!(coordinator.unavailable_reason(), Some("no engine"));
    }

    #[test]
    fn test_stop_when_unavailable_is_noop() {
        let mut coordinator = PlaybackCoordinator::unavailable("no engine");
        coordinator.stop();
        assert_eq!(coordinator.state(), PlaybackState::Idle);
        assert!(!coordinator.pump());
    }

    #[test]
    fn test_event_while_idle_is_stale() {
        let mut coordinator = PlaybackCoordinator::unavailable("no engine");
        assert!(!coordinator.handle_event(EngineEvent::started(1)));
        assert_eq!(coordinator.state(), PlaybackState::Idle);
    }
}
