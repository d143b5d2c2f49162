//! Native TTS backend using the tts crate
//!
//! This backend uses the `tts` crate which provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - Various other platforms
//!
//! Utterance callbacks arrive on the platform's own threads. They only touch
//! the id map and the event channel. With Speech Dispatcher the same thread
//! also delivers the reply to `speak`, so the map is never held while
//! speaking.

use crate::speech::{EngineEvent, EngineOptions, SpeechEngine, Utterance, UtteranceToken};
use crate::{ReaderError, Result};
use log::{debug, error, warn};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tts::{Tts as TtsCrate, UtteranceId};

/// Platform utterance callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Begin,
    End,
    Stop,
}

/// Platform utterance ids mapped to coordinator tokens
///
/// Callbacks may fire before `speak` has returned the id they refer to.
/// Those signals are parked in `early` and replayed by `register`.
#[derive(Debug)]
struct Utterances<I> {
    live: Vec<(I, UtteranceToken)>,
    early: Vec<(I, Signal)>,
}

impl<I> Default for Utterances<I> {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            early: Vec::new(),
        }
    }
}

/// Parked signals kept for ids `speak` has not returned yet
const MAX_EARLY: usize = 16;

impl<I: PartialEq + Copy> Utterances<I> {
    /// Apply a callback; returns the event to forward, if any
    fn resolve(&mut self, id: I, signal: Signal) -> Option<EngineEvent> {
        let Some(index) = self.live.iter().position(|(known, _)| *known == id) else {
            if self.early.len() >= MAX_EARLY {
                self.early.remove(0);
            }
            self.early.push((id, signal));
            return None;
        };

        let token = self.live[index].1;
        match signal {
            Signal::Begin => Some(EngineEvent::started(token)),
            Signal::End => {
                self.live.remove(index);
                Some(EngineEvent::ended(token))
            }
            // Stopped utterances are stale by the time this fires; just forget them
            Signal::Stop => {
                self.live.remove(index);
                None
            }
        }
    }

    /// Record the id `speak` returned; returns events for signals that beat it
    fn register(&mut self, id: I, token: UtteranceToken) -> Vec<EngineEvent> {
        self.live.push((id, token));

        let mut parked = Vec::new();
        self.early.retain(|&(known, signal)| {
            if known == id {
                parked.push(signal);
                false
            } else {
                true
            }
        });

        parked
            .into_iter()
            .filter_map(|signal| self.resolve(id, signal))
            .collect()
    }

    /// Forget parked signals
    fn clear_early(&mut self) {
        self.early.clear();
    }
}

type IdMap = Arc<Mutex<Utterances<UtteranceId>>>;

/// How long to trust a not-yet-speaking engine before polling for the end
const START_GRACE: Duration = Duration::from_secs(1);

/// Utterance tracked by polling when the platform cannot report its end
struct Polled {
    token: UtteranceToken,
    submitted: Instant,
    seen_speaking: bool,
}

/// What one `is_speaking` reading means for a polled utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Speaking,
    /// Not audible yet, still within the start grace period
    Waiting,
    Finished,
}

fn poll_outcome(speaking: bool, seen_speaking: bool, elapsed: Duration) -> PollOutcome {
    if speaking {
        PollOutcome::Speaking
    } else if seen_speaking || elapsed > START_GRACE {
        PollOutcome::Finished
    } else {
        PollOutcome::Waiting
    }
}

/// Native TTS backend using the tts crate
pub struct NativeEngine {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    events: Sender<EngineEvent>,

    /// Utterances tracked through platform callbacks
    ids: IdMap,

    /// Whether the platform reports begin/end itself
    callbacks: bool,

    /// Whether `is_speaking` can be queried
    can_poll: bool,

    polled: Option<Polled>,
}

impl NativeEngine {
    /// Create a native engine and select a voice for the locale
    pub fn new(options: &EngineOptions, events: Sender<EngineEvent>) -> Result<Self> {
        debug!("Creating native TTS backend");

        let mut tts = TtsCrate::default()
            .map_err(|e| ReaderError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        let features = tts.supported_features();
        let ids: IdMap = Arc::new(Mutex::new(Utterances::default()));

        if features.voice {
            Self::select_voice(&mut tts, &options.locale);
        } else {
            warn!("Voice selection not supported on this platform");
        }
        if let Some(rate) = options.rate {
            Self::apply_rate(&mut tts, rate, features.rate);
        }
        if let Some(volume) = options.volume {
            Self::apply_volume(&mut tts, volume, features.volume);
        }

        if features.utterance_callbacks {
            Self::install_callbacks(&tts, &ids, &events)?;
        } else {
            debug!("No utterance callbacks; falling back to polling");
        }

        debug!("Native TTS backend created successfully");

        Ok(Self {
            tts,
            events,
            ids,
            callbacks: features.utterance_callbacks,
            can_poll: features.is_speaking,
            polled: None,
        })
    }

    /// Pick the first voice whose language matches the locale's language
    fn select_voice(tts: &mut TtsCrate, locale: &str) {
        let wanted = language_of(locale);
        let voices = match tts.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Failed to list voices: {}", e);
                return;
            }
        };

        let voice = voices
            .iter()
            .find(|v| v.language().as_str().eq_ignore_ascii_case(locale))
            .or_else(|| {
                voices
                    .iter()
                    .find(|v| language_of(v.language().as_str()).eq_ignore_ascii_case(wanted))
            });

        match voice {
            Some(voice) => {
                debug!("Selecting voice: {:?}", voice);
                if let Err(e) = tts.set_voice(voice) {
                    warn!("Failed to set voice: {}", e);
                }
            }
            None => warn!(
                "No {} voice among {} installed voices; using the default voice",
                locale,
                voices.len()
            ),
        }
    }

    fn apply_rate(tts: &mut TtsCrate, rate: u8, supported: bool) {
        if !supported {
            warn!("Rate control not supported on this platform");
            return;
        }
        let value = scale(rate, tts.min_rate(), tts.max_rate());
        debug!("Setting rate to {} ({})", rate, value);
        if let Err(e) = tts.set_rate(value) {
            warn!("Failed to set rate: {}", e);
        }
    }

    fn apply_volume(tts: &mut TtsCrate, volume: u8, supported: bool) {
        if !supported {
            warn!("Volume control not supported on this platform");
            return;
        }
        let value = scale(volume, tts.min_volume(), tts.max_volume());
        debug!("Setting volume to {} ({})", volume, value);
        if let Err(e) = tts.set_volume(value) {
            warn!("Failed to set volume: {}", e);
        }
    }

    fn install_callbacks(tts: &TtsCrate, ids: &IdMap, events: &Sender<EngineEvent>) -> Result<()> {
        let (begin_ids, begin_tx) = (ids.clone(), events.clone());
        tts.on_utterance_begin(Some(Box::new(move |id| {
            forward(&begin_ids, &begin_tx, id, Signal::Begin);
        })))
        .map_err(|e| ReaderError::Speech(format!("Failed to register callback: {}", e)))?;

        let (end_ids, end_tx) = (ids.clone(), events.clone());
        tts.on_utterance_end(Some(Box::new(move |id| {
            forward(&end_ids, &end_tx, id, Signal::End);
        })))
        .map_err(|e| ReaderError::Speech(format!("Failed to register callback: {}", e)))?;

        let (stop_ids, stop_tx) = (ids.clone(), events.clone());
        tts.on_utterance_stop(Some(Box::new(move |id| {
            forward(&stop_ids, &stop_tx, id, Signal::Stop);
        })))
        .map_err(|e| ReaderError::Speech(format!("Failed to register callback: {}", e)))?;

        Ok(())
    }

    fn start_polling(&mut self, token: UtteranceToken) {
        let _ = self.events.send(EngineEvent::started(token));
        if self.can_poll {
            self.polled = Some(Polled {
                token,
                submitted: Instant::now(),
                seen_speaking: false,
            });
        } else {
            warn!("Engine cannot report when utterance {} ends", token);
        }
    }
}

/// Handle one platform callback on the platform's thread
fn forward(ids: &IdMap, events: &Sender<EngineEvent>, id: UtteranceId, signal: Signal) {
    let event = match ids.lock() {
        Ok(mut ids) => ids.resolve(id, signal),
        Err(_) => {
            error!("Utterance map poisoned; dropping {:?}", signal);
            return;
        }
    };
    if let Some(event) = event {
        let _ = events.send(event);
    }
}

/// Language subtag of a locale (`hi-IN` -> `hi`)
fn language_of(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

/// Map 0-100 onto an engine range
fn scale(value: u8, min: f32, max: f32) -> f32 {
    min + (max - min) * f32::from(value.min(100)) / 100.0
}

impl SpeechEngine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    fn submit(&mut self, utterance: Utterance) -> Result<()> {
        debug!("Speaking utterance {}: {}", utterance.token, utterance.text);

        // The map stays unlocked while speaking: callbacks may run before
        // `speak` returns and must not wait on this thread
        let id = self.tts.speak(utterance.text, false).map_err(|e| {
            error!("Failed to speak: {}", e);
            ReaderError::Speech(format!("Speak failed: {}", e))
        })?;

        match id {
            Some(id) if self.callbacks => {
                let parked = self
                    .ids
                    .lock()
                    .map_err(|_| ReaderError::Speech("Utterance map poisoned".to_string()))?
                    .register(id, utterance.token);
                for event in parked {
                    let _ = self.events.send(event);
                }
            }
            _ => self.start_polling(utterance.token),
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.polled = None;
        if let Ok(mut ids) = self.ids.lock() {
            ids.clear_early();
        }
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            ReaderError::Speech(format!("Cancel failed: {}", e))
        })?;
        Ok(())
    }

    fn poll(&mut self) {
        let Some(polled) = self.polled.as_mut() else {
            return;
        };

        match self.tts.is_speaking() {
            Ok(speaking) => {
                match poll_outcome(speaking, polled.seen_speaking, polled.submitted.elapsed()) {
                    PollOutcome::Speaking => polled.seen_speaking = true,
                    PollOutcome::Waiting => {}
                    PollOutcome::Finished => {
                        let _ = self.events.send(EngineEvent::ended(polled.token));
                        self.polled = None;
                    }
                }
            }
            Err(e) => {
                let _ = self.events.send(EngineEvent::failed(polled.token, e.to_string()));
                self.polled = None;
            }
        }
    }
}
