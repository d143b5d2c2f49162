//! Playback coordinator tests
//!
//! A recording engine stands in for the platform synthesizer: it remembers
//! every call, and the tests play the engine's part by sending events.

use msgreader::speech::{
    EngineEvent, PlaybackCoordinator, PlaybackState, SpeechEngine, Utterance, UtteranceToken,
};
use msgreader::store::{MemoryStorage, Message, MessageStore};
use msgreader::{ReaderError, Result};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Submit(Utterance),
    Cancel,
}

struct RecordingEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_submit: bool,
}

impl SpeechEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn submit(&mut self, utterance: Utterance) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Submit(utterance));
        if self.fail_submit {
            return Err(ReaderError::Speech("engine refused".to_string()));
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Cancel);
        Ok(())
    }
}

struct Harness {
    coordinator: PlaybackCoordinator,
    engine: Sender<EngineEvent>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Harness {
    fn new() -> Self {
        Self::with_failing_submit(false)
    }

    fn with_failing_submit(fail_submit: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = RecordingEngine {
            calls: calls.clone(),
            fail_submit,
        };
        Self {
            coordinator: PlaybackCoordinator::new(Box::new(engine), rx, "hi-IN"),
            engine: tx,
            calls,
        }
    }

    fn send(&mut self, event: EngineEvent) -> bool {
        self.engine.send(event).unwrap();
        self.coordinator.pump()
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Tokens of every submitted utterance, in order
    fn tokens(&self) -> Vec<UtteranceToken> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Submit(u) => Some(u.token),
                Call::Cancel => None,
            })
            .collect()
    }
}

fn messages(texts: &[&str]) -> Vec<Message> {
    let mut store = MessageStore::initialize(MemoryStorage::new());
    for text in texts {
        store.append(text).unwrap();
    }
    store.messages().to_vec()
}

#[test]
fn test_speaking_starts_on_engine_signal() {
    let mut h = Harness::new();
    let msgs = messages(&["नमस्ते"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);

    let token = h.tokens()[0];
    assert!(h.send(EngineEvent::started(token)));
    assert_eq!(h.coordinator.state(), PlaybackState::Speaking(msgs[0].id()));
    assert!(h.coordinator.is_speaking(msgs[0].id()));

    assert!(h.send(EngineEvent::ended(token)));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
}

#[test]
fn test_speak_cancels_then_submits_in_hindi() {
    let mut h = Harness::new();
    let msgs = messages(&["पहला संदेश"]);

    h.coordinator.speak(&msgs[0]).unwrap();

    let calls = h.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], Call::Cancel);
    match &calls[1] {
        Call::Submit(u) => {
            assert_eq!(u.text, "पहला संदेश");
            assert_eq!(u.locale, "hi-IN");
        }
        other => panic!("expected submit, got {:?}", other),
    }
}

#[test]
fn test_second_speak_before_first_starts() {
    let mut h = Harness::new();
    let msgs = messages(&["A", "B"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    h.coordinator.speak(&msgs[1]).unwrap();
    let tokens = h.tokens();
    assert_eq!(tokens.len(), 2);
    assert_ne!(tokens[0], tokens[1]);

    // Late start for A is stale
    assert!(!h.send(EngineEvent::started(tokens[0])));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);

    assert!(h.send(EngineEvent::started(tokens[1])));
    assert_eq!(h.coordinator.state(), PlaybackState::Speaking(msgs[1].id()));

    // Late end for A does not stop B
    assert!(!h.send(EngineEvent::ended(tokens[0])));
    assert_eq!(h.coordinator.state(), PlaybackState::Speaking(msgs[1].id()));
}

#[test]
fn test_speak_while_speaking_switches_message() {
    let mut h = Harness::new();
    let msgs = messages(&["A", "B"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    h.send(EngineEvent::started(h.tokens()[0]));
    assert_eq!(h.coordinator.speaking_id(), Some(msgs[0].id()));

    h.coordinator.speak(&msgs[1]).unwrap();
    // The old utterance no longer counts as speaking
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);

    h.send(EngineEvent::started(h.tokens()[1]));
    assert_eq!(h.coordinator.speaking_id(), Some(msgs[1].id()));
}

#[test]
fn test_stop_while_idle_only_cancels() {
    let mut h = Harness::new();

    h.coordinator.stop();
    h.coordinator.stop();

    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
    assert_eq!(h.calls(), vec![Call::Cancel, Call::Cancel]);
}

#[test]
fn test_stop_is_immediate_and_ignores_late_events() {
    let mut h = Harness::new();
    let msgs = messages(&["A"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    let token = h.tokens()[0];
    h.send(EngineEvent::started(token));

    h.coordinator.stop();
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
    assert_eq!(h.calls().last(), Some(&Call::Cancel));

    assert!(!h.send(EngineEvent::started(token)));
    assert!(!h.send(EngineEvent::ended(token)));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
}

#[test]
fn test_stop_before_start_signal() {
    let mut h = Harness::new();
    let msgs = messages(&["A"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    h.coordinator.stop();

    assert!(!h.send(EngineEvent::started(h.tokens()[0])));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
}

#[test]
fn test_utterance_error_returns_to_idle() {
    let mut h = Harness::new();
    let msgs = messages(&["A"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    let token = h.tokens()[0];
    h.send(EngineEvent::started(token));

    assert!(h.send(EngineEvent::failed(token, "audio device lost")));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
}

#[test]
fn test_submit_failure() {
    let mut h = Harness::with_failing_submit(true);
    let msgs = messages(&["A"]);

    let err = h.coordinator.speak(&msgs[0]).unwrap_err();
    assert!(matches!(err, ReaderError::Speech(_)));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);

    assert!(!h.send(EngineEvent::started(h.tokens()[0])));
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
}

#[test]
fn test_several_events_in_one_pump() {
    let mut h = Harness::new();
    let msgs = messages(&["A"]);

    h.coordinator.speak(&msgs[0]).unwrap();
    let token = h.tokens()[0];
    h.engine.send(EngineEvent::started(token)).unwrap();
    h.engine.send(EngineEvent::ended(token)).unwrap();

    assert!(h.coordinator.pump());
    assert_eq!(h.coordinator.state(), PlaybackState::Idle);
    assert!(!h.coordinator.pump());
}

#[test]
fn test_real_backend_if_present() {
    // May fail in CI or environments without speech-dispatcher or espeak-ng
    let coordinator = PlaybackCoordinator::from_options(&Default::default());
    if coordinator.is_available() {
        println!("✓ Speech backend available");
    } else {
        println!(
            "⚠ No speech backend (may be expected): {}",
            coordinator.unavailable_reason().unwrap_or("")
        );
    }
    assert_eq!(coordinator.state(), PlaybackState::Idle);
}
