//! Speech synthesis and playback tracking

pub mod backends;
pub mod coordinator;
pub mod engine;

pub use coordinator::{PlaybackCoordinator, PlaybackState};
pub use engine::{
    create_engine, BackendChoice, EngineEvent, EngineEventKind, EngineOptions, SpeechEngine,
    Utterance, UtteranceToken,
};
