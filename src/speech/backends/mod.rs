//! Platform speech backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

// espeak-ng subprocess backend for systems without Speech Dispatcher
pub mod espeak;
