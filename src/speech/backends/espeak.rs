//! espeak-ng subprocess backend
//!
//! Used where the tts crate has nothing to talk to (no Speech Dispatcher,
//! WSL with WSLg). Each utterance is one `espeak-ng` process; the process
//! exit status tells us whether it finished or failed.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::platform::is_wsl;
use crate::speech::{EngineEvent, EngineOptions, SpeechEngine, Utterance, UtteranceToken};
use crate::{ReaderError, Result};
use log::{debug, error, info, warn};
use std::process::{Child, Command, Stdio};

/// espeak-ng backend
pub struct EspeakEngine {
    /// Running espeak-ng process and the utterance it speaks
    current: Option<(Child, UtteranceToken)>,

    events: std::sync::mpsc::Sender<EngineEvent>,

    /// Speed in words per minute
    speed: u16,

    /// Amplitude (0-200)
    amplitude: u8,

    /// Path to espeak-ng
    espeak_path: String,
}

impl EspeakEngine {
    /// Create an espeak-ng engine
    ///
    /// Fails when espeak-ng is not installed.
    pub fn new(options: &EngineOptions, events: std::sync::mpsc::Sender<EngineEvent>) -> Result<Self> {
        debug!("Creating espeak-ng backend");

        Self::setup_pulseaudio();

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            current: None,
            events,
            speed: Self::rate_to_espeak_speed(options.rate.unwrap_or(25)),
            amplitude: Self::volume_to_espeak_amplitude(options.volume.unwrap_or(50)),
            espeak_path,
        })
    }

    /// Point PulseAudio clients at the WSLg server when it exists
    fn setup_pulseaudio() {
        const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

        if std::env::var("PULSE_SERVER").is_ok() || !is_wsl() {
            return;
        }

        if std::path::Path::new(WSLG_PULSE_PATH).exists() {
            info!("Auto-detected WSLG PulseAudio server at {}", WSLG_PULSE_PATH);
            std::env::set_var("PULSE_SERVER", WSLG_PULSE_PATH);
        } else {
            warn!("WSLG PulseAudio server not found at {}", WSLG_PULSE_PATH);
        }
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng", "/usr/local/bin/espeak-ng"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(ReaderError::Speech(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Convert a 0-100 rate to espeak speed (80-450 wpm)
    fn rate_to_espeak_speed(rate: u8) -> u16 {
        80 + (u16::from(rate.min(100)) * 370 / 100)
    }

    /// Convert a 0-100 volume to espeak amplitude (0-200)
    fn volume_to_espeak_amplitude(volume: u8) -> u8 {
        (u16::from(volume.min(100)) * 2) as u8
    }

    /// espeak-ng voice for a locale; espeak names voices by language
    fn voice_for(locale: &str) -> String {
        locale
            .split(['-', '_'])
            .next()
            .filter(|lang| !lang.is_empty())
            .unwrap_or("hi")
            .to_ascii_lowercase()
    }

    /// Kill the running process, if any, without reporting it
    fn kill_current(&mut self) {
        if let Some((mut child, token)) = self.current.take() {
            debug!("Killing espeak-ng process for utterance {}", token);
            match child.kill() {
                Ok(_) => {
                    let _ = child.wait(); // Clean up zombie
                }
                Err(e) => {
                    debug!("Failed to kill espeak-ng process: {}", e);
                }
            }
        }
    }
}

impl SpeechEngine for EspeakEngine {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn submit(&mut self, utterance: Utterance) -> Result<()> {
        self.kill_current();

        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(Self::voice_for(&utterance.locale));
        cmd.arg("-s").arg(self.speed.to_string());
        cmd.arg("-a").arg(self.amplitude.to_string());
        // Keep text starting with '-' from being read as an option
        cmd.arg("--").arg(&utterance.text);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        match cmd.spawn() {
            Ok(child) => {
                debug!("espeak-ng started for utterance {}", utterance.token);
                self.current = Some((child, utterance.token));
                let _ = self.events.send(EngineEvent::started(utterance.token));
                Ok(())
            }
            Err(e) => {
                error!("Failed to spawn espeak-ng: {}", e);
                Err(ReaderError::Speech(format!("Failed to start espeak-ng: {}", e)))
            }
        }
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.kill_current();
        Ok(())
    }

    fn poll(&mut self) {
        let Some((child, token)) = self.current.as_mut() else {
            return;
        };
        let token = *token;

        let event = match child.try_wait() {
            Ok(None) => return,
            Ok(Some(status)) if status.success() => EngineEvent::ended(token),
            Ok(Some(status)) => EngineEvent::failed(token, format!("espeak-ng exited with {}", status)),
            Err(e) => EngineEvent::failed(token, format!("Failed to wait for espeak-ng: {}", e)),
        };

        self.current = None;
        let _ = self.events.send(event);
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        debug!("Shutting down espeak-ng backend");
        self.kill_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_rate_conversion() {
        assert_eq!(EspeakEngine::rate_to_espeak_speed(0), 80);
        assert_eq!(EspeakEngine::rate_to_espeak_speed(50), 265);
        assert_eq!(EspeakEngine::rate_to_espeak_speed(100), 450);
        assert_eq!(EspeakEngine::rate_to_espeak_speed(255), 450);
    }

    #[test]
    fn test_volume_conversion() {
        assert_eq!(EspeakEngine::volume_to_espeak_amplitude(0), 0);
        assert_eq!(EspeakEngine::volume_to_espeak_amplitude(50), 100);
        assert_eq!(EspeakEngine::volume_to_espeak_amplitude(100), 200);
    }

    #[test]
    fn test_voice_for_locale() {
        assert_eq!(EspeakEngine::voice_for("hi-IN"), "hi");
        assert_eq!(EspeakEngine::voice_for("HI"), "hi");
        assert_eq!(EspeakEngine::voice_for(""), "hi");
    }

    #[test]
    fn test_create_espeak_engine() {
        let (tx, _rx) = mpsc::channel();
        match EspeakEngine::new(&EngineOptions::default(), tx) {
            Ok(_) => println!("✓ espeak-ng backend available"),
            Err(e) => println!("⚠ espeak-ng backend not available: {}", e),
        }
    }
}
