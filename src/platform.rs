//! Platform detection utilities

use std::env;
use std::fs;

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// WSL changes which speech backend works and how stdin can be polled.
pub fn is_wsl() -> bool {
    let kernel = fs::read_to_string("/proc/version").unwrap_or_default();
    looks_like_wsl(&kernel) || env::var_os("WSL_DISTRO_NAME").is_some()
}

/// Whether a `/proc/version` string comes from a WSL kernel
fn looks_like_wsl(kernel: &str) -> bool {
    let lower = kernel.to_lowercase();
    lower.contains("microsoft") || lower.contains("wsl")
}

/// Whether a graphical session is around for the clipboard to talk to
pub fn has_display() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| env::var_os(var).is_some_and(|v| !v.is_empty()))
}
