//! Desktop launcher registration
//!
//! On startup a desktop entry is written so the reader shows up in the
//! application menu. This runs on a background thread and is best effort:
//! failures are logged and otherwise ignored, and never retried.

use crate::{ReaderError, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// File name of the desktop entry
pub const DESKTOP_FILE: &str = "msgreader.desktop";

/// Desktop entry contents for an executable
pub fn desktop_entry(exec: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=Message Reader\n\
         Comment=Hear your saved messages read aloud in Hindi\n\
         Exec=\"{}\"\n\
         Terminal=true\n\
         Categories=Accessibility;Utility;\n",
        exec.display()
    )
}

/// Write the desktop entry into `applications_dir` unless one exists
///
/// Returns whether a new entry was written.
pub fn register(applications_dir: &Path, exec: &Path) -> Result<bool> {
    let path = applications_dir.join(DESKTOP_FILE);
    if path.exists() {
        debug!("Desktop entry already present at {:?}", path);
        return Ok(false);
    }

    fs::create_dir_all(applications_dir)?;
    fs::write(&path, desktop_entry(exec))?;
    info!("Registered desktop entry at {:?}", path);
    Ok(true)
}

/// Default location of user desktop entries
pub fn applications_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("applications"))
        .ok_or_else(|| ReaderError::Other("Could not find data directory".to_string()))
}

/// Register the running executable on a background thread
pub fn register_in_background() {
    let spawned = thread::Builder::new()
        .name("install".to_string())
        .spawn(|| {
            let result = applications_dir().and_then(|dir| {
                let exec = std::env::current_exe()?;
                register(&dir, &exec)
            });
            if let Err(e) = result {
                warn!("Desktop registration failed: {}", e);
            }
        });

    if let Err(e) = spawned {
        warn!("Could not start desktop registration: {}", e);
    }
}
