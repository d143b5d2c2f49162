//! Configuration tests

use msgreader::speech::{BackendChoice, EngineOptions};
use msgreader::state::config::Config;
use std::fs;
use std::path::PathBuf;

#[test]
fn test_default_config_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".msgreader.cfg");

    let config = Config::load_from(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.path(), path.as_path());

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[speech]"));
    assert!(contents.contains("[storage]"));
    assert!(contents.contains("[install]"));
}

#[test]
fn test_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(dir.path().join("c.cfg")).unwrap();

    assert_eq!(config.locale(), "hi-IN");
    assert_eq!(config.backend(), BackendChoice::Auto);
    assert_eq!(config.rate(), None);
    assert_eq!(config.volume(), None);
    assert_eq!(config.storage_dir(), None);
    assert!(config.register_install());
    assert_eq!(config.engine_options(), EngineOptions::default());
}

#[test]
fn test_values_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.cfg");
    fs::write(
        &path,
        "[speech]\nlocale = hi-IN\nbackend = espeak\nrate = 40\nvolume = 90\n\
         [storage]\ndir = /tmp/msgs\n\
         [install]\nregister = false\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.backend(), BackendChoice::Espeak);
    assert_eq!(config.rate(), Some(40));
    assert_eq!(config.volume(), Some(90));
    assert_eq!(config.storage_dir(), Some(PathBuf::from("/tmp/msgs")));
    assert!(!config.register_install());

    let options = config.engine_options();
    assert_eq!(options.backend, BackendChoice::Espeak);
    assert_eq!(options.rate, Some(40));
}

#[test]
fn test_bad_values_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.cfg");
    fs::write(
        &path,
        "[speech]\nlocale = fr-FR\nbackend = sapi\nrate = 250\nvolume = loud\n\
         [install]\nregister = maybe\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.locale(), "hi-IN");
    assert_eq!(config.backend(), BackendChoice::Auto);
    assert_eq!(config.rate(), None);
    assert_eq!(config.volume(), None);
    assert!(config.register_install());
}

#[test]
fn test_set_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.cfg");

    let mut config = Config::load_from(&path).unwrap();
    config.set("speech", "backend", "native");
    config.save().unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.backend(), BackendChoice::Native);
}

#[test]
fn test_older_file_is_completed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.cfg");
    fs::write(&path, "[speech]\nrate = 30\n[install]\nregister = false\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.rate(), Some(30));
    assert!(!config.register_install());

    // Reloading sees the filled-in keys and keeps the user's values
    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.rate(), Some(30));
    assert!(!reloaded.register_install());
    assert_eq!(reloaded.backend(), BackendChoice::Auto);
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[storage]"));
    assert!(contents.contains("locale"));
}
