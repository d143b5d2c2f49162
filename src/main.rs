//! msgreader main entry point
//!
//! The main loop waits on stdin with a short timeout so speech engine
//! events are applied promptly even while the user is not typing:
//! 1. stdin (lines typed or pasted by the user) - routed to handlers
//! 2. speech engine events - update the "speaking" marker
//! 3. SIGINT - stop speaking and exit cleanly

use anyhow::Context;
use chrono::Local;
use log::{debug, error, info, warn};
use mio::{Events, Interest, Poll, Token};
use msgreader::input::{dispatch_line, DefaultHandler, HandlerAction};
use msgreader::install::register_in_background;
use msgreader::platform::is_wsl;
use msgreader::speech::PlaybackCoordinator;
use msgreader::state::config::Config;
use msgreader::state::App;
use msgreader::store::{FileStorage, LocalStorage, MemoryStorage, MessageStore};
use msgreader::terminal::{get_terminal_size, has_input, is_tty, take_lines, wait_for_input};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

/// How long to wait for input before checking on speech
const TICK: Duration = Duration::from_millis(100);

/// Global flag set by SIGINT handler
static QUIT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// SIGINT handler - sets flag so the loop can exit cleanly
extern "C" fn handle_sigint(_: libc::c_int) {
    QUIT_REQUESTED.store(true, Ordering::Relaxed);
}

/// Command line options
struct Options {
    debug: bool,
    memory: bool,
}

fn usage() {
    println!("Usage: {} [OPTIONS]", msgreader::APP_NAME);
    println!();
    println!("Type or paste messages, then have them read aloud in Hindi.");
    println!();
    println!("Options:");
    println!("  -d, --debug     write debug logs to {}.log", msgreader::APP_NAME);
    println!("      --memory    keep messages in memory only");
    println!("  -h, --help      show this help");
    println!("  -V, --version   show version");
}

fn parse_args() -> Options {
    let mut options = Options {
        debug: false,
        memory: false,
    };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--memory" => options.memory = true,
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", msgreader::APP_NAME, msgreader::VERSION);
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                usage();
                process::exit(2);
            }
        }
    }

    options
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to msgreader.log file
        use std::fs::OpenOptions;
        let log_name = format!("{}.log", msgreader::APP_NAME);
        match OpenOptions::new().create(true).append(true).open(&log_name) {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open {} for debug logging: {}", log_name, e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "msgreader version {} starting (debug mode, logging to {}.log)",
            msgreader::VERSION,
            msgreader::APP_NAME
        );
    } else {
        // Normal mode: errors only, unless RUST_LOG says otherwise
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}

fn main() {
    let options = parse_args();
    init_logging(options.debug);

    if let Err(e) = run(&options) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Open the configured storage, falling back to memory
fn open_storage(config: &Config, memory: bool) -> (Box<dyn LocalStorage>, Option<String>) {
    if memory {
        info!("Using in-memory storage");
        return (Box::new(MemoryStorage::new()), None);
    }

    let dir = match config.storage_dir() {
        Some(dir) => Ok(dir),
        None => FileStorage::default_dir(),
    };

    match dir.and_then(|dir| FileStorage::open(dir)) {
        Ok(storage) => {
            info!("Messages stored in {:?}", storage.dir());
            (Box::new(storage), None)
        }
        Err(e) => {
            warn!("Falling back to in-memory storage: {}", e);
            (
                Box::new(MemoryStorage::new()),
                Some(format!("Messages will not be saved: {}", e)),
            )
        }
    }
}

fn run(options: &Options) -> anyhow::Result<()> {
    debug!("Initializing msgreader");

    // Line-by-line interaction needs a terminal
    let stdin_fd = io::stdin().as_raw_fd();
    if !is_tty(stdin_fd) {
        eprintln!("Error: msgreader requires an interactive terminal (stdin is not a TTY)");
        eprintln!("Usage: run msgreader directly in a terminal, not through pipes or redirects");
        process::exit(1);
    }

    let config = Config::load().context("loading configuration")?;
    info!("Configuration loaded from {:?}", config.path());

    let (storage, storage_notice) = open_storage(&config, options.memory);
    let store = MessageStore::initialize(storage);

    if config.register_install() {
        register_in_background();
    }

    let coordinator = PlaybackCoordinator::from_options(&config.engine_options());
    let mut app = App::new(store, coordinator);
    if let Some(notice) = storage_notice {
        app.print(notice);
    }
    let mut default_handler = DefaultHandler::new();

    unsafe {
        signal::signal(Signal::SIGINT, SigHandler::Handler(handle_sigint))
            .context("installing SIGINT handler")?;
    }

    // WSL doesn't support epoll on TTY file descriptors, so poll() directly there
    let mut mio_poll = if !is_wsl() {
        debug!("Using mio::Poll for event loop");
        let poll = Poll::new().context("creating poll")?;
        let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN, Interest::READABLE)
            .context("registering stdin")?;
        Some((poll, Events::with_capacity(8)))
    } else {
        debug!("Using poll() for event loop (WSL mode)");
        None
    };

    let mut pending: Vec<u8> = Vec::new();
    let mut show_prompt = true;

    info!("msgreader ready - entering event loop");

    loop {
        app.pump_speech();
        show_prompt |= draw(&mut app)?;
        if show_prompt {
            prompt(&app)?;
            show_prompt = false;
        }

        if QUIT_REQUESTED.load(Ordering::Relaxed) {
            info!("Interrupted");
            break;
        }

        let readable = match mio_poll {
            Some((ref mut poll, ref mut events)) => match poll.poll(events, Some(TICK)) {
                Ok(()) => events.iter().any(|event| event.token() == STDIN),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
                Err(e) => return Err(e).context("waiting for input"),
            },
            None => wait_for_input(stdin_fd, TICK),
        };
        if !readable {
            continue;
        }

        // Poll is edge-triggered: read until nothing is left
        let mut eof = false;
        loop {
            let mut buf = [0u8; 4096];
            match io::stdin().read(&mut buf) {
                Ok(0) => {
                    eof = true;
                    break;
                }
                Ok(n) => pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => break,
                Err(e) => return Err(e).context("reading stdin"),
            }
            if !has_input(stdin_fd) {
                break;
            }
        }

        if eof && !pending.is_empty() {
            pending.push(b'\n');
        }

        let mut quit = eof;
        for line in take_lines(&mut pending) {
            show_prompt = true;
            match dispatch_line(&line, &mut app, &mut default_handler) {
                Ok(HandlerAction::Quit) => {
                    quit = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Command failed: {}", e);
                    app.print(format!("Error: {}", e));
                }
            }
        }

        if quit {
            flush_output(&mut app)?;
            break;
        }
    }

    app.coordinator.stop();
    println!();
    info!("msgreader exiting");
    Ok(())
}

/// Redraw the list if asked to, then print queued lines
///
/// Returns whether anything was written, so the prompt can be re-shown.
fn draw(app: &mut App) -> io::Result<bool> {
    let mut wrote = false;
    let mut stdout = io::stdout().lock();

    if app.take_render_request() {
        let (cols, _) = get_terminal_size(libc::STDOUT_FILENO);
        // Clear screen and home the cursor
        write!(stdout, "\x1b[2J\x1b[H")?;
        for line in app.render(Local::now().date_naive(), usize::from(cols)) {
            writeln!(stdout, "{}", line)?;
        }
        writeln!(stdout)?;
        wrote = true;
    }

    for line in app.take_output() {
        writeln!(stdout, "{}", line)?;
        wrote = true;
    }

    stdout.flush()?;
    Ok(wrote)
}

fn flush_output(app: &mut App) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for line in app.take_output() {
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()
}

fn prompt(app: &App) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match app.prompt() {
        Some(text) => write!(stdout, "{}", text)?,
        None => write!(stdout, "> ")?,
    }
    stdout.flush()
}
