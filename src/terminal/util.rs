//! Terminal utilities

use nix::libc;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Get the terminal size for the given file descriptor
///
/// Falls back to 80x24 when the descriptor is not a terminal.
pub fn get_terminal_size(fd: RawFd) -> (u16, u16) {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 {
        (ws.ws_col, ws.ws_row)
    } else {
        (80, 24)
    }
}

/// Whether a file descriptor is an interactive terminal
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

/// Whether more input can be read from a descriptor without blocking
pub fn has_input(fd: RawFd) -> bool {
    wait_for_input(fd, Duration::ZERO)
}

/// Wait up to `timeout` for a descriptor to become readable
///
/// Used where epoll cannot watch terminals (WSL).
pub fn wait_for_input(fd: RawFd, timeout: Duration) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    let n = unsafe { libc::poll(&mut pfd, 1, millis) };
    n > 0 && (pfd.revents & (libc::POLLIN | libc::POLLHUP)) != 0
}

/// Split complete lines off the front of an input buffer
///
/// Lines are decoded leniently and lose their `\n` / `\r\n` ending. A
/// trailing partial line stays in the buffer.
pub fn take_lines(pending: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = pending.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
        lines.push(line.trim_end_matches('\r').to_string());
    }
    lines
}
