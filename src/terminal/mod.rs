//! Terminal output: sizing and message list rendering

pub mod render;
pub mod util;

pub use render::{render_messages, wrap};
pub use util::{get_terminal_size, has_input, is_tty, take_lines, wait_for_input};
