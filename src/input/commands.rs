//! Command parsing for the default handler

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line
    Empty,
    /// Store a new message
    Send(String),
    /// Speak a message by 1-based position, or the newest one
    Speak(Option<usize>),
    Stop,
    List,
    Clear,
    /// Set the title, or ask for one when no text is given
    Title(Option<String>),
    Paste,
    Help,
    Quit,
    /// Unknown command or bad argument, with a message for the user
    Invalid(String),
}

/// Help text listing every command
pub const HELP: &[(&str, &str)] = &[
    ("<text>", "save a message"),
    ("/speak [n]", "read message n aloud (default: newest)"),
    ("/stop", "stop speaking"),
    ("/list", "show all messages"),
    ("/paste", "save the clipboard text as a message"),
    ("/title [text]", "rename the app (Enter twice on an empty line also works)"),
    ("/clear", "delete all messages"),
    ("//text", "save a message starting with '/'"),
    ("/help", "show this help"),
    ("/quit", "exit"),
];

/// Parse one input line
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    // "//" escapes a literal leading slash
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Command::Send(format!("/{}", rest));
    }

    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let (name, arg) = match body.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (body, None),
    };

    match name.to_ascii_lowercase().as_str() {
        "speak" | "s" | "play" => match arg {
            None => Command::Speak(None),
            Some(n) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::Speak(Some(n)),
                _ => Command::Invalid(format!("Not a message number: {}", n)),
            },
        },
        "stop" | "x" => Command::Stop,
        "list" | "l" | "ls" => Command::List,
        "clear" => Command::Clear,
        "title" | "t" => Command::Title(arg.map(str::to_string)),
        "paste" | "p" => Command::Paste,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Invalid(format!("Unknown command /{} (try /help)", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent_verbatim() {
        assert_eq!(
            parse_command("  नमस्ते  "),
            Command::Send("  नमस्ते  ".to_string())
        );
    }

    #[test]
    fn test_escaped_slash() {
        assert_eq!(parse_command("//etc/hosts"), Command::Send("/etc/hosts".to_string()));
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(parse_command(" \t "), Command::Empty);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(parse_command("/speak"), Command::Speak(None));
        assert_eq!(parse_command("/speak 3"), Command::Speak(Some(3)));
        assert_eq!(parse_command("/S 2"), Command::Speak(Some(2)));
        assert!(matches!(parse_command("/speak 0"), Command::Invalid(_)));
        assert!(matches!(parse_command("/speak abc"), Command::Invalid(_)));
        assert_eq!(parse_command("/title"), Command::Title(None));
        assert_eq!(
            parse_command("/title  मेरे संदेश "),
            Command::Title(Some("मेरे संदेश".to_string()))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(parse_command("/frobnicate"), Command::Invalid(_)));
    }
}
