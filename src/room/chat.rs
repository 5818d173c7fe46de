//! Append-only chat/event log and the line formats clients display.

/// Append a line to the log, returning the new log. No cap, no dedup, no
/// reformatting; entries are never edited or removed afterwards.
pub fn append_log(log: &[String], line: impl Into<String>) -> Vec<String> {
    let mut next = log.to_vec();
    next.push(line.into());
    next
}

/// `"<time> <name>: <text>"` for a plain chat message.
pub fn chat_line(clock: &str, name: &str, text: &str) -> String {
    format!("{clock} {name}: {text}")
}

/// `"<time> <name> <action>"` for a game event announcement.
pub fn event_line(clock: &str, name: &str, action: &str) -> String {
    format!("{clock} {name} {action}")
}

/// Join announcement broadcast when a connection binds to the room.
pub fn entered_line(clock: &str, name: &str) -> String {
    event_line(clock, name, "entered the room")
}

/// Leave announcement broadcast on disconnect.
pub fn left_line(clock: &str, name: &str) -> String {
    event_line(clock, name, "left the room")
}
