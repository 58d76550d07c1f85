/// Where user-facing announcements go. Each call is independent; the caller
/// does not expect any queuing guarantee beyond "shown to the user".
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Prints each message on its own line. Used by the headless subcommands.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Keeps every message; tests assert on the list.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    pub messages: Vec<String>,
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
