use crate::core::message::{ConversationTurn, Role};
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only transcript of a chat session.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    /// A logger for `log_file`, active immediately when a path is given.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn Error>> {
        // Fail early if the file cannot be created.
        OpenOptions::new().create(true).append(true).open(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn Error>> {
        match self.file_path.clone() {
            Some(path) => {
                if self.is_active {
                    self.log_message("## Logging paused")?;
                    self.is_active = false;
                    Ok(format!("Logging paused (file: {path})"))
                } else {
                    self.is_active = true;
                    Ok(format!("Logging resumed to: {path}"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    /// Write one turn. User turns get a `You:` prefix, assistant turns are
    /// written as-is and system turns are skipped.
    pub fn log_turn(&self, turn: &ConversationTurn) -> Result<(), Box<dyn Error>> {
        match turn.role() {
            Role::User => self.log_message(&format!("You: {}", turn.content())),
            Role::Assistant if !turn.content().is_empty() => self.log_message(turn.content()),
            _ => Ok(()),
        }
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn Error>> {
        let Some(file_path) = self.file_path.as_deref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between messages, matching the terminal display.
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let file_name = |path: &str| {
            Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_turns_and_honours_pause() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chat.log");
        let path_str = path.to_string_lossy().into_owned();

        let mut logging = LoggingState::new(Some(path_str)).expect("logger");
        assert!(logging.is_active());
        assert_eq!(logging.get_status_string(), "active (chat.log)");

        logging
            .log_turn(&ConversationTurn::user("Hello"))
            .expect("log user");
        logging
            .log_turn(&ConversationTurn::assistant("Hi!\nHow can I help?"))
            .expect("log assistant");
        logging
            .log_turn(&ConversationTurn::system("hidden"))
            .expect("skip system");

        logging.toggle_logging().expect("pause");
        assert!(!logging.is_active());
        logging
            .log_turn(&ConversationTurn::user("not logged"))
            .expect("paused write is a no-op");

        let contents = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(
            contents,
            "You: Hello\n\nHi!\nHow can I help?\n\n## Logging paused\n\n"
        );

        logging.toggle_logging().expect("resume");
        assert!(logging.get_status_string().starts_with("active"));
    }

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut logging = LoggingState::new(None).expect("logger");
        assert_eq!(logging.get_status_string(), "disabled");
        assert!(logging.toggle_logging().is_err());
    }
}
