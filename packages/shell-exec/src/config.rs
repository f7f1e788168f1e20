use std::path::PathBuf;

use crate::command::CommandSpec;

pub const DEFAULT_PROMPT: &str = "» ";

/// Session settings handed to [`Commander::new`](crate::commander::Commander::new).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub prompt: String,
    /// User commands. The built-ins are added alongside them.
    pub commands: Vec<CommandSpec>,
    /// Every submitted line is appended here.
    pub dump_file: Option<PathBuf>,
    /// Line-reader history, loaded at startup and saved on exit.
    pub history_file: Option<PathBuf>,
}

impl Config {
    pub fn new(commands: Vec<CommandSpec>) -> Self {
        Config {
            commands,
            ..Default::default()
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn dump_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_file = Some(path.into());
        self
    }

    pub fn history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_file = Some(path.into());
        self
    }

    pub fn apply_defaults(&mut self) {
        if self.prompt.is_empty() {
            self.prompt = DEFAULT_PROMPT.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_gets_default() {
        let mut config = Config::new(Vec::new());
        config.apply_defaults();
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn explicit_prompt_is_kept() {
        let mut config = Config::new(Vec::new()).prompt("farm> ");
        config.apply_defaults();
        assert_eq!(config.prompt, "farm> ");
        assert!(config.dump_file.is_none());
    }
}
