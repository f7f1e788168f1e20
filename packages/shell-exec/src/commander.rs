//! The command registry and the entry points a line reader drives.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Arc;

use cmdtree_shell::lexer::tokenize_partial;
use cmdtree_shell::token::FlowControl;
use tracing::{debug, info, warn};

use crate::builtins::builtin_commands;
use crate::command::{Command, CommandSpec};
use crate::completer::Suggestion;
use crate::config::Config;
use crate::control::{ControlFlow, ShellError};
use crate::error::SchemaError;
use crate::executor::exec_line;
use crate::flag::Flag;
use crate::host::HostInterface;

/// Validated root commands, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

/// Result of walking a token list down the command tree.
#[derive(Debug)]
pub struct Located<'a> {
    /// Deepest command matched, `None` when the first token names no root.
    pub command: Option<&'a Command>,
    /// Flags of every matched ancestor of `command`, outermost first.
    pub inherited: Vec<&'a Flag>,
    /// Tokens after the last matched command name.
    pub remaining: &'a [String],
}

impl CommandSet {
    pub fn new<'a>(specs: impl IntoIterator<Item = &'a CommandSpec>) -> Result<Self, SchemaError> {
        let mut set = CommandSet::default();
        for spec in specs {
            if set.index.contains_key(&spec.name) {
                return Err(SchemaError::DuplicateCommand(spec.name.clone()));
            }
            let command = spec.validate(HashSet::new())?;
            set.index.insert(spec.name.clone(), set.commands.len());
            set.commands.push(command);
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Root commands ordered by name.
    pub fn sorted(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self.iter().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Follow `tokens` through root and subcommand names for as long as they
    /// match. Stops at the first token that is not a subcommand of the
    /// current node, or once a leaf is reached.
    pub fn locate_command<'a>(&'a self, tokens: &'a [String]) -> Located<'a> {
        let mut current: Option<&Command> = None;
        let mut inherited = Vec::new();
        let mut consumed = 0;

        for token in tokens {
            let next = match current {
                None => self.get(token),
                Some(command) if command.is_leaf() => None,
                Some(command) => command.subcommand(token),
            };
            let Some(next) = next else { break };
            if let Some(parent) = current {
                inherited.extend(parent.flags());
            }
            current = Some(next);
            consumed += 1;
        }

        Located {
            command: current,
            inherited,
            remaining: &tokens[consumed..],
        }
    }
}

/// A command session: the registry plus the host it executes against.
pub struct Commander {
    prompt: String,
    dump_file: Option<std::path::PathBuf>,
    history_file: Option<std::path::PathBuf>,
    commands: CommandSet,
    host: Arc<dyn HostInterface>,
}

impl Commander {
    /// Validate the configured commands together with the built-ins.
    /// Fails on the first schema error, or when two root commands share a
    /// name.
    pub fn new(mut config: Config, host: Arc<dyn HostInterface>) -> Result<Self, SchemaError> {
        config.apply_defaults();
        let builtins = builtin_commands();
        let commands = CommandSet::new(config.commands.iter().chain(&builtins))?;
        info!(commands = commands.len(), "command registry built");

        Ok(Commander {
            prompt: config.prompt,
            dump_file: config.dump_file,
            history_file: config.history_file,
            commands,
            host,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn history_file(&self) -> Option<&std::path::Path> {
        self.history_file.as_deref()
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Run one line, writing the final stage's output to `stdout`.
    pub fn execute_line(&self, line: &str, stdout: &mut dyn Write) -> Result<ControlFlow, ShellError> {
        exec_line(&self.commands, self.host.as_ref(), line, stdout)
    }

    /// Run one line against the process's stdout. Errors are reported on
    /// stderr and never end the session.
    pub fn submit_line(&self, line: &str) -> ControlFlow {
        if let Err(e) = self.dump_line(line) {
            warn!("failed to append to dump file: {e}");
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.execute_line(line, &mut out) {
            Ok(flow) => flow,
            Err(e) => {
                warn!(line, "line failed: {e}");
                let _ = out.flush();
                eprintln!("{e}");
                ControlFlow::Continue
            }
        }
    }

    fn dump_line(&self, line: &str) -> io::Result<()> {
        let Some(path) = &self.dump_file else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }

    /// Completion candidates for the token under the cursor. Only the text
    /// before the cursor is considered. Returns `None` when there is
    /// nothing to offer.
    pub fn suggest(&self, before: &str, after: &str, full: &str) -> Option<Vec<Suggestion>> {
        debug!(before, after, full, "suggest");

        let partial = tokenize_partial(before);
        // Redirect destinations are file paths.
        if partial.group.flow == FlowControl::Redirect {
            return None;
        }
        let mut tokens = partial.group.tokens;
        if !partial.token_open {
            tokens.push(String::new());
        }

        let Some((current, prefix)) = tokens.split_last() else {
            return None;
        };
        let located = self.commands.locate_command(prefix);

        let suggestions = match located.command {
            None if prefix.is_empty() => self
                .commands
                .sorted()
                .into_iter()
                .filter(|c| c.name().starts_with(current.as_str()))
                .map(|c| Suggestion::plain(c.name()))
                .collect(),
            None => Vec::new(),
            Some(command) => {
                let mut rest = located.remaining.to_vec();
                rest.push(current.clone());
                command.suggest(&rest, &located.inherited)
            }
        };

        (!suggestions.is_empty()).then_some(suggestions)
    }
}
