use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use cmdtree_shell::value::ArgType;

use crate::argmap::ArgMap;
use crate::argument::{Argument, ArgumentSpec};
use crate::classify::{classify_tokens, flag_lookup};
use crate::commander::CommandSet;
use crate::completer::Suggestion;
use crate::error::{ParseError, SchemaError};
use crate::flag::{Flag, FlagSpec, HELP_FLAG};
use crate::host::HostInterface;

/// Column width for names in help listings.
pub const COMMAND_PADDING: usize = 20;

/// Everything a handler sees when its command runs.
pub struct Invocation<'a> {
    pub command: &'a Command,
    pub args: &'a ArgMap,
    /// Output of the previous pipeline stage; empty for the first stage.
    pub input: &'a [u8],
    /// Where the stage writes. Captured unless this is the last stage.
    pub stdout: &'a mut dyn Write,
    pub commands: &'a CommandSet,
    pub host: &'a dyn HostInterface,
}

pub type Handler = Arc<dyn Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Declaration of a command node, as written by the caller.
#[derive(Clone, Default)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub flags: Vec<FlagSpec>,
    pub arguments: Vec<ArgumentSpec>,
    pub subcommands: Vec<CommandSpec>,
    pub on_execute: Option<Handler>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        CommandSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn subcommand(mut self, subcommand: CommandSpec) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub fn on_execute<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_execute = Some(Arc::new(handler));
        self
    }

    /// Build the validated command tree rooted at this spec.
    ///
    /// `inherited` holds every flag name and short name declared by
    /// ancestors. Each subcommand receives its own copy, so siblings never
    /// see each other's flags.
    pub fn validate(&self, mut inherited: HashSet<String>) -> Result<Command, SchemaError> {
        let name = &self.name;
        let has_subcommands = !self.subcommands.is_empty();

        if has_subcommands && !self.arguments.is_empty() {
            return Err(SchemaError::SubcommandsWithArguments(name.clone()));
        }
        if has_subcommands && self.on_execute.is_some() {
            return Err(SchemaError::SubcommandsWithHandler(name.clone()));
        }
        if !has_subcommands && self.on_execute.is_none() {
            return Err(SchemaError::MissingHandler(name.clone()));
        }

        // The help flag is injected below, so it counts as declared here.
        let own_flag_names: HashSet<&str> = self
            .flags
            .iter()
            .flat_map(|f| f.name.as_deref().into_iter().chain(f.short_name.as_deref()))
            .chain([HELP_FLAG])
            .collect();

        let mut arguments = Vec::with_capacity(self.arguments.len());
        let mut argument_index = HashMap::new();
        for (position, spec) in self.arguments.iter().enumerate() {
            let arg_name = &spec.name;
            if inherited.contains(arg_name) {
                return Err(SchemaError::ArgumentShadowsParentFlag {
                    name: arg_name.clone(),
                    command: name.clone(),
                });
            }
            if own_flag_names.contains(arg_name.as_str()) {
                return Err(SchemaError::ArgumentShadowsFlag {
                    name: arg_name.clone(),
                    command: name.clone(),
                });
            }
            if argument_index.contains_key(arg_name) {
                return Err(SchemaError::DuplicateArgument {
                    name: arg_name.clone(),
                    command: name.clone(),
                });
            }
            if spec.allow_multiple && position + 1 != self.arguments.len() {
                return Err(SchemaError::MultipleNotLast(arg_name.clone()).in_command(name));
            }

            let argument = spec.validate().map_err(|e| e.in_command(name))?;
            argument_index.insert(arg_name.clone(), arguments.len());
            arguments.push(argument);
        }

        let help = FlagSpec::help();
        let needs_help = !self.flags.iter().any(FlagSpec::is_help);
        let flag_specs = self.flags.iter().chain(needs_help.then_some(&help));

        let mut flags = Vec::with_capacity(self.flags.len() + 1);
        let mut flag_index = HashMap::new();
        for spec in flag_specs {
            let flag = spec.validate().map_err(|e| e.in_command(name))?;
            for lookup in flag.lookup_names() {
                let is_help = lookup == HELP_FLAG;
                if inherited.contains(lookup) && !is_help {
                    return Err(SchemaError::FlagShadowsParentFlag {
                        name: lookup.to_string(),
                        command: name.clone(),
                    });
                }
                if flag_index.contains_key(lookup) {
                    return Err(SchemaError::DuplicateFlag {
                        name: lookup.to_string(),
                        command: name.clone(),
                    });
                }
                flag_index.insert(lookup.to_string(), flags.len());
                inherited.insert(lookup.to_string());
            }
            flags.push(flag);
        }

        let mut subcommands = Vec::with_capacity(self.subcommands.len());
        let mut subcommand_index = HashMap::new();
        for spec in &self.subcommands {
            if subcommand_index.contains_key(&spec.name) {
                return Err(SchemaError::DuplicateSubcommand {
                    name: spec.name.clone(),
                    parent: name.clone(),
                });
            }
            let subcommand = spec.validate(inherited.clone())?;
            subcommand_index.insert(spec.name.clone(), subcommands.len());
            subcommands.push(subcommand);
        }

        Ok(Command {
            name: name.clone(),
            description: self.description.clone(),
            flags,
            arguments,
            subcommands,
            handler: self.on_execute.clone(),
            subcommand_index,
            flag_index,
            argument_index,
        })
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("on_execute", &self.on_execute.is_some())
            .finish()
    }
}

/// A validated node of the command tree with its lookup indices.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    flags: Vec<Flag>,
    arguments: Vec<Argument>,
    subcommands: Vec<Command>,
    handler: Option<Handler>,
    subcommand_index: HashMap<String, usize>,
    flag_index: HashMap<String, usize>,
    argument_index: HashMap<String, usize>,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.subcommands.is_empty()
    }

    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommand_index.get(name).map(|&i| &self.subcommands[i])
    }

    /// Look up an own flag by long or short name.
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flag_index.get(name).map(|&i| &self.flags[i])
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.argument_index.get(name).map(|&i| &self.arguments[i])
    }

    pub fn classify_tokens(
        &self,
        tokens: &[String],
        inherited: &[&Flag],
    ) -> Result<ArgMap, ParseError> {
        classify_tokens(self, tokens, inherited)
    }

    fn invocation(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if !self.subcommands.is_empty() {
            parts.push("<subcommand>".to_string());
        }
        if !self.flags.is_empty() {
            parts.push("[flags...]".to_string());
        }
        parts.extend(self.arguments.iter().map(Argument::invocation));
        parts.join(" ")
    }

    /// Formatted help: invocation, subcommands, arguments, inherited flags
    /// and own flags.
    pub fn help_string(&self, inherited: &[&Flag]) -> String {
        let mut lines = vec!["Invocation:".to_string(), self.invocation()];

        if !self.subcommands.is_empty() {
            lines.push(String::new());
            lines.push("Subcommands:".to_string());
            for sub in &self.subcommands {
                lines.push(format!(
                    "  {}{}",
                    pad_right(&sub.name, COMMAND_PADDING),
                    sub.description
                ));
            }
        }

        if !self.arguments.is_empty() {
            lines.push(String::new());
            lines.push("Arguments:".to_string());
            for arg in &self.arguments {
                let mut description = Vec::new();
                if !arg.description().is_empty() {
                    description.push(arg.description().to_string());
                }
                if let Some(one_of) = arg.one_of() {
                    let values: Vec<String> = one_of.iter().map(ToString::to_string).collect();
                    description.push(format!("one of {}", values.join(", ")));
                }
                lines.push(format!(
                    "  {}{}",
                    pad_right(arg.name(), COMMAND_PADDING),
                    description.join(" - ")
                ));
            }
        }

        let own: Vec<&Flag> = self.flags.iter().collect();
        for (label, flags) in [("Inherited flags:", inherited), ("Flags:", own.as_slice())] {
            if flags.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(label.to_string());
            for flag in flags {
                lines.push(format!(
                    "  {}{}",
                    pad_right(&flag.padded_invocation(), COMMAND_PADDING),
                    flag_description(flag)
                ));
            }
        }

        lines.join("\n")
    }

    /// Completion candidates for the last of `tokens`, which are the tokens
    /// left after resolving this command.
    pub fn suggest(&self, tokens: &[String], inherited: &[&Flag]) -> Vec<Suggestion> {
        let lookup = flag_lookup(self, inherited);
        let all_flags: Vec<&Flag> = inherited
            .iter()
            .copied()
            .chain(self.flags.iter())
            .collect();

        let mut arg_num = 0;
        let mut no_flags = false;
        let mut pending: Option<&Flag> = None;

        for (idx, token) in tokens.iter().enumerate() {
            let is_final = idx + 1 == tokens.len();

            if let Some(flag) = pending.take() {
                if is_final {
                    return flag.suggest_values(token);
                }
                continue;
            }

            if !no_flags {
                if token == "--" && !is_final {
                    no_flags = true;
                    continue;
                }

                let (body, long) = if let Some(body) = token.strip_prefix("--") {
                    (Some(body), true)
                } else {
                    (token.strip_prefix('-'), false)
                };

                if let Some(body) = body {
                    if body.contains('=') {
                        continue;
                    }
                    if is_final {
                        return suggest_flag_names(&all_flags, body, long);
                    }
                    if let Some(&flag) = lookup.get(body) {
                        if flag.arg_type() != ArgType::Bool {
                            pending = Some(flag);
                        }
                    }
                    continue;
                }
            }

            if !self.subcommands.is_empty() {
                if !is_final {
                    return Vec::new();
                }
                return self
                    .subcommands
                    .iter()
                    .filter(|sub| sub.name.starts_with(token.as_str()))
                    .map(|sub| Suggestion::plain(sub.name.clone()))
                    .collect();
            }

            let Some(last) = self.arguments.last() else {
                return Vec::new();
            };
            let current = match self.arguments.get(arg_num) {
                Some(arg) => arg,
                None if last.allow_multiple() => last,
                None => return Vec::new(),
            };

            if is_final {
                return current.suggest_values(token);
            }
            arg_num += 1;
        }

        Vec::new()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

fn flag_description(flag: &Flag) -> String {
    let mut description = Vec::new();
    if !flag.description().is_empty() {
        description.push(flag.description().to_string());
    }
    if let Some(one_of) = flag.one_of() {
        let values: Vec<String> = one_of.iter().map(|v| format!("\"{v}\"")).collect();
        description.push(format!("one of {}", values.join(", ")));
    }
    if flag.arg_type() != ArgType::Bool {
        if let Some(default) = flag.default_value() {
            description.push(format!("defaults to \"{default}\""));
        }
    }
    if flag.is_required() {
        description.push("required".to_string());
    }
    description.join(" - ")
}

fn suggest_flag_names(flags: &[&Flag], prefix: &str, long: bool) -> Vec<Suggestion> {
    flags
        .iter()
        .filter_map(|flag| {
            let (name, dashes) = if long {
                (flag.name()?, "--")
            } else {
                (flag.short_name()?, "-")
            };
            name.starts_with(prefix).then(|| Suggestion {
                value: format!("{dashes}{name}"),
                display: format!("{}  {}", flag.invocation(), flag.description()),
            })
        })
        .collect()
}

/// Pad `text` with spaces to `width`, truncating with "..." when too long.
pub fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        return format!("{kept}...");
    }
    format!("{text}{}", " ".repeat(width - len))
}
