//! Commands every session gets: `help`, `grep`, `clear` and `exit`.
//!
//! They are ordinary command specifications registered next to the user's,
//! so they resolve, classify and pipe exactly like user commands.

use std::io::Write;

use crate::argument::ArgumentSpec;
use crate::command::{pad_right, CommandSpec, Invocation, COMMAND_PADDING};
use crate::control::ExitRequested;
use crate::flag::FlagSpec;

/// Specifications for all built-in commands.
pub fn builtin_commands() -> Vec<CommandSpec> {
    vec![help_command(), grep_command(), clear_command(), exit_command()]
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

fn help_command() -> CommandSpec {
    CommandSpec::new("help")
        .description("list the available commands")
        .on_execute(builtin_help)
}

fn builtin_help(inv: &mut Invocation<'_>) -> anyhow::Result<()> {
    writeln!(inv.stdout, "Commands:")?;
    for command in inv.commands.sorted() {
        writeln!(
            inv.stdout,
            "  {}{}",
            pad_right(command.name(), COMMAND_PADDING),
            command.description()
        )?;
    }
    writeln!(inv.stdout)?;
    writeln!(inv.stdout, "Use <command> --help for details on a command.")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

fn grep_command() -> CommandSpec {
    CommandSpec::new("grep")
        .description("filter piped input by substring")
        .flag(
            FlagSpec::new("insensitive")
                .short("i")
                .description("ignore case when matching"),
        )
        .argument(ArgumentSpec::new("pattern").description("text each line must contain"))
        .on_execute(builtin_grep)
}

fn builtin_grep(inv: &mut Invocation<'_>) -> anyhow::Result<()> {
    let pattern = inv.args.get_str("pattern").unwrap_or_default();
    let insensitive = inv.args.get_bool("insensitive");
    let needle = if insensitive {
        pattern.to_lowercase()
    } else {
        pattern.to_string()
    };

    let input = String::from_utf8_lossy(inv.input);
    for line in input.lines() {
        let matched = if insensitive {
            line.to_lowercase().contains(&needle)
        } else {
            line.contains(&needle)
        };
        if matched {
            writeln!(inv.stdout, "{line}")?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// clear / exit
// ---------------------------------------------------------------------------

fn clear_command() -> CommandSpec {
    CommandSpec::new("clear")
        .description("clear the screen")
        .on_execute(|inv: &mut Invocation<'_>| {
            inv.host.clear_screen(inv.stdout)?;
            Ok(())
        })
}

fn exit_command() -> CommandSpec {
    CommandSpec::new("exit")
        .description("end the session")
        .on_execute(|_: &mut Invocation<'_>| Err(ExitRequested.into()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtins_validate() {
        for spec in builtin_commands() {
            let command = spec.validate(HashSet::new()).unwrap();
            assert!(command.handler().is_some(), "{}", command.name());
        }
    }

    #[test]
    fn grep_requires_pattern() {
        let grep = grep_command().validate(HashSet::new()).unwrap();
        assert!(grep.argument("pattern").is_some());
        assert!(grep.flag("i").is_some());
    }
}
