use std::io::Write;
use std::sync::OnceLock;

use cmdtree_shell::lexer::tokenize;
use cmdtree_shell::token::{FlowControl, TokenGroup};
use regex::bytes::Regex;
use tracing::debug;

use crate::command::Invocation;
use crate::commander::CommandSet;
use crate::control::{ControlFlow, ExitRequested, ShellError};
use crate::error::ParseError;
use crate::flag::HELP_FLAG;
use crate::host::HostInterface;

// ---------------------------------------------------------------------------
// Line layout
// ---------------------------------------------------------------------------

/// Command stages of a line plus the optional redirect destination.
#[derive(Debug)]
struct Plan<'g> {
    stages: &'g [TokenGroup],
    redirect: Option<&'g str>,
}

fn flow_verb(flow: FlowControl) -> &'static str {
    match flow {
        FlowControl::Redirect => "redirect",
        FlowControl::Pipe | FlowControl::None => "pipe",
    }
}

/// Check the shape of the whole line before anything runs: every stage has
/// a command, and a redirect is last with exactly one destination.
fn plan_line<'g>(line: &str, groups: &'g [TokenGroup]) -> Result<Plan<'g>, ParseError> {
    for (i, group) in groups.iter().enumerate() {
        if group.flow == FlowControl::Redirect {
            if i + 1 != groups.len() {
                return Err(ParseError::RedirectNotFinal);
            }
            if group.tokens.len() != 1 {
                return Err(ParseError::RedirectTarget(group.tokens.len()));
            }
            continue;
        }
        if group.is_empty() {
            // A lone operator leaves a single empty group behind.
            let verb = match groups.get(i + 1) {
                Some(next) => flow_verb(next.flow),
                None if line.trim_start().starts_with('>') => "redirect",
                None => "pipe",
            };
            return Err(ParseError::NothingToFlowFrom(verb));
        }
    }

    match groups.split_last() {
        Some((last, stages)) if last.flow == FlowControl::Redirect => Ok(Plan {
            stages,
            redirect: last.tokens.first().map(String::as_str),
        }),
        _ => Ok(Plan {
            stages: groups,
            redirect: None,
        }),
    }
}

// ---------------------------------------------------------------------------
// Output capture
// ---------------------------------------------------------------------------

fn escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // CSI, OSC (BEL or ST terminated) and two-byte escapes.
        Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
            .expect("escape pattern should compile")
    })
}

/// Remove terminal escape sequences from captured output.
pub fn strip_escapes(data: &[u8]) -> Vec<u8> {
    escape_pattern().replace_all(data, &b""[..]).into_owned()
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Tokenize and run one line.
///
/// Every stage but the last writes into a buffer that becomes the next
/// stage's input; the last writes to `stdout`, or into a buffer that is
/// written to the redirect file. The first failing stage aborts the line,
/// and earlier stages' side effects are not rolled back.
pub fn exec_line(
    commands: &CommandSet,
    host: &dyn HostInterface,
    line: &str,
    stdout: &mut dyn Write,
) -> Result<ControlFlow, ShellError> {
    let groups = tokenize(line);
    if groups.is_empty() {
        return Ok(ControlFlow::Continue);
    }
    let plan = plan_line(line, &groups)?;

    let mut input: Vec<u8> = Vec::new();
    for (i, stage) in plan.stages.iter().enumerate() {
        let capture = i + 1 < plan.stages.len() || plan.redirect.is_some();
        let mut buffer = Vec::new();
        let sink: &mut dyn Write = if capture { &mut buffer } else { &mut *stdout };

        if let ControlFlow::Exit = exec_stage(commands, host, &stage.tokens, &input, sink)? {
            return Ok(ControlFlow::Exit);
        }

        if capture {
            input = strip_escapes(&buffer);
        } else {
            stdout.flush()?;
        }
    }

    if let Some(path) = plan.redirect {
        debug!(path, bytes = input.len(), "redirecting output");
        host.write_file(path, &input)?;
    }
    Ok(ControlFlow::Continue)
}

fn exec_stage(
    commands: &CommandSet,
    host: &dyn HostInterface,
    tokens: &[String],
    input: &[u8],
    sink: &mut dyn Write,
) -> Result<ControlFlow, ShellError> {
    let located = commands.locate_command(tokens);
    let Some(command) = located.command else {
        let name = tokens.first().cloned().unwrap_or_default();
        return Err(ParseError::UnknownCommand(name).into());
    };
    debug!(
        command = command.name(),
        remaining = ?located.remaining,
        "resolved stage"
    );

    let help = format!("--{HELP_FLAG}");
    if located.remaining.iter().any(|t| *t == help) {
        writeln!(sink, "{}", command.help_string(&located.inherited))?;
        return Ok(ControlFlow::Continue);
    }

    let args = command.classify_tokens(located.remaining, &located.inherited)?;
    let Some(handler) = command.handler() else {
        return Err(ShellError::NotExecutable(command.name().to_string()));
    };

    let mut invocation = Invocation {
        command,
        args: &args,
        input,
        stdout: sink,
        commands,
        host,
    };
    match (**handler)(&mut invocation) {
        Ok(()) => Ok(ControlFlow::Continue),
        Err(error) if error.is::<ExitRequested>() => Ok(ControlFlow::Exit),
        Err(error) => Err(ShellError::Execution {
            command: command.name().to_string(),
            error,
        }),
    }
}
