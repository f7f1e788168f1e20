use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cmdtree_exec::argument::ArgumentSpec;
use cmdtree_exec::command::{pad_right, CommandSpec, Invocation};
use cmdtree_exec::commander::Commander;
use cmdtree_exec::config::{Config, DEFAULT_PROMPT};
use cmdtree_exec::control::ControlFlow;
use cmdtree_exec::flag::FlagSpec;
use cmdtree_exec::host::OsHost;
use cmdtree_shell::value::ArgType;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Config as ReadlineConfig, Context as ReadlineContext, Editor, Helper,
};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Interactive demo shell over a small process inventory.
#[derive(Debug, Parser)]
#[command(name = "cmdtree-demo")]
struct Cli {
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Append every submitted line to this file.
    #[arg(long)]
    dump_file: Option<PathBuf>,

    #[arg(long, default_value = ".cmdtree_history")]
    history_file: PathBuf,

    /// Log filter, e.g. `debug` or `cmdtree_exec=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,

    /// Run a single line and exit.
    #[arg(short, long)]
    command: Option<String>,
}

fn init_tracing(level: Option<&str>) {
    let env_filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Process {
    id: u32,
    name: &'static str,
    invocation: &'static str,
}

#[derive(Debug, Serialize)]
struct ProcessGroup {
    name: &'static str,
    processes: Vec<&'static Process>,
}

static SSHD: Process = Process {
    id: 3838,
    name: "sshd",
    invocation: "/usr/sbin/sshd",
};
static DATABASE: Process = Process {
    id: 489437,
    name: "database",
    invocation: "/etc/db/db",
};
static DB_WATCHER: Process = Process {
    id: 23733,
    name: "db-watcher",
    invocation: "/etc/db/db-watch",
};
static DB_POOL: Process = Process {
    id: 3453,
    name: "db-pool",
    invocation: "/etc/db/db-pool",
};

fn processes() -> Vec<&'static Process> {
    vec![&SSHD, &DATABASE, &DB_WATCHER, &DB_POOL]
}

fn process_groups() -> Vec<ProcessGroup> {
    vec![
        ProcessGroup {
            name: "sshd",
            processes: vec![&SSHD],
        },
        ProcessGroup {
            name: "db",
            processes: vec![&DATABASE, &DB_WATCHER, &DB_POOL],
        },
    ]
}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn bold(text: &str, width: usize) -> String {
    format!("{BOLD}{}{RESET}", pad_right(text, width))
}

fn get_resource(inv: &mut Invocation<'_>) -> Result<()> {
    let resource = inv.args.get_str("resource-type").unwrap_or_default();
    let output = inv.args.get_str("output").unwrap_or("table");
    let out = &mut *inv.stdout;

    match (resource, output) {
        ("process", "json") => writeln!(out, "{}", serde_json::to_string(&processes())?)?,
        ("group", "json") => writeln!(out, "{}", serde_json::to_string(&process_groups())?)?,
        ("process", _) => {
            writeln!(out, "{}{}{BOLD}INVOCATION{RESET}", bold("PID", 12), bold("NAME", 25))?;
            for process in processes() {
                writeln!(
                    out,
                    "{}{}{}",
                    pad_right(&process.id.to_string(), 12),
                    pad_right(process.name, 25),
                    process.invocation
                )?;
            }
        }
        _ => {
            writeln!(out, "{}{}{BOLD}PROCESS{RESET}", bold("GROUP", 20), bold("PID", 12))?;
            for group in process_groups() {
                for process in &group.processes {
                    writeln!(
                        out,
                        "{}{}{}",
                        pad_right(group.name, 20),
                        pad_right(&process.id.to_string(), 12),
                        process.name
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn kill_process(inv: &mut Invocation<'_>) -> Result<()> {
    let signal = inv.args.get_int("signal").unwrap_or(15);
    for pid in inv.args.get_ints("pid") {
        let Some(process) = processes().into_iter().find(|p| i64::from(p.id) == pid) else {
            anyhow::bail!("no process with pid {pid}");
        };
        writeln!(inv.stdout, "sent signal {signal} to {} ({pid})", process.name)?;
    }
    Ok(())
}

fn demo_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("get")
            .description("get information about a resource")
            .argument(
                ArgumentSpec::new("resource-type")
                    .description("type of resource to locate")
                    .one_of(["process", "group"]),
            )
            .flag(
                FlagSpec::new("output")
                    .short("o")
                    .description("command output format")
                    .arg_type(ArgType::String)
                    .default_value("table")
                    .one_of(["json", "table"]),
            )
            .on_execute(get_resource),
        CommandSpec::new("process")
            .description("act on running processes")
            .subcommand(
                CommandSpec::new("kill")
                    .description("signal one or more processes")
                    .flag(
                        FlagSpec::new("signal")
                            .short("s")
                            .description("signal number")
                            .arg_type(ArgType::Int)
                            .default_value(15),
                    )
                    .argument(
                        ArgumentSpec::new("pid")
                            .description("process id")
                            .arg_type(ArgType::Int)
                            .allow_multiple()
                            .completer(|prefix| {
                                processes()
                                    .iter()
                                    .map(|p| p.id.to_string())
                                    .filter(|id| id.starts_with(prefix))
                                    .collect()
                            }),
                    )
                    .on_execute(kill_process),
            ),
    ]
}

// ---------------------------------------------------------------------------
// Line reader
// ---------------------------------------------------------------------------

struct ShellHelper {
    commander: Rc<Commander>,
}

impl Helper for ShellHelper {}
impl Validator for ShellHelper {}
impl Highlighter for ShellHelper {}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let safe_pos = pos.min(line.len());
        let (before, after) = line.split_at(safe_pos);
        let start = before
            .rfind(|c: char| c.is_whitespace() || c == '|' || c == '>')
            .map_or(0, |index| index + 1);

        let Some(suggestions) = self.commander.suggest(before, after, line) else {
            return Ok((safe_pos, Vec::new()));
        };
        let pairs = suggestions
            .into_iter()
            .map(|s| Pair {
                display: s.display,
                replacement: s.value,
            })
            .collect();
        Ok((start, pairs))
    }
}

fn build_editor(commander: Rc<Commander>) -> Result<Editor<ShellHelper, DefaultHistory>> {
    let config = ReadlineConfig::builder().build();
    let mut editor = Editor::<ShellHelper, DefaultHistory>::with_config(config)
        .context("failed to initialize line editor")?;
    editor.set_helper(Some(ShellHelper { commander }));
    Ok(editor)
}

fn load_history(editor: &mut Editor<ShellHelper, DefaultHistory>, path: &Path) {
    if let Err(error) = editor.load_history(path) {
        if !matches!(
            error,
            ReadlineError::Io(ref io_error) if io_error.kind() == std::io::ErrorKind::NotFound
        ) {
            tracing::warn!("failed to load history from {}: {error}", path.display());
        }
    }
}

fn save_history(editor: &mut Editor<ShellHelper, DefaultHistory>, path: &Path) {
    if let Err(error) = editor.save_history(path) {
        tracing::warn!("failed to save history to {}: {error}", path.display());
    }
}

fn run_interactive(commander: Rc<Commander>) -> Result<()> {
    let history = commander.history_file().map(Path::to_path_buf);
    let mut editor = build_editor(commander.clone())?;
    if let Some(path) = &history {
        load_history(&mut editor, path);
    }

    loop {
        let line = match editor.readline(commander.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error).context("failed to read line"),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line.as_str());
        if commander.submit_line(&line) == ControlFlow::Exit {
            break;
        }
    }

    if let Some(path) = &history {
        save_history(&mut editor, path);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = Config::new(demo_commands())
        .prompt(cli.prompt)
        .history_file(cli.history_file);
    if let Some(path) = cli.dump_file {
        config = config.dump_file(path);
    }
    let commander =
        Commander::new(config, Arc::new(OsHost)).context("invalid command definitions")?;

    if let Some(line) = cli.command {
        commander.submit_line(&line);
        return Ok(());
    }
    run_interactive(Rc::new(commander))
}
