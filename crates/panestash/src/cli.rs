use std::fmt::Write as _;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use panestash_core::codec::RestoreReport;
use panestash_core::config::Config;
use panestash_core::error::LayoutError;
use panestash_core::manager::{LayoutManager, Navigation, Outcome};
use panestash_core::sim::SimSurface;
use serde_json::json;

use crate::output::{self, ListEntry, OutputFormat, Reply};

const EXIT_OK: i32 = 0;
/// Unknown name or no current layout.
const EXIT_LAYOUT: i32 = 1;
/// Config, surface file or usage problems.
const EXIT_SETUP: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "pstash",
    about = "Save, restore and cycle named split-pane layouts",
    version
)]
pub struct Cli {
    /// Config file (defaults to $PANESTASH_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Layout store file, overriding `[store] path`
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// JSON surface state to operate on; written back when a command changes it
    #[arg(long, global = true, env = "PANESTASH_SURFACE")]
    pub surface: Option<PathBuf>,

    /// Output format for replies
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Log level, overriding `[general] log_level`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Capture the surface and store it under NAME.
    Add { name: String },

    /// Rebuild the layout stored under NAME.
    Restore { name: String },

    /// Remove the layout stored under NAME.
    Delete { name: String },

    /// Re-capture the surface into the current layout.
    Update,

    /// Restore the layout after the current one.
    Next,

    /// Restore the layout before the current one.
    #[command(alias = "previous")]
    Prev,

    /// List stored layout names, most recent first.
    List,

    /// Print a stored layout.
    Show { name: String },

    /// Read commands from stdin, one per line, sharing one current layout.
    /// Lines are split like a shell command, so quote names with spaces.
    Session,
}

/// One line of `pstash session` input.
#[derive(Debug, Parser)]
#[command(name = "pstash", no_binary_name = true)]
struct SessionLine {
    #[command(subcommand)]
    command: Commands,
}

pub fn run_from_env() -> i32 {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> i32 {
    let format = cli.format;

    let config = match Config::bootstrap(cli.config.as_deref(), cli.log_level.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let remediation = e.remediation().render_plain();
            output::fatal(&anyhow::Error::new(e), Some(remediation), format);
            return EXIT_SETUP;
        }
    };

    let surface = match load_surface(cli.surface.as_deref()) {
        Ok(surface) => surface,
        Err(e) => {
            output::fatal(&e, None, format);
            return EXIT_SETUP;
        }
    };
    let before = surface.clone();

    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path());
    tracing::debug!(path = %store_path.display(), "opening layout store");
    let mut manager = LayoutManager::open(surface, store_path, config.restore.clone());

    let mut code = match &cli.command {
        Commands::Session => run_session(&mut manager, format),
        command => execute(&mut manager, command, format),
    };

    if let Some(path) = &cli.surface {
        if manager.surface() != &before {
            if let Err(e) = save_surface(path, manager.surface()) {
                output::fatal(&e, None, format);
                code = code.max(EXIT_SETUP);
            }
        }
    }
    code
}

fn load_surface(path: Option<&Path>) -> anyhow::Result<SimSurface> {
    let Some(path) = path else {
        return Ok(SimSurface::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "surface file absent; starting from a single pane");
        return Ok(SimSurface::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read surface {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid surface file {}", path.display()))
}

fn save_surface(path: &Path, surface: &SimSurface) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(surface).context("failed to serialize surface")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write surface {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace surface {}", path.display()))?;
    Ok(())
}

fn run_session(manager: &mut LayoutManager<SimSurface>, format: OutputFormat) -> i32 {
    let mut code = EXIT_OK;
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                output::fatal(
                    &anyhow::Error::new(e).context("failed to read session input"),
                    None,
                    format,
                );
                return code.max(EXIT_SETUP);
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words = match shell_words::split(line) {
            Ok(words) => words,
            Err(e) => {
                output::fatal(
                    &anyhow::Error::new(e).context(format!("unparsable session line: {line}")),
                    None,
                    format,
                );
                code = code.max(EXIT_SETUP);
                continue;
            }
        };
        let parsed = match SessionLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = e.print();
                if e.use_stderr() {
                    code = code.max(EXIT_SETUP);
                }
                continue;
            }
        };
        let line_code = if matches!(parsed.command, Commands::Session) {
            output::fatal(&anyhow::anyhow!("session cannot be nested"), None, format);
            EXIT_SETUP
        } else {
            execute(manager, &parsed.command, format)
        };
        code = code.max(line_code);
    }
    code
}

fn execute(
    manager: &mut LayoutManager<SimSurface>,
    command: &Commands,
    format: OutputFormat,
) -> i32 {
    match command {
        Commands::Add { name } => finish(manager.add(name), format, |()| {
            Reply::new("add", format!("saved {name}"), json!({ "name": name }))
        }),
        Commands::Restore { name } => finish(manager.restore(name), format, |report| {
            Reply::new(
                "restore",
                restored_plain(name, &report),
                json!({ "name": name, "report": report }),
            )
        }),
        Commands::Delete { name } => finish(manager.delete(name), format, |()| {
            Reply::new("delete", format!("deleted {name}"), json!({ "name": name }))
        }),
        Commands::Update => finish(manager.update_current(), format, |name| {
            Reply::new("update", format!("updated {name}"), json!({ "name": name }))
        }),
        Commands::Next => finish(manager.next(), format, |nav| navigated("next", &nav)),
        Commands::Prev => finish(manager.prev(), format, |nav| navigated("prev", &nav)),
        Commands::List => {
            let current = manager.current().name();
            let entries: Vec<ListEntry<'_>> = manager
                .store()
                .entries()
                .iter()
                .map(|entry| ListEntry {
                    name: &entry.name,
                    saved_at: entry.saved_at,
                    leaves: entry.snapshot.leaf_count(),
                    current: current == Some(entry.name.as_str()),
                })
                .collect();
            let mut plain = String::new();
            for entry in &entries {
                let marker = if entry.current { "* " } else { "  " };
                let _ = writeln!(plain, "{marker}{}", entry.name);
            }
            output::emit(
                &Reply::new("list", plain, json!({ "layouts": entries, "current": current })),
                format,
            );
            EXIT_OK
        }
        Commands::Show { name } => report(manager.show(name), format, |entry| {
            Reply::new(
                "show",
                output::render_layout(entry),
                json!({ "layout": entry }),
            )
        }),
        Commands::Session => {
            output::fatal(&anyhow::anyhow!("session cannot be nested"), None, format);
            EXIT_SETUP
        }
    }
}

fn navigated(command: &str, nav: &Navigation) -> Reply {
    Reply::new(
        command,
        restored_plain(&nav.name, &nav.report),
        json!({ "name": nav.name, "report": nav.report }),
    )
}

fn restored_plain(name: &str, report: &RestoreReport) -> String {
    let mut text = format!("restored {name} ({} panes)", report.panes_created);
    for (index, reason) in &report.failed_leaves {
        let _ = write!(text, "\n  leaf {index} not placed: {reason}");
    }
    for (index, reason) in &report.content_failures {
        let _ = write!(text, "\n  leaf {index} kept its content: {reason}");
    }
    text
}

fn finish<T>(outcome: Outcome<T>, format: OutputFormat, reply: impl FnOnce(T) -> Reply) -> i32 {
    if let Some(err) = &outcome.persist_error {
        output::warning(err, format);
    }
    report(outcome.result, format, reply)
}

fn report<T>(
    result: Result<T, LayoutError>,
    format: OutputFormat,
    reply: impl FnOnce(T) -> Reply,
) -> i32 {
    match result {
        Ok(value) => {
            output::emit(&reply(value), format);
            EXIT_OK
        }
        Err(err) => {
            output::error(&err, format);
            exit_code(&err)
        }
    }
}

const fn exit_code(err: &LayoutError) -> i32 {
    match err {
        LayoutError::NotFound(_) | LayoutError::NothingCurrent => EXIT_LAYOUT,
        LayoutError::PersistenceUnavailable { .. } => EXIT_SETUP,
    }
}
