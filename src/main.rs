// Command-line entry point for calltrace_view.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use calltrace_view::api::commands::run_command_loop;
use calltrace_view::application::TraceViewSession;
use calltrace_view::config::ViewerConfig;
use calltrace_view::infrastructure::{LoggingLayoutTrigger, TraceLoader};
use calltrace_view::ports::dot_exporter::DotExporter;
use calltrace_view::ports::GraphExporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Dot,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON call trace (flat node list or nested call tree)
    #[arg(short, long)]
    trace: PathBuf,

    /// Viewer config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum child count for a fan-out (overrides the config file)
    #[arg(long)]
    fanout_threshold: Option<usize>,

    /// Layout name passed to the renderer (overrides the config file)
    #[arg(long)]
    layout: Option<String>,

    /// Do not ask the renderer to fit the viewport after a layout
    #[arg(long)]
    no_fit: bool,

    /// Toggle these nodes, in order, before exporting
    #[arg(long)]
    collapse: Vec<String>,

    /// Fully expand these nodes, in order, after the collapses
    #[arg(long)]
    expand_all: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read JSON commands from stdin and answer on stdout
    #[arg(short, long)]
    interactive: bool,
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };

    if let Some(threshold) = cli.fanout_threshold {
        config.fanout_threshold = threshold;
    }
    if let Some(layout) = &cli.layout {
        config.layout.name = layout.clone();
    }
    if cli.no_fit {
        config.layout.fit = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let graph = TraceLoader::load_file(&cli.trace)?;

    let layout = LoggingLayoutTrigger;
    let mut session = TraceViewSession::new(graph, config, &layout)?;

    if cli.interactive {
        let stdin = io::stdin();
        return run_command_loop(&mut session, stdin.lock(), io::stdout().lock());
    }

    for id in &cli.collapse {
        session
            .toggle_children(id)
            .with_context(|| format!("Cannot collapse {}", id))?;
    }
    for id in &cli.expand_all {
        session
            .expand_all_descendants(id)
            .with_context(|| format!("Cannot expand {}", id))?;
    }

    match (cli.format, &cli.output) {
        (OutputFormat::Dot, Some(path)) => {
            let path_str = path.to_string_lossy();
            DotExporter
                .export(session.graph(), &path_str)
                .with_context(|| format!("Failed to write {}", path_str))?;
        }
        (OutputFormat::Dot, None) => println!("{}", DotExporter::to_dot(session.graph())),
        (OutputFormat::Json, output) => {
            let json = serde_json::to_string_pretty(&session.snapshot())?;
            match output {
                Some(path) => fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
