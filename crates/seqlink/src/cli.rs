//! Clap derive structures for the `seqlink` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this module may
//! only depend on clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// seqlink -- keep ALSA sequencer ports connected by name
#[derive(Debug, Parser)]
#[command(
    name = "seqlink",
    version,
    about = "Connect ALSA sequencer ports by name",
    long_about = "Connects ALSA MIDI sequencer ports whose names match configured\n\
        (source, destination) pairs. Runs once, or keeps running and connects\n\
        matching ports as devices and applications come and go.",
    after_help = "Pairs file format: one `source,destination` pair of port names per line, \
        no header.",
    propagate_version = true,
    arg_required_else_help = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(flatten)]
    pub connect: ConnectArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file (default: platform config dir)
    #[arg(long, short = 'c', env = "SEQLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for sequencer state and config
    #[arg(
        long,
        short = 'o',
        env = "SEQLINK_OUTPUT",
        default_value = "plain",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v logs every received event, -vv traces matching)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Connect Options ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Print the sequencer state: clients, ports, capabilities, connections
    #[arg(long, short = 'i')]
    pub info: bool,

    /// Read port pairs to connect from a CSV file
    #[arg(long = "pairs", short = 'f', value_name = "FILE")]
    pub pairs: Option<PathBuf>,

    /// Keep running and connect ports as they appear
    #[arg(long, short = 'r')]
    pub run: bool,

    /// Client name to register with the sequencer
    #[arg(long, value_name = "NAME")]
    pub client_name: Option<String>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per client and port (default)
    Plain,
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

// ── Subcommands ──────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the configuration file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
