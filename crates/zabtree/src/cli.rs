//! Clap derive structures for the `zabtree` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zabtree -- build Zabbix IT-service trees from triggers
#[derive(Debug, Parser)]
#[command(
    name = "zabtree",
    version,
    about = "Build Zabbix IT-service trees from the trigger inventory",
    long_about = "Derives a host group > host > trigger IT-service tree from the triggers\n\
        Zabbix monitors, creates the nodes that are missing, and can purge the\n\
        whole tree again. Runs are idempotent: existing nodes are reused.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, env = "ZABTREE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Zabbix frontend URL (overrides profile)
    #[arg(long, short = 's', env = "ZABTREE_SERVER", global = true)]
    pub server: Option<String>,

    /// Zabbix user name (overrides profile)
    #[arg(long, short = 'u', env = "ZABTREE_USER", global = true)]
    pub user: Option<String>,

    /// Prompt for the password
    #[arg(
        long = "password-prompt",
        short = 'p',
        global = true,
        conflicts_with = "passfile"
    )]
    pub password_prompt: bool,

    /// Read the password from a file
    #[arg(long, value_name = "FILE", global = true)]
    pub passfile: Option<PathBuf>,

    /// The frontend sits behind HTTP basic auth
    #[arg(long = "http-auth", alias = "httpauth", global = true)]
    pub http_auth: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ZABTREE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ZABTREE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZABTREE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// How created services derive their status from children.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    /// Problem if at least one child has a problem
    Any,
    /// Problem if all children have problems
    All,
    /// Do not calculate
    None,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the missing service nodes for the current trigger inventory
    #[command(alias = "sync")]
    Populate(PopulateArgs),

    /// Delete every IT service
    Purge(PurgeArgs),

    /// List the current service tree
    #[command(alias = "ls")]
    Services(ServicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TREE OPERATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PopulateArgs {
    /// Build the tree for this host group only
    #[arg(long)]
    pub hostgroup: Option<String>,

    /// SLA target in percent for created services [default: 99.9]
    #[arg(long)]
    pub sla: Option<f64>,

    /// Minimum trigger severity, 0-5 or a name such as "high" [default: 5]
    #[arg(long)]
    pub priority: Option<String>,

    /// Only triggers whose description contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Top-level service above the host groups
    #[arg(long)]
    pub root: Option<String>,

    /// Second prefix level, under --root
    #[arg(long, requires = "root")]
    pub branch: Option<String>,

    /// Third prefix level, under --branch
    #[arg(long, requires = "branch")]
    pub node: Option<String>,

    /// Status calculation for created services
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Include triggers that are disabled or on unmonitored hosts
    #[arg(long)]
    pub include_unmonitored: bool,

    /// Also write the result as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Give up after this many cycles without progress [default: 3]
    #[arg(long, value_name = "N")]
    pub max_stalled: Option<u32>,

    /// Also write the result as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ServicesArgs {
    /// Also write the listing as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
