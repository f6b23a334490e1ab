//! Clap derive structures for the `netdash` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netdash -- documents and messages from the operations dashboard
#[derive(Debug, Parser)]
#[command(
    name = "netdash",
    version,
    about = "Browse and manage netdash documents and messages",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NETDASH_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL (overrides config)
    #[arg(long, short = 'u', env = "NETDASH_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token (overrides config)
    #[arg(long, env = "NETDASH_TOKEN", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "NETDASH_OUTPUT", default_value = "table", global = true)]
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// One identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse, upload and delete documents
    #[command(alias = "docs", alias = "d")]
    Documents(DocumentsArgs),

    /// Read and send messages
    #[command(alias = "msg", alias = "m")]
    Messages(MessagesArgs),

    /// Inspect and initialise configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Page to fetch (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Items per page (defaults to config)
    #[arg(long, short = 'l')]
    pub page_size: Option<u32>,

    /// Server-side filter, repeatable (key=value)
    #[arg(long = "filter", short = 'f', value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,

    /// Sort field
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in '{raw}'"));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}

// ── Documents ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: DocumentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List documents
    #[command(alias = "ls")]
    List(ListArgs),

    /// Full-text search on the server
    Search {
        query: String,
        #[arg(long, short = 'p', default_value = "1")]
        page: u32,
    },

    /// Show one document
    Get { id: String },

    /// Upload one or more files
    #[command(alias = "up")]
    Upload(UploadArgs),

    /// Edit document metadata
    Update(DocumentUpdateArgs),

    /// Delete a document
    #[command(alias = "rm")]
    Delete { id: String },

    /// Totals and per-category counts for one page
    Stats(ListArgs),

    /// Distinct tags on one page
    Tags(ListArgs),
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Title (single file only; defaults to the file name)
    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Tag, repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Content type (guessed from the extension otherwise)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct DocumentUpdateArgs {
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Replace all tags, repeatable
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,
}

// ── Messages ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MessagesArgs {
    #[command(subcommand)]
    pub command: MessagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// List messages
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only unread messages on the fetched page
        #[arg(long)]
        unread: bool,
    },

    /// Show one message
    Get { id: String },

    /// Mark a message as read
    Read { id: String },

    /// Send a message
    Send(SendArgs),

    /// Delete a message
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, short = 's')]
    pub subject: String,

    #[arg(long, short = 'b')]
    pub body: String,

    /// Recipient, repeatable
    #[arg(long = "to", required = true)]
    pub recipients: Vec<String>,

    /// low, normal, high or urgent
    #[arg(long, default_value = "normal")]
    pub priority: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (token masked)
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filters_parse_as_pairs() {
        let cli = Cli::try_parse_from([
            "netdash", "documents", "list", "-f", "category=ops", "--filter", "tag = vpn",
        ])
        .unwrap();
        let Command::Documents(DocumentsArgs {
            command: DocumentsCommand::List(list),
        }) = cli.command
        else {
            panic!("expected documents list");
        };
        assert_eq!(
            list.filters,
            vec![("category".into(), "ops".into()), ("tag".into(), "vpn".into())]
        );
    }

    #[test]
    fn malformed_filter_is_rejected() {
        assert!(Cli::try_parse_from(["netdash", "documents", "list", "-f", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["netdash", "documents", "list", "-f", "=x"]).is_err());
    }

    #[test]
    fn upload_needs_a_file() {
        assert!(Cli::try_parse_from(["netdash", "documents", "upload"]).is_err());
    }
}
