//! Clap derive structures for the `botdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// botdesk -- admin console for a messaging bot and its model provider
#[derive(Debug, Parser)]
#[command(
    name = "botdesk",
    version,
    about = "Configure a messaging bot, its language-model provider and tools",
    long_about = "Admin console for the botdesk settings backend.\n\n\
        Edits are diffed against the server snapshot before anything is sent:\n\
        unchanged forms send nothing, model/prompt edits are patched, and\n\
        provider or credential changes replace the configuration.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "BOTDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Admin backend URL (overrides profile)
    #[arg(long, short = 'b', env = "BOTDESK_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Admin key sent as X-Admin-Key
    #[arg(long, env = "BOTDESK_ADMIN_KEY", global = true, hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BOTDESK_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BOTDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BOTDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current connector and provider settings
    #[command(alias = "status")]
    Settings,

    /// Manage the messaging-bot connector
    #[command(alias = "bot")]
    Connector(ConnectorArgs),

    /// Manage the language-model provider
    #[command(alias = "llm")]
    Provider(ProviderArgs),

    /// Manage extension tools and their settings
    #[command(alias = "tool")]
    Tools(ToolsArgs),

    /// Follow connectivity status of both integrations
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONNECTOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConnectorArgs {
    #[command(subcommand)]
    pub command: ConnectorCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConnectorCommand {
    /// Show connector settings (masked)
    Show,

    /// Save connector settings; unchanged values are not sent
    Save {
        /// New bot access token
        #[arg(long, env = "BOTDESK_BOT_TOKEN", hide_env_values = true, conflicts_with = "ask_token")]
        token: Option<String>,

        /// Prompt for the bot token without echo
        #[arg(long)]
        ask_token: bool,

        /// Messaging API base URL (blank uses the default)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Test connectivity with the stored token
    Test,

    /// Restart the bot with the stored token
    Activate,

    /// Delete all connector settings
    Clear,

    /// Remove only the stored token and stop the bot
    Unbind,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROVIDER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProviderArgs {
    #[command(subcommand)]
    pub command: ProviderCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    /// Show provider settings (masked)
    Show,

    /// List supported providers and their preset models
    Catalog,

    /// List models available for a provider
    Models {
        /// Provider id (defaults to the saved provider)
        #[arg(long)]
        provider: Option<String>,

        /// Project id for project-scoped listings
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Save provider settings; model-only edits are patched
    Save(ProviderSaveArgs),

    /// Test connectivity with the stored key
    Test,

    /// Reload the assistant with the stored key
    Activate,

    /// Delete all provider settings
    Clear,

    /// Remove only the stored API key and stop the assistant
    Unbind,
}

#[derive(Debug, Args)]
pub struct ProviderSaveArgs {
    /// Provider id (e.g. openai, anthropic, ollama, azure, custom)
    #[arg(long)]
    pub provider: Option<String>,

    /// New API key
    #[arg(long, env = "BOTDESK_API_KEY", hide_env_values = true, conflicts_with = "ask_key")]
    pub api_key: Option<String>,

    /// Prompt for the API key without echo
    #[arg(long)]
    pub ask_key: bool,

    /// Provider base URL (blank uses the catalog default)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model id
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// System prompt ("" clears it)
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Project id ("" clears it)
    #[arg(long)]
    pub project_id: Option<String>,

    /// Enterprise gateway endpoint (gateway providers only)
    #[arg(long)]
    pub gateway_endpoint: Option<String>,

    /// Gateway API version (gateway providers only)
    #[arg(long)]
    pub api_version: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOOLS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub command: ToolsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// List available tools
    #[command(alias = "ls")]
    List,

    /// Show a tool's settings form (secrets stay masked)
    Show {
        /// Tool name
        name: String,
    },

    /// Change a tool's settings
    Configure {
        /// Tool name
        name: String,

        /// Setting to change, as KEY=VALUE (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Prompt for every field
        #[arg(long, short = 'i')]
        interactive: bool,
    },

    /// Test a tool's connection with its saved settings
    Test {
        /// Tool name
        name: String,
    },

    /// Enable a tool
    Enable {
        /// Tool name
        name: String,
    },

    /// Disable a tool
    Disable {
        /// Tool name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many status changes
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
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
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Key (backend, admin_key, admin_key_env, ca_cert, insecure, timeout, poll_interval_secs)
        key: String,

        /// Value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store the admin key in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
