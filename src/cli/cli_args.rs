use clap::{Parser, Subcommand, ValueEnum};

/// Connector factory CLI - resolve database providers to drivers
#[derive(Parser, Debug)]
#[command(name = "connfactory")]
#[command(about = "Resolve database provider names into connection-producing drivers")]
#[command(version = "0.1.0")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List known providers with their aliases and driver candidates
    Providers {
        /// Show aliases and candidates
        #[arg(short, long)]
        detailed: bool,
    },

    /// Resolve a provider name or alias to its driver
    Resolve {
        /// Provider name or alias (e.g. "npgsql", "SqlServer")
        provider: String,
    },

    /// Load a driver directly from a qualified reference
    Load {
        /// Reference in the form "Type.Name, Origin"
        reference: String,
    },

    /// Create a connection for a provider
    Connect {
        /// Provider name or alias
        provider: String,

        /// Connection string, passed to the driver unmodified
        #[arg(value_name = "CONNECTION_STRING")]
        connection_string: String,

        /// Open the connection after creating it
        #[arg(long)]
        open: bool,
    },
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    /// Colored text output
    Text,
    /// JSON output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
