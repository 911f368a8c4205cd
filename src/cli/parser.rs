use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for linkvault
/// Capture and keep estimate share links, locally or on a remote backend
#[derive(Parser)]
#[command(
    name = "linkvault",
    version = env!("CARGO_PKG_VERSION"),
    about = "Save estimate share links as they are copied, with duplicate detection and CSV export",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the effective configuration (API key masked)")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Save a link, unless it is already saved
    Capture {
        /// The link to save
        url: String,

        /// Display name (defaults to the configured fallback name)
        #[arg(long = "name")]
        name: Option<String>,
    },

    /// List saved links, newest first
    List,

    /// Delete one saved link by ID
    Del {
        /// Record ID as shown by `list`
        id: String,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Delete every saved link
    Clear {
        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Export saved links
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Replay a page script through the capture watcher
    Watch {
        #[arg(long, value_name = "FILE", help = "JSON-lines page script")]
        script: String,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}
