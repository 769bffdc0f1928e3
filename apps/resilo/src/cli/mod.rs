//! # Resilo CLI Module
//!
//! This module implements the CLI interface for Resilo.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show store status
//! - `sessions` - List assessment sessions
//! - `new-session` - Create an assessment session
//! - `progress` - Show a session's progress summary
//! - `show` - Show one topic's rating entry
//! - `rate` - Rate a topic (flags or keystroke notation)
//! - `export` - Export a session archive to file
//! - `import` - Import a session archive from file
//! - `init` - Initialize a new database

mod commands;

use clap::{Parser, Subcommand};
use resilo_core::ResiloError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Resilo - Maturity Assessment Server
///
/// Assessors rate topics on a maturity scale twice - current and
/// desired - and the same rule engine validates every entry, whether it
/// arrives over HTTP or from this CLI.
#[derive(Parser, Debug)]
#[command(name = "resilo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the assessment database
    #[arg(short = 'D', long, global = true, default_value = "resilo.db")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Path to the TOML configuration file
    #[arg(short = 'C', long, global = true, default_value = "resilo.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show store status
    Status,

    /// List assessment sessions
    Sessions,

    /// Create a new assessment session
    NewSession {
        /// Session name
        #[arg(short, long)]
        name: String,

        /// Who is running the assessment
        #[arg(short, long)]
        assessor: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a session's progress summary
    Progress {
        /// Session id
        #[arg(short, long)]
        session: u64,
    },

    /// Show one topic's rating entry
    Show {
        /// Session id
        #[arg(short, long)]
        session: u64,

        /// Topic id
        #[arg(short, long)]
        topic: u64,
    },

    /// Rate a topic
    Rate {
        /// Session id
        #[arg(short, long)]
        session: u64,

        /// Topic id
        #[arg(short, long)]
        topic: u64,

        /// Keystroke notation for rapid entry, e.g. "3", "shift+5", "n"
        /// (repeatable; applied in order before the explicit flags)
        #[arg(short = 'k', long = "stroke")]
        strokes: Vec<String>,

        /// Set the current maturity level
        #[arg(long)]
        current: Option<u8>,

        /// Mark current as not applicable
        #[arg(long)]
        current_na: bool,

        /// Set the desired maturity level
        #[arg(long)]
        desired: Option<u8>,

        /// Mark desired as not applicable
        #[arg(long)]
        desired_na: bool,

        /// Attach a comment
        #[arg(long)]
        comment: Option<String>,

        /// Attach an evidence link (repeatable, replaces stored links)
        #[arg(long = "evidence")]
        evidence: Vec<String>,
    },

    /// Export a session archive to file
    Export {
        /// Session id
        #[arg(short, long)]
        session: u64,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a session archive from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ResiloError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(&cli.database, backend, &cli.config, host, port).await
        }
        Some(Commands::Status) => cmd_status(&cli.database, backend, &cli.config, json_mode),
        Some(Commands::Sessions) => cmd_sessions(&cli.database, backend, json_mode),
        Some(Commands::NewSession {
            name,
            assessor,
            notes,
        }) => cmd_new_session(&cli.database, backend, json_mode, &name, assessor, notes),
        Some(Commands::Progress { session }) => {
            cmd_progress(&cli.database, backend, json_mode, session)
        }
        Some(Commands::Show { session, topic }) => {
            cmd_show(&cli.database, backend, &cli.config, json_mode, session, topic)
        }
        Some(Commands::Rate {
            session,
            topic,
            strokes,
            current,
            current_na,
            desired,
            desired_na,
            comment,
            evidence,
        }) => cmd_rate(
            &cli.database,
            backend,
            &cli.config,
            json_mode,
            session,
            topic,
            &strokes,
            RatingFlags {
                current,
                current_na,
                desired,
                desired_na,
                comment,
                evidence,
            },
        ),
        Some(Commands::Export { session, output }) => {
            cmd_export(&cli.database, backend, session, &output)
        }
        Some(Commands::Import { input }) => cmd_import(&cli.database, backend, json_mode, &input),
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.database, backend, &cli.config, json_mode)
        }
    }
}
